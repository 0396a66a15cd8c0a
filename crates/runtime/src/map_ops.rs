//! Map operations
//!
//! Keys compare by value and tag, so `1`, `true` and `1.0` are three
//! different keys. Lookups that miss report `OutOfRange` with "map key".

use crate::containers::Map;
use crate::error::{Result, RuntimeError};
use crate::registry::{Handle, Shared};
use crate::runtime::{Runtime, busy, destroy, index_arg};
use dynval_core::{Cell, DynObject, TagPtr};

fn missing_key() -> RuntimeError {
    RuntimeError::OutOfRange { what: "map key" }
}

impl Runtime {
    pub fn map_new(&mut self) -> Result<Handle> {
        self.maps.add(Map::new())
    }

    pub(crate) fn map(&self, map: Handle) -> Result<Shared<Map>> {
        self.maps.get(map)
    }

    fn with_map<R>(&self, map: Handle, f: impl FnOnce(&Map) -> R) -> Result<R> {
        let map = self.map(map)?;
        let map = map.try_borrow().map_err(|_| busy())?;
        Ok(f(&*map))
    }

    fn with_map_mut<R>(&self, map: Handle, f: impl FnOnce(&mut Map) -> R) -> Result<R> {
        let map = self.map(map)?;
        let mut map = map.try_borrow_mut().map_err(|_| busy())?;
        Ok(f(&mut *map))
    }

    pub fn map_delete(&mut self, map: Handle) -> Result<()> {
        destroy(&mut self.maps, map)
    }

    pub fn map_size(&self, map: Handle) -> Result<usize> {
        self.with_map(map, |m| m.len())
    }

    pub fn map_clear(&mut self, map: Handle) -> Result<()> {
        self.with_map_mut(map, |m| m.clear())
    }

    /// Add an entry; `false` if the key is already present
    pub fn map_add(&mut self, map: Handle, key: DynObject, value: DynObject) -> Result<bool> {
        self.with_map_mut(map, |m| m.insert(key, value))
    }

    /// Add or replace an entry
    pub fn map_set(&mut self, map: Handle, key: DynObject, value: DynObject) -> Result<()> {
        self.with_map_mut(map, |m| {
            m.set(key, value);
        })
    }

    pub fn map_get(&self, map: Handle, key: &DynObject) -> Result<Option<DynObject>> {
        self.with_map(map, |m| m.get(key).cloned())
    }

    pub fn map_get_cell(&self, map: Handle, key: &DynObject, offset: Cell) -> Result<Cell> {
        self.with_map(map, |m| match m.get(key) {
            Some(v) => v.get_cell(offset).map_err(RuntimeError::from),
            None => Err(missing_key()),
        })?
    }

    /// Like [`Runtime::map_get_cell`], failing unless the stored value's tag fits `tag`
    pub fn map_get_checked(
        &self,
        map: Handle,
        key: &DynObject,
        offset: Cell,
        tag: TagPtr,
    ) -> Result<Cell> {
        self.with_map(map, |m| match m.get(key) {
            Some(v) if !tag.accepts(v.tag()) => Err(RuntimeError::TypeMismatch),
            Some(v) => v.get_cell(offset).map_err(RuntimeError::from),
            None => Err(missing_key()),
        })?
    }

    pub fn map_remove(&mut self, map: Handle, key: &DynObject) -> Result<bool> {
        self.with_map_mut(map, |m| m.remove(key).is_some())
    }

    pub fn map_contains(&self, map: Handle, key: &DynObject) -> Result<bool> {
        self.with_map(map, |m| m.contains(key))
    }

    /// Key of the `index`-th entry in entry order
    pub fn map_key_at(&self, map: Handle, index: Cell) -> Result<DynObject> {
        let index = index_arg(index, "map index")?;
        self.with_map(map, |m| m.entry_at(index).map(|(k, _)| k.clone()))?
            .ok_or(RuntimeError::OutOfRange { what: "map index" })
    }

    pub fn map_value_at(&self, map: Handle, index: Cell) -> Result<DynObject> {
        let index = index_arg(index, "map index")?;
        self.with_map(map, |m| m.entry_at(index).map(|(_, v)| v.clone()))?
            .ok_or(RuntimeError::OutOfRange { what: "map index" })
    }

    /// Overwrite one cell of the value stored under `key`
    pub fn map_set_cell(&mut self, map: Handle, key: &DynObject, offset: Cell, value: Cell) -> Result<()> {
        self.with_map_mut(map, |m| match m.get_mut(key) {
            Some(v) => v.set_cell(offset, value).map_err(RuntimeError::from),
            None => Err(missing_key()),
        })?
    }

    /// Like [`Runtime::map_set_cell`], refusing tags the stored value cannot hold
    pub fn map_set_cell_safe(
        &mut self,
        map: Handle,
        key: &DynObject,
        offset: Cell,
        value: Cell,
        tag: TagPtr,
    ) -> Result<()> {
        self.with_map_mut(map, |m| match m.get_mut(key) {
            Some(v) if !v.tag_assignable(tag) => Err(RuntimeError::TypeMismatch),
            Some(v) => v.set_cell(offset, value).map_err(RuntimeError::from),
            None => Err(missing_key()),
        })?
    }

    pub fn map_tag(&self, map: Handle, key: &DynObject) -> Result<TagPtr> {
        self.with_map(map, |m| m.get(key).map(|v| v.tag()))?
            .ok_or_else(missing_key)
    }

    pub fn map_sizeof(&self, map: Handle, key: &DynObject) -> Result<usize> {
        self.with_map(map, |m| m.get(key).map(|v| v.size()))?
            .ok_or_else(missing_key)
    }

    /// Copy every entry of `other` into `map`, returning how many were written
    ///
    /// Without `overwrite`, keys already in `map` keep their values.
    pub fn map_add_map(&mut self, map: Handle, other: Handle, overwrite: bool) -> Result<usize> {
        let entries: Vec<(DynObject, DynObject)> = self.with_map(other, |m| {
            m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        })?;
        self.with_map_mut(map, |m| {
            entries
                .into_iter()
                .filter(|(k, v)| {
                    if overwrite {
                        m.set(k.clone(), v.clone());
                        true
                    } else {
                        m.insert(k.clone(), v.clone())
                    }
                })
                .count()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::iter::DynIterator;

    fn runtime() -> Runtime {
        Runtime::with_config(RuntimeConfig::default())
    }

    fn text(s: &str) -> DynObject {
        DynObject::from_text(s)
    }

    #[test]
    fn test_add_set_get() {
        let mut rt = runtime();
        let map = rt.map_new().unwrap();
        assert!(rt.map_add(map, text("a"), DynObject::from_int(1)).unwrap());
        assert!(!rt.map_add(map, text("a"), DynObject::from_int(2)).unwrap());
        rt.map_set(map, text("a"), DynObject::from_int(3)).unwrap();
        assert_eq!(rt.map_get_cell(map, &text("a"), 0).unwrap(), 3);
        assert_eq!(rt.map_get(map, &text("b")).unwrap(), None);
        assert_eq!(
            rt.map_get_cell(map, &text("b"), 0),
            Err(RuntimeError::OutOfRange { what: "map key" })
        );
        assert_eq!(rt.map_size(map).unwrap(), 1);
    }

    #[test]
    fn test_entry_order_access() {
        let mut rt = runtime();
        let map = rt.map_new().unwrap();
        rt.map_add(map, text("x"), DynObject::from_int(1)).unwrap();
        rt.map_add(map, text("y"), DynObject::from_int(2)).unwrap();
        assert_eq!(rt.map_key_at(map, 1).unwrap(), text("y"));
        assert_eq!(rt.map_value_at(map, 0).unwrap(), DynObject::from_int(1));
        assert!(rt.map_key_at(map, 2).is_err());
        assert!(rt.map_remove(map, &text("x")).unwrap());
        assert_eq!(rt.map_key_at(map, 0).unwrap(), text("y"));
    }

    #[test]
    fn test_set_cell_safe() {
        let mut rt = runtime();
        let map = rt.map_new().unwrap();
        rt.map_add(map, DynObject::from_int(0), DynObject::from_float(1.0))
            .unwrap();
        let int_tag = DynObject::from_int(0).tag();
        assert_eq!(
            rt.map_set_cell_safe(map, &DynObject::from_int(0), 0, 5, int_tag),
            Err(RuntimeError::TypeMismatch)
        );
        assert_eq!(rt.map_tag(map, &DynObject::from_int(0)).unwrap().name, "Float");
    }

    #[test]
    fn test_get_checked() {
        let mut rt = runtime();
        let map = rt.map_new().unwrap();
        rt.map_add(map, text("f"), DynObject::from_float(2.0)).unwrap();
        let float_tag = DynObject::from_float(0.0).tag();
        let int_tag = DynObject::from_int(0).tag();
        assert_eq!(
            rt.map_get_checked(map, &text("f"), 0, float_tag).unwrap(),
            2.0f32.to_bits() as Cell
        );
        assert_eq!(
            rt.map_get_checked(map, &text("f"), 0, int_tag),
            Err(RuntimeError::TypeMismatch)
        );
        assert_eq!(
            rt.map_get_checked(map, &text("g"), 0, float_tag),
            Err(RuntimeError::OutOfRange { what: "map key" })
        );
    }

    #[test]
    fn test_add_map() {
        let mut rt = runtime();
        let a = rt.map_new().unwrap();
        let b = rt.map_new().unwrap();
        rt.map_add(a, text("k"), DynObject::from_int(1)).unwrap();
        rt.map_add(b, text("k"), DynObject::from_int(2)).unwrap();
        rt.map_add(b, text("n"), DynObject::from_int(3)).unwrap();
        assert_eq!(rt.map_add_map(a, b, false).unwrap(), 1);
        assert_eq!(rt.map_get_cell(a, &text("k"), 0).unwrap(), 1);
        assert_eq!(rt.map_add_map(a, b, true).unwrap(), 2);
        assert_eq!(rt.map_get_cell(a, &text("k"), 0).unwrap(), 2);
        assert_eq!(rt.map_add_map(a, a, false).unwrap(), 0);
    }

    #[test]
    fn test_delete_expires_cursors() {
        let mut rt = runtime();
        let map = rt.map_new().unwrap();
        rt.map_add(map, text("k"), DynObject::from_int(1)).unwrap();
        let it = rt.map_iter(map, 0).unwrap();
        rt.map_delete(map).unwrap();
        assert!(!rt.iter_linked(it).unwrap());
        assert!(!rt.iter_inside(it).unwrap());
        assert!(rt.iter_get(it).is_err());
        let cursor = rt.iterators().get(it).unwrap();
        assert!(!cursor.borrow_mut().move_next());
    }
}
