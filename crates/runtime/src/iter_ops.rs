//! Iterator operations
//!
//! Everything a host does with an iterator handle: construction over each
//! container kind, movement, capability queries, and value/key access through
//! [`crate::access`]. Handle `0` is the null iterator: introspection on it
//! answers as an unlinked cursor would, other operations reject it as an
//! invalid handle.
//!
//! # Examples
//!
//! ```
//! use dynval_core::DynObject;
//! use dynval_runtime::{Runtime, RuntimeConfig};
//!
//! let mut rt = Runtime::with_config(RuntimeConfig::default());
//! let iter = rt.iter_range(DynObject::from_int(0), 3, 1).unwrap();
//! let mut seen = Vec::new();
//! loop {
//!     seen.push(rt.iter_get_cell(iter, 0).unwrap());
//!     if !rt.iter_move_next(iter, 1).unwrap() {
//!         break;
//!     }
//! }
//! assert_eq!(seen, vec![0, 1, 2]);
//! ```

use crate::access::{key_read, key_value_access, value_modify, value_read, value_write};
use crate::error::{Result, RuntimeError, report};
use crate::iter::{
    Cursor, DynIterator, LinkedListCursor, ListCursor, MapCursor, PoolCursor, RangeCursor,
    RepeatCursor, VariantCursor,
};
use crate::registry::{Handle, Shared};
use crate::runtime::{Runtime, index_arg, insert_index};
use dynval_core::{Cell, DynObject, TagPtr};
use std::rc::Rc;

fn unsupported(cursor: &Cursor) -> RuntimeError {
    RuntimeError::OperationNotSupported {
        kind: cursor.type_name(),
    }
}

fn busy() -> RuntimeError {
    RuntimeError::OperationNotSupported { kind: "cursor" }
}

fn offset_arg(offset: Cell) -> Result<Cell> {
    if offset < 0 {
        return Err(RuntimeError::OutOfRange {
            what: "array offset",
        });
    }
    Ok(offset)
}

fn index_result(index: usize, what: &'static str) -> Result<Cell> {
    Cell::try_from(index).map_err(|_| RuntimeError::OutOfRange { what })
}

/// Move `steps` times; a negative count moves the other way
fn walk(cursor: &mut Cursor, steps: Cell, forward: bool) -> bool {
    let forward = forward == (steps >= 0);
    (0..steps.unsigned_abs()).all(|_| {
        if forward {
            cursor.move_next()
        } else {
            cursor.move_previous()
        }
    })
}

impl Runtime {
    fn cursor_or_null(&self, iter: Handle) -> Result<Option<Shared<Cursor>>> {
        if iter == 0 {
            return Ok(None);
        }
        self.iters.get(iter).map(Some)
    }

    /// Run `f` on a cursor, or return `null` for the null handle
    fn peek<R>(&self, iter: Handle, null: R, f: impl FnOnce(&Cursor) -> R) -> Result<R> {
        let Some(cursor) = self.cursor_or_null(iter)? else {
            return Ok(null);
        };
        let cursor = cursor.try_borrow().map_err(|_| busy())?;
        Ok(f(&*cursor))
    }

    fn with_cursor<R>(&self, iter: Handle, f: impl FnOnce(&Cursor) -> R) -> Result<R> {
        let cursor = self.shared_cursor(iter)?;
        let cursor = cursor.try_borrow().map_err(|_| busy())?;
        Ok(f(&*cursor))
    }

    fn with_cursor_mut<R>(&self, iter: Handle, f: impl FnOnce(&mut Cursor) -> R) -> Result<R> {
        let cursor = self.shared_cursor(iter)?;
        let mut cursor = cursor.try_borrow_mut().map_err(|_| busy())?;
        Ok(f(&mut *cursor))
    }

    // ---- construction ----

    /// Arithmetic sequence from `start`, `count` items, `skip` increments apart
    pub fn iter_range(&mut self, start: DynObject, count: Cell, skip: Cell) -> Result<Handle> {
        self.iters.add(RangeCursor::new(start, count, skip).into())
    }

    pub fn iter_repeat(&mut self, value: DynObject, count: Cell) -> Result<Handle> {
        self.iters.add(RepeatCursor::new(value, count).into())
    }

    pub fn list_iter(&mut self, list: Handle, index: Cell) -> Result<Handle> {
        let list = self.list(list)?;
        self.add_cursor(ListCursor::new(list), index)
    }

    pub fn map_iter(&mut self, map: Handle, index: Cell) -> Result<Handle> {
        let map = self.map(map)?;
        self.add_cursor(MapCursor::new(map), index)
    }

    pub fn linked_list_iter(&mut self, list: Handle, index: Cell) -> Result<Handle> {
        let list = self.linked_list(list)?;
        self.add_cursor(LinkedListCursor::new(list), index)
    }

    pub fn pool_iter(&mut self, pool: Handle, index: Cell) -> Result<Handle> {
        let pool = self.pool(pool)?;
        self.add_cursor(PoolCursor::new(pool), index)
    }

    /// Cursor at the entry for `key` (unpositioned if there is none)
    pub fn map_iter_at(&mut self, map: Handle, key: &DynObject) -> Result<Handle> {
        let map = self.map(map)?;
        let at = {
            let m = map.try_borrow().map_err(|_| busy())?;
            m.find(key).and_then(|i| m.position(i))
        };
        self.iters.add(MapCursor::at(map, at).into())
    }

    /// Cursor at slot `index` (unpositioned if the slot is empty)
    pub fn pool_iter_at(&mut self, pool: Handle, index: Cell) -> Result<Handle> {
        let index = index_arg(index, "pool index")?;
        let pool = self.pool(pool)?;
        let at = pool.try_borrow().map_err(|_| busy())?.slot(index);
        self.iters.add(PoolCursor::at(pool, at).into())
    }

    pub fn var_iter(&mut self, var: Handle) -> Result<Handle> {
        let var = self.variant(var)?;
        self.iters.add(VariantCursor::new(&var).into())
    }

    // ---- lifecycle and introspection ----

    /// The handle names a live iterator
    pub fn iter_valid(&self, iter: Handle) -> bool {
        self.iters.contains(iter)
    }

    pub fn iter_acquire(&mut self, iter: Handle) -> Result<Handle> {
        self.iters.acquire_ref(iter)?;
        Ok(iter)
    }

    pub fn iter_release(&mut self, iter: Handle) -> Result<Handle> {
        self.iters.release_ref(iter)?;
        Ok(iter)
    }

    pub fn iter_delete(&mut self, iter: Handle) -> Result<()> {
        self.iters.remove(iter).map(|_| ())
    }

    /// The backing store still exists
    pub fn iter_linked(&self, iter: Handle) -> Result<bool> {
        self.peek(iter, false, |c| !c.expired())
    }

    /// Positioned at an item
    pub fn iter_inside(&self, iter: Handle) -> Result<bool> {
        self.peek(iter, false, |c| c.valid())
    }

    pub fn iter_type_name(&self, iter: Handle) -> Result<Option<&'static str>> {
        self.peek(iter, None, |c| Some(c.type_name()))
    }

    pub fn iter_can_reset(&self, iter: Handle) -> Result<bool> {
        self.peek(iter, true, |c| c.can_reset())
    }

    pub fn iter_can_insert(&self, iter: Handle) -> Result<bool> {
        self.peek(iter, false, |c| c.can_insert())
    }

    pub fn iter_can_erase(&self, iter: Handle) -> Result<bool> {
        self.peek(iter, false, |c| c.can_erase())
    }

    /// Independent cursor at the same position
    pub fn iter_clone(&mut self, iter: Handle) -> Result<Handle> {
        let dup = self.with_cursor(iter, |c| c.clone_shared())?;
        self.adopt_cursor(dup)
    }

    /// Cursor equality; the null handle equals only itself
    pub fn iter_eq(&self, a: Handle, b: Handle) -> Result<bool> {
        match (self.cursor_or_null(a)?, self.cursor_or_null(b)?) {
            (None, None) => Ok(true),
            (Some(x), Some(y)) if Rc::ptr_eq(&x, &y) => Ok(true),
            (Some(x), Some(y)) => {
                let x = x.try_borrow().map_err(|_| busy())?;
                let y = y.try_borrow().map_err(|_| busy())?;
                Ok(*x == *y)
            }
            _ => Ok(false),
        }
    }

    /// Exchange the values under two cursors
    ///
    /// If the second cursor refuses the write, the first one gets its own
    /// value back.
    pub fn iter_swap(&mut self, a: Handle, b: Handle) -> Result<()> {
        let left = value_read(&self.iters, a, DynObject::clone)?;
        let right = value_read(&self.iters, b, DynObject::clone)?;
        value_write(&self.iters, a, |v| *v = right)?;
        if let Err(e) = value_write(&self.iters, b, |v| *v = left.clone()) {
            report(value_write(&self.iters, a, |v| *v = left));
            return Err(e);
        }
        Ok(())
    }

    // ---- movement ----

    /// Advance `steps` items; returns whether every step landed on an item
    pub fn iter_move_next(&mut self, iter: Handle, steps: Cell) -> Result<bool> {
        self.with_cursor_mut(iter, |c| walk(c, steps, true))
    }

    pub fn iter_move_previous(&mut self, iter: Handle, steps: Cell) -> Result<bool> {
        self.with_cursor_mut(iter, |c| walk(c, steps, false))
    }

    /// Position at the `index`-th item from the start
    pub fn iter_to_first(&mut self, iter: Handle, index: Cell) -> Result<bool> {
        let steps = index_arg(index, "iterator index")?;
        self.with_cursor_mut(iter, |c| c.set_to_first() && (0..steps).all(|_| c.move_next()))
    }

    /// Position at the `index`-th item from the end
    pub fn iter_to_last(&mut self, iter: Handle, index: Cell) -> Result<bool> {
        let steps = index_arg(index, "iterator index")?;
        self.with_cursor_mut(iter, |c| {
            c.set_to_last() && (0..steps).all(|_| c.move_previous())
        })
    }

    pub fn iter_reset(&mut self, iter: Handle) -> Result<Handle> {
        if iter == 0 {
            return Ok(iter);
        }
        self.with_cursor_mut(iter, |c| if c.reset() { Ok(()) } else { Err(unsupported(c)) })??;
        Ok(iter)
    }

    /// Remove the current item; the cursor moves to its follower
    pub fn iter_erase(&mut self, iter: Handle) -> Result<Handle> {
        self.with_cursor_mut(iter, |c| if c.erase() { Ok(()) } else { Err(unsupported(c)) })??;
        Ok(iter)
    }

    /// Give up the handles the current item holds, then erase it
    pub fn iter_erase_deep(&mut self, iter: Handle) -> Result<Handle> {
        self.with_cursor(iter, |c| if c.can_erase() { Ok(()) } else { Err(unsupported(c)) })??;
        let mut tracked = Vec::new();
        key_value_access(&self.iters, iter, |v| tracked.extend(v.release()))?;
        self.release_tracked(&tracked);
        self.iter_erase(iter)
    }

    /// Insert before the current item (or at the end) and point at it
    pub fn iter_insert(&mut self, iter: Handle, value: DynObject) -> Result<Handle> {
        self.with_cursor_mut(iter, |c| {
            if c.insert(value) {
                Ok(())
            } else {
                Err(unsupported(c))
            }
        })??;
        Ok(iter)
    }

    // ---- value access ----

    pub fn iter_get(&self, iter: Handle) -> Result<DynObject> {
        value_read(&self.iters, iter, DynObject::clone)
    }

    pub fn iter_get_cell(&self, iter: Handle, offset: Cell) -> Result<Cell> {
        let offset = offset_arg(offset)?;
        Ok(value_read(&self.iters, iter, |v| v.get_cell(offset))??)
    }

    pub fn iter_get_md(&self, iter: Handle, offsets: &[Cell]) -> Result<Cell> {
        Ok(value_read(&self.iters, iter, |v| v.get_cell_md(offsets))??)
    }

    /// Copy the current value's cells into `out`, returning how many were copied
    pub fn iter_get_arr(&self, iter: Handle, out: &mut [Cell]) -> Result<usize> {
        Ok(value_read(&self.iters, iter, |v| v.get_cells(0, out))??)
    }

    pub fn iter_get_text(&self, iter: Handle) -> Result<String> {
        value_read(&self.iters, iter, |v| v.to_text())?.ok_or(RuntimeError::TypeMismatch)
    }

    /// Box a copy of the current value
    pub fn iter_get_var(&mut self, iter: Handle) -> Result<Handle> {
        let value = self.iter_get(iter)?;
        self.variant_from_dyn(value)
    }

    /// Read a cell only if the value's tag fits `tag`
    pub fn iter_get_safe(&self, iter: Handle, offset: Cell, tag: TagPtr) -> Result<Cell> {
        let offset = offset_arg(offset)?;
        value_read(&self.iters, iter, |v| {
            if tag.accepts(v.tag()) {
                v.get_cell(offset).map_err(RuntimeError::from)
            } else {
                Err(RuntimeError::TypeMismatch)
            }
        })?
    }

    /// Like [`Runtime::iter_get_safe`], addressing the cell by `offsets`
    pub fn iter_get_md_safe(&self, iter: Handle, offsets: &[Cell], tag: TagPtr) -> Result<Cell> {
        value_read(&self.iters, iter, |v| {
            if tag.accepts(v.tag()) {
                v.get_cell_md(offsets).map_err(RuntimeError::from)
            } else {
                Err(RuntimeError::TypeMismatch)
            }
        })?
    }

    /// Replace the current value
    pub fn iter_set(&mut self, iter: Handle, value: DynObject) -> Result<()> {
        value_write(&self.iters, iter, |v| *v = value)
    }

    pub fn iter_set_cell(&mut self, iter: Handle, offset: Cell, value: Cell) -> Result<()> {
        let offset = offset_arg(offset)?;
        Ok(value_modify(&self.iters, iter, |v| v.set_cell(offset, value))??)
    }

    /// Write a cell only if `tag` may be stored in the current value
    pub fn iter_set_cell_safe(
        &mut self,
        iter: Handle,
        offset: Cell,
        value: Cell,
        tag: TagPtr,
    ) -> Result<()> {
        let offset = offset_arg(offset)?;
        value_modify(&self.iters, iter, |v| {
            if v.tag_assignable(tag) {
                v.set_cell(offset, value).map_err(RuntimeError::from)
            } else {
                Err(RuntimeError::TypeMismatch)
            }
        })?
    }

    pub fn iter_set_cells(&mut self, iter: Handle, offset: Cell, values: &[Cell]) -> Result<usize> {
        let offset = offset_arg(offset)?;
        Ok(value_modify(&self.iters, iter, |v| v.set_cells(offset, values))??)
    }

    /// Bulk write guarded like [`Runtime::iter_set_cell_safe`]
    pub fn iter_set_cells_safe(
        &mut self,
        iter: Handle,
        offset: Cell,
        values: &[Cell],
        tag: TagPtr,
    ) -> Result<usize> {
        let offset = offset_arg(offset)?;
        value_modify(&self.iters, iter, |v| {
            if v.tag_assignable(tag) {
                v.set_cells(offset, values).map_err(RuntimeError::from)
            } else {
                Err(RuntimeError::TypeMismatch)
            }
        })?
    }

    /// Overwrite the sub-array addressed by `offsets`, returning how many cells were written
    pub fn iter_set_cells_md(&mut self, iter: Handle, offsets: &[Cell], values: &[Cell]) -> Result<usize> {
        Ok(value_modify(&self.iters, iter, |v| v.set_cells_md(offsets, values))??)
    }

    pub fn iter_set_cell_md(&mut self, iter: Handle, offsets: &[Cell], value: Cell) -> Result<()> {
        Ok(value_modify(&self.iters, iter, |v| v.set_cell_md(offsets, value))??)
    }

    pub fn iter_set_cell_md_safe(
        &mut self,
        iter: Handle,
        offsets: &[Cell],
        value: Cell,
        tag: TagPtr,
    ) -> Result<()> {
        value_modify(&self.iters, iter, |v| {
            if v.tag_assignable(tag) {
                v.set_cell_md(offsets, value).map_err(RuntimeError::from)
            } else {
                Err(RuntimeError::TypeMismatch)
            }
        })?
    }

    pub fn iter_tag(&self, iter: Handle) -> Result<TagPtr> {
        value_read(&self.iters, iter, |v| v.tag())
    }

    pub fn iter_sizeof(&self, iter: Handle) -> Result<usize> {
        value_read(&self.iters, iter, |v| v.size())
    }

    pub fn iter_sizeof_md(&self, iter: Handle, offsets: &[Cell]) -> Result<usize> {
        Ok(value_read(&self.iters, iter, |v| v.size_md(offsets))??)
    }

    pub fn iter_rank(&self, iter: Handle) -> Result<usize> {
        value_read(&self.iters, iter, |v| v.rank())
    }

    // ---- key access ----

    pub fn iter_get_key(&self, iter: Handle) -> Result<DynObject> {
        key_read(&self.iters, iter, DynObject::clone)
    }

    pub fn iter_get_key_cell(&self, iter: Handle, offset: Cell) -> Result<Cell> {
        let offset = offset_arg(offset)?;
        Ok(key_read(&self.iters, iter, |k| k.get_cell(offset))??)
    }

    pub fn iter_get_key_md(&self, iter: Handle, offsets: &[Cell]) -> Result<Cell> {
        Ok(key_read(&self.iters, iter, |k| k.get_cell_md(offsets))??)
    }

    /// Read a key cell only if the key's tag fits `tag`
    pub fn iter_get_key_safe(&self, iter: Handle, offset: Cell, tag: TagPtr) -> Result<Cell> {
        let offset = offset_arg(offset)?;
        key_read(&self.iters, iter, |k| {
            if tag.accepts(k.tag()) {
                k.get_cell(offset).map_err(RuntimeError::from)
            } else {
                Err(RuntimeError::TypeMismatch)
            }
        })?
    }

    pub fn iter_get_key_text(&self, iter: Handle) -> Result<String> {
        key_read(&self.iters, iter, |k| k.to_text())?.ok_or(RuntimeError::TypeMismatch)
    }

    pub fn iter_key_tag(&self, iter: Handle) -> Result<TagPtr> {
        key_read(&self.iters, iter, |k| k.tag())
    }

    pub fn iter_sizeof_key(&self, iter: Handle) -> Result<usize> {
        key_read(&self.iters, iter, |k| k.size())
    }

    pub fn iter_sizeof_key_md(&self, iter: Handle, offsets: &[Cell]) -> Result<usize> {
        Ok(key_read(&self.iters, iter, |k| k.size_md(offsets))??)
    }

    pub fn iter_key_rank(&self, iter: Handle) -> Result<usize> {
        key_read(&self.iters, iter, |k| k.rank())
    }

    // ---- bulk ----

    /// Copy out every value from the cursor's position on, advancing it
    ///
    /// Items that cannot be read are reported and skipped.
    fn drain_values(&self, iter: Handle) -> Result<Vec<DynObject>> {
        self.with_cursor_mut(iter, |cursor| {
            let mut values = Vec::new();
            while cursor.valid() {
                values.extend(report(cursor.read_value(DynObject::clone)));
                if !cursor.move_next() {
                    break;
                }
            }
            values
        })
    }

    /// Insert the cursor's remaining values at `index` (-1 appends)
    ///
    /// Returns the index the first value went to.
    pub fn list_add_iter(&mut self, list: Handle, iter: Handle, index: Cell) -> Result<Cell> {
        const WHAT: &str = "list index";
        let list = self.list(list)?;
        let len = list.try_borrow().map_err(|_| busy())?.len();
        let at = insert_index(index, len, WHAT)?;
        let values = self.drain_values(iter)?;
        let mut list = list.try_borrow_mut().map_err(|_| busy())?;
        for (i, value) in values.into_iter().enumerate() {
            report(list.insert(at + i, value).ok_or(RuntimeError::OutOfRange { what: WHAT }));
        }
        index_result(at, WHAT)
    }

    pub fn linked_list_add_iter(&mut self, list: Handle, iter: Handle, index: Cell) -> Result<Cell> {
        const WHAT: &str = "linked list index";
        let list = self.linked_list(list)?;
        let len = list.try_borrow().map_err(|_| busy())?.len();
        let at = insert_index(index, len, WHAT)?;
        let values = self.drain_values(iter)?;
        let mut list = list.try_borrow_mut().map_err(|_| busy())?;
        let anchor = list.nth(at);
        for value in values {
            report(
                list.insert_before(anchor, value)
                    .ok_or(RuntimeError::OutOfRange { what: WHAT }),
            );
        }
        index_result(at, WHAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use dynval_core::{TAG_CELL, TAG_FLOAT, TAG_LIST, TAG_STRING, builtin};

    fn runtime() -> Runtime {
        Runtime::with_config(RuntimeConfig::default())
    }

    fn list_of(rt: &mut Runtime, values: &[Cell]) -> Handle {
        let list = rt.list_new().unwrap();
        for &v in values {
            rt.list_add(list, DynObject::from_int(v), -1).unwrap();
        }
        list
    }

    fn cells(rt: &Runtime, list: Handle) -> Vec<Cell> {
        (0..rt.list_len(list).unwrap() as Cell)
            .map(|i| rt.list_get(list, i).unwrap().get_cell(0).unwrap())
            .collect()
    }

    #[test]
    fn test_list_iter_start_index() {
        let mut rt = runtime();
        let list = list_of(&mut rt, &[10, 20, 30]);
        let it = rt.list_iter(list, 2).unwrap();
        assert_eq!(rt.iter_get_cell(it, 0).unwrap(), 30);
        let detached = rt.list_iter(list, -1).unwrap();
        assert!(!rt.iter_inside(detached).unwrap());
        assert!(rt.iter_move_next(detached, 1).unwrap());
        assert_eq!(rt.iter_get_cell(detached, 0).unwrap(), 10);
    }

    #[test]
    fn test_steps_and_negative_steps() {
        let mut rt = runtime();
        let list = list_of(&mut rt, &[0, 1, 2, 3]);
        let it = rt.list_iter(list, 0).unwrap();
        assert!(rt.iter_move_next(it, 3).unwrap());
        assert_eq!(rt.iter_get_cell(it, 0).unwrap(), 3);
        assert!(rt.iter_move_next(it, -2).unwrap());
        assert_eq!(rt.iter_get_cell(it, 0).unwrap(), 1);
        assert!(!rt.iter_move_previous(it, 5).unwrap());
        assert!(!rt.iter_inside(it).unwrap());
    }

    #[test]
    fn test_to_first_and_last() {
        let mut rt = runtime();
        let list = list_of(&mut rt, &[0, 1, 2, 3]);
        let it = rt.list_iter(list, -1).unwrap();
        assert!(rt.iter_to_first(it, 2).unwrap());
        assert_eq!(rt.iter_get_cell(it, 0).unwrap(), 2);
        assert!(rt.iter_to_last(it, 1).unwrap());
        assert_eq!(rt.iter_get_cell(it, 0).unwrap(), 2);
        assert!(matches!(
            rt.iter_to_first(it, -1),
            Err(RuntimeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_null_handle() {
        let rt = runtime();
        assert!(!rt.iter_linked(0).unwrap());
        assert!(!rt.iter_inside(0).unwrap());
        assert_eq!(rt.iter_type_name(0).unwrap(), None);
        assert!(rt.iter_eq(0, 0).unwrap());
        assert!(rt.iter_get(0).is_err());
        assert!(rt.iter_linked(42).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rt = runtime();
        let it = rt.iter_repeat(DynObject::from_int(1), 3).unwrap();
        let dup = rt.iter_clone(it).unwrap();
        assert!(rt.iter_eq(it, dup).unwrap());
        rt.iter_move_next(dup, 1).unwrap();
        assert!(!rt.iter_eq(it, dup).unwrap());
    }

    #[test]
    fn test_swap_between_lists() {
        let mut rt = runtime();
        let a = list_of(&mut rt, &[1, 2]);
        let b = list_of(&mut rt, &[8, 9]);
        let ia = rt.list_iter(a, 1).unwrap();
        let ib = rt.list_iter(b, 0).unwrap();
        rt.iter_swap(ia, ib).unwrap();
        assert_eq!(cells(&rt, a), vec![1, 8]);
        assert_eq!(cells(&rt, b), vec![2, 9]);

        // a read-only partner leaves both sides untouched
        let range = rt.iter_range(DynObject::from_int(5), 1, 1).unwrap();
        assert!(rt.iter_swap(ia, range).is_err());
        assert_eq!(cells(&rt, a), vec![1, 8]);
    }

    #[test]
    fn test_swap_same_item() {
        let mut rt = runtime();
        let list = list_of(&mut rt, &[4]);
        let x = rt.list_iter(list, 0).unwrap();
        let y = rt.list_iter(list, 0).unwrap();
        rt.iter_swap(x, y).unwrap();
        rt.iter_swap(x, x).unwrap();
        assert_eq!(cells(&rt, list), vec![4]);
    }

    #[test]
    fn test_tag_checked_write_rejected() {
        let mut rt = runtime();
        let list = rt.list_new().unwrap();
        rt.list_add(list, DynObject::from_array(&[1, 2, 3], builtin(TAG_CELL)), -1)
            .unwrap();
        let it = rt.list_iter(list, 0).unwrap();
        assert_eq!(
            rt.iter_set_cell_safe(it, 1, 65, builtin(TAG_STRING)),
            Err(RuntimeError::TypeMismatch)
        );
        assert_eq!(rt.iter_get_cell(it, 1).unwrap(), 2);
        rt.iter_set_cell_safe(it, 1, 7, builtin(TAG_CELL)).unwrap();
        assert_eq!(rt.iter_get_cell(it, 1).unwrap(), 7);
    }

    #[test]
    fn test_checked_reads_and_bulk_md_writes() {
        let mut rt = runtime();
        let list = rt.list_new().unwrap();
        let grid = DynObject::from_array_md(&[1, 2, 3, 4], &[2, 2], builtin(TAG_CELL)).unwrap();
        rt.list_add(list, grid, -1).unwrap();
        let it = rt.list_iter(list, 0).unwrap();

        assert_eq!(rt.iter_get_md_safe(it, &[1, 0], builtin(TAG_CELL)).unwrap(), 3);
        assert_eq!(
            rt.iter_get_md_safe(it, &[1, 0], builtin(TAG_FLOAT)),
            Err(RuntimeError::TypeMismatch)
        );
        // clipped to the addressed row
        assert_eq!(rt.iter_set_cells_md(it, &[1], &[7, 8, 9]).unwrap(), 2);
        assert_eq!(rt.iter_get_md(it, &[1, 1]).unwrap(), 8);
        assert_eq!(rt.iter_get_md(it, &[0, 1]).unwrap(), 2);

        assert_eq!(
            rt.iter_set_cells_safe(it, 0, &[5, 6], builtin(TAG_STRING)),
            Err(RuntimeError::TypeMismatch)
        );
        assert_eq!(rt.iter_get_cell(it, 0).unwrap(), 1);
        assert_eq!(rt.iter_set_cells_safe(it, 0, &[5, 6], builtin(TAG_CELL)).unwrap(), 2);
        assert_eq!(rt.iter_get_cell(it, 1).unwrap(), 6);
    }

    #[test]
    fn test_checked_key_reads() {
        let mut rt = runtime();
        let map = rt.map_new().unwrap();
        let key = DynObject::from_array_md(&[1, 2, 3, 4, 5, 6], &[2, 3], builtin(TAG_CELL)).unwrap();
        rt.map_add(map, key, DynObject::from_int(0)).unwrap();
        let it = rt.map_iter(map, 0).unwrap();

        assert_eq!(rt.iter_sizeof_key_md(it, &[]).unwrap(), 6);
        assert_eq!(rt.iter_sizeof_key_md(it, &[1]).unwrap(), 3);
        assert!(rt.iter_sizeof_key_md(it, &[2]).is_err());
        assert_eq!(rt.iter_get_key_safe(it, 4, builtin(TAG_CELL)).unwrap(), 5);
        assert_eq!(
            rt.iter_get_key_safe(it, 4, builtin(TAG_FLOAT)),
            Err(RuntimeError::TypeMismatch)
        );

        let list = list_of(&mut rt, &[1]);
        let it = rt.list_iter(list, 0).unwrap();
        assert_eq!(
            rt.iter_get_key_safe(it, 0, builtin(TAG_CELL)),
            Err(RuntimeError::OperationNotSupported { kind: "list" })
        );
    }

    #[test]
    fn test_list_add_iter() {
        let mut rt = runtime();
        let list = list_of(&mut rt, &[0, 9]);
        let range = rt.iter_range(DynObject::from_int(1), 3, 1).unwrap();
        assert_eq!(rt.list_add_iter(list, range, 1).unwrap(), 1);
        assert_eq!(cells(&rt, list), vec![0, 1, 2, 3, 9]);
        assert!(!rt.iter_inside(range).unwrap());

        let again = rt.iter_repeat(DynObject::from_int(5), 2).unwrap();
        assert_eq!(rt.list_add_iter(list, again, -1).unwrap(), 5);
        assert_eq!(cells(&rt, list), vec![0, 1, 2, 3, 9, 5, 5]);
        assert!(rt.list_add_iter(list, again, -2).is_err());
        assert!(rt.list_add_iter(list, again, 8).is_err());
    }

    #[test]
    fn test_list_add_iter_from_itself() {
        let mut rt = runtime();
        let list = list_of(&mut rt, &[1, 2]);
        let it = rt.list_iter(list, 0).unwrap();
        assert_eq!(rt.list_add_iter(list, it, 0).unwrap(), 0);
        assert_eq!(cells(&rt, list), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_linked_list_add_iter() {
        let mut rt = runtime();
        let list = rt.linked_list_new().unwrap();
        rt.linked_list_add(list, DynObject::from_int(0), -1).unwrap();
        rt.linked_list_add(list, DynObject::from_int(4), -1).unwrap();
        let range = rt.iter_range(DynObject::from_int(1), 3, 1).unwrap();
        assert_eq!(rt.linked_list_add_iter(list, range, 1).unwrap(), 1);
        let values: Vec<Cell> = (0..5)
            .map(|i| rt.linked_list_get(list, i).unwrap().get_cell(0).unwrap())
            .collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_erase_deep_releases_handles() {
        let mut rt = runtime();
        let inner = rt.list_new().unwrap();
        rt.lists.acquire_ref(inner).unwrap();
        let outer = rt.list_new().unwrap();
        rt.list_add(
            outer,
            DynObject::from_cell(inner, builtin(TAG_LIST)),
            -1,
        )
        .unwrap();
        let it = rt.list_iter(outer, 0).unwrap();
        rt.iter_erase_deep(it).unwrap();
        assert_eq!(rt.list_len(outer).unwrap(), 0);
        assert_eq!(rt.lists().refs(inner), Some(0));
    }

    #[test]
    fn test_erase_deep_declines_before_releasing() {
        let mut rt = runtime();
        let inner = rt.list_new().unwrap();
        rt.lists.acquire_ref(inner).unwrap();
        let it = rt
            .iter_repeat(DynObject::from_cell(inner, builtin(TAG_LIST)), 1)
            .unwrap();
        assert!(matches!(
            rt.iter_erase_deep(it),
            Err(RuntimeError::OperationNotSupported { kind: "repeat" })
        ));
        assert_eq!(rt.lists().refs(inner), Some(1));
    }

    #[test]
    fn test_insert_unsupported_on_map() {
        let mut rt = runtime();
        let map = rt.map_new().unwrap();
        rt.map_add(map, DynObject::from_int(1), DynObject::from_int(2)).unwrap();
        let it = rt.map_iter(map, 0).unwrap();
        assert!(!rt.iter_can_insert(it).unwrap());
        assert!(rt.iter_can_erase(it).unwrap());
        assert!(matches!(
            rt.iter_insert(it, DynObject::from_int(3)),
            Err(RuntimeError::OperationNotSupported { kind: "map" })
        ));
        assert_eq!(rt.iter_get_key_cell(it, 0).unwrap(), 1);
    }
}
