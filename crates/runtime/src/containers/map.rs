//! Hash map keyed by dynamic values
//!
//! Entries keep insertion order. `ids` runs parallel to the index map and
//! shifts with it on removal, so cursor positions survive earlier erases.

use super::{Container, Position, resolve};
use dynval_core::DynObject;
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct Map {
    entries: IndexMap<DynObject, DynObject>,
    ids: Vec<u64>,
    next_id: u64,
    destroyed: bool,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a new entry; fails if the key exists
    pub fn insert(&mut self, key: DynObject, value: DynObject) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.push(key, value);
        true
    }

    fn push(&mut self, key: DynObject, value: DynObject) {
        self.next_id += 1;
        let (index, _) = self.entries.insert_full(key, value);
        debug_assert_eq!(index, self.ids.len());
        self.ids.push(self.next_id);
    }

    /// Add or replace, returning the previous value
    pub fn set(&mut self, key: DynObject, value: DynObject) -> Option<DynObject> {
        match self.entries.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.push(key, value);
                None
            }
        }
    }

    pub fn find(&self, key: &DynObject) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    pub fn get(&self, key: &DynObject) -> Option<&DynObject> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &DynObject) -> Option<&mut DynObject> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &DynObject) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &DynObject) -> Option<DynObject> {
        let (i, _, value) = self.entries.shift_remove_full(key)?;
        self.ids.remove(i);
        Some(value)
    }

    pub fn remove_at(&mut self, i: usize) -> Option<(DynObject, DynObject)> {
        let entry = self.entries.shift_remove_index(i)?;
        self.ids.remove(i);
        Some(entry)
    }

    pub fn entry_at(&self, i: usize) -> Option<(&DynObject, &DynObject)> {
        self.entries.get_index(i)
    }

    /// Key stays immutable; only the value half is handed out mutably
    pub fn entry_at_mut(&mut self, i: usize) -> Option<(&DynObject, &mut DynObject)> {
        self.entries.get_index_mut(i)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DynObject, &DynObject)> {
        self.entries.iter()
    }

    pub(crate) fn position(&self, i: usize) -> Option<Position> {
        self.ids.get(i).map(|&id| Position { index: i, id })
    }

    pub(crate) fn resolve(&self, pos: Position) -> Option<usize> {
        resolve(&self.ids, pos)
    }
}

impl Container for Map {
    fn destroy(&mut self) {
        self.clear();
        self.destroyed = true;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
