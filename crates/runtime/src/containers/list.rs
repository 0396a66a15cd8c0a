//! Ordered sequence of values

use super::{Container, Position, resolve};
use dynval_core::DynObject;

#[derive(Debug, Default)]
pub struct List {
    items: Vec<DynObject>,
    ids: Vec<u64>,
    next_id: u64,
    destroyed: bool,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn stamp(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Append, returning the new item's index
    pub fn push(&mut self, value: DynObject) -> usize {
        let id = self.stamp();
        self.items.push(value);
        self.ids.push(id);
        self.items.len() - 1
    }

    /// Insert before `index`; `index == len` appends
    pub fn insert(&mut self, index: usize, value: DynObject) -> Option<usize> {
        if index > self.items.len() {
            return None;
        }
        let id = self.stamp();
        self.items.insert(index, value);
        self.ids.insert(index, id);
        Some(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<DynObject> {
        if index >= self.items.len() {
            return None;
        }
        self.ids.remove(index);
        Some(self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&DynObject> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut DynObject> {
        self.items.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DynObject> {
        self.items.iter()
    }

    pub(crate) fn position(&self, index: usize) -> Option<Position> {
        self.ids.get(index).map(|&id| Position { index, id })
    }

    pub(crate) fn resolve(&self, pos: Position) -> Option<usize> {
        resolve(&self.ids, pos)
    }
}

impl Container for List {
    fn destroy(&mut self) {
        self.clear();
        self.destroyed = true;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
