//! Index-addressable slot pool
//!
//! Adding fills the lowest free slot; removing empties a slot without moving
//! any other value, so indices stay stable for the life of a value.

use super::Container;
use dynval_core::DynObject;

/// Reference to an occupied slot, stamped with its generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    index: usize,
    generation: u32,
}

impl SlotRef {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Default)]
struct Slot {
    value: Option<DynObject>,
    generation: u32,
}

#[derive(Debug, Default)]
pub struct Pool {
    slots: Vec<Slot>,
    len: usize,
    destroyed: bool,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupied slots
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots allocated so far, occupied or not
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Store a value in the lowest free slot, returning its index
    pub fn add(&mut self, value: DynObject) -> usize {
        self.len += 1;
        match self.slots.iter().position(|s| s.value.is_none()) {
            Some(i) => {
                self.slots[i].value = Some(value);
                i
            }
            None => {
                self.slots.push(Slot {
                    value: Some(value),
                    generation: 0,
                });
                self.slots.len() - 1
            }
        }
    }

    /// Store a value at a specific index, growing the pool as needed
    pub fn set(&mut self, index: usize, value: DynObject) -> Option<DynObject> {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, Slot::default);
        }
        let previous = self.slots[index].value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn get(&self, index: usize) -> Option<&DynObject> {
        self.slots.get(index).and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut DynObject> {
        self.slots.get_mut(index).and_then(|s| s.value.as_mut())
    }

    pub fn remove(&mut self, index: usize) -> Option<DynObject> {
        let slot = self.slots.get_mut(index)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.len -= 1;
        Some(value)
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.len = 0;
    }

    /// Reference to an occupied slot
    pub fn slot(&self, index: usize) -> Option<SlotRef> {
        let slot = self.slots.get(index)?;
        slot.value.as_ref().map(|_| SlotRef {
            index,
            generation: slot.generation,
        })
    }

    /// Current index of a slot reference, if the value it was taken for is still there
    pub fn resolve(&self, at: SlotRef) -> Option<usize> {
        let slot = self.slots.get(at.index)?;
        (slot.generation == at.generation && slot.value.is_some()).then_some(at.index)
    }

    /// First occupied slot at or after `from`
    pub fn next_occupied(&self, from: usize) -> Option<SlotRef> {
        (from..self.slots.len()).find_map(|i| self.slot(i))
    }

    /// Last occupied slot strictly before `before`
    pub fn prev_occupied(&self, before: usize) -> Option<SlotRef> {
        (0..before.min(self.slots.len())).rev().find_map(|i| self.slot(i))
    }

    pub fn first(&self) -> Option<SlotRef> {
        self.next_occupied(0)
    }

    pub fn last(&self) -> Option<SlotRef> {
        self.prev_occupied(self.slots.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &DynObject)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.value.as_ref().map(|v| (i, v)))
    }
}

impl Container for Pool {
    fn destroy(&mut self) {
        self.clear();
        self.destroyed = true;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
