//! Cursor over the occupied slots of a pool

use super::container::{ContainerCursor, Walk};
use super::{Item, ItemMut, Shape};
use crate::containers::{Pool, SlotRef};

pub type PoolCursor = ContainerCursor<Pool>;

impl Walk for Pool {
    type Pos = SlotRef;

    const NAME: &'static str = "pool";
    const CAN_ERASE: bool = true;

    fn first(&self) -> Option<SlotRef> {
        Pool::first(self)
    }

    fn last(&self) -> Option<SlotRef> {
        Pool::last(self)
    }

    fn next(&self, at: SlotRef) -> Option<SlotRef> {
        self.resolve(at).and_then(|i| self.next_occupied(i + 1))
    }

    fn prev(&self, at: SlotRef) -> Option<SlotRef> {
        self.resolve(at).and_then(|i| self.prev_occupied(i))
    }

    fn live(&self, at: SlotRef) -> bool {
        self.resolve(at).is_some()
    }

    fn item(&self, at: SlotRef) -> Option<Item<'_>> {
        self.resolve(at).and_then(|i| self.get(i)).map(Item::Value)
    }

    fn item_mut(&mut self, at: SlotRef) -> Option<ItemMut<'_>> {
        let i = self.resolve(at)?;
        self.get_mut(i).map(ItemMut::Value)
    }

    fn offers(shape: Shape) -> bool {
        shape == Shape::Value
    }

    /// Frees the slot; the follower is the next occupied one
    fn erase(&mut self, at: SlotRef) -> Option<Option<SlotRef>> {
        let i = self.resolve(at)?;
        self.remove(i)?;
        Some(self.next_occupied(i + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::DynIterator;
    use dynval_core::DynObject;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn current(cursor: &PoolCursor) -> Option<i32> {
        let mut out = None;
        cursor.extract(Shape::Value, &mut |item| out = item.value().get_cell(0).ok());
        out
    }

    #[test]
    fn test_skips_empty_slots() {
        let pool = Rc::new(RefCell::new(Pool::new()));
        for i in 0..4 {
            pool.borrow_mut().add(DynObject::from_int(i * 10));
        }
        pool.borrow_mut().remove(1);
        let mut cursor = PoolCursor::new(Rc::clone(&pool));
        assert_eq!(current(&cursor), Some(0));
        assert!(cursor.move_next());
        assert_eq!(current(&cursor), Some(20));
        assert!(cursor.move_previous());
        assert_eq!(current(&cursor), Some(0));
    }

    #[test]
    fn test_erase_frees_slot() {
        let pool = Rc::new(RefCell::new(Pool::new()));
        pool.borrow_mut().add(DynObject::from_int(1));
        pool.borrow_mut().add(DynObject::from_int(2));
        let mut cursor = PoolCursor::new(Rc::clone(&pool));
        assert!(cursor.erase());
        assert_eq!(current(&cursor), Some(2));
        assert!(pool.borrow().get(0).is_none());
        assert!(!cursor.insert(DynObject::from_int(3)));
    }
}
