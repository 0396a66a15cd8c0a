//! Cursor over an ordered sequence

use super::container::{ContainerCursor, Walk};
use super::{Item, ItemMut, Shape};
use crate::containers::{List, Position};
use dynval_core::DynObject;

pub type ListCursor = ContainerCursor<List>;

impl Walk for List {
    type Pos = Position;

    const NAME: &'static str = "list";
    const CAN_ERASE: bool = true;
    const CAN_INSERT: bool = true;

    fn first(&self) -> Option<Position> {
        self.position(0)
    }

    fn last(&self) -> Option<Position> {
        self.len().checked_sub(1).and_then(|i| self.position(i))
    }

    fn next(&self, at: Position) -> Option<Position> {
        self.resolve(at).and_then(|i| self.position(i + 1))
    }

    fn prev(&self, at: Position) -> Option<Position> {
        self.resolve(at)
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.position(i))
    }

    fn live(&self, at: Position) -> bool {
        self.resolve(at).is_some()
    }

    fn item(&self, at: Position) -> Option<Item<'_>> {
        self.resolve(at).and_then(|i| self.get(i)).map(Item::Value)
    }

    fn item_mut(&mut self, at: Position) -> Option<ItemMut<'_>> {
        let i = self.resolve(at)?;
        self.get_mut(i).map(ItemMut::Value)
    }

    fn offers(shape: Shape) -> bool {
        shape == Shape::Value
    }

    fn erase(&mut self, at: Position) -> Option<Option<Position>> {
        let i = self.resolve(at)?;
        self.remove(i)?;
        Some(self.position(i))
    }

    fn insert_before(&mut self, at: Option<Position>, value: DynObject) -> Option<Position> {
        let index = match at {
            Some(at) => self.resolve(at)?,
            None => self.len(),
        };
        self.insert(index, value)?;
        self.position(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::DynIterator;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn list_of(values: &[i32]) -> Rc<RefCell<List>> {
        let mut list = List::new();
        for &v in values {
            list.push(DynObject::from_int(v));
        }
        Rc::new(RefCell::new(list))
    }

    fn current(cursor: &ListCursor) -> Option<i32> {
        let mut out = None;
        cursor.extract(Shape::Value, &mut |item| out = item.value().get_cell(0).ok());
        out
    }

    #[test]
    fn test_walk_both_ways() {
        let mut cursor = ListCursor::new(list_of(&[1, 2, 3]));
        assert_eq!(current(&cursor), Some(1));
        assert!(cursor.move_next());
        assert!(cursor.move_next());
        assert_eq!(current(&cursor), Some(3));
        assert!(!cursor.move_next());
        assert!(!cursor.valid());
        // Exhausted stays put until repositioned
        assert!(!cursor.move_previous());
        assert!(cursor.set_to_last());
        assert!(cursor.move_previous());
        assert_eq!(current(&cursor), Some(2));
        assert!(cursor.move_next());
        assert_eq!(current(&cursor), Some(3));
    }

    #[test]
    fn test_erase_lands_on_follower() {
        let list = list_of(&[1, 2, 3]);
        let mut cursor = ListCursor::new(Rc::clone(&list));
        let sibling = cursor.clone();
        assert!(cursor.move_next());
        assert!(cursor.erase());
        assert_eq!(current(&cursor), Some(3));
        assert_eq!(current(&sibling), Some(1));
        assert!(cursor.erase());
        assert!(!cursor.valid());
        assert_eq!(list.borrow().len(), 1);
    }

    #[test]
    fn test_sibling_never_sees_erased_item() {
        let list = list_of(&[1, 2]);
        let mut a = ListCursor::new(Rc::clone(&list));
        let b = a.clone();
        assert!(a.erase());
        assert!(!b.valid());
        assert_eq!(current(&b), None);
    }

    #[test]
    fn test_insert_before_current() {
        let list = list_of(&[1, 3]);
        let mut cursor = ListCursor::new(Rc::clone(&list));
        cursor.move_next();
        assert!(cursor.insert(DynObject::from_int(2)));
        assert_eq!(current(&cursor), Some(2));
        cursor.reset();
        assert!(cursor.insert(DynObject::from_int(4)));
        let cells: Vec<i32> = list.borrow().iter().map(|v| v.get_cell(0).unwrap()).collect();
        assert_eq!(cells, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reset_then_move_next_matches_first() {
        let mut cursor = ListCursor::new(list_of(&[5, 6]));
        cursor.move_next();
        assert!(cursor.reset());
        assert!(!cursor.valid());
        assert!(cursor.move_next());
        let mut first = cursor.clone();
        first.set_to_first();
        assert_eq!(cursor, first);
        assert_eq!(current(&cursor), Some(5));
    }

    #[test]
    fn test_stale_position_is_not_expiry() {
        let list = list_of(&[1, 2]);
        let mut a = ListCursor::new(Rc::clone(&list));
        let mut b = a.clone();
        assert!(a.erase());
        assert!(!b.move_next());
        assert!(!b.expired());
        assert!(b.set_to_first());
        assert_eq!(current(&b), Some(2));
    }

    #[test]
    fn test_only_value_shape() {
        let cursor = ListCursor::new(list_of(&[1]));
        assert!(!cursor.extract(Shape::Pair, &mut |_| {}));
        assert!(!cursor.extract(Shape::SharedValue, &mut |_| {}));
    }
}
