//! Cursor over a hash map's entries
//!
//! Items come as key/value pairs in entry order. Entries can be erased
//! through the cursor but not inserted: a map entry needs a key.

use super::container::{ContainerCursor, Walk};
use super::{Item, ItemMut, Shape};
use crate::containers::{Map, Position};

pub type MapCursor = ContainerCursor<Map>;

impl Walk for Map {
    type Pos = Position;

    const NAME: &'static str = "map";
    const CAN_ERASE: bool = true;

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
        let (k, v) = self.entry_at(self.resolve(at)?)?;
        Some(Item::Pair(k, v))
    }

    fn item_mut(&mut self, at: Position) -> Option<ItemMut<'_>> {
        let i = self.resolve(at)?;
        let (k, v) = self.entry_at_mut(i)?;
        Some(ItemMut::Pair(k, v))
    }

    fn offers(shape: Shape) -> bool {
        shape == Shape::Pair
    }

    fn erase(&mut self, at: Position) -> Option<Option<Position>> {
        let i = self.resolve(at)?;
        self.remove_at(i)?;
        Some(self.position(i))
    }
}
