//! Cursor over a doubly-linked list

use super::container::{ContainerCursor, Walk};
use super::{Item, ItemMut, Shape};
use crate::containers::{LinkedList, NodeRef};
use dynval_core::DynObject;

pub type LinkedListCursor = ContainerCursor<LinkedList>;

impl Walk for LinkedList {
    type Pos = NodeRef;

    const NAME: &'static str = "linked list";
    const CAN_ERASE: bool = true;
    const CAN_INSERT: bool = true;

    fn first(&self) -> Option<NodeRef> {
        LinkedList::first(self)
    }

    fn last(&self) -> Option<NodeRef> {
        LinkedList::last(self)
    }

    fn next(&self, at: NodeRef) -> Option<NodeRef> {
        LinkedList::next(self, at)
    }

    fn prev(&self, at: NodeRef) -> Option<NodeRef> {
        LinkedList::prev(self, at)
    }

    fn live(&self, at: NodeRef) -> bool {
        self.contains(at)
    }

    fn item(&self, at: NodeRef) -> Option<Item<'_>> {
        self.get(at).map(Item::Value)
    }

    fn item_mut(&mut self, at: NodeRef) -> Option<ItemMut<'_>> {
        self.get_mut(at).map(ItemMut::Value)
    }

    fn offers(shape: Shape) -> bool {
        shape == Shape::Value
    }

    fn erase(&mut self, at: NodeRef) -> Option<Option<NodeRef>> {
        self.remove(at).map(|(_, next)| next)
    }

    fn insert_before(&mut self, at: Option<NodeRef>, value: DynObject) -> Option<NodeRef> {
        LinkedList::insert_before(self, at, value)
    }
}
