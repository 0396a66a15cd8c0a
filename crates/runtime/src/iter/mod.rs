//! Cursors over dynamic values
//!
//! A cursor is a position over a logical sequence: a container's items, a
//! synthesized range, a replayed value, or the single slot of a boxed value.
//! Every cursor kind implements [`DynIterator`]; the registry stores them as
//! the closed enum [`Cursor`].
//!
//! # States
//!
//! - *expired*: the backing store is gone (terminal)
//! - *positioned*: `valid()` is true
//! - *detached*: unpositioned after `reset()`; `move_next` enters at the
//!   first item and `move_previous` at the last, where the kind supports it
//! - *exhausted*: unpositioned after moving past an end; every move fails
//!   until `reset`, `set_to_first` or `set_to_last`
//!
//! # Extraction
//!
//! Callers do not know which kind backs a cursor, so they ask for the current
//! item in one of a few [`Shape`]s and the cursor either hands it to the
//! continuation or declines. See [`crate::access`] for the probing order.

pub mod container;
pub mod linked_list;
pub mod list;
pub mod map;
pub mod pool;
pub mod range;
pub mod repeat;
pub mod variant;

pub use container::ContainerCursor;
pub use linked_list::LinkedListCursor;
pub use list::ListCursor;
pub use map::MapCursor;
pub use pool::PoolCursor;
pub use range::RangeCursor;
pub use repeat::RepeatCursor;
pub use variant::VariantCursor;

use crate::registry::Shared;
use dynval_core::DynObject;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Ways a cursor may expose its current item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// The value itself
    Value,
    /// A value owned by a shared box
    SharedValue,
    /// A key/value entry
    Pair,
    /// A key/value entry synthesized or shared by the cursor
    SharedPair,
    /// A value reached through a read-only link that still permits mutation
    ModifiableValue,
    /// An entry reached through a read-only link that still permits mutation
    ModifiablePair,
}

impl Shape {
    pub fn is_pair(self) -> bool {
        matches!(self, Shape::Pair | Shape::SharedPair | Shape::ModifiablePair)
    }
}

/// Current item, read-only
#[derive(Debug, Clone, Copy)]
pub enum Item<'a> {
    Value(&'a DynObject),
    Pair(&'a DynObject, &'a DynObject),
}

impl<'a> Item<'a> {
    /// The value half (the value itself for non-pairs)
    pub fn value(self) -> &'a DynObject {
        match self {
            Item::Value(v) | Item::Pair(_, v) => v,
        }
    }

    fn same_as(self, other: Item<'_>) -> bool {
        match (self, other) {
            (Item::Value(a), Item::Value(b)) => a == b,
            (Item::Pair(ak, av), Item::Pair(bk, bv)) => ak == bk && av == bv,
            _ => false,
        }
    }

    fn hash_into<H: Hasher>(self, state: &mut H) {
        match self {
            Item::Value(v) => v.hash(state),
            Item::Pair(k, v) => {
                k.hash(state);
                v.hash(state);
            }
        }
    }
}

/// Current item, mutable (keys never are)
#[derive(Debug)]
pub enum ItemMut<'a> {
    Value(&'a mut DynObject),
    Pair(&'a DynObject, &'a mut DynObject),
}

impl ItemMut<'_> {
    pub fn value_mut(&mut self) -> &mut DynObject {
        match self {
            ItemMut::Value(v) | ItemMut::Pair(_, v) => v,
        }
    }
}

/// Unpositioned-state bookkeeping shared by all cursor kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spot<P> {
    Detached,
    Exhausted,
    At(P),
}

impl<P: Copy> Spot<P> {
    pub fn at(&self) -> Option<P> {
        match self {
            Spot::At(p) => Some(*p),
            _ => None,
        }
    }
}

/// Hash reported by every unpositioned cursor
pub(crate) const UNPOSITIONED_HASH: u64 = 0x9e37_79b9_7f4a_7c15;

/// Bidirectional, resettable cursor with capability-negotiated access
pub trait DynIterator {
    /// The backing store no longer exists
    fn expired(&self) -> bool;

    /// Positioned at an existing item
    fn valid(&self) -> bool;

    fn move_next(&mut self) -> bool;

    fn move_previous(&mut self) -> bool;

    fn set_to_first(&mut self) -> bool;

    fn set_to_last(&mut self) -> bool;

    fn reset(&mut self) -> bool;

    fn can_reset(&self) -> bool {
        !self.expired()
    }

    fn can_insert(&self) -> bool {
        false
    }

    fn can_erase(&self) -> bool {
        false
    }

    /// Remove the current item and move to its follower
    fn erase(&mut self) -> bool {
        false
    }

    /// Insert before the current item (or at the end) and point at it
    fn insert(&mut self, value: DynObject) -> bool {
        let _ = value;
        false
    }

    /// Hand the current item to `f` if it can be had in `shape`
    fn extract(&self, shape: Shape, f: &mut dyn FnMut(Item<'_>)) -> bool;

    /// Hand the current item to `f` mutably if it can be had in `shape`
    fn extract_mut(&mut self, shape: Shape, f: &mut dyn FnMut(ItemMut<'_>)) -> bool {
        let _ = (shape, f);
        false
    }

    /// Insert an item offered in `shape`
    fn insert_dyn(&mut self, shape: Shape, item: Item<'_>) -> bool {
        match (shape, item) {
            (Shape::Value, Item::Value(v)) => self.insert(v.clone()),
            _ => false,
        }
    }

    /// Hash of the current item, or [`UNPOSITIONED_HASH`]-derived when unpositioned
    fn get_hash(&self) -> u64;

    /// Stable name of the cursor kind
    fn type_name(&self) -> &'static str;
}

/// The closed set of cursor kinds
#[derive(Debug, Clone)]
pub enum Cursor {
    Range(RangeCursor),
    Repeat(RepeatCursor),
    Variant(VariantCursor),
    List(ListCursor),
    Map(MapCursor),
    LinkedList(LinkedListCursor),
    Pool(PoolCursor),
}

macro_rules! each_cursor {
    ($cursor:expr, $c:ident => $body:expr) => {
        match $cursor {
            Cursor::Range($c) => $body,
            Cursor::Repeat($c) => $body,
            Cursor::Variant($c) => $body,
            Cursor::List($c) => $body,
            Cursor::Map($c) => $body,
            Cursor::LinkedList($c) => $body,
            Cursor::Pool($c) => $body,
        }
    };
}

impl DynIterator for Cursor {
    fn expired(&self) -> bool {
        each_cursor!(self, c => c.expired())
    }

    fn valid(&self) -> bool {
        each_cursor!(self, c => c.valid())
    }

    fn move_next(&mut self) -> bool {
        each_cursor!(self, c => c.move_next())
    }

    fn move_previous(&mut self) -> bool {
        each_cursor!(self, c => c.move_previous())
    }

    fn set_to_first(&mut self) -> bool {
        each_cursor!(self, c => c.set_to_first())
    }

    fn set_to_last(&mut self) -> bool {
        each_cursor!(self, c => c.set_to_last())
    }

    fn reset(&mut self) -> bool {
        each_cursor!(self, c => c.reset())
    }

    fn can_reset(&self) -> bool {
        each_cursor!(self, c => c.can_reset())
    }

    fn can_insert(&self) -> bool {
        each_cursor!(self, c => c.can_insert())
    }

    fn can_erase(&self) -> bool {
        each_cursor!(self, c => c.can_erase())
    }

    fn erase(&mut self) -> bool {
        each_cursor!(self, c => c.erase())
    }

    fn insert(&mut self, value: DynObject) -> bool {
        each_cursor!(self, c => c.insert(value))
    }

    fn extract(&self, shape: Shape, f: &mut dyn FnMut(Item<'_>)) -> bool {
        each_cursor!(self, c => c.extract(shape, f))
    }

    fn extract_mut(&mut self, shape: Shape, f: &mut dyn FnMut(ItemMut<'_>)) -> bool {
        each_cursor!(self, c => c.extract_mut(shape, f))
    }

    fn insert_dyn(&mut self, shape: Shape, item: Item<'_>) -> bool {
        each_cursor!(self, c => c.insert_dyn(shape, item))
    }

    fn get_hash(&self) -> u64 {
        each_cursor!(self, c => c.get_hash())
    }

    fn type_name(&self) -> &'static str {
        each_cursor!(self, c => c.type_name())
    }
}

impl Cursor {
    /// Independent duplicate behind shared ownership
    pub fn clone_shared(&self) -> Shared<Cursor> {
        Rc::new(RefCell::new(self.clone()))
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cursor::Range(a), Cursor::Range(b)) => a == b,
            (Cursor::Repeat(a), Cursor::Repeat(b)) => a == b,
            (Cursor::Variant(a), Cursor::Variant(b)) => a == b,
            (Cursor::List(a), Cursor::List(b)) => a == b,
            (Cursor::Map(a), Cursor::Map(b)) => a == b,
            (Cursor::LinkedList(a), Cursor::LinkedList(b)) => a == b,
            (Cursor::Pool(a), Cursor::Pool(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for Cursor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        state.write_u64(self.get_hash());
    }
}

/// Hash an item with the standard hasher
pub(crate) fn hash_item(item: Item<'_>) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    item.hash_into(&mut hasher);
    hasher.finish()
}

/// Equality of two optional current items
pub(crate) fn same_item(a: Option<Item<'_>>, b: Option<Item<'_>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_as(b),
        _ => false,
    }
}

macro_rules! impl_from_cursor {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for Cursor {
            fn from(c: $ty) -> Self {
                Cursor::$variant(c)
            }
        })*
    };
}

impl_from_cursor!(
    Range(RangeCursor),
    Repeat(RepeatCursor),
    Variant(VariantCursor),
    List(ListCursor),
    Map(MapCursor),
    LinkedList(LinkedListCursor),
    Pool(PoolCursor),
);
