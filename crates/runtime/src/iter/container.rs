//! Cursor over a shared backing container
//!
//! The cursor keeps the container alive through its `Rc` and checks the
//! container's destroyed flag before every positional operation. What a
//! position is, how to step it and which shapes the items come in is up to
//! the container's [`Walk`] implementation.

use super::{DynIterator, Item, ItemMut, Shape, Spot, UNPOSITIONED_HASH, hash_item, same_item};
use crate::containers::Container;
use crate::registry::Shared;
use dynval_core::DynObject;
use std::fmt;
use std::rc::Rc;

/// Navigation and access a container offers to its cursors
pub trait Walk: Container {
    type Pos: Copy + PartialEq + fmt::Debug;

    const NAME: &'static str;

    fn first(&self) -> Option<Self::Pos>;
    fn last(&self) -> Option<Self::Pos>;
    fn next(&self, at: Self::Pos) -> Option<Self::Pos>;
    fn prev(&self, at: Self::Pos) -> Option<Self::Pos>;

    /// The item `at` was taken for still exists
    fn live(&self, at: Self::Pos) -> bool;

    fn item(&self, at: Self::Pos) -> Option<Item<'_>>;
    fn item_mut(&mut self, at: Self::Pos) -> Option<ItemMut<'_>>;

    /// Shapes the items are offered in
    fn offers(shape: Shape) -> bool;

    const CAN_ERASE: bool = false;
    const CAN_INSERT: bool = false;

    /// Remove the item, returning the follower's position
    fn erase(&mut self, at: Self::Pos) -> Option<Option<Self::Pos>> {
        let _ = at;
        None
    }

    /// Insert before `at` (append when `None`), returning the new item's position
    fn insert_before(&mut self, at: Option<Self::Pos>, value: DynObject) -> Option<Self::Pos> {
        let _ = (at, value);
        None
    }
}

pub struct ContainerCursor<C: Walk> {
    container: Shared<C>,
    spot: Spot<C::Pos>,
}

impl<C: Walk> Clone for ContainerCursor<C> {
    fn clone(&self) -> Self {
        Self {
            container: Rc::clone(&self.container),
            spot: self.spot,
        }
    }
}

impl<C: Walk> fmt::Debug for ContainerCursor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerCursor")
            .field("kind", &C::NAME)
            .field("spot", &self.spot)
            .finish()
    }
}

impl<C: Walk> ContainerCursor<C> {
    /// Cursor positioned at the first item (unpositioned if empty)
    pub fn new(container: Shared<C>) -> Self {
        let mut cursor = Self::detached(container);
        cursor.set_to_first();
        cursor
    }

    pub fn detached(container: Shared<C>) -> Self {
        Self {
            container,
            spot: Spot::Detached,
        }
    }

    /// Cursor positioned at `at`, or exhausted when there is no such item
    pub fn at(container: Shared<C>, at: Option<C::Pos>) -> Self {
        let spot = match at {
            Some(p) => Spot::At(p),
            None => Spot::Exhausted,
        };
        Self { container, spot }
    }

    pub fn container(&self) -> &Shared<C> {
        &self.container
    }

    /// Run `f` on the live container
    fn with<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let c = self.container.try_borrow().ok()?;
        if c.is_destroyed() {
            return None;
        }
        Some(f(&*c))
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let mut c = self.container.try_borrow_mut().ok()?;
        if c.is_destroyed() {
            return None;
        }
        Some(f(&mut *c))
    }

    /// Current position, if it still refers to an item
    fn live_pos(&self) -> Option<C::Pos> {
        let at = self.spot.at()?;
        self.with(|c| c.live(at)).unwrap_or(false).then_some(at)
    }

    fn land(&mut self, target: Option<Option<C::Pos>>) -> bool {
        match target {
            Some(Some(p)) => {
                self.spot = Spot::At(p);
                true
            }
            Some(None) => {
                self.spot = Spot::Exhausted;
                false
            }
            None if self.expired() => {
                tracing::warn!(kind = C::NAME, "operation on expired cursor");
                false
            }
            None => {
                tracing::debug!(kind = C::NAME, spot = ?self.spot, "position no longer valid");
                false
            }
        }
    }

    fn step(&mut self, forward: bool) -> bool {
        let target = match self.spot {
            Spot::Exhausted => return false,
            Spot::Detached => self.with(|c| if forward { c.first() } else { c.last() }),
            Spot::At(at) => self.with(|c| {
                if !c.live(at) {
                    None
                } else if forward {
                    c.next(at)
                } else {
                    c.prev(at)
                }
            }),
        };
        self.land(target)
    }

    fn current<R>(&self, f: impl FnOnce(Option<Item<'_>>) -> R) -> R {
        let Some(at) = self.spot.at() else {
            return f(None);
        };
        match self.container.try_borrow() {
            Ok(c) if !c.is_destroyed() && c.live(at) => f(c.item(at)),
            _ => f(None),
        }
    }
}

impl<C: Walk> DynIterator for ContainerCursor<C> {
    fn expired(&self) -> bool {
        self.container
            .try_borrow()
            .map(|c| c.is_destroyed())
            .unwrap_or(false)
    }

    fn valid(&self) -> bool {
        self.live_pos().is_some()
    }

    fn move_next(&mut self) -> bool {
        self.step(true)
    }

    fn move_previous(&mut self) -> bool {
        self.step(false)
    }

    fn set_to_first(&mut self) -> bool {
        match self.with(|c| c.first()) {
            Some(Some(p)) => {
                self.spot = Spot::At(p);
                true
            }
            Some(None) => {
                self.spot = Spot::Detached;
                false
            }
            None => false,
        }
    }

    fn set_to_last(&mut self) -> bool {
        match self.with(|c| c.last()) {
            Some(Some(p)) => {
                self.spot = Spot::At(p);
                true
            }
            Some(None) => {
                self.spot = Spot::Detached;
                false
            }
            None => false,
        }
    }

    fn reset(&mut self) -> bool {
        if self.expired() {
            return false;
        }
        self.spot = Spot::Detached;
        true
    }

    fn can_insert(&self) -> bool {
        C::CAN_INSERT && !self.expired()
    }

    fn can_erase(&self) -> bool {
        C::CAN_ERASE && !self.expired()
    }

    fn erase(&mut self) -> bool {
        if !C::CAN_ERASE {
            return false;
        }
        let Some(at) = self.live_pos() else {
            return false;
        };
        match self.with_mut(|c| c.erase(at)).flatten() {
            Some(follower) => {
                self.spot = follower.map_or(Spot::Exhausted, Spot::At);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, value: DynObject) -> bool {
        if !C::CAN_INSERT {
            return false;
        }
        let before = match self.spot {
            Spot::At(at) => match self.live_pos() {
                Some(p) => Some(p),
                None => {
                    tracing::debug!(kind = C::NAME, ?at, "insert at a removed position");
                    return false;
                }
            },
            _ => None,
        };
        match self.with_mut(|c| c.insert_before(before, value)).flatten() {
            Some(p) => {
                self.spot = Spot::At(p);
                true
            }
            None => false,
        }
    }

    fn extract(&self, shape: Shape, f: &mut dyn FnMut(Item<'_>)) -> bool {
        if !C::offers(shape) {
            return false;
        }
        self.current(|item| match item {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        })
    }

    fn extract_mut(&mut self, shape: Shape, f: &mut dyn FnMut(ItemMut<'_>)) -> bool {
        if !C::offers(shape) {
            return false;
        }
        let Some(at) = self.live_pos() else {
            return false;
        };
        self.with_mut(|c| match c.item_mut(at) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        })
        .unwrap_or(false)
    }

    fn get_hash(&self) -> u64 {
        self.current(|item| item.map_or(UNPOSITIONED_HASH, hash_item))
    }

    fn type_name(&self) -> &'static str {
        C::NAME
    }
}

impl<C: Walk> PartialEq for ContainerCursor<C> {
    fn eq(&self, other: &Self) -> bool {
        self.current(|a| other.current(|b| same_item(a, b)))
    }
}
