//! Backing containers for the handle registries
//!
//! Each container is shared as `Rc<RefCell<_>>` between its registry entry
//! and any cursors walking it. Removing the registry entry *destroys* the
//! container: its contents are dropped and the flag makes every cursor still
//! holding it report itself expired.
//!
//! Positions handed to cursors carry a stamp (an item id or a slot
//! generation) so that a cursor whose item was erased through another cursor
//! stops resolving instead of silently sliding onto a neighbour.

pub mod linked_list;
pub mod list;
pub mod map;
pub mod pool;

pub use linked_list::{LinkedList, NodeRef};
pub use list::List;
pub use map::Map;
pub use pool::{Pool, SlotRef};

/// Lifecycle shared by all backing containers
pub trait Container {
    /// Drop the contents and mark the container as gone
    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;
}

/// Index into an id-stamped sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub(crate) index: usize,
    pub(crate) id: u64,
}

/// Current index of the item `pos` was taken from, if it still exists
pub(crate) fn resolve(ids: &[u64], pos: Position) -> Option<usize> {
    if ids.get(pos.index) == Some(&pos.id) {
        return Some(pos.index);
    }
    // Something before it was inserted or erased
    ids.iter().position(|&id| id == pos.id)
}
