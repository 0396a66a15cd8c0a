//! Doubly-linked list on a slab of nodes
//!
//! Node references carry the slot's generation. Freeing a node bumps the
//! generation, so a stale `NodeRef` no longer resolves even after the slot
//! is reused.

use super::Container;
use dynval_core::DynObject;

/// Reference to a node that may since have been removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Node {
    value: DynObject,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
struct Slot {
    node: Option<Node>,
    generation: u32,
}

#[derive(Debug, Default)]
pub struct LinkedList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    destroyed: bool,
}

impl LinkedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, at: NodeRef) -> Option<&Node> {
        let slot = self.slots.get(at.index)?;
        if slot.generation != at.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_ref(&self, index: usize) -> NodeRef {
        NodeRef {
            index,
            generation: self.slots[index].generation,
        }
    }

    pub fn contains(&self, at: NodeRef) -> bool {
        self.node(at).is_some()
    }

    pub fn get(&self, at: NodeRef) -> Option<&DynObject> {
        self.node(at).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, at: NodeRef) -> Option<&mut DynObject> {
        let slot = self.slots.get_mut(at.index)?;
        if slot.generation != at.generation {
            return None;
        }
        slot.node.as_mut().map(|n| &mut n.value)
    }

    pub fn first(&self) -> Option<NodeRef> {
        self.head.map(|i| self.node_ref(i))
    }

    pub fn last(&self) -> Option<NodeRef> {
        self.tail.map(|i| self.node_ref(i))
    }

    pub fn next(&self, at: NodeRef) -> Option<NodeRef> {
        self.node(at)?.next.map(|i| self.node_ref(i))
    }

    pub fn prev(&self, at: NodeRef) -> Option<NodeRef> {
        self.node(at)?.prev.map(|i| self.node_ref(i))
    }

    /// Node at a zero-based position
    pub fn nth(&self, n: usize) -> Option<NodeRef> {
        let mut cur = self.first();
        for _ in 0..n {
            cur = self.next(cur?);
        }
        cur
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(i) => {
                self.slots[i].node = Some(node);
                i
            }
            None => {
                self.slots.push(Slot {
                    node: Some(node),
                    generation: 0,
                });
                self.slots.len() - 1
            }
        }
    }

    pub fn push_back(&mut self, value: DynObject) -> NodeRef {
        let i = self.alloc(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(t) => {
                if let Some(n) = self.slots[t].node.as_mut() {
                    n.next = Some(i);
                }
            }
            None => self.head = Some(i),
        }
        self.tail = Some(i);
        self.len += 1;
        self.node_ref(i)
    }

    /// Insert before `at`, or append when `at` is `None`
    ///
    /// Returns `None` if `at` no longer refers to a node.
    pub fn insert_before(&mut self, at: Option<NodeRef>, value: DynObject) -> Option<NodeRef> {
        let Some(at) = at else {
            return Some(self.push_back(value));
        };
        let prev = self.node(at)?.prev;
        let i = self.alloc(Node {
            value,
            prev,
            next: Some(at.index),
        });
        if let Some(n) = self.slots[at.index].node.as_mut() {
            n.prev = Some(i);
        }
        match prev {
            Some(p) => {
                if let Some(n) = self.slots[p].node.as_mut() {
                    n.next = Some(i);
                }
            }
            None => self.head = Some(i),
        }
        self.len += 1;
        Some(self.node_ref(i))
    }

    /// Unlink a node, returning its value and its successor
    pub fn remove(&mut self, at: NodeRef) -> Option<(DynObject, Option<NodeRef>)> {
        self.node(at)?;
        let slot = &mut self.slots[at.index];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(at.index);

        match node.prev {
            Some(p) => {
                if let Some(n) = self.slots[p].node.as_mut() {
                    n.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(nx) => {
                if let Some(n) = self.slots[nx].node.as_mut() {
                    n.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
        self.len -= 1;
        Some((node.value, node.next.map(|i| self.node_ref(i))))
    }

    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(i);
            }
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynObject> {
        std::iter::successors(self.first(), |&at| self.next(at)).filter_map(|at| self.get(at))
    }
}

impl Container for LinkedList {
    fn destroy(&mut self) {
        self.clear();
        self.destroyed = true;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
