//! Handle registries
//!
//! A `HandlePool<T>` maps opaque integer handles to shared entries. Each
//! entry carries a reference count: a fresh entry starts *local* (count 0)
//! and survives until it is explicitly removed or swept by [`HandlePool::collect`]
//! while still unreferenced. Acquiring a handle makes the entry outlive
//! collection; releasing it back to zero makes it local again.
//!
//! Handle `0` is never issued and handles are never reused, so a stale handle
//! fails lookup instead of aliasing a newer entry.

use crate::error::{Result, RuntimeError};
use dynval_core::{Cell, HandleKind};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Opaque registry handle as seen by the host
pub type Handle = Cell;

/// Shared slot of a registry
pub type Shared<T> = Rc<RefCell<T>>;

struct Entry<T> {
    value: Shared<T>,
    refs: usize,
}

pub struct HandlePool<T> {
    kind: HandleKind,
    entries: BTreeMap<Handle, Entry<T>>,
    next: Handle,
    limit: usize,
}

impl<T> HandlePool<T> {
    pub fn new(kind: HandleKind, limit: usize) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
            next: 1,
            limit,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Register a new local entry
    pub fn add(&mut self, value: T) -> Result<Handle> {
        self.add_shared(Rc::new(RefCell::new(value)))
    }

    /// Register an already shared entry
    pub fn add_shared(&mut self, value: Shared<T>) -> Result<Handle> {
        if self.entries.len() >= self.limit || self.next == Handle::MAX {
            tracing::warn!(
                kind = self.kind.as_str(),
                limit = self.limit,
                "handle registry is full"
            );
            return Err(RuntimeError::RegistryFull {
                kind: self.kind,
                limit: self.limit,
            });
        }
        let handle = self.next;
        self.next += 1;
        self.entries.insert(handle, Entry { value, refs: 0 });
        tracing::debug!(kind = self.kind.as_str(), handle, "handle added");
        Ok(handle)
    }

    fn invalid(&self, handle: Handle) -> RuntimeError {
        RuntimeError::InvalidHandle {
            kind: self.kind,
            handle,
        }
    }

    /// Shared reference to a live entry
    pub fn get(&self, handle: Handle) -> Result<Shared<T>> {
        self.entries
            .get(&handle)
            .map(|e| Rc::clone(&e.value))
            .ok_or_else(|| self.invalid(handle))
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Handle of an entry, looked up by identity
    pub fn find(&self, value: &Shared<T>) -> Option<Handle> {
        self.entries
            .iter()
            .find(|(_, e)| Rc::ptr_eq(&e.value, value))
            .map(|(&h, _)| h)
    }

    /// Unregister an entry, returning it
    pub fn remove(&mut self, handle: Handle) -> Result<Shared<T>> {
        let entry = self
            .entries
            .remove(&handle)
            .ok_or_else(|| self.invalid(handle))?;
        tracing::debug!(kind = self.kind.as_str(), handle, "handle removed");
        Ok(entry.value)
    }

    pub fn acquire_ref(&mut self, handle: Handle) -> Result<()> {
        let entry = self.entries.get_mut(&handle).ok_or(RuntimeError::InvalidHandle {
            kind: self.kind,
            handle,
        })?;
        entry.refs = entry.refs.checked_add(1).ok_or(RuntimeError::CannotAcquire)?;
        Ok(())
    }

    pub fn release_ref(&mut self, handle: Handle) -> Result<()> {
        let entry = self.entries.get_mut(&handle).ok_or(RuntimeError::InvalidHandle {
            kind: self.kind,
            handle,
        })?;
        if entry.refs == 0 {
            return Err(RuntimeError::CannotRelease);
        }
        entry.refs -= 1;
        Ok(())
    }

    /// Reference count of a live entry
    pub fn refs(&self, handle: Handle) -> Option<usize> {
        self.entries.get(&handle).map(|e| e.refs)
    }

    /// Remove every unreferenced entry, returning what was swept
    pub fn collect(&mut self) -> Vec<Shared<T>> {
        let local: Vec<Handle> = self
            .entries
            .iter()
            .filter(|(_, e)| e.refs == 0)
            .map(|(&h, _)| h)
            .collect();
        local
            .into_iter()
            .filter_map(|h| self.entries.remove(&h))
            .map(|e| e.value)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries holding at least one reference
    pub fn acquired(&self) -> usize {
        self.entries.values().filter(|e| e.refs > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
