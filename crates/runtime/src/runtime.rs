//! Runtime context
//!
//! One `Runtime` owns every handle registry: iterators, boxed values and the
//! four container kinds. It is single-threaded; handles are only meaningful
//! to the runtime that issued them.
//!
//! Deleting a container unregisters it and marks it destroyed, so cursors
//! still holding it expire instead of dangling. [`Runtime::collect`] drops
//! entries nobody acquired; cursors keep collected containers alive.

use crate::config::RuntimeConfig;
use crate::containers::{Container, LinkedList, List, Map, Pool};
use crate::error::{Result, RuntimeError};
use crate::iter::{Cursor, DynIterator};
use crate::registry::{Handle, HandlePool, Shared};
use dynval_core::{Cell, DynObject, HandleKind, TrackedHandle};

pub struct Runtime {
    config: RuntimeConfig,
    pub(crate) iters: HandlePool<Cursor>,
    pub(crate) variants: HandlePool<DynObject>,
    pub(crate) lists: HandlePool<List>,
    pub(crate) maps: HandlePool<Map>,
    pub(crate) linked_lists: HandlePool<LinkedList>,
    pub(crate) pools: HandlePool<Pool>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-negative index argument
pub(crate) fn index_arg(index: Cell, what: &'static str) -> Result<usize> {
    usize::try_from(index).map_err(|_| RuntimeError::OutOfRange { what })
}

/// Insertion index: -1 appends, anything else must be within `0..=len`
pub(crate) fn insert_index(index: Cell, len: usize, what: &'static str) -> Result<usize> {
    if index == -1 {
        return Ok(len);
    }
    match usize::try_from(index) {
        Ok(i) if i <= len => Ok(i),
        _ => Err(RuntimeError::OutOfRange { what }),
    }
}

pub(crate) fn destroy<C: Container>(pool: &mut HandlePool<C>, handle: Handle) -> Result<()> {
    let container = pool.get(handle)?;
    let mut c = container.try_borrow_mut().map_err(|_| busy())?;
    c.destroy();
    pool.remove(handle)?;
    Ok(())
}

pub(crate) fn busy() -> RuntimeError {
    RuntimeError::OperationNotSupported {
        kind: "borrowed container",
    }
}

impl Runtime {
    /// Runtime configured from the environment
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let limit = config.max_handles;
        Self {
            iters: HandlePool::new(HandleKind::Iter, limit),
            variants: HandlePool::new(HandleKind::Variant, limit),
            lists: HandlePool::new(HandleKind::List, limit),
            maps: HandlePool::new(HandleKind::Map, limit),
            linked_lists: HandlePool::new(HandleKind::LinkedList, limit),
            pools: HandlePool::new(HandleKind::Pool, limit),
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn iterators(&self) -> &HandlePool<Cursor> {
        &self.iters
    }

    pub fn variants(&self) -> &HandlePool<DynObject> {
        &self.variants
    }

    pub fn lists(&self) -> &HandlePool<List> {
        &self.lists
    }

    pub fn maps(&self) -> &HandlePool<Map> {
        &self.maps
    }

    pub fn linked_lists(&self) -> &HandlePool<LinkedList> {
        &self.linked_lists
    }

    pub fn pools(&self) -> &HandlePool<Pool> {
        &self.pools
    }

    /// Drop every entry that was never acquired (or was released back to zero)
    pub fn collect(&mut self) -> usize {
        let swept = self.iters.collect().len()
            + self.variants.collect().len()
            + self.lists.collect().len()
            + self.maps.collect().len()
            + self.linked_lists.collect().len()
            + self.pools.collect().len();
        if swept > 0 {
            tracing::debug!(swept, "collected local handles");
        }
        swept
    }

    /// Give up the references a value held on registry entries
    ///
    /// Each acquired handle loses one reference; handles that were never
    /// acquired are left for [`Runtime::collect`].
    pub fn release_tracked(&mut self, handles: &[TrackedHandle]) {
        for &TrackedHandle { kind, handle } in handles {
            let released = match kind {
                HandleKind::Variant => Self::release_if_held(&mut self.variants, handle),
                HandleKind::List => Self::release_if_held(&mut self.lists, handle),
                HandleKind::Map => Self::release_if_held(&mut self.maps, handle),
                HandleKind::LinkedList => Self::release_if_held(&mut self.linked_lists, handle),
                HandleKind::Pool => Self::release_if_held(&mut self.pools, handle),
                HandleKind::Iter => Self::release_if_held(&mut self.iters, handle),
            };
            if !released {
                tracing::debug!(kind = kind.as_str(), handle, "tracked handle not held");
            }
        }
    }

    fn release_if_held<T>(pool: &mut HandlePool<T>, handle: Handle) -> bool {
        match pool.refs(handle) {
            Some(n) if n > 0 => pool.release_ref(handle).is_ok(),
            _ => false,
        }
    }

    // ---- value factories ----

    /// Copy of a boxed value; a dead handle gives an empty value
    pub fn dyn_from_variant(&self, var: Handle) -> DynObject {
        self.variants
            .get(var)
            .ok()
            .and_then(|v| v.try_borrow().ok().map(|v| v.clone()))
            .unwrap_or_default()
    }

    /// Box a value and register it
    pub fn variant_from_dyn(&mut self, value: DynObject) -> Result<Handle> {
        self.variants.add(value)
    }

    // ---- lists ----

    pub fn list_new(&mut self) -> Result<Handle> {
        self.lists.add(List::new())
    }

    pub(crate) fn list(&self, list: Handle) -> Result<Shared<List>> {
        self.lists.get(list)
    }

    /// Insert at `index` (-1 appends), returning where the value landed
    pub fn list_add(&mut self, list: Handle, value: DynObject, index: Cell) -> Result<usize> {
        let list = self.list(list)?;
        let mut list = list.try_borrow_mut().map_err(|_| busy())?;
        let at = insert_index(index, list.len(), "list index")?;
        list.insert(at, value)
            .ok_or(RuntimeError::OutOfRange { what: "list index" })
    }

    pub fn list_get(&self, list: Handle, index: Cell) -> Result<DynObject> {
        let at = index_arg(index, "list index")?;
        let list = self.list(list)?;
        let list = list.try_borrow().map_err(|_| busy())?;
        list.get(at)
            .cloned()
            .ok_or(RuntimeError::OutOfRange { what: "list index" })
    }

    pub fn list_len(&self, list: Handle) -> Result<usize> {
        let list = self.list(list)?;
        let list = list.try_borrow().map_err(|_| busy())?;
        Ok(list.len())
    }

    pub fn list_delete(&mut self, list: Handle) -> Result<()> {
        destroy(&mut self.lists, list)
    }

    // ---- linked lists ----

    pub fn linked_list_new(&mut self) -> Result<Handle> {
        self.linked_lists.add(LinkedList::new())
    }

    pub(crate) fn linked_list(&self, list: Handle) -> Result<Shared<LinkedList>> {
        self.linked_lists.get(list)
    }

    pub fn linked_list_add(&mut self, list: Handle, value: DynObject, index: Cell) -> Result<usize> {
        let list = self.linked_list(list)?;
        let mut list = list.try_borrow_mut().map_err(|_| busy())?;
        let at = insert_index(index, list.len(), "linked list index")?;
        let before = list.nth(at);
        list.insert_before(before, value)
            .ok_or(RuntimeError::OutOfRange {
                what: "linked list index",
            })?;
        Ok(at)
    }

    pub fn linked_list_get(&self, list: Handle, index: Cell) -> Result<DynObject> {
        let at = index_arg(index, "linked list index")?;
        let list = self.linked_list(list)?;
        let list = list.try_borrow().map_err(|_| busy())?;
        list.nth(at)
            .and_then(|node| list.get(node))
            .cloned()
            .ok_or(RuntimeError::OutOfRange {
                what: "linked list index",
            })
    }

    pub fn linked_list_len(&self, list: Handle) -> Result<usize> {
        let list = self.linked_list(list)?;
        let list = list.try_borrow().map_err(|_| busy())?;
        Ok(list.len())
    }

    pub fn linked_list_delete(&mut self, list: Handle) -> Result<()> {
        destroy(&mut self.linked_lists, list)
    }

    // ---- pools ----

    pub fn pool_new(&mut self) -> Result<Handle> {
        self.pools.add(Pool::new())
    }

    pub(crate) fn pool(&self, pool: Handle) -> Result<Shared<Pool>> {
        self.pools.get(pool)
    }

    /// Store in the lowest free slot, returning its index
    pub fn pool_add(&mut self, pool: Handle, value: DynObject) -> Result<usize> {
        let pool = self.pool(pool)?;
        let mut pool = pool.try_borrow_mut().map_err(|_| busy())?;
        Ok(pool.add(value))
    }

    pub fn pool_set(&mut self, pool: Handle, index: Cell, value: DynObject) -> Result<()> {
        let at = index_arg(index, "pool index")?;
        if at >= self.config.max_pool_slots {
            return Err(RuntimeError::OutOfRange { what: "pool index" });
        }
        let pool = self.pool(pool)?;
        let mut pool = pool.try_borrow_mut().map_err(|_| busy())?;
        pool.set(at, value);
        Ok(())
    }

    pub fn pool_get(&self, pool: Handle, index: Cell) -> Result<DynObject> {
        let at = index_arg(index, "pool index")?;
        let pool = self.pool(pool)?;
        let pool = pool.try_borrow().map_err(|_| busy())?;
        pool.get(at)
            .cloned()
            .ok_or(RuntimeError::OutOfRange { what: "pool index" })
    }

    pub fn pool_remove(&mut self, pool: Handle, index: Cell) -> Result<DynObject> {
        let at = index_arg(index, "pool index")?;
        let pool = self.pool(pool)?;
        let mut pool = pool.try_borrow_mut().map_err(|_| busy())?;
        pool.remove(at)
            .ok_or(RuntimeError::OutOfRange { what: "pool index" })
    }

    pub fn pool_len(&self, pool: Handle) -> Result<usize> {
        let pool = self.pool(pool)?;
        let pool = pool.try_borrow().map_err(|_| busy())?;
        Ok(pool.len())
    }

    pub fn pool_delete(&mut self, pool: Handle) -> Result<()> {
        destroy(&mut self.pools, pool)
    }

    /// Shared box behind a variant handle
    pub(crate) fn variant(&self, var: Handle) -> Result<Shared<DynObject>> {
        self.variants.get(var)
    }

    /// Register a cursor over a container, advanced `index` steps (detached if negative)
    pub(crate) fn add_cursor(&mut self, cursor: impl Into<Cursor>, index: Cell) -> Result<Handle> {
        let mut cursor = cursor.into();
        if index < 0 {
            cursor.reset();
        } else {
            for _ in 0..index {
                if !cursor.move_next() {
                    break;
                }
            }
        }
        self.iters.add(cursor)
    }

    pub(crate) fn shared_cursor(&self, iter: Handle) -> Result<Shared<Cursor>> {
        self.iters.get(iter)
    }

    /// Register an existing shared cursor (used by clones)
    pub(crate) fn adopt_cursor(&mut self, cursor: Shared<Cursor>) -> Result<Handle> {
        self.iters.add_shared(cursor)
    }
}
