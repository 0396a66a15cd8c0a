//! Dynval Runtime: handle registries and capability-negotiated cursors
//!
//! Key design principles:
//! - Runtime: owns one handle registry per kind (iterators, boxed values,
//!   lists, maps, linked lists, pools); hosts only ever see integer handles
//! - Cursor: a bidirectional, resettable position over a logical sequence,
//!   backed by a container, a synthesized range or a single boxed value
//! - Access: callers ask a cursor for its current item in some shape and the
//!   cursor either answers or declines; nothing is known statically
//!
//! # Modules
//!
//! - `registry`: `HandlePool`, reference counted handle arenas
//! - `containers`: list, map, linked list and pool storage
//! - `iter`: the `DynIterator` trait and the seven cursor kinds
//! - `access`: value/key read, write and modify dispatch over cursors
//! - `runtime`: the `Runtime` context and container operations
//! - `iter_ops`, `variant_ops`, `map_ops`: handle-level operations
//! - `report`: registry counts for `DYNVAL_REPORT`

pub mod access;
pub mod config;
pub mod containers;
pub mod error;
pub mod iter;
pub mod iter_ops;
pub mod map_ops;
pub mod registry;
pub mod report;
pub mod runtime;
pub mod variant_ops;

pub use access::{key_read, key_value_access, value_modify, value_read, value_write};
pub use config::RuntimeConfig;
pub use containers::{Container, LinkedList, List, Map, Pool};
pub use error::{
    Result, RuntimeError, clear_runtime_error, has_runtime_error, set_runtime_error,
    take_runtime_error,
};
pub use iter::{Cursor, DynIterator, Item, ItemMut, Shape};
pub use registry::{Handle, HandlePool, Shared};
pub use report::{ReportConfig, ReportData, RegistryCounts, emit_report};
pub use runtime::Runtime;

// Value model, re-exported for hosts that only depend on the runtime
pub use dynval_core::{Cell, DynObject, TagOp, TagPtr, TrackedHandle, ValueError};
