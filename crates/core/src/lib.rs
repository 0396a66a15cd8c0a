//! Dynval Core: tagged dynamic values
//!
//! This crate provides the value model shared by the runtime: a value is a
//! tag plus either nothing, one cell, or an owned array of cells.
//!
//! Key design principles:
//! - Tag: what a value *means* (Float, String, a user type, a handle kind)
//! - DynObject: what a value *holds* (empty, scalar, N-dimensional array)
//! - Every access is bounds-checked; mismatches are benign failures
//!
//! # Modules
//!
//! - `tags`: Process-wide tag registry and inheritance queries
//! - `value`: The `DynObject` type, cell access, equality and hashing
//! - `ops`: Tag-aware arithmetic
//! - `serialize`: Portable snapshots (serde + bincode)

pub mod ops;
pub mod serialize;
pub mod tags;
pub mod value;

pub use ops::TagOp;
pub use serialize::{SerializeError, SnapshotData, ValueSerialize, ValueSnapshot};
pub use tags::{
    HandleKind, TAG_BOOL, TAG_CELL, TAG_CHAR, TAG_FLOAT, TAG_ITER, TAG_LINKED_LIST, TAG_LIST,
    TAG_MAP, TAG_POOL, TAG_STRING, TAG_VARIANT, TagInfo, TagPtr, TagUid, builtin, find_tag,
    find_tag_by_name, register_tag,
};
pub use value::{Cell, DynObject, TrackedHandle, ValueError};
