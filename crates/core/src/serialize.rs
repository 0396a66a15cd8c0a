//! Serialization of dynamic values
//!
//! `DynObject` refers to its tag through a process-local pointer, which is
//! not portable. `ValueSnapshot` records the tag chain by name instead, so a
//! snapshot can be restored in another process: missing tags are registered
//! on the way back in.
//!
//! Uses bincode for compact binary snapshots. For debugging, use
//! `ValueSnapshot::to_debug_string()`.

use crate::tags::{self, TagPtr};
use crate::value::{Cell, DynObject, Storage};
use serde::{Deserialize, Serialize};

/// Error during serialization/deserialization
#[derive(Debug)]
pub enum SerializeError {
    /// Bincode encoding/decoding error (preserves original error for debugging)
    BincodeError(Box<bincode::Error>),
    /// Snapshot does not describe a valid value
    InvalidData(String),
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::BincodeError(e) => write!(f, "Bincode error: {}", e),
            SerializeError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializeError::BincodeError(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<bincode::Error> for SerializeError {
    fn from(e: bincode::Error) -> Self {
        SerializeError::BincodeError(Box::new(e))
    }
}

/// Stored payload of a value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SnapshotData {
    Empty,
    Cell(Cell),
    Array { dims: Vec<usize>, cells: Vec<Cell> },
}

/// Portable representation of a `DynObject`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueSnapshot {
    /// Tag names from the value's tag up to (excluding) the root
    pub tag_chain: Vec<String>,
    pub data: SnapshotData,
}

impl ValueSnapshot {
    pub fn from_value(value: &DynObject) -> Self {
        let mut tag_chain = Vec::new();
        let mut tag = Some(value.tag());
        while let Some(t) = tag {
            if t.base.is_none() {
                break;
            }
            tag_chain.push(t.name.clone());
            tag = t.base_tag();
        }
        let data = match &value.storage {
            Storage::Empty => SnapshotData::Empty,
            Storage::Cell(c) => SnapshotData::Cell(*c),
            Storage::Array { dims, data } => SnapshotData::Array {
                dims: dims.to_vec(),
                cells: data.to_vec(),
            },
        };
        Self { tag_chain, data }
    }

    /// Restore the value, registering any tag this process lacks
    pub fn to_value(&self) -> Result<DynObject, SerializeError> {
        let tag = self.resolve_tag();
        match &self.data {
            SnapshotData::Empty => Ok(DynObject::new()),
            SnapshotData::Cell(c) => Ok(DynObject::from_cell(*c, tag)),
            SnapshotData::Array { dims, cells } => DynObject::from_array_md(cells, dims, tag)
                .map_err(|e| SerializeError::InvalidData(format!("array shape: {}", e))),
        }
    }

    fn resolve_tag(&self) -> TagPtr {
        // Outermost ancestor first so each registration can name its base
        let mut tag = tags::builtin(tags::TAG_CELL);
        for name in self.tag_chain.iter().rev() {
            tag = match tags::find_tag_by_name(name) {
                Some(existing) => existing,
                None => tags::register_tag(name, Some(tag)),
            };
        }
        tag
    }

    /// Serialize to binary format (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        bincode::serialize(self).map_err(SerializeError::from)
    }

    /// Deserialize from binary format (bincode)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializeError> {
        bincode::deserialize(bytes).map_err(SerializeError::from)
    }

    /// Convert to human-readable debug string
    pub fn to_debug_string(&self) -> String {
        let tag = self.tag_chain.first().map(String::as_str).unwrap_or("_");
        match &self.data {
            SnapshotData::Empty => format!("{}:<empty>", tag),
            SnapshotData::Cell(c) => format!("{}:{}", tag, c),
            SnapshotData::Array { dims, cells } => format!("{}:{:?}{:?}", tag, dims, cells),
        }
    }
}

/// Extension trait for DynObject to add serialization methods
pub trait ValueSerialize {
    fn to_snapshot(&self) -> ValueSnapshot;

    /// Serialize directly to bytes
    fn to_bytes(&self) -> Result<Vec<u8>, SerializeError>;
}

impl ValueSerialize for DynObject {
    fn to_snapshot(&self) -> ValueSnapshot {
        ValueSnapshot::from_value(self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        ValueSnapshot::from_value(self).to_bytes()
    }
}
