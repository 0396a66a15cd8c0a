//! Runtime Error Handling
//!
//! Every runtime operation returns `Result<T, RuntimeError>`. In addition, a
//! thread-local "last error" slot lets loops that keep going past a failed
//! element (bulk inserts, for example) leave a trace for the caller:
//!
//! ```ignore
//! for value in values {
//!     if let Some(idx) = report(list.insert(value)) {
//!         inserted = idx;
//!     }
//! }
//! if has_runtime_error() {
//!     let error = take_runtime_error();
//!     // Handle error...
//! }
//! ```

use dynval_core::{HandleKind, ValueError};
use std::cell::RefCell;
use std::fmt;

/// Failure of a runtime operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The handle does not name a live entry of that registry
    InvalidHandle { kind: HandleKind, handle: i32 },
    /// The cursor cannot do this (no matching shape, unsupported mutator, expired backing)
    OperationNotSupported { kind: &'static str },
    /// An index, step count or offset argument is out of range
    OutOfRange { what: &'static str },
    /// A tag-checked write or read with an incompatible tag
    TypeMismatch,
    /// Reference count could not be raised
    CannotAcquire,
    /// Reference count was already zero
    CannotRelease,
    /// The registry already holds its configured maximum of live entries
    RegistryFull { kind: HandleKind, limit: usize },
    /// Value-level access failure
    Value(ValueError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::InvalidHandle { kind, handle } => {
                write!(f, "invalid {} handle: {}", kind.as_str(), handle)
            }
            RuntimeError::OperationNotSupported { kind } => {
                write!(f, "operation not supported by {} iterator", kind)
            }
            RuntimeError::OutOfRange { what } => write!(f, "{} out of range", what),
            RuntimeError::TypeMismatch => write!(f, "tag mismatch"),
            RuntimeError::CannotAcquire => write!(f, "reference cannot be acquired"),
            RuntimeError::CannotRelease => write!(f, "reference cannot be released"),
            RuntimeError::RegistryFull { kind, limit } => {
                write!(f, "{} registry is full ({} entries)", kind.as_str(), limit)
            }
            RuntimeError::Value(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Value(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValueError> for RuntimeError {
    fn from(e: ValueError) -> Self {
        match e {
            ValueError::TagMismatch => RuntimeError::TypeMismatch,
            other => RuntimeError::Value(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

thread_local! {
    /// Thread-local storage for the last runtime error message
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Set the last runtime error message
pub fn set_runtime_error(msg: impl Into<String>) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(msg.into());
    });
}

/// Take (and clear) the last runtime error message
pub fn take_runtime_error() -> Option<String> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Check if there's a pending runtime error
pub fn has_runtime_error() -> bool {
    LAST_ERROR.with(|e| e.borrow().is_some())
}

/// Clear any pending runtime error
pub fn clear_runtime_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

/// Record a failure in the last-error slot and continue without its value
pub fn report<T>(result: Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(error = %e, "runtime operation failed");
            set_runtime_error(e.to_string());
            None
        }
    }
}
