//! Access dispatch over whatever a cursor points at
//!
//! Callers hand in a continuation; the dispatcher probes the cursor for each
//! shape it accepts, in a fixed order, and runs the continuation on the first
//! one offered. Getters, setters and deep erase are all built on these five
//! entry points and never branch on the cursor kind.
//!
//! | entry point        | shapes probed                                              |
//! |--------------------|------------------------------------------------------------|
//! | `value_read`       | value, shared value, pair (value), shared pair (value)     |
//! | `value_write`      | value, shared value, pair (value), shared pair (value)     |
//! | `value_modify`     | as `value_write`, then modifiable value, modifiable pair   |
//! | `key_read`         | pair (key), shared pair (key)                              |
//! | `key_value_access` | mutable value, shared value; else pair key then pair value |

use crate::error::{Result, RuntimeError};
use crate::iter::{Cursor, DynIterator, Item, ItemMut, Shape};
use crate::registry::{Handle, HandlePool};
use dynval_core::DynObject;

const READ_SHAPES: [Shape; 4] = [Shape::Value, Shape::SharedValue, Shape::Pair, Shape::SharedPair];
const WRITE_SHAPES: [Shape; 4] = READ_SHAPES;
const MODIFY_SHAPES: [Shape; 6] = [
    Shape::Value,
    Shape::SharedValue,
    Shape::Pair,
    Shape::SharedPair,
    Shape::ModifiableValue,
    Shape::ModifiablePair,
];
const KEY_SHAPES: [Shape; 2] = [Shape::Pair, Shape::SharedPair];
const BARE_SHAPES: [Shape; 2] = [Shape::Value, Shape::SharedValue];

fn unsupported(cursor: &Cursor) -> RuntimeError {
    RuntimeError::OperationNotSupported {
        kind: cursor.type_name(),
    }
}

impl Cursor {
    /// Run `f` on the current value, read-only
    pub fn read_value<R>(&self, f: impl FnOnce(&DynObject) -> R) -> Result<R> {
        let mut f = Some(f);
        let mut out = None;
        for shape in READ_SHAPES {
            let hit = self.extract(shape, &mut |item| {
                if let Some(f) = f.take() {
                    out = Some(f(item.value()));
                }
            });
            if hit {
                break;
            }
        }
        out.ok_or_else(|| unsupported(self))
    }

    fn probe_mut<R>(&mut self, shapes: &[Shape], f: impl FnOnce(&mut DynObject) -> R) -> Result<R> {
        let mut f = Some(f);
        let mut out = None;
        for &shape in shapes {
            let hit = self.extract_mut(shape, &mut |mut item| {
                if let Some(f) = f.take() {
                    out = Some(f(item.value_mut()));
                }
            });
            if hit {
                break;
            }
        }
        out.ok_or_else(|| unsupported(self))
    }

    /// Run `f` on the current value through a plainly mutable shape
    pub fn write_value<R>(&mut self, f: impl FnOnce(&mut DynObject) -> R) -> Result<R> {
        self.probe_mut(&WRITE_SHAPES, f)
    }

    /// Like [`Cursor::write_value`], also accepting values reached through a shared box
    pub fn modify_value<R>(&mut self, f: impl FnOnce(&mut DynObject) -> R) -> Result<R> {
        self.probe_mut(&MODIFY_SHAPES, f)
    }

    /// Run `f` on the current key; only pair-shaped cursors have one
    pub fn read_key<R>(&self, f: impl FnOnce(&DynObject) -> R) -> Result<R> {
        let mut f = Some(f);
        let mut out = None;
        for shape in KEY_SHAPES {
            let hit = self.extract(shape, &mut |item| {
                if let (Item::Pair(key, _), Some(f)) = (item, f.take()) {
                    out = Some(f(key));
                }
            });
            if hit && out.is_some() {
                break;
            }
        }
        out.ok_or_else(|| unsupported(self))
    }

    /// Run `f` on the bare value, or on the key and then the value of a pair
    ///
    /// Only storage-backed shapes count: a cursor that merely produces its
    /// items (range, repeat) or reaches them through a shared box declines.
    pub fn visit_key_value(&mut self, mut f: impl FnMut(&DynObject)) -> Result<()> {
        for shape in BARE_SHAPES {
            if self.extract_mut(shape, &mut |mut item| f(item.value_mut())) {
                return Ok(());
            }
        }
        for shape in KEY_SHAPES {
            let hit = self.extract_mut(shape, &mut |item| match item {
                ItemMut::Pair(key, value) => {
                    f(key);
                    f(value);
                }
                ItemMut::Value(value) => f(value),
            });
            if hit {
                return Ok(());
            }
        }
        Err(unsupported(self))
    }
}

/// Read the value under the cursor registered as `iter`
pub fn value_read<R>(
    iters: &HandlePool<Cursor>,
    iter: Handle,
    f: impl FnOnce(&DynObject) -> R,
) -> Result<R> {
    let cursor = iters.get(iter)?;
    let cursor = cursor
        .try_borrow()
        .map_err(|_| RuntimeError::OperationNotSupported { kind: "cursor" })?;
    cursor.read_value(f)
}

/// Mutate the value under the cursor through a plainly mutable shape
pub fn value_write<R>(
    iters: &HandlePool<Cursor>,
    iter: Handle,
    f: impl FnOnce(&mut DynObject) -> R,
) -> Result<R> {
    let cursor = iters.get(iter)?;
    let mut cursor = cursor
        .try_borrow_mut()
        .map_err(|_| RuntimeError::OperationNotSupported { kind: "cursor" })?;
    cursor.write_value(f)
}

/// Mutate the value under the cursor, also through shared boxes
pub fn value_modify<R>(
    iters: &HandlePool<Cursor>,
    iter: Handle,
    f: impl FnOnce(&mut DynObject) -> R,
) -> Result<R> {
    let cursor = iters.get(iter)?;
    let mut cursor = cursor
        .try_borrow_mut()
        .map_err(|_| RuntimeError::OperationNotSupported { kind: "cursor" })?;
    cursor.modify_value(f)
}

/// Read the key under a pair-shaped cursor
pub fn key_read<R>(
    iters: &HandlePool<Cursor>,
    iter: Handle,
    f: impl FnOnce(&DynObject) -> R,
) -> Result<R> {
    let cursor = iters.get(iter)?;
    let cursor = cursor
        .try_borrow()
        .map_err(|_| RuntimeError::OperationNotSupported { kind: "cursor" })?;
    cursor.read_key(f)
}

/// Visit every half of the current item: the value, or key then value
pub fn key_value_access(
    iters: &HandlePool<Cursor>,
    iter: Handle,
    f: impl FnMut(&DynObject),
) -> Result<()> {
    let cursor = iters.get(iter)?;
    let mut cursor = cursor
        .try_borrow_mut()
        .map_err(|_| RuntimeError::OperationNotSupported { kind: "cursor" })?;
    cursor.visit_key_value(f)
}
