//! DynObject: a tagged, rank-aware dynamic value
//!
//! A `DynObject` is either empty, a single cell (rank 0), or an owned array of
//! cells with one extent per dimension (rank >= 1, row-major). Every value
//! carries a [`TagPtr`] naming its logical type.
//!
//! # Ownership
//!
//! Array storage is exclusively owned. `Clone` deep-copies it and
//! `std::mem::take` moves it out, leaving an empty value behind.
//!
//! # Failure policy
//!
//! Cell access is always bounds-checked and reports a [`ValueError`];
//! arithmetic and comparisons between incompatible values yield `None` or
//! `false`. Nothing here panics on bad input.

use crate::tags::{self, HandleKind, TAG_BOOL, TAG_CELL, TAG_FLOAT, TAG_STRING, TagPtr};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The host's machine word
pub type Cell = i32;

/// Error from a bounds-checked value access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    /// The value holds nothing
    Empty,
    /// A non-zero offset was used on a scalar
    NotArray,
    /// Negative or over-extent offset
    OutOfRange,
    /// Offsets count does not match the value's rank
    RankMismatch,
    /// Tag-checked access with an incompatible tag
    TagMismatch,
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Empty => write!(f, "value is empty"),
            ValueError::NotArray => write!(f, "value is not an array"),
            ValueError::OutOfRange => write!(f, "offset out of range"),
            ValueError::RankMismatch => write!(f, "offsets do not match the value's rank"),
            ValueError::TagMismatch => write!(f, "tag mismatch"),
        }
    }
}

impl std::error::Error for ValueError {}

/// A handle carried by a value whose tag refers to a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedHandle {
    pub kind: HandleKind,
    pub handle: Cell,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub(crate) enum Storage {
    #[default]
    Empty,
    Cell(Cell),
    Array {
        dims: Box<[usize]>,
        data: Box<[Cell]>,
    },
}

/// Tagged dynamic value
#[derive(Clone)]
pub struct DynObject {
    tag: TagPtr,
    pub(crate) storage: Storage,
}

impl Default for DynObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.storage {
            Storage::Empty => write!(f, "DynObject(empty)"),
            Storage::Cell(c) if self.tag.is_float() => {
                write!(f, "DynObject({}:{})", self.tag.name, f32::from_bits(*c as u32))
            }
            Storage::Cell(c) => write!(f, "DynObject({}:{})", self.tag.name, c),
            Storage::Array { dims, data } => match self.to_text() {
                Some(text) if self.tag.is_string() => {
                    write!(f, "DynObject({}:{:?})", self.tag.name, text)
                }
                _ => write!(f, "DynObject({}:{:?}{:?})", self.tag.name, dims, data),
            },
        }
    }
}

impl DynObject {
    /// Empty value tagged as a plain cell
    pub fn new() -> Self {
        Self {
            tag: tags::builtin(TAG_CELL),
            storage: Storage::Empty,
        }
    }

    pub fn from_cell(value: Cell, tag: TagPtr) -> Self {
        Self {
            tag,
            storage: Storage::Cell(value),
        }
    }

    pub fn from_int(value: Cell) -> Self {
        Self::from_cell(value, tags::builtin(TAG_CELL))
    }

    pub fn from_bool(value: bool) -> Self {
        Self::from_cell(value as Cell, tags::builtin(TAG_BOOL))
    }

    pub fn from_float(value: f32) -> Self {
        Self::from_cell(value.to_bits() as Cell, tags::builtin(TAG_FLOAT))
    }

    /// One-dimensional array
    pub fn from_array(data: &[Cell], tag: TagPtr) -> Self {
        Self {
            tag,
            storage: Storage::Array {
                dims: Box::new([data.len()]),
                data: data.into(),
            },
        }
    }

    /// N-dimensional array in row-major order
    ///
    /// Fails if `dims` is empty or its product differs from `data.len()`.
    pub fn from_array_md(data: &[Cell], dims: &[usize], tag: TagPtr) -> Result<Self, ValueError> {
        if dims.is_empty() {
            return Err(ValueError::RankMismatch);
        }
        let total = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(ValueError::OutOfRange)?;
        if total != data.len() {
            return Err(ValueError::OutOfRange);
        }
        Ok(Self {
            tag,
            storage: Storage::Array {
                dims: dims.into(),
                data: data.into(),
            },
        })
    }

    /// Zero-filled one-dimensional array
    pub fn from_buffer(size: usize, tag: TagPtr) -> Self {
        Self {
            tag,
            storage: Storage::Array {
                dims: Box::new([size]),
                data: vec![0; size].into_boxed_slice(),
            },
        }
    }

    /// String import; the terminator is implicit
    pub fn from_text(text: &str) -> Self {
        let data: Vec<Cell> = text.chars().map(|c| c as u32 as Cell).collect();
        Self::from_array(&data, tags::builtin(TAG_STRING))
    }

    /// String import from a null-terminated cell sequence
    pub fn from_terminated(cells: &[Cell]) -> Self {
        let len = cells.iter().position(|&c| c == 0).unwrap_or(cells.len());
        Self::from_array(&cells[..len], tags::builtin(TAG_STRING))
    }

    pub fn tag(&self) -> TagPtr {
        self.tag
    }

    /// 0 for scalars and empty values
    pub fn rank(&self) -> usize {
        match &self.storage {
            Storage::Array { dims, .. } => dims.len(),
            _ => 0,
        }
    }

    pub fn dims(&self) -> &[usize] {
        match &self.storage {
            Storage::Array { dims, .. } => dims,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.storage, Storage::Empty)
    }

    pub fn is_cell(&self) -> bool {
        matches!(self.storage, Storage::Cell(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.storage, Storage::Array { .. })
    }

    /// Flattened cell view (a scalar is a one-cell slice)
    pub fn cells(&self) -> &[Cell] {
        match &self.storage {
            Storage::Empty => &[],
            Storage::Cell(c) => std::slice::from_ref(c),
            Storage::Array { data, .. } => data,
        }
    }

    fn cells_mut(&mut self) -> &mut [Cell] {
        match &mut self.storage {
            Storage::Empty => &mut [],
            Storage::Cell(c) => std::slice::from_mut(c),
            Storage::Array { data, .. } => data,
        }
    }

    /// Flattened element count
    pub fn size(&self) -> usize {
        self.cells().len()
    }

    /// Element count of the sub-array addressed by `offsets`
    pub fn size_md(&self, offsets: &[Cell]) -> Result<usize, ValueError> {
        self.locate(offsets).map(|(_, len)| len)
    }

    /// Resolve a (possibly partial) offsets list to a flat `(start, len)` span
    fn locate(&self, offsets: &[Cell]) -> Result<(usize, usize), ValueError> {
        match &self.storage {
            Storage::Empty => Err(ValueError::Empty),
            Storage::Cell(_) => {
                if offsets.is_empty() {
                    Ok((0, 1))
                } else if offsets.iter().any(|&o| o < 0) {
                    Err(ValueError::OutOfRange)
                } else {
                    Err(ValueError::NotArray)
                }
            }
            Storage::Array { dims, .. } => {
                if offsets.len() > dims.len() {
                    return Err(ValueError::RankMismatch);
                }
                let mut start = 0usize;
                let mut span: usize = dims.iter().product();
                for (&offset, &extent) in offsets.iter().zip(dims.iter()) {
                    let offset = usize::try_from(offset).map_err(|_| ValueError::OutOfRange)?;
                    if offset >= extent {
                        return Err(ValueError::OutOfRange);
                    }
                    span /= extent;
                    start += offset * span;
                }
                Ok((start, span))
            }
        }
    }

    fn flat_offset(&self, offset: Cell) -> Result<usize, ValueError> {
        let index = usize::try_from(offset).map_err(|_| ValueError::OutOfRange)?;
        match &self.storage {
            Storage::Empty => Err(ValueError::Empty),
            Storage::Cell(_) if index == 0 => Ok(0),
            Storage::Cell(_) => Err(ValueError::NotArray),
            Storage::Array { data, .. } if index < data.len() => Ok(index),
            Storage::Array { .. } => Err(ValueError::OutOfRange),
        }
    }

    /// Read one cell; arrays of any rank are addressed flat
    pub fn get_cell(&self, offset: Cell) -> Result<Cell, ValueError> {
        let index = self.flat_offset(offset)?;
        Ok(self.cells()[index])
    }

    pub fn set_cell(&mut self, offset: Cell, value: Cell) -> Result<(), ValueError> {
        let index = self.flat_offset(offset)?;
        self.cells_mut()[index] = value;
        Ok(())
    }

    /// Read one cell by per-dimension offsets; the count must equal the rank
    pub fn get_cell_md(&self, offsets: &[Cell]) -> Result<Cell, ValueError> {
        if offsets.len() != self.rank() {
            return Err(if self.is_empty() {
                ValueError::Empty
            } else {
                ValueError::RankMismatch
            });
        }
        let (start, _) = self.locate(offsets)?;
        Ok(self.cells()[start])
    }

    pub fn set_cell_md(&mut self, offsets: &[Cell], value: Cell) -> Result<(), ValueError> {
        if offsets.len() != self.rank() {
            return Err(if self.is_empty() {
                ValueError::Empty
            } else {
                ValueError::RankMismatch
            });
        }
        let (start, _) = self.locate(offsets)?;
        self.cells_mut()[start] = value;
        Ok(())
    }

    /// Copy cells starting at a flat offset into `out`, clipped to what exists
    pub fn get_cells(&self, offset: Cell, out: &mut [Cell]) -> Result<usize, ValueError> {
        let start = usize::try_from(offset).map_err(|_| ValueError::OutOfRange)?;
        let cells = self.cells();
        if self.is_empty() {
            return Err(ValueError::Empty);
        }
        if start > cells.len() {
            return Err(ValueError::OutOfRange);
        }
        let count = out.len().min(cells.len() - start);
        out[..count].copy_from_slice(&cells[start..start + count]);
        Ok(count)
    }

    /// Overwrite cells starting at a flat offset, clipped to what exists
    pub fn set_cells(&mut self, offset: Cell, values: &[Cell]) -> Result<usize, ValueError> {
        let start = usize::try_from(offset).map_err(|_| ValueError::OutOfRange)?;
        if self.is_empty() {
            return Err(ValueError::Empty);
        }
        let cells = self.cells_mut();
        if start > cells.len() {
            return Err(ValueError::OutOfRange);
        }
        let count = values.len().min(cells.len() - start);
        cells[start..start + count].copy_from_slice(&values[..count]);
        Ok(count)
    }

    /// Copy the sub-array addressed by `offsets` into `out`
    pub fn get_cells_md(&self, offsets: &[Cell], out: &mut [Cell]) -> Result<usize, ValueError> {
        let (start, len) = self.locate(offsets)?;
        let count = out.len().min(len);
        out[..count].copy_from_slice(&self.cells()[start..start + count]);
        Ok(count)
    }

    /// Overwrite the sub-array addressed by `offsets`
    pub fn set_cells_md(&mut self, offsets: &[Cell], values: &[Cell]) -> Result<usize, ValueError> {
        let (start, len) = self.locate(offsets)?;
        let count = values.len().min(len);
        self.cells_mut()[start..start + count].copy_from_slice(&values[..count]);
        Ok(count)
    }

    /// Scalar float view
    pub fn as_float(&self) -> Option<f32> {
        match self.storage {
            Storage::Cell(c) if self.tag.is_float() => Some(f32::from_bits(c as u32)),
            _ => None,
        }
    }

    /// Text view of a one-dimensional array, stopping at the first null
    pub fn to_text(&self) -> Option<String> {
        match &self.storage {
            Storage::Array { dims, data } if dims.len() == 1 => Some(
                data.iter()
                    .take_while(|&&c| c != 0)
                    .map(|&c| char::from_u32(c as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Cells followed by the terminator, as the host expects strings
    pub fn to_terminated(&self) -> Vec<Cell> {
        let mut cells = self.cells().to_vec();
        cells.push(0);
        cells
    }

    /// Whether a value tagged `candidate` may be stored in this slot
    pub fn tag_assignable(&self, candidate: TagPtr) -> bool {
        self.tag.accepts(candidate)
    }

    /// Any non-zero cell
    pub fn is_truthy(&self) -> bool {
        if let Some(f) = self.as_float() {
            return f != 0.0;
        }
        self.cells().iter().any(|&c| c != 0)
    }

    /// Handles this value refers to in external registries
    ///
    /// The caller relinquishes them when it takes ownership of what a cursor
    /// pointed at. The value's own buffer is untouched, and a plain value
    /// reports nothing.
    pub fn release(&self) -> Vec<TrackedHandle> {
        match self.tag.handle_kind() {
            Some(kind) => self
                .cells()
                .iter()
                .filter(|&&c| c != 0)
                .map(|&handle| TrackedHandle { kind, handle })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Same shape and tag, new cells
    pub(crate) fn with_cells(&self, cells: Vec<Cell>) -> Self {
        let storage = match &self.storage {
            Storage::Empty => Storage::Empty,
            Storage::Cell(_) => Storage::Cell(cells.first().copied().unwrap_or(0)),
            Storage::Array { dims, .. } => Storage::Array {
                dims: dims.clone(),
                data: cells.into_boxed_slice(),
            },
        };
        Self {
            tag: self.tag,
            storage,
        }
    }

    /// Values whose tags share a top base and whose shapes line up
    pub(crate) fn compatible(&self, other: &DynObject) -> bool {
        self.tag.same_base(other.tag) && self.dims() == other.dims()
    }
}

fn float_eq(a: Cell, b: Cell) -> bool {
    let (a, b) = (f32::from_bits(a as u32), f32::from_bits(b as u32));
    a == b || (a.is_nan() && b.is_nan())
}

fn float_cmp(a: Cell, b: Cell) -> Option<Ordering> {
    let (a, b) = (f32::from_bits(a as u32), f32::from_bits(b as u32));
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Some(Ordering::Equal),
        (false, false) => a.partial_cmp(&b),
        _ => None,
    }
}

/// Bits that hash identically for every pair `float_eq` accepts
fn float_hash_bits(c: Cell) -> u32 {
    let f = f32::from_bits(c as u32);
    if f.is_nan() {
        f32::NAN.to_bits()
    } else if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

impl PartialEq for DynObject {
    fn eq(&self, other: &Self) -> bool {
        match (&self.storage, &other.storage) {
            (Storage::Empty, Storage::Empty) => true,
            (Storage::Empty, _) | (_, Storage::Empty) => false,
            _ => {
                if !self.compatible(other) || self.is_cell() != other.is_cell() {
                    return false;
                }
                if self.tag.is_float() {
                    self.cells()
                        .iter()
                        .zip(other.cells())
                        .all(|(&a, &b)| float_eq(a, b))
                } else {
                    self.cells() == other.cells()
                }
            }
        }
    }
}

impl Eq for DynObject {}

impl Hash for DynObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.storage {
            Storage::Empty => state.write_u8(0),
            _ => {
                state.write_u8(1);
                self.tag.find_top_base().uid.hash(state);
                self.dims().hash(state);
                if self.tag.is_float() {
                    for &c in self.cells() {
                        float_hash_bits(c).hash(state);
                    }
                } else {
                    self.cells().hash(state);
                }
            }
        }
    }
}

impl DynObject {
    /// Hash used by cursors and maps
    pub fn get_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialOrd for DynObject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.storage, &other.storage) {
            (Storage::Empty, Storage::Empty) => return Some(Ordering::Equal),
            (Storage::Empty, _) | (_, Storage::Empty) => return None,
            _ => {}
        }
        if !self.tag.same_base(other.tag) || self.rank() != other.rank() {
            return None;
        }
        // Multi-dimensional arrays only order against the same shape
        if self.rank() > 1 && self.dims() != other.dims() {
            return None;
        }
        let float = self.tag.is_float();
        for (&a, &b) in self.cells().iter().zip(other.cells()) {
            let ord = if float { float_cmp(a, b)? } else { a.cmp(&b) };
            if ord != Ordering::Equal {
                return Some(ord);
            }
        }
        Some(self.size().cmp(&other.size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{TAG_CHAR, TAG_LIST, builtin, register_tag};

    fn hash_of(v: &DynObject) -> u64 {
        v.get_hash()
    }

    #[test]
    fn test_scalar_access() {
        let mut v = DynObject::from_int(42);
        assert_eq!(v.rank(), 0);
        assert_eq!(v.size(), 1);
        assert_eq!(v.get_cell(0), Ok(42));
        assert_eq!(v.get_cell(1), Err(ValueError::NotArray));
        assert_eq!(v.get_cell(-1), Err(ValueError::OutOfRange));
        v.set_cell(0, 7).unwrap();
        assert_eq!(v.get_cell(0), Ok(7));
        assert_eq!(v.get_cell_md(&[]), Ok(7));
    }

    #[test]
    fn test_array_bounds() {
        let mut v = DynObject::from_array(&[1, 2, 3], builtin(TAG_CELL));
        assert_eq!(v.get_cell(2), Ok(3));
        assert_eq!(v.get_cell(3), Err(ValueError::OutOfRange));
        assert_eq!(v.set_cell(3, 9), Err(ValueError::OutOfRange));
        assert_eq!(v.cells(), &[1, 2, 3]);
    }

    #[test]
    fn test_multi_dimensional_access() {
        let data: Vec<Cell> = (0..6).collect();
        let mut v = DynObject::from_array_md(&data, &[2, 3], builtin(TAG_CELL)).unwrap();
        assert_eq!(v.rank(), 2);
        assert_eq!(v.get_cell_md(&[1, 2]), Ok(5));
        assert_eq!(v.get_cell_md(&[0, 1]), Ok(1));
        assert_eq!(v.get_cell_md(&[2, 0]), Err(ValueError::OutOfRange));
        assert_eq!(v.get_cell_md(&[0, 3]), Err(ValueError::OutOfRange));
        assert_eq!(v.get_cell_md(&[1]), Err(ValueError::RankMismatch));
        assert_eq!(v.get_cell_md(&[0, 0, 0]), Err(ValueError::RankMismatch));

        v.set_cell_md(&[1, 0], 30).unwrap();
        assert_eq!(v.get_cell(3), Ok(30));

        assert_eq!(v.size(), 6);
        assert_eq!(v.size_md(&[]), Ok(6));
        assert_eq!(v.size_md(&[1]), Ok(3));
        assert_eq!(v.size_md(&[1, 1]), Ok(1));
    }

    #[test]
    fn test_from_array_md_rejects_bad_shape() {
        assert!(DynObject::from_array_md(&[1, 2, 3], &[2, 2], builtin(TAG_CELL)).is_err());
        assert!(DynObject::from_array_md(&[1], &[], builtin(TAG_CELL)).is_err());
    }

    #[test]
    fn test_bulk_cells() {
        let mut v = DynObject::from_buffer(4, builtin(TAG_CELL));
        assert_eq!(v.set_cells(2, &[5, 6, 7]), Ok(2));
        assert_eq!(v.cells(), &[0, 0, 5, 6]);
        let mut out = [0; 8];
        assert_eq!(v.get_cells(1, &mut out), Ok(3));
        assert_eq!(&out[..3], &[0, 5, 6]);
        assert_eq!(v.set_cells(-1, &[1]), Err(ValueError::OutOfRange));

        let data: Vec<Cell> = (0..6).collect();
        let mut grid = DynObject::from_array_md(&data, &[2, 3], builtin(TAG_CELL)).unwrap();
        assert_eq!(grid.set_cells_md(&[1], &[9, 9, 9, 9]), Ok(3));
        assert_eq!(grid.cells(), &[0, 1, 2, 9, 9, 9]);
        let mut row = [0; 3];
        assert_eq!(grid.get_cells_md(&[0], &mut row), Ok(3));
        assert_eq!(row, [0, 1, 2]);
    }

    #[test]
    fn test_text_round_trip() {
        let v = DynObject::from_text("hello");
        assert!(v.tag().is_string());
        assert_eq!(v.size(), 5);
        assert_eq!(v.to_text().as_deref(), Some("hello"));
        assert_eq!(v.to_terminated().last(), Some(&0));

        let t = DynObject::from_terminated(&['h' as Cell, 'i' as Cell, 0, 'x' as Cell]);
        assert_eq!(t.to_text().as_deref(), Some("hi"));
    }

    #[test]
    fn test_clone_is_deep_and_take_empties() {
        let mut original = DynObject::from_array(&[1, 2], builtin(TAG_CELL));
        let copy = original.clone();
        original.set_cell(0, 100).unwrap();
        assert_eq!(copy.get_cell(0), Ok(1));

        let moved = std::mem::take(&mut original);
        assert!(original.is_empty());
        assert_eq!(moved.get_cell(0), Ok(100));
    }

    #[test]
    fn test_tag_assignable() {
        let slot = DynObject::from_array(&[1, 2, 3], builtin(TAG_CELL));
        assert!(slot.tag_assignable(builtin(TAG_CELL)));
        assert!(slot.tag_assignable(builtin(TAG_BOOL)));
        assert!(!slot.tag_assignable(builtin(TAG_STRING)));
        assert!(!slot.tag_assignable(builtin(TAG_FLOAT)));

        let float_slot = DynObject::from_float(1.0);
        assert!(float_slot.tag_assignable(builtin(TAG_FLOAT)));
        assert!(!float_slot.tag_assignable(builtin(TAG_CELL)));

        let base = register_tag("Shape", None);
        let derived = register_tag("Circle", Some(base));
        let shape_slot = DynObject::from_cell(0, base);
        assert!(shape_slot.tag_assignable(derived));
        assert!(!DynObject::from_cell(0, derived).tag_assignable(base));
    }

    #[test]
    fn test_equality_is_tag_aware() {
        assert_eq!(DynObject::from_int(1), DynObject::from_int(1));
        assert_ne!(DynObject::from_int(1), DynObject::from_int(2));
        assert_ne!(DynObject::from_int(1), DynObject::from_bool(true));
        assert_ne!(DynObject::from_int(1), DynObject::from_array(&[1], builtin(TAG_CELL)));
        assert_eq!(DynObject::new(), DynObject::new());
        assert_ne!(DynObject::new(), DynObject::from_int(0));
    }

    #[test]
    fn test_float_equality_and_hash() {
        let pos = DynObject::from_float(0.0);
        let neg = DynObject::from_float(-0.0);
        assert_eq!(pos, neg);
        assert_eq!(hash_of(&pos), hash_of(&neg));

        let nan1 = DynObject::from_float(f32::NAN);
        let nan2 = DynObject::from_cell(0x7fc0_0001, builtin(TAG_FLOAT));
        assert_eq!(nan1, nan2);
        assert_eq!(hash_of(&nan1), hash_of(&nan2));
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        let values = [
            DynObject::from_int(5),
            DynObject::from_int(5),
            DynObject::from_text("abc"),
            DynObject::from_text("abc"),
            DynObject::from_cell(5, register_tag("Inches", None)),
            DynObject::new(),
        ];
        for a in &values {
            for b in &values {
                if a == b {
                    assert_eq!(hash_of(a), hash_of(b), "{:?} == {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_ordering() {
        assert!(DynObject::from_int(1) < DynObject::from_int(2));
        assert!(DynObject::from_float(-1.5) < DynObject::from_float(0.25));
        assert!(DynObject::from_text("abc") < DynObject::from_text("abd"));
        assert!(DynObject::from_text("ab") < DynObject::from_text("abc"));

        let a = DynObject::from_int(1);
        let b = DynObject::from_text("a");
        assert!(!(a < b));
        assert!(!(a > b));
        assert!(!(a <= b));
        assert!(!(a >= b));
    }

    #[test]
    fn test_release_reports_handles_only_for_handle_tags() {
        let plain = DynObject::from_array(&[1, 2], builtin(TAG_CELL));
        assert!(plain.release().is_empty());

        let lists = DynObject::from_array(&[3, 0, 4], builtin(TAG_LIST));
        let released = lists.release();
        assert_eq!(
            released,
            vec![
                TrackedHandle { kind: HandleKind::List, handle: 3 },
                TrackedHandle { kind: HandleKind::List, handle: 4 },
            ]
        );
        // Release leaves the value intact
        assert_eq!(lists.cells(), &[3, 0, 4]);
    }

    #[test]
    fn test_truthiness() {
        assert!(!DynObject::from_int(0).is_truthy());
        assert!(DynObject::from_cell('a' as Cell, builtin(TAG_CHAR)).is_truthy());
        assert!(!DynObject::from_float(0.0).is_truthy());
        assert!(!DynObject::new().is_truthy());
    }
}
