//! Arithmetic on dynamic values
//!
//! Operators are implemented for `&DynObject` and yield `Option<DynObject>`:
//! `None` is the empty result of a mismatched operation.
//!
//! # Compatibility
//!
//! Both operands must share a top base tag and the same shape (scalar with
//! scalar, or arrays with equal extents, applied elementwise). The result
//! takes the left operand's tag. Handle-carrying tags have no arithmetic.
//!
//! # Overflow Behavior
//!
//! Integer tags use **wrapping semantics**, like the host's cells:
//! - `add`: i32::MAX + 1 wraps to i32::MIN
//! - `div`: i32::MIN / -1 wraps to i32::MIN
//! - division or remainder by zero yields `None`
//!
//! `Float` cells use IEEE `f32` arithmetic. `String + String` concatenates;
//! no other operator applies to strings.

use crate::value::{Cell, DynObject, Storage};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

#[derive(Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

fn int_op(op: BinOp, a: Cell, b: Cell) -> Option<Cell> {
    match op {
        BinOp::Add => Some(a.wrapping_add(b)),
        BinOp::Sub => Some(a.wrapping_sub(b)),
        BinOp::Mul => Some(a.wrapping_mul(b)),
        BinOp::Div if b == 0 => None,
        BinOp::Div => Some(a.wrapping_div(b)),
        BinOp::Rem if b == 0 => None,
        BinOp::Rem => Some(a.wrapping_rem(b)),
    }
}

fn float_op(op: BinOp, a: Cell, b: Cell) -> Cell {
    let (a, b) = (f32::from_bits(a as u32), f32::from_bits(b as u32));
    let r = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Rem => a % b,
    };
    r.to_bits() as Cell
}

fn concat(a: &DynObject, b: &DynObject) -> Option<DynObject> {
    if a.rank() != 1 || b.rank() != 1 {
        return None;
    }
    let mut cells = Vec::with_capacity(a.size() + b.size());
    cells.extend_from_slice(a.cells());
    cells.extend_from_slice(b.cells());
    Some(DynObject::from_array(&cells, a.tag()))
}

fn binary(op: BinOp, a: &DynObject, b: &DynObject) -> Option<DynObject> {
    if a.is_empty() || b.is_empty() || !a.tag().same_base(b.tag()) {
        return None;
    }
    if a.tag().handle_kind().is_some() {
        return None;
    }
    if a.tag().is_string() {
        return match op {
            BinOp::Add => concat(a, b),
            _ => None,
        };
    }
    if a.dims() != b.dims() || a.is_cell() != b.is_cell() {
        return None;
    }
    let float = a.tag().is_float();
    let cells = a
        .cells()
        .iter()
        .zip(b.cells())
        .map(|(&x, &y)| {
            if float {
                Some(float_op(op, x, y))
            } else {
                int_op(op, x, y)
            }
        })
        .collect::<Option<Vec<Cell>>>()?;
    Some(a.with_cells(cells))
}

fn unary(
    value: &DynObject,
    int: impl Fn(Cell) -> Cell,
    float: impl Fn(f32) -> f32,
) -> Option<DynObject> {
    if matches!(value.storage, Storage::Empty)
        || value.tag().handle_kind().is_some()
        || value.tag().is_string()
    {
        return None;
    }
    let is_float = value.tag().is_float();
    let cells = value
        .cells()
        .iter()
        .map(|&c| {
            if is_float {
                float(f32::from_bits(c as u32)).to_bits() as Cell
            } else {
                int(c)
            }
        })
        .collect();
    Some(value.with_cells(cells))
}

impl Add for &DynObject {
    type Output = Option<DynObject>;
    fn add(self, rhs: Self) -> Option<DynObject> {
        binary(BinOp::Add, self, rhs)
    }
}

impl Sub for &DynObject {
    type Output = Option<DynObject>;
    fn sub(self, rhs: Self) -> Option<DynObject> {
        binary(BinOp::Sub, self, rhs)
    }
}

impl Mul for &DynObject {
    type Output = Option<DynObject>;
    fn mul(self, rhs: Self) -> Option<DynObject> {
        binary(BinOp::Mul, self, rhs)
    }
}

impl Div for &DynObject {
    type Output = Option<DynObject>;
    fn div(self, rhs: Self) -> Option<DynObject> {
        binary(BinOp::Div, self, rhs)
    }
}

impl Rem for &DynObject {
    type Output = Option<DynObject>;
    fn rem(self, rhs: Self) -> Option<DynObject> {
        binary(BinOp::Rem, self, rhs)
    }
}

impl Neg for &DynObject {
    type Output = Option<DynObject>;
    fn neg(self) -> Option<DynObject> {
        unary(self, Cell::wrapping_neg, |f| -f)
    }
}

impl DynObject {
    /// Successor: +1 per cell
    pub fn inc(&self) -> Option<DynObject> {
        unary(self, |c| c.wrapping_add(1), |f| f + 1.0)
    }

    /// Predecessor: -1 per cell
    pub fn dec(&self) -> Option<DynObject> {
        unary(self, |c| c.wrapping_sub(1), |f| f - 1.0)
    }

    /// `by` successors in one step, predecessors when negative
    ///
    /// Integer cells land where `by` repeated `inc`/`dec` calls would, wrapping
    /// included. Float cells add `by` once.
    pub fn offset(&self, by: i64) -> Option<DynObject> {
        // truncation is the wrap: only `by` mod 2^32 matters
        let delta = by as Cell;
        unary(self, |c| c.wrapping_add(delta), |f| f + by as f32)
    }
}

/// Operation a tag defines for its values, applied by [`DynObject::call_op`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Inc,
    Dec,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Not,
}

impl TagOp {
    /// Whether the operation needs a right-hand operand
    pub fn is_binary(self) -> bool {
        !matches!(self, TagOp::Neg | TagOp::Inc | TagOp::Dec | TagOp::Not)
    }
}

impl DynObject {
    /// Apply `op` with a right-hand operand taken from `args`
    ///
    /// The operand is the first argument cell, carried with this value's tag
    /// and spread over its shape. Comparisons and `Not` yield a `Bool`.
    /// `None` when a binary operation has no argument or the operation does
    /// not apply.
    pub fn call_op(&self, op: TagOp, args: &[Cell]) -> Option<DynObject> {
        let rhs = match (op.is_binary(), args.first()) {
            (false, _) => None,
            (true, Some(&arg)) if !self.is_empty() => Some(self.with_cells(vec![arg; self.size()])),
            (true, _) => return None,
        };
        let rhs = rhs.as_ref();
        match op {
            TagOp::Add => self + rhs?,
            TagOp::Sub => self - rhs?,
            TagOp::Mul => self * rhs?,
            TagOp::Div => self / rhs?,
            TagOp::Mod => self % rhs?,
            TagOp::Neg => -self,
            TagOp::Inc => self.inc(),
            TagOp::Dec => self.dec(),
            TagOp::Eq => Some(DynObject::from_bool(self == rhs?)),
            TagOp::Neq => Some(DynObject::from_bool(self != rhs?)),
            TagOp::Lt => Some(DynObject::from_bool(self < rhs?)),
            TagOp::Gt => Some(DynObject::from_bool(self > rhs?)),
            TagOp::Lte => Some(DynObject::from_bool(self <= rhs?)),
            TagOp::Gte => Some(DynObject::from_bool(self >= rhs?)),
            TagOp::Not => Some(DynObject::from_bool(!self.is_truthy())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{TAG_BOOL, TAG_CELL, TAG_LIST, builtin, register_tag};

    #[test]
    fn test_integer_arithmetic() {
        let a = DynObject::from_int(7);
        let b = DynObject::from_int(3);
        assert_eq!(&a + &b, Some(DynObject::from_int(10)));
        assert_eq!(&a - &b, Some(DynObject::from_int(4)));
        assert_eq!(&a * &b, Some(DynObject::from_int(21)));
        assert_eq!(&a / &b, Some(DynObject::from_int(2)));
        assert_eq!(&a % &b, Some(DynObject::from_int(1)));
        assert_eq!(-&a, Some(DynObject::from_int(-7)));
    }

    #[test]
    fn test_offset_matches_repeated_steps() {
        let v = DynObject::from_int(i32::MAX - 2);
        let mut stepped = v.clone();
        for _ in 0..5 {
            stepped = stepped.inc().unwrap();
        }
        assert_eq!(v.offset(5), Some(stepped));
        assert_eq!(
            DynObject::from_int(0).offset(-(1i64 << 31)),
            Some(DynObject::from_int(i32::MIN))
        );
        assert_eq!(
            DynObject::from_float(1.5).offset(-2),
            Some(DynObject::from_float(-0.5))
        );
        assert_eq!(DynObject::from_text("a").offset(1), None);
    }

    #[test]
    fn test_call_op() {
        let v = DynObject::from_int(7);
        assert_eq!(v.call_op(TagOp::Add, &[3]), Some(DynObject::from_int(10)));
        assert_eq!(v.call_op(TagOp::Mod, &[0]), None);
        assert_eq!(v.call_op(TagOp::Inc, &[]), Some(DynObject::from_int(8)));
        assert_eq!(v.call_op(TagOp::Gt, &[3]), Some(DynObject::from_bool(true)));
        assert_eq!(v.call_op(TagOp::Not, &[]), Some(DynObject::from_bool(false)));
        assert_eq!(v.call_op(TagOp::Sub, &[]), None);

        let arr = DynObject::from_array(&[1, 2], builtin(TAG_CELL));
        assert_eq!(
            arr.call_op(TagOp::Mul, &[3]),
            Some(DynObject::from_array(&[3, 6], builtin(TAG_CELL)))
        );

        let half = DynObject::from_float(0.5);
        let one = 1.0f32.to_bits() as Cell;
        assert_eq!(half.call_op(TagOp::Add, &[one]), Some(DynObject::from_float(1.5)));
        assert_eq!(DynObject::new().call_op(TagOp::Eq, &[0]), None);
    }

    #[test]
    fn test_wrapping() {
        let max = DynObject::from_int(i32::MAX);
        let one = DynObject::from_int(1);
        assert_eq!(&max + &one, Some(DynObject::from_int(i32::MIN)));

        let min = DynObject::from_int(i32::MIN);
        assert_eq!(&min / &DynObject::from_int(-1), Some(min.clone()));
        assert_eq!(min.dec(), Some(DynObject::from_int(i32::MAX)));
    }

    #[test]
    fn test_division_by_zero_is_empty() {
        let a = DynObject::from_int(5);
        let zero = DynObject::from_int(0);
        assert_eq!(&a / &zero, None);
        assert_eq!(&a % &zero, None);
    }

    #[test]
    fn test_float_arithmetic() {
        let a = DynObject::from_float(1.5);
        let b = DynObject::from_float(0.25);
        assert_eq!((&a + &b).and_then(|v| v.as_float()), Some(1.75));
        assert_eq!((&a / &b).and_then(|v| v.as_float()), Some(6.0));
        assert_eq!(a.inc().and_then(|v| v.as_float()), Some(2.5));
        let inf = &a / &DynObject::from_float(0.0);
        assert_eq!(inf.and_then(|v| v.as_float()), Some(f32::INFINITY));
    }

    #[test]
    fn test_mismatched_tags_are_empty() {
        let a = DynObject::from_int(1);
        assert_eq!(&a + &DynObject::from_float(1.0), None);
        assert_eq!(&a + &DynObject::from_bool(true), None);
        assert_eq!(&a + &DynObject::new(), None);
    }

    #[test]
    fn test_shape_rules() {
        let tag = builtin(TAG_CELL);
        let a = DynObject::from_array(&[1, 2, 3], tag);
        let b = DynObject::from_array(&[10, 20, 30], tag);
        assert_eq!(&a + &b, Some(DynObject::from_array(&[11, 22, 33], tag)));
        assert_eq!(&a + &DynObject::from_array(&[1, 2], tag), None);
        assert_eq!(&a + &DynObject::from_int(1), None);
    }

    #[test]
    fn test_string_concat() {
        let a = DynObject::from_text("foo");
        let b = DynObject::from_text("bar");
        let joined = (&a + &b).unwrap();
        assert_eq!(joined.to_text().as_deref(), Some("foobar"));
        assert_eq!(&a - &b, None);
        assert_eq!(a.inc(), None);
    }

    #[test]
    fn test_derived_tags_share_arithmetic() {
        let meters = register_tag("Meters", None);
        let km = register_tag("Kilometers", Some(meters));
        let a = DynObject::from_cell(2, meters);
        let b = DynObject::from_cell(3, km);
        let sum = (&a + &b).unwrap();
        assert_eq!(sum.get_cell(0), Ok(5));
        assert!(std::ptr::eq(sum.tag(), meters));
    }

    #[test]
    fn test_handles_have_no_arithmetic() {
        let a = DynObject::from_cell(1, builtin(TAG_LIST));
        assert_eq!(&a + &a, None);
        assert_eq!(a.inc(), None);
        // Weak tags still do arithmetic among themselves
        let t = DynObject::from_cell(1, builtin(TAG_BOOL));
        assert_eq!(t.inc().and_then(|v| v.get_cell(0).ok()), Some(2));
    }
}
