//! Boxed value operations
//!
//! A variant handle names one `DynObject` in the runtime. Arithmetic
//! registers its result as a fresh local variant; comparisons and `var_not`
//! treat a dead handle as the empty value instead of failing.

use crate::error::{Result, RuntimeError};
use crate::registry::Handle;
use crate::runtime::{Runtime, busy, index_arg};
use dynval_core::{Cell, DynObject, TagOp, TagPtr, ValueError};

type BinaryOp = fn(&DynObject, &DynObject) -> Option<DynObject>;
type UnaryOp = fn(&DynObject) -> Option<DynObject>;
type Comparison = fn(&DynObject, &DynObject) -> bool;

impl Runtime {
    fn with_var<R>(&self, var: Handle, f: impl FnOnce(&DynObject) -> R) -> Result<R> {
        let var = self.variant(var)?;
        let var = var.try_borrow().map_err(|_| busy())?;
        Ok(f(&*var))
    }

    fn with_var_mut<R>(&self, var: Handle, f: impl FnOnce(&mut DynObject) -> R) -> Result<R> {
        let var = self.variant(var)?;
        let mut var = var.try_borrow_mut().map_err(|_| busy())?;
        Ok(f(&mut *var))
    }

    pub fn var_new(&mut self, value: DynObject) -> Result<Handle> {
        self.variant_from_dyn(value)
    }

    /// Zero-filled buffer of `size` cells
    pub fn var_new_buf(&mut self, size: Cell, tag: TagPtr) -> Result<Handle> {
        let size = index_arg(size, "buffer size")?;
        self.variant_from_dyn(DynObject::from_buffer(size, tag))
    }

    /// Copy of another variant (empty if `var` is dead)
    pub fn var_new_var(&mut self, var: Handle) -> Result<Handle> {
        let value = self.dyn_from_variant(var);
        self.variant_from_dyn(value)
    }

    pub fn var_valid(&self, var: Handle) -> bool {
        self.variants.contains(var)
    }

    pub fn var_acquire(&mut self, var: Handle) -> Result<Handle> {
        self.variants.acquire_ref(var)?;
        Ok(var)
    }

    pub fn var_release(&mut self, var: Handle) -> Result<Handle> {
        self.variants.release_ref(var)?;
        Ok(var)
    }

    /// Unregister the variant and give up whatever handles its value held
    pub fn var_delete(&mut self, var: Handle) -> Result<()> {
        let value = self.variants.remove(var)?;
        let held = value.try_borrow().map_err(|_| busy())?.release();
        self.release_tracked(&held);
        Ok(())
    }

    pub fn var_clone(&mut self, var: Handle) -> Result<Handle> {
        let value = self.with_var(var, DynObject::clone)?;
        self.variant_from_dyn(value)
    }

    /// Read one cell; no offsets reads the first cell
    pub fn var_get(&self, var: Handle, offsets: &[Cell]) -> Result<Cell> {
        self.with_var(var, |v| match offsets {
            [] => v.get_cell(0),
            offsets => v.get_cell_md(offsets),
        })?
        .map_err(RuntimeError::from)
    }

    /// Like [`Runtime::var_get`], failing unless the value's tag is acceptable to `tag`
    pub fn var_get_safe(&self, var: Handle, offsets: &[Cell], tag: TagPtr) -> Result<Cell> {
        if !self.with_var(var, |v| tag.accepts(v.tag()))? {
            return Err(RuntimeError::TypeMismatch);
        }
        self.var_get(var, offsets)
    }

    /// Copy cells from `offset` into `out`, returning how many were copied
    pub fn var_get_arr(&self, var: Handle, offset: Cell, out: &mut [Cell]) -> Result<usize> {
        self.with_var(var, |v| v.get_cells(offset, out))?
            .map_err(RuntimeError::from)
    }

    pub fn var_get_text(&self, var: Handle) -> Result<String> {
        self.with_var(var, |v| v.to_text())?
            .ok_or(RuntimeError::TypeMismatch)
    }

    /// Overwrite one cell of an array value
    pub fn var_set_cell(&mut self, var: Handle, offsets: &[Cell], value: Cell) -> Result<()> {
        self.with_var_mut(var, |v| {
            if !v.is_array() {
                return Err(ValueError::NotArray);
            }
            match offsets {
                [] => v.set_cell(0, value),
                offsets => v.set_cell_md(offsets, value),
            }
        })?
        .map_err(RuntimeError::from)
    }

    pub fn var_set_cell_safe(
        &mut self,
        var: Handle,
        offsets: &[Cell],
        value: Cell,
        tag: TagPtr,
    ) -> Result<()> {
        if !self.with_var(var, |v| v.tag_assignable(tag))? {
            return Err(RuntimeError::TypeMismatch);
        }
        self.var_set_cell(var, offsets, value)
    }

    pub fn var_tag(&self, var: Handle) -> Result<TagPtr> {
        self.with_var(var, |v| v.tag())
    }

    /// Cells below the position named by `offsets` (the whole value for none)
    pub fn var_sizeof(&self, var: Handle, offsets: &[Cell]) -> Result<usize> {
        self.with_var(var, |v| v.size_md(offsets))?
            .map_err(RuntimeError::from)
    }

    pub fn var_rank(&self, var: Handle) -> Result<usize> {
        self.with_var(var, |v| v.rank())
    }

    fn binary(&mut self, a: Handle, b: Handle, op: BinaryOp) -> Result<Option<Handle>> {
        let result = self.with_var(a, |x| self.with_var(b, |y| op(x, y)))??;
        result.map(|v| self.variant_from_dyn(v)).transpose()
    }

    fn unary(&mut self, a: Handle, op: UnaryOp) -> Result<Option<Handle>> {
        let result = self.with_var(a, op)?;
        result.map(|v| self.variant_from_dyn(v)).transpose()
    }

    /// Sum as a new variant; `None` when the operands do not combine
    pub fn var_add(&mut self, a: Handle, b: Handle) -> Result<Option<Handle>> {
        self.binary(a, b, |x, y| x + y)
    }

    pub fn var_sub(&mut self, a: Handle, b: Handle) -> Result<Option<Handle>> {
        self.binary(a, b, |x, y| x - y)
    }

    pub fn var_mul(&mut self, a: Handle, b: Handle) -> Result<Option<Handle>> {
        self.binary(a, b, |x, y| x * y)
    }

    pub fn var_div(&mut self, a: Handle, b: Handle) -> Result<Option<Handle>> {
        self.binary(a, b, |x, y| x / y)
    }

    pub fn var_mod(&mut self, a: Handle, b: Handle) -> Result<Option<Handle>> {
        self.binary(a, b, |x, y| x % y)
    }

    pub fn var_neg(&mut self, a: Handle) -> Result<Option<Handle>> {
        self.unary(a, |x| -x)
    }

    pub fn var_inc(&mut self, a: Handle) -> Result<Option<Handle>> {
        self.unary(a, DynObject::inc)
    }

    pub fn var_dec(&mut self, a: Handle) -> Result<Option<Handle>> {
        self.unary(a, DynObject::dec)
    }

    /// Apply a tag operation with `args` as the right-hand cells
    ///
    /// The result is registered as a new variant; `None` when the operation
    /// does not apply.
    pub fn var_call_op(&mut self, var: Handle, op: TagOp, args: &[Cell]) -> Result<Option<Handle>> {
        let result = self.with_var(var, |v| v.call_op(op, args))?;
        result.map(|v| self.variant_from_dyn(v)).transpose()
    }

    fn compare(&self, a: Handle, b: Handle, op: Comparison) -> bool {
        op(&self.dyn_from_variant(a), &self.dyn_from_variant(b))
    }

    pub fn var_eq(&self, a: Handle, b: Handle) -> bool {
        self.compare(a, b, |x, y| x == y)
    }

    pub fn var_neq(&self, a: Handle, b: Handle) -> bool {
        self.compare(a, b, |x, y| x != y)
    }

    pub fn var_lt(&self, a: Handle, b: Handle) -> bool {
        self.compare(a, b, |x, y| x < y)
    }

    pub fn var_gt(&self, a: Handle, b: Handle) -> bool {
        self.compare(a, b, |x, y| x > y)
    }

    pub fn var_lte(&self, a: Handle, b: Handle) -> bool {
        self.compare(a, b, |x, y| x <= y)
    }

    pub fn var_gte(&self, a: Handle, b: Handle) -> bool {
        self.compare(a, b, |x, y| x >= y)
    }

    /// Logical negation of the value's truthiness
    pub fn var_not(&self, a: Handle) -> bool {
        !self.dyn_from_variant(a).is_truthy()
    }
}
