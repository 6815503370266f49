//! # MathBackend Trait Module
//!
//! The operation interface every instruction-set tier implements.
//!
//! Backends are selected by value (one `&'static` instance per tier) and
//! only ever handed out by [`crate::backend_for`] once the tier has been
//! reported usable on the running CPU. All entry points work in place over
//! flat, contiguous buffers; shape handling lives in the façade.

use std::fmt::Debug;

use crate::enums::dtype::DType;
use crate::enums::instruction_set::InstructionSet;
use crate::enums::unary_op::UnaryOp;

/// One complete implementation of the operation set, bound to one tier.
pub trait MathBackend: Debug + Send + Sync {
    /// The tier this backend was compiled for.
    fn instruction_set(&self) -> InstructionSet;

    /// Number of elements of `dtype` processed per vector step.
    ///
    /// Integer dtypes report `1`; no kernel accepts them.
    fn lanes(&self, dtype: DType) -> usize;

    /// Applies `op` to every element of `data`, overwriting it.
    fn unary_f32(&self, op: UnaryOp, data: &mut [f32]);

    /// Applies `op` to every element of `data`, overwriting it.
    fn unary_f64(&self, op: UnaryOp, data: &mut [f64]);

    /// Numerically stable softmax over consecutive rows of `row_len` elements.
    ///
    /// `data.len()` must be a multiple of `row_len`; a zero `row_len` is a no-op.
    fn softmax_f32(&self, data: &mut [f32], row_len: usize);

    /// Numerically stable softmax over consecutive rows of `row_len` elements.
    ///
    /// `data.len()` must be a multiple of `row_len`; a zero `row_len` is a no-op.
    fn softmax_f64(&self, data: &mut [f64], row_len: usize);
}
