//! # **ElementwiseOps Module** - *public operation surface*
//!
//! [`ElementwiseOps`] validates a tensor, looks up the backend for the
//! calling thread and runs one operation over the flat buffer.
//!
//! ## Contract
//! - Only `float32` and `float64` are accepted (`UnsupportedDtype`).
//! - Only row-major contiguous tensors are accepted (`NonContiguousBuffer`);
//!   call `to_contiguous()` first for strided views.
//! - `softmax` runs over the last axis and needs at least one
//!   (`InvalidShape`).
//! - Validation always completes before anything is written, so a failed
//!   in-place call leaves the tensor untouched.
//! - Output shape and dtype always equal the input's.
//!
//! ## Example
//! ```
//! use simdops::{ElementwiseOps, InstructionSet, NumericTensor, Tensor};
//!
//! let ops = ElementwiseOps::new();
//! let x: NumericTensor = Tensor::<f32>::from_slice(&[-1.0, 0.0, 1.0]).into();
//! let y = ops.gelu(&x).unwrap();
//! assert_eq!(y.shape(), x.shape());
//!
//! for isa in ElementwiseOps::instruction_sets() {
//!     let scope = ElementwiseOps::with_cpu_feature(isa).unwrap();
//!     assert_eq!(scope.instruction_set(), isa);
//!     let _ = scope.sigmoid(&x).unwrap();
//! }
//! ```

use std::ops::Deref;

use crate::enums::collections::numeric_tensor::NumericTensor;
use crate::enums::error::{KernelError, KernelResult};
use crate::enums::instruction_set::InstructionSet;
use crate::enums::unary_op::UnaryOp;
use crate::structs::dispatcher::{Dispatcher, OverrideGuard};
use crate::structs::tensor::Tensor;
use crate::traits::backend::MathBackend;
use crate::traits::type_unions::{Float, Numeric};

/// Operation set bound either to the calling thread's active backend or,
/// inside a [`CpuFeatureScope`], to one forced backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementwiseOps {
    pinned: Option<&'static dyn MathBackend>,
}

/// Result of a call carrying the `inplace` flag.
#[derive(Debug)]
pub enum Applied<'a> {
    /// The caller's tensor, overwritten.
    InPlace(&'a mut NumericTensor),
    /// A new tensor; the input is unchanged.
    Copied(NumericTensor),
}

impl Applied<'_> {
    pub fn is_inplace(&self) -> bool {
        matches!(self, Applied::InPlace(_))
    }

    /// Owned result, cloning when it aliases the input.
    pub fn into_owned(self) -> NumericTensor {
        match self {
            Applied::InPlace(t) => t.clone(),
            Applied::Copied(t) => t,
        }
    }
}

impl Deref for Applied<'_> {
    type Target = NumericTensor;

    fn deref(&self) -> &NumericTensor {
        match self {
            Applied::InPlace(t) => t,
            Applied::Copied(t) => t,
        }
    }
}

fn unsupported_dtype(op: &'static str, x: &NumericTensor) -> KernelError {
    KernelError::UnsupportedDtype {
        op,
        dtype: x.dtype(),
    }
}

fn ensure_contiguous<T: Numeric>(op: &'static str, t: &Tensor<T>) -> KernelResult<()> {
    if t.is_contiguous() {
        Ok(())
    } else {
        Err(KernelError::NonContiguousBuffer {
            op,
            shape: t.shape().to_vec(),
            strides: t.strides().to_vec(),
        })
    }
}

/// Dtype, then layout, then rank for softmax.
fn validate(op: &'static str, x: &NumericTensor, needs_axis: bool) -> KernelResult<()> {
    if !x.dtype().is_float() {
        return Err(unsupported_dtype(op, x));
    }
    if !x.is_contiguous() {
        return Err(KernelError::NonContiguousBuffer {
            op,
            shape: x.shape().to_vec(),
            strides: x.strides().to_vec(),
        });
    }
    if needs_axis && x.ndim() == 0 {
        return Err(softmax_rank_error(x.shape()));
    }
    Ok(())
}

fn softmax_rank_error(shape: &[usize]) -> KernelError {
    KernelError::InvalidShape {
        op: "softmax",
        shape: shape.to_vec(),
        message: "softmax needs at least one axis".to_string(),
    }
}

impl ElementwiseOps {
    /// Operation set following the calling thread's active backend.
    pub fn new() -> Self {
        Self { pinned: None }
    }

    /// Every tier usable on this host, ascending.
    pub fn instruction_sets() -> Vec<InstructionSet> {
        Dispatcher::global().enumerate_supported()
    }

    /// Forces `tier` on the calling thread for the life of the returned scope.
    ///
    /// Unusable tiers degrade to the strongest usable lower tier, or fail
    /// with `UnsupportedInstructionSetRequested` under the strict policy.
    /// The scope derefs to an operation set pinned to the activated backend.
    pub fn with_cpu_feature(tier: InstructionSet) -> KernelResult<CpuFeatureScope> {
        let guard = Dispatcher::global().with_forced_tier(tier)?;
        Ok(CpuFeatureScope {
            ops: ElementwiseOps {
                pinned: Some(guard.backend()),
            },
            guard,
        })
    }

    /// Runs `f` with `tier` forced, restoring the previous tier afterwards.
    pub fn scoped<R>(
        tier: InstructionSet,
        f: impl FnOnce(&ElementwiseOps) -> R,
    ) -> KernelResult<R> {
        let scope = Self::with_cpu_feature(tier)?;
        Ok(f(&scope))
    }

    /// Backend the next call will run on.
    pub fn backend(&self) -> &'static dyn MathBackend {
        match self.pinned {
            Some(backend) => backend,
            None => Dispatcher::global().active_backend(),
        }
    }

    pub fn instruction_set(&self) -> InstructionSet {
        self.backend().instruction_set()
    }

    /// Runs `op` over a typed tensor in place.
    pub fn apply_typed<'a, T: Float>(
        &self,
        op: UnaryOp,
        t: &'a mut Tensor<T>,
    ) -> KernelResult<&'a mut Tensor<T>> {
        ensure_contiguous(op.name(), t)?;
        T::run_unary(self.backend(), op, t.as_mut_slice());
        Ok(t)
    }

    /// Runs `op` in place, overwriting `x`.
    pub fn apply_inplace<'a>(
        &self,
        op: UnaryOp,
        x: &'a mut NumericTensor,
    ) -> KernelResult<&'a mut NumericTensor> {
        validate(op.name(), x, false)?;
        match &mut *x {
            NumericTensor::Float32(t) => {
                self.apply_typed(op, t)?;
            }
            NumericTensor::Float64(t) => {
                self.apply_typed(op, t)?;
            }
            other => return Err(unsupported_dtype(op.name(), other)),
        }
        Ok(x)
    }

    /// Runs `op` into a new tensor; `x` is left unchanged.
    pub fn apply_copied(&self, op: UnaryOp, x: &NumericTensor) -> KernelResult<NumericTensor> {
        validate(op.name(), x, false)?;
        let mut out = x.clone();
        self.apply_inplace(op, &mut out)?;
        Ok(out)
    }

    /// Runs `op` either in place or into a new tensor.
    pub fn apply<'a>(
        &self,
        op: UnaryOp,
        x: &'a mut NumericTensor,
        inplace: bool,
    ) -> KernelResult<Applied<'a>> {
        if inplace {
            self.apply_inplace(op, x).map(Applied::InPlace)
        } else {
            self.apply_copied(op, x).map(Applied::Copied)
        }
    }

    /// Softmax over the last axis of a typed tensor, in place.
    pub fn softmax_typed<'a, T: Float>(
        &self,
        t: &'a mut Tensor<T>,
    ) -> KernelResult<&'a mut Tensor<T>> {
        ensure_contiguous("softmax", t)?;
        let row_len = match t.shape().last() {
            Some(&n) => n,
            None => return Err(softmax_rank_error(t.shape())),
        };
        T::run_softmax(self.backend(), t.as_mut_slice(), row_len);
        Ok(t)
    }

    /// Softmax over the last axis, in place.
    pub fn softmax_inplace<'a>(
        &self,
        x: &'a mut NumericTensor,
    ) -> KernelResult<&'a mut NumericTensor> {
        validate("softmax", x, true)?;
        match &mut *x {
            NumericTensor::Float32(t) => {
                self.softmax_typed(t)?;
            }
            NumericTensor::Float64(t) => {
                self.softmax_typed(t)?;
            }
            other => return Err(unsupported_dtype("softmax", other)),
        }
        Ok(x)
    }

    /// Softmax over the last axis into a new tensor.
    ///
    /// Every row of the result sums to one. Rows are independent.
    pub fn softmax(&self, x: &NumericTensor) -> KernelResult<NumericTensor> {
        validate("softmax", x, true)?;
        let mut out = x.clone();
        self.softmax_inplace(&mut out)?;
        Ok(out)
    }

    /// Softmax either in place or into a new tensor.
    pub fn softmax_with<'a>(
        &self,
        x: &'a mut NumericTensor,
        inplace: bool,
    ) -> KernelResult<Applied<'a>> {
        if inplace {
            self.softmax_inplace(x).map(Applied::InPlace)
        } else {
            self.softmax(x).map(Applied::Copied)
        }
    }
}

macro_rules! named_ops {
    ($($(#[$doc:meta])* $name:ident, $inplace:ident => $op:expr;)*) => {
        impl ElementwiseOps {
            $(
                $(#[$doc])*
                pub fn $name(&self, x: &NumericTensor) -> KernelResult<NumericTensor> {
                    self.apply_copied($op, x)
                }

                #[doc = concat!("In-place form of [`ElementwiseOps::", stringify!($name), "`].")]
                pub fn $inplace<'a>(
                    &self,
                    x: &'a mut NumericTensor,
                ) -> KernelResult<&'a mut NumericTensor> {
                    self.apply_inplace($op, x)
                }
            )*
        }
    };
}

named_ops! {
    /// `e^x`
    exp, exp_inplace => UnaryOp::Exp;
    /// Gauss error function.
    erf, erf_inplace => UnaryOp::Erf;
    tanh, tanh_inplace => UnaryOp::Tanh;
    /// `1 / (1 + e^-x)`
    sigmoid, sigmoid_inplace => UnaryOp::Sigmoid;
    /// `x·Φ(x)`, with `Φ` the standard normal CDF.
    gelu, gelu_inplace => UnaryOp::Gelu;
    /// Derivative of GELU, `Φ(x) + x·φ(x)`.
    gelu_backward, gelu_backward_inplace => UnaryOp::GeluBackward;
    /// `x·σ(x)`
    swish, swish_inplace => UnaryOp::Swish;
    /// Derivative of Swish, `σ(x) + x·σ(x)·(1 - σ(x))`.
    swish_backward, swish_backward_inplace => UnaryOp::SwishBackward;
    /// Standard normal CDF `Φ(x)`.
    normal_cdf, normal_cdf_inplace => UnaryOp::NormalCdf;
    /// Standard normal PDF `φ(x)`.
    normal_pdf, normal_pdf_inplace => UnaryOp::NormalPdf;
}

/// Forced-tier scope returned by [`ElementwiseOps::with_cpu_feature`].
///
/// Derefs to an [`ElementwiseOps`] pinned to the activated backend. The
/// calling thread's previous tier is restored when the scope is dropped.
#[derive(Debug)]
pub struct CpuFeatureScope {
    ops: ElementwiseOps,
    guard: OverrideGuard,
}

impl CpuFeatureScope {
    /// Tier actually activated, after any degradation.
    pub fn instruction_set(&self) -> InstructionSet {
        self.guard.instruction_set()
    }

    pub fn requested(&self) -> InstructionSet {
        self.guard.requested()
    }

    pub fn ops(&self) -> &ElementwiseOps {
        &self.ops
    }
}

impl Deref for CpuFeatureScope {
    type Target = ElementwiseOps;

    fn deref(&self) -> &ElementwiseOps {
        &self.ops
    }
}
