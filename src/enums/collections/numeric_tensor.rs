//! # **NumericTensor Module** - *Dtype-erased Tensor for Unified Signature Dispatch*
//!
//! NumericTensor unifies the four element types a caller can hand to the
//! operation façade into a single enum.
//!
//! ## Features
//! - direct variant access
//! - zero-cost unwrapping when the type is known
//! - simplifies function signatures by accepting `impl Into<NumericTensor>`
//! - centralises dtype dispatch and the `UnsupportedDtype` check
//! - preserves SIMD-aligned buffers across all variants.

use std::fmt::{Display, Formatter};

use crate::enums::dtype::DType;
use crate::structs::tensor::Tensor;

/// # NumericTensor
///
/// Unified numeric tensor container.
///
/// ## Purpose
/// The elementwise operations are defined for `Float32` and `Float64` only.
/// The integer variants exist so real integer data can travel through the
/// same entry points and be rejected with `UnsupportedDtype` before any
/// buffer is touched.
///
/// ## Usage
/// - Build one with `.into()` from any `Tensor<f32>`, `Tensor<f64>`,
///   `Tensor<i32>` or `Tensor<i64>`.
/// - Drill down with `.f32()`, `.f64()` (owned) or `.as_f32()`,
///   `.as_f64_mut()` etc. (borrowed), which return `None` on a dtype
///   mismatch rather than converting.
#[derive(PartialEq, Clone, Debug)]
pub enum NumericTensor {
    Float32(Tensor<f32>),
    Float64(Tensor<f64>),
    Int32(Tensor<i32>),
    Int64(Tensor<i64>),
}

impl NumericTensor {
    #[inline]
    pub fn dtype(&self) -> DType {
        match self {
            NumericTensor::Float32(_) => DType::Float32,
            NumericTensor::Float64(_) => DType::Float64,
            NumericTensor::Int32(_) => DType::Int32,
            NumericTensor::Int64(_) => DType::Int64,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        match self {
            NumericTensor::Float32(t) => t.shape(),
            NumericTensor::Float64(t) => t.shape(),
            NumericTensor::Int32(t) => t.shape(),
            NumericTensor::Int64(t) => t.shape(),
        }
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        match self {
            NumericTensor::Float32(t) => t.strides(),
            NumericTensor::Float64(t) => t.strides(),
            NumericTensor::Int32(t) => t.strides(),
            NumericTensor::Int64(t) => t.strides(),
        }
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            NumericTensor::Float32(t) => t.len(),
            NumericTensor::Float64(t) => t.len(),
            NumericTensor::Int32(t) => t.len(),
            NumericTensor::Int64(t) => t.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_contiguous(&self) -> bool {
        match self {
            NumericTensor::Float32(t) => t.is_contiguous(),
            NumericTensor::Float64(t) => t.is_contiguous(),
            NumericTensor::Int32(t) => t.is_contiguous(),
            NumericTensor::Int64(t) => t.is_contiguous(),
        }
    }

    /// Row-major copy, keeping the dtype.
    pub fn to_contiguous(&self) -> NumericTensor {
        match self {
            NumericTensor::Float32(t) => NumericTensor::Float32(t.to_contiguous()),
            NumericTensor::Float64(t) => NumericTensor::Float64(t.to_contiguous()),
            NumericTensor::Int32(t) => NumericTensor::Int32(t.to_contiguous()),
            NumericTensor::Int64(t) => NumericTensor::Int64(t.to_contiguous()),
        }
    }

    /// Unwraps a `Float32` tensor.
    pub fn f32(self) -> Option<Tensor<f32>> {
        match self {
            NumericTensor::Float32(t) => Some(t),
            _ => None,
        }
    }

    /// Unwraps a `Float64` tensor.
    pub fn f64(self) -> Option<Tensor<f64>> {
        match self {
            NumericTensor::Float64(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&Tensor<f32>> {
        match self {
            NumericTensor::Float32(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&Tensor<f64>> {
        match self {
            NumericTensor::Float64(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_f32_mut(&mut self) -> Option<&mut Tensor<f32>> {
        match self {
            NumericTensor::Float32(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_f64_mut(&mut self) -> Option<&mut Tensor<f64>> {
        match self {
            NumericTensor::Float64(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&Tensor<i32>> {
        match self {
            NumericTensor::Int32(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&Tensor<i64>> {
        match self {
            NumericTensor::Int64(t) => Some(t),
            _ => None,
        }
    }
}

macro_rules! impl_from_tensor {
    ($t:ty, $variant:ident) => {
        impl From<Tensor<$t>> for NumericTensor {
            #[inline]
            fn from(t: Tensor<$t>) -> Self {
                NumericTensor::$variant(t)
            }
        }
    };
}

impl_from_tensor!(f32, Float32);
impl_from_tensor!(f64, Float64);
impl_from_tensor!(i32, Int32);
impl_from_tensor!(i64, Int64);

impl Display for NumericTensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericTensor::Float32(t) => write!(f, "NumericTensor::Float32\n{}", t),
            NumericTensor::Float64(t) => write!(f, "NumericTensor::Float64\n{}", t),
            NumericTensor::Int32(t) => write!(f, "NumericTensor::Int32\n{}", t),
            NumericTensor::Int64(t) => write!(f, "NumericTensor::Int64\n{}", t),
        }
    }
}
