//! # **Tensor Module** - *Shaped, 64-byte aligned numeric buffer*
//!
//! `Tensor<T>` is the array type every elementwise operation consumes.
//!
//! ## Layout
//! - `data`: flat `Vec64<T>` storage, 64-byte aligned so every vector tier
//!   can stream full lanes from the first element.
//! - `shape`: logical extent per axis. An empty shape is a 0-dimensional
//!   (single value) tensor.
//! - `strides`: element step per axis into `data`. Freshly constructed
//!   tensors are row-major; [`Tensor::permuted`] and [`Tensor::transposed`]
//!   produce strided layouts over the same storage order.
//!
//! Operations only accept row-major contiguous tensors. Strided tensors
//! are rejected with `NonContiguousBuffer`; [`Tensor::to_contiguous`] is the
//! explicit materialisation step.

use std::fmt::{Display, Formatter};

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::{KernelError, KernelResult};
use crate::traits::type_unions::{Float, Numeric};

/// Maximum number of values shown by `Display`.
pub const MAX_PREVIEW: usize = 16;

/// N-dimensional numeric tensor with 64-byte SIMD alignment.
///
/// ### Usage Tips
/// Kernels never see the shape: once validated, the façade hands the flat
/// buffer straight to the active backend. When writing your own routines
/// on top of this type, prefer accepting `&[T]` / `&mut [T]` via
/// [`Tensor::as_slice`] and [`Tensor::as_mut_slice`].
#[repr(C, align(64))]
#[derive(PartialEq, Clone, Debug)]
pub struct Tensor<T> {
    /// Backing buffer for values.
    data: Vec64<T>,
    /// Logical extent per axis.
    shape: Vec<usize>,
    /// Element step per axis.
    strides: Vec<usize>,
}

/// Row-major strides for `shape`, in elements.
pub fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0usize; shape.len()];
    let mut step = 1usize;
    for (stride, &dim) in strides.iter_mut().zip(shape).rev() {
        *stride = step;
        step *= dim;
    }
    strides
}

/// Number of elements `shape` describes, or `InvalidShape` if it overflows `usize`.
fn element_count(op: &'static str, shape: &[usize]) -> KernelResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| KernelError::InvalidShape {
            op,
            shape: shape.to_vec(),
            message: "element count overflows usize".to_string(),
        })
}

impl<T: Numeric> Tensor<T> {
    /// Wraps `data` with `shape`, validating the element count.
    pub fn from_vec64(data: Vec64<T>, shape: &[usize]) -> KernelResult<Self> {
        let numel = element_count("from_vec64", shape)?;
        if numel != data.len() {
            return Err(KernelError::InvalidShape {
                op: "from_vec64",
                shape: shape.to_vec(),
                message: format!(
                    "shape holds {} elements but the buffer has {}",
                    numel,
                    data.len()
                ),
            });
        }
        Ok(Self {
            data,
            strides: row_major_strides(shape),
            shape: shape.to_vec(),
        })
    }

    /// Copies `data` into aligned storage with `shape`.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> KernelResult<Self> {
        Self::from_vec64(Vec64::from(data), shape)
    }

    /// One-dimensional tensor over a copy of `values`.
    pub fn from_slice(values: &[T]) -> Self {
        Self {
            data: Vec64::from(values),
            shape: vec![values.len()],
            strides: vec![1],
        }
    }

    /// Zero-dimensional tensor holding one value.
    pub fn scalar(value: T) -> Self {
        Self {
            data: Vec64::from(&[value][..]),
            shape: Vec::new(),
            strides: Vec::new(),
        }
    }

    /// Tensor of `shape` filled with zeros.
    pub fn zeros(shape: &[usize]) -> KernelResult<Self> {
        let numel = element_count("zeros", shape)?;
        let data: Vec64<T> = std::iter::repeat_n(T::zero(), numel).collect();
        Ok(Self {
            data,
            strides: row_major_strides(shape),
            shape: shape.to_vec(),
        })
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the strides are the row-major strides of the shape.
    ///
    /// Axes of extent 1 carry no stride constraint.
    pub fn is_contiguous(&self) -> bool {
        if self.data.is_empty() {
            return true;
        }
        let mut expected = 1usize;
        for (&dim, &stride) in self.shape.iter().zip(&self.strides).rev() {
            if dim != 1 && stride != expected {
                return false;
            }
            expected *= dim;
        }
        true
    }

    /// Backing storage in memory order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..]
    }

    /// Backing storage in memory order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..]
    }

    /// Value at a full multi-axis index, or `None` when out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0usize;
        for ((&i, &dim), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= dim {
                return None;
            }
            offset += i * stride;
        }
        self.as_slice().get(offset).copied()
    }

    /// Reinterprets a contiguous tensor with a new shape of equal size.
    pub fn reshape(self, shape: &[usize]) -> KernelResult<Self> {
        if !self.is_contiguous() {
            return Err(KernelError::NonContiguousBuffer {
                op: "reshape",
                shape: self.shape,
                strides: self.strides,
            });
        }
        Self::from_vec64(self.data, shape)
    }

    /// Reorders the axes without moving any element.
    ///
    /// `axes[i]` names the source axis that becomes axis `i`. The result
    /// shares the storage order of `self` and is in general strided.
    pub fn permuted(&self, axes: &[usize]) -> KernelResult<Self> {
        let ndim = self.ndim();
        let mut seen = vec![false; ndim];
        let valid = axes.len() == ndim
            && axes.iter().all(|&a| {
                if a >= ndim || seen[a] {
                    return false;
                }
                seen[a] = true;
                true
            });
        if !valid {
            return Err(KernelError::InvalidShape {
                op: "permuted",
                shape: self.shape.clone(),
                message: format!("{:?} is not a permutation of 0..{}", axes, ndim),
            });
        }
        Ok(Self {
            data: self.data.clone(),
            shape: axes.iter().map(|&a| self.shape[a]).collect(),
            strides: axes.iter().map(|&a| self.strides[a]).collect(),
        })
    }

    /// Reverses all axes.
    pub fn transposed(&self) -> KernelResult<Self> {
        let axes: Vec<usize> = (0..self.ndim()).rev().collect();
        self.permuted(&axes)
    }

    /// Values in logical row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        if self.is_contiguous() {
            return self.as_slice().to_vec();
        }
        let ndim = self.ndim();
        let data = self.as_slice();
        let mut out = Vec::with_capacity(data.len());
        let mut index = vec![0usize; ndim];
        for _ in 0..self.len() {
            let offset: usize = index
                .iter()
                .zip(&self.strides)
                .map(|(i, s)| i * s)
                .sum();
            out.push(data[offset]);
            for axis in (0..ndim).rev() {
                index[axis] += 1;
                if index[axis] < self.shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        out
    }

    /// Row-major copy of this tensor. Contiguous tensors are cloned as is.
    pub fn to_contiguous(&self) -> Self {
        if self.is_contiguous() {
            return self.clone();
        }
        Self {
            data: Vec64::from(self.to_vec()),
            strides: row_major_strides(&self.shape),
            shape: self.shape.clone(),
        }
    }
}

impl<T: Float> Tensor<T> {
    /// Evenly spaced values in `[start, stop)`, one-dimensional.
    ///
    /// The element count is `ceil((stop - start) / step)`. It is zero when
    /// that is negative, NaN, or too large for a `usize` (for example
    /// `arange(0.0, 1e30, 1.0)`), so the result is then an empty tensor.
    pub fn arange(start: T, stop: T, step: T) -> Self {
        let n = ((stop - start) / step).ceil().to_usize().unwrap_or(0);
        let data: Vec64<T> = (0..n).map(|i| start + T::lit(i as f64) * step).collect();
        Self {
            data,
            shape: vec![n],
            strides: vec![1],
        }
    }
}

impl<T> Display for Tensor<T>
where
    T: Numeric,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let values = self.to_vec();
        let len = values.len();

        writeln!(
            f,
            "Tensor {:?} [{} values] (dtype: {})",
            self.shape,
            len,
            T::DTYPE
        )?;

        write!(f, "[")?;
        for (i, v) in values.iter().take(MAX_PREVIEW).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        if len > MAX_PREVIEW {
            write!(f, ", … ({} total)", len)?;
        }
        write!(f, "]")
    }
}
