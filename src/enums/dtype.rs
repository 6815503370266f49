//! # DType Enum Module
//!
//! Element-type tags carried by [`crate::NumericTensor`].

use std::fmt::{Display, Formatter};

/// Element type of a tensor buffer.
///
/// Only `Float32` and `Float64` are accepted by the elementwise operations.
/// The integer tags exist so that integer data can travel through the
/// same entry points and be rejected with
/// [`KernelError::UnsupportedDtype`](crate::KernelError::UnsupportedDtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Float32,
    Float64,
    Int32,
    Int64,
}

impl DType {
    /// Width of one element in bytes.
    #[inline]
    pub const fn size_of(self) -> usize {
        match self {
            DType::Float32 | DType::Int32 => 4,
            DType::Float64 | DType::Int64 => 8,
        }
    }

    /// True for the two widths the operations accept.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_widths() {
        assert!(DType::Float32.is_float());
        assert!(DType::Float64.is_float());
        assert!(!DType::Int32.is_float());
        assert!(!DType::Int64.is_float());
        assert_eq!(DType::Float32.size_of(), 4);
        assert_eq!(DType::Float64.size_of(), 8);
    }

    #[test]
    fn test_display() {
        assert_eq!(DType::Float64.to_string(), "float64");
        assert_eq!(DType::Int64.to_string(), "int64");
    }
}
