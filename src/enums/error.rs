//! # Error Module - Custom *simdops* Error Type
//!
//! Defines the unified error type for every fallible call in the crate.
//!
//! ## Features
//! - Covers unsupported element types, shape mismatches, strided
//!   (non-contiguous) layouts and instruction-set requests that the
//!   dispatch policy cannot honour.
//! - Every variant is raised synchronously by the call that triggered it,
//!   before any element of a caller buffer has been written.

use thiserror::Error;

use crate::enums::dtype::DType;

/// Catch all error type for `simdops`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// The tensor's element type is not one of the two float widths.
    #[error("Unsupported dtype: '{op}' is defined for float32 and float64, found {dtype}.")]
    UnsupportedDtype { op: &'static str, dtype: DType },

    /// The shape is incompatible with the requested operation.
    #[error("Invalid shape {shape:?} for '{op}': {message}")]
    InvalidShape {
        op: &'static str,
        shape: Vec<usize>,
        message: String,
    },

    /// The layout cannot be iterated as one flat row-major buffer.
    #[error(
        "Non-contiguous buffer passed to '{op}' (shape {shape:?}, strides {strides:?}). \
         Call `to_contiguous()` first."
    )]
    NonContiguousBuffer {
        op: &'static str,
        shape: Vec<usize>,
        strides: Vec<usize>,
    },

    /// An override asked for a tier the dispatch policy will not activate.
    #[error("Unsupported instruction set requested: '{requested}': {reason}")]
    UnsupportedInstructionSetRequested { requested: String, reason: String },
}

/// Result alias used across the crate.
pub type KernelResult<T> = Result<T, KernelError>;
