//! Shared helpers for the integration tests.

#![allow(dead_code)]

use simdops::{ElementwiseOps, InstructionSet, NumericTensor, Tensor, UnaryOp};

/// Absolute tolerance for `float32` comparisons.
pub const ATOL_F32: f64 = 1e-4;
/// Absolute tolerance for `float64` comparisons.
pub const ATOL_F64: f64 = 1e-6;
/// Relative slack added on top, as `numpy.allclose` does.
pub const RTOL: f64 = 1e-5;

/// `|a - b| <= atol + RTOL·|b|`; NaNs and equal infinities match.
pub fn close(a: f64, b: f64, atol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a == b {
        return true;
    }
    (a - b).abs() <= atol + RTOL * b.abs()
}

pub fn assert_all_close(got: &[f64], want: &[f64], atol: f64, context: &str) {
    assert_eq!(got.len(), want.len(), "{context}: length");
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        assert!(close(*g, *w, atol), "{context}: index {i}: got {g}, want {w}");
    }
}

/// Values of a float tensor widened to `f64`.
pub fn values(t: &NumericTensor) -> Vec<f64> {
    match t {
        NumericTensor::Float32(t) => t.as_slice().iter().map(|&v| v as f64).collect(),
        NumericTensor::Float64(t) => t.as_slice().to_vec(),
        other => panic!("not a float tensor: {}", other.dtype()),
    }
}

pub fn f32_tensor(values: &[f32]) -> NumericTensor {
    Tensor::from_slice(values).into()
}

pub fn f64_tensor(values: &[f64]) -> NumericTensor {
    Tensor::from_slice(values).into()
}

/// Runs `op` copy-out with `isa` forced.
pub fn run_on(isa: InstructionSet, op: UnaryOp, x: &NumericTensor) -> NumericTensor {
    ElementwiseOps::scoped(isa, |ops| ops.apply_copied(op, x))
        .unwrap()
        .unwrap()
}
