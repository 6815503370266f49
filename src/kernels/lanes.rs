//! # **Lane Drivers** - *fixed-width loops shared by every tier*
//!
//! Each driver walks a flat buffer in chunks of `N` elements through a
//! `[T; N]` register image. `N` is the tier's lane count, so once a driver
//! is inlined into a `#[target_feature]` body every chunk maps onto one
//! vector register. The scalar tier instantiates the same drivers with
//! `N = 1`.

use crate::enums::unary_op::UnaryOp;
use crate::kernels::approx::{self, Primitives};
use crate::traits::type_unions::Float;

/// Applies `f` to every whole `N`-chunk of `data`.
///
/// Returns the number of elements processed. The remainder
/// `data[body..]` is left for the caller.
#[inline(always)]
pub(crate) fn map<T: Float, const N: usize>(data: &mut [T], f: impl Fn(T) -> T) -> usize {
    let body = data.len() - data.len() % N;
    for chunk in data[..body].chunks_exact_mut(N) {
        let mut lane = [T::zero(); N];
        lane.copy_from_slice(chunk);
        for v in lane.iter_mut() {
            *v = f(*v);
        }
        chunk.copy_from_slice(&lane);
    }
    body
}

/// As [`map`], finishing the remainder with the same `f`.
#[inline(always)]
fn map_all<T: Float, const N: usize>(data: &mut [T], f: impl Fn(T) -> T) {
    let body = map::<T, N>(data, &f);
    for v in data[body..].iter_mut() {
        *v = f(*v);
    }
}

/// Runs `op` over every whole `N`-chunk of `data` and returns the number
/// of elements written.
#[inline(always)]
pub(crate) fn unary<P: Primitives, T: Float, const N: usize>(op: UnaryOp, data: &mut [T]) -> usize {
    match op {
        UnaryOp::Exp => map::<T, N>(data, P::exp::<T>),
        UnaryOp::Erf => map::<T, N>(data, P::erf::<T>),
        UnaryOp::Tanh => map::<T, N>(data, P::tanh::<T>),
        UnaryOp::Sigmoid => map::<T, N>(data, approx::sigmoid::<P, T>),
        UnaryOp::Gelu => map::<T, N>(data, approx::gelu::<P, T>),
        UnaryOp::GeluBackward => map::<T, N>(data, approx::gelu_backward::<P, T>),
        UnaryOp::Swish => map::<T, N>(data, approx::swish::<P, T>),
        UnaryOp::SwishBackward => map::<T, N>(data, approx::swish_backward::<P, T>),
        UnaryOp::NormalCdf => map::<T, N>(data, approx::normal_cdf::<P, T>),
        UnaryOp::NormalPdf => map::<T, N>(data, approx::normal_pdf::<P, T>),
    }
}

/// Maximum that propagates NaN from either side.
#[inline(always)]
fn nan_max<T: Float>(a: T, b: T) -> T {
    if a.is_nan() || a > b { a } else { b }
}

#[inline(always)]
pub(crate) fn reduce_max<T: Float, const N: usize>(row: &[T]) -> T {
    let body = row.len() - row.len() % N;
    let mut acc = [T::neg_infinity(); N];
    for chunk in row[..body].chunks_exact(N) {
        for (a, &v) in acc.iter_mut().zip(chunk) {
            *a = nan_max(*a, v);
        }
    }
    let mut m = T::neg_infinity();
    for &a in acc.iter().chain(&row[body..]) {
        m = nan_max(m, a);
    }
    m
}

#[inline(always)]
pub(crate) fn reduce_sum<T: Float, const N: usize>(row: &[T]) -> T {
    let body = row.len() - row.len() % N;
    let mut acc = [T::zero(); N];
    for chunk in row[..body].chunks_exact(N) {
        for (a, &v) in acc.iter_mut().zip(chunk) {
            *a = *a + v;
        }
    }
    let mut s = T::zero();
    for &a in acc.iter().chain(&row[body..]) {
        s = s + a;
    }
    s
}

/// Row softmax: subtract the row max, exponentiate, divide by the row sum.
///
/// Rows are `row_len` consecutive elements; a zero `row_len` is a no-op.
#[inline(always)]
pub(crate) fn softmax<P: Primitives, T: Float, const N: usize>(data: &mut [T], row_len: usize) {
    if row_len == 0 {
        return;
    }
    for row in data.chunks_exact_mut(row_len) {
        let max = reduce_max::<T, N>(row);
        map_all::<T, N>(row, |x| P::exp(x - max));
        let sum = reduce_sum::<T, N>(row);
        map_all::<T, N>(row, |x| x / sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::approx::{Libm, Polynomial};

    #[test]
    fn test_map_leaves_remainder() {
        let mut data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let body = map::<f32, 4>(&mut data, |x| x * 10.0);
        assert_eq!(body, 4);
        assert_eq!(data, [10.0, 20.0, 30.0, 40.0, 5.0, 6.0]);
    }

    #[test]
    fn test_unary_scalar_width_covers_everything() {
        let mut data = [0.0f64, 1.0, -1.0];
        let body = unary::<Libm, f64, 1>(UnaryOp::Exp, &mut data);
        assert_eq!(body, 3);
        assert_eq!(data[0], 1.0);
        assert!((data[1] - std::f64::consts::E).abs() < 1e-15);
    }

    #[test]
    fn test_reductions_include_remainder() {
        let row = [1.0f32, 9.0, 3.0, 4.0, 5.0, 11.0, 2.0];
        assert_eq!(reduce_max::<f32, 4>(&row), 11.0);
        assert_eq!(reduce_sum::<f32, 4>(&row), 35.0);
        assert_eq!(reduce_max::<f32, 8>(&row), 11.0);
        assert_eq!(reduce_max::<f32, 4>(&[]), f32::NEG_INFINITY);
    }

    #[test]
    fn test_reduce_max_propagates_nan() {
        let row = [1.0f64, f64::NAN, 3.0, 4.0, 5.0];
        assert!(reduce_max::<f64, 2>(&row).is_nan());
        let row = [1.0f64, 2.0, 3.0, 4.0, f64::NAN];
        assert!(reduce_max::<f64, 2>(&row).is_nan());
    }

    #[test]
    fn test_softmax_rows_are_independent() {
        let mut data = [1.0f32, 2.0, 3.0, 1000.0, 1000.0, 1000.0];
        softmax::<Polynomial, f32, 4>(&mut data, 3);
        let first: f32 = data[..3].iter().sum();
        assert!((first - 1.0).abs() < 1e-6);
        assert!(data[2] > data[1] && data[1] > data[0]);
        for v in &data[3..] {
            assert!((v - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_zero_row_len_is_noop() {
        let mut data: [f64; 0] = [];
        softmax::<Libm, f64, 1>(&mut data, 0);
        let mut data = [1.0f64];
        softmax::<Libm, f64, 1>(&mut data, 1);
        assert_eq!(data, [1.0]);
    }
}
