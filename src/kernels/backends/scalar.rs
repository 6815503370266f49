//! Portable baseline tier, one element at a time through `libm`.

use crate::enums::dtype::DType;
use crate::enums::instruction_set::InstructionSet;
use crate::enums::unary_op::UnaryOp;
use crate::kernels::approx::Libm;
use crate::kernels::lanes;
use crate::traits::backend::MathBackend;

#[derive(Debug)]
pub(crate) struct ScalarBackend;

pub(crate) static SCALAR: ScalarBackend = ScalarBackend;

impl MathBackend for ScalarBackend {
    fn instruction_set(&self) -> InstructionSet {
        InstructionSet::Scalar
    }

    fn lanes(&self, _dtype: DType) -> usize {
        1
    }

    fn unary_f32(&self, op: UnaryOp, data: &mut [f32]) {
        lanes::unary::<Libm, f32, 1>(op, data);
    }

    fn unary_f64(&self, op: UnaryOp, data: &mut [f64]) {
        lanes::unary::<Libm, f64, 1>(op, data);
    }

    fn softmax_f32(&self, data: &mut [f32], row_len: usize) {
        lanes::softmax::<Libm, f32, 1>(data, row_len)
    }

    fn softmax_f64(&self, data: &mut [f64], row_len: usize) {
        lanes::softmax::<Libm, f64, 1>(data, row_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_matches_libm_exactly() {
        let xs: Vec<f64> = (-20..20).map(|i| i as f64 * 0.5).collect();
        let mut data = xs.clone();
        SCALAR.unary_f64(UnaryOp::Erf, &mut data);
        for (x, y) in xs.iter().zip(&data) {
            assert_eq!(*y, libm::erf(*x));
        }
    }

    #[test]
    fn test_scalar_softmax_two_rows() {
        let mut data = [0.0f32, 0.0, 1.0, 1.0];
        SCALAR.softmax_f32(&mut data, 2);
        assert_eq!(data, [0.5, 0.5, 0.5, 0.5]);
    }
}
