//! # **Backends** - *one `MathBackend` per instruction-set tier*
//!
//! Vector tiers are generated by [`lane_backend!`]: the lane drivers are
//! monomorphised at the tier's lane count inside `#[target_feature]`
//! bodies, whole chunks are processed there, and the remainder is handed
//! to the next lower tier (`Avx512F → Avx → Sse2 → Scalar`,
//! `Neon → Scalar`).
//!
//! Instances are only reachable through [`backend_for`], which checks the
//! tier against the cached capability report. That check is what makes
//! calling the `#[target_feature]` bodies sound.

use crate::enums::instruction_set::InstructionSet;
use crate::structs::capabilities::capabilities;
use crate::traits::backend::MathBackend;

/// Declares a vector tier backend.
macro_rules! lane_backend {
    (
        $(#[$meta:meta])*
        $name:ident, $instance:ident,
        isa: $isa:expr,
        feature: $feature:literal,
        lanes: ($n32:literal, $n64:literal),
        lower: $lower:expr $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub(crate) struct $name;

        pub(crate) static $instance: $name = $name;

        impl $name {
            #[target_feature(enable = $feature)]
            unsafe fn unary_body<T: $crate::traits::type_unions::Float, const N: usize>(
                op: $crate::enums::unary_op::UnaryOp,
                data: &mut [T],
            ) -> usize {
                $crate::kernels::lanes::unary::<$crate::kernels::approx::Polynomial, T, N>(op, data)
            }

            #[target_feature(enable = $feature)]
            unsafe fn softmax_body<T: $crate::traits::type_unions::Float, const N: usize>(
                data: &mut [T],
                row_len: usize,
            ) {
                $crate::kernels::lanes::softmax::<$crate::kernels::approx::Polynomial, T, N>(
                    data, row_len,
                )
            }
        }

        impl $crate::traits::backend::MathBackend for $name {
            fn instruction_set(&self) -> $crate::enums::instruction_set::InstructionSet {
                $isa
            }

            fn lanes(&self, dtype: $crate::enums::dtype::DType) -> usize {
                match dtype {
                    $crate::enums::dtype::DType::Float32 => $n32,
                    $crate::enums::dtype::DType::Float64 => $n64,
                    _ => 1,
                }
            }

            fn unary_f32(&self, op: $crate::enums::unary_op::UnaryOp, data: &mut [f32]) {
                // SAFETY: only reachable through `backend_for`, which checked the tier.
                let body = unsafe { Self::unary_body::<f32, $n32>(op, data) };
                $crate::traits::backend::MathBackend::unary_f32(&$lower, op, &mut data[body..]);
            }

            fn unary_f64(&self, op: $crate::enums::unary_op::UnaryOp, data: &mut [f64]) {
                // SAFETY: as above.
                let body = unsafe { Self::unary_body::<f64, $n64>(op, data) };
                $crate::traits::backend::MathBackend::unary_f64(&$lower, op, &mut data[body..]);
            }

            fn softmax_f32(&self, data: &mut [f32], row_len: usize) {
                // SAFETY: as above.
                unsafe { Self::softmax_body::<f32, $n32>(data, row_len) }
            }

            fn softmax_f64(&self, data: &mut [f64], row_len: usize) {
                // SAFETY: as above.
                unsafe { Self::softmax_body::<f64, $n64>(data, row_len) }
            }
        }
    };
}

pub(crate) mod scalar;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

/// The backend compiled into this build for `isa`, regardless of the host.
pub(crate) fn compiled_backend(isa: InstructionSet) -> Option<&'static dyn MathBackend> {
    match isa {
        InstructionSet::Scalar => Some(&scalar::SCALAR),
        #[cfg(target_arch = "aarch64")]
        InstructionSet::Neon => Some(&neon::NEON),
        #[cfg(target_arch = "x86_64")]
        InstructionSet::Sse2 => Some(&x86::SSE2),
        #[cfg(target_arch = "x86_64")]
        InstructionSet::Avx => Some(&x86::AVX),
        #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
        InstructionSet::Avx512F => Some(&x86::AVX512F),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Backend for `isa`, or `None` when the tier is not usable on this host.
pub fn backend_for(isa: InstructionSet) -> Option<&'static dyn MathBackend> {
    if capabilities().contains(isa) {
        compiled_backend(isa)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::dtype::DType;
    use crate::enums::unary_op::UnaryOp;

    #[test]
    fn test_scalar_is_always_available() {
        let backend = backend_for(InstructionSet::Scalar).unwrap();
        assert_eq!(backend.instruction_set(), InstructionSet::Scalar);
        assert_eq!(backend.lanes(DType::Float32), 1);
    }

    #[test]
    fn test_every_reported_tier_has_a_backend() {
        for isa in capabilities().iter() {
            let backend = backend_for(isa).unwrap();
            assert_eq!(backend.instruction_set(), isa);
            if isa != InstructionSet::Scalar {
                assert_eq!(backend.lanes(DType::Float32) * 4, isa.vector_bytes());
                assert_eq!(backend.lanes(DType::Float64) * 8, isa.vector_bytes());
            }
            assert_eq!(backend.lanes(DType::Int64), 1);
        }
    }

    #[test]
    fn test_unreported_tiers_are_withheld() {
        for isa in InstructionSet::ALL {
            assert_eq!(backend_for(isa).is_some(), capabilities().contains(isa));
        }
    }

    #[test]
    fn test_odd_lengths_cover_tail() {
        for isa in capabilities().iter() {
            let backend = backend_for(isa).unwrap();
            for len in [0usize, 1, 3, 5, 17, 33] {
                let mut data: Vec<f32> = (0..len).map(|i| i as f32 * 0.1).collect();
                backend.unary_f32(UnaryOp::Exp, &mut data);
                for (i, v) in data.iter().enumerate() {
                    let want = libm::expf(i as f32 * 0.1);
                    assert!((v - want).abs() < 1e-5 * want, "{isa} len {len} i {i}");
                }
            }
        }
    }
}
