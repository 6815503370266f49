use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, Num, NumCast, ToPrimitive};

use crate::enums::dtype::DType;
use crate::enums::unary_op::UnaryOp;
use crate::traits::backend::MathBackend;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Trait for types valid as tensor elements.
///
/// Useful when specifying `my_fn::<T: Numeric>() {}`.
///
/// Extends and constrains the *num-traits* `Num` implementation to fit the crate's type universe.
pub trait Numeric:
    Num + NumCast + Copy + Default + ToPrimitive + PartialEq + Debug + Display + Send + Sync + 'static
{
    /// Runtime tag for this element type.
    const DTYPE: DType;
}

impl Numeric for f32 {
    const DTYPE: DType = DType::Float32;
}
impl Numeric for f64 {
    const DTYPE: DType = DType::Float64;
}
impl Numeric for i32 {
    const DTYPE: DType = DType::Int32;
}
impl Numeric for i64 {
    const DTYPE: DType = DType::Int64;
}

/// Trait for the two float widths the kernels operate on.
///
/// Useful when specifying `my_fn::<T: Float>() {}`.
///
/// Extends the *num-traits* `Float` implementation with what the lane
/// approximations need per width: range-reduction constants for `exp`,
/// exponent-bit scaling, the `libm` entry points used by the scalar tier,
/// and the routing into the matching `MathBackend` method.
/// Sealed: only `f32` and `f64` implement it.
pub trait Float: Numeric + NumFloat + sealed::Sealed {
    /// High part of the Cody-Waite split of `ln 2`.
    const LN2_HI: Self;
    /// Low part of the Cody-Waite split of `ln 2`.
    const LN2_LO: Self;
    /// Lower clamp for `exp` arguments; below it the result flushes to zero.
    const EXP_MIN: Self;
    /// Upper clamp for `exp` arguments; at or above it the result overflows.
    const EXP_MAX: Self;
    /// `1.5 · 2^mantissa_bits`, adding and subtracting it rounds to an integer.
    const ROUND_MAGIC: Self;
    /// Taylor coefficients of `e^r` in ascending powers.
    const EXP_POLY: &'static [Self];

    /// Converts an `f64` literal to this width.
    fn lit(v: f64) -> Self;

    /// Computes `self · 2^k` for an integral `k` inside the clamped `exp`
    /// range by writing exponent bits. The scale is split in two factors so
    /// that both stay normal at the extremes.
    fn scale_by_pow2(self, k: Self) -> Self;

    fn libm_exp(self) -> Self;
    fn libm_erf(self) -> Self;
    fn libm_tanh(self) -> Self;

    /// Routes a flat in-place unary kernel to the width-specific backend entry.
    fn run_unary(backend: &dyn MathBackend, op: UnaryOp, data: &mut [Self]);

    /// Routes a flat in-place row softmax to the width-specific backend entry.
    fn run_softmax(backend: &dyn MathBackend, data: &mut [Self], row_len: usize);
}

impl Float for f32 {
    const LN2_HI: f32 = 6.931_457_5e-1;
    const LN2_LO: f32 = 1.428_606_8e-6;
    const EXP_MIN: f32 = -104.0;
    const EXP_MAX: f32 = 88.8;
    const ROUND_MAGIC: f32 = 12_582_912.0;
    const EXP_POLY: &'static [f32] = &[
        1.0,
        1.0,
        1.0 / 2.0,
        1.0 / 6.0,
        1.0 / 24.0,
        1.0 / 120.0,
        1.0 / 720.0,
        1.0 / 5040.0,
    ];

    #[inline(always)]
    fn lit(v: f64) -> f32 {
        v as f32
    }

    #[inline(always)]
    fn scale_by_pow2(self, k: f32) -> f32 {
        let n = k as i32;
        let n1 = n >> 1;
        let n2 = n - n1;
        let s1 = f32::from_bits(((n1 + 127) as u32) << 23);
        let s2 = f32::from_bits(((n2 + 127) as u32) << 23);
        self * s1 * s2
    }

    #[inline(always)]
    fn libm_exp(self) -> f32 {
        libm::expf(self)
    }

    #[inline(always)]
    fn libm_erf(self) -> f32 {
        libm::erff(self)
    }

    #[inline(always)]
    fn libm_tanh(self) -> f32 {
        libm::tanhf(self)
    }

    #[inline]
    fn run_unary(backend: &dyn MathBackend, op: UnaryOp, data: &mut [f32]) {
        backend.unary_f32(op, data)
    }

    #[inline]
    fn run_softmax(backend: &dyn MathBackend, data: &mut [f32], row_len: usize) {
        backend.softmax_f32(data, row_len)
    }
}

impl Float for f64 {
    const LN2_HI: f64 = 6.931_471_803_691_238_164_90e-1;
    const LN2_LO: f64 = 1.908_214_929_270_587_700_02e-10;
    const EXP_MIN: f64 = -745.2;
    const EXP_MAX: f64 = 709.9;
    const ROUND_MAGIC: f64 = 6_755_399_441_055_744.0;
    const EXP_POLY: &'static [f64] = &[
        1.0,
        1.0,
        1.0 / 2.0,
        1.0 / 6.0,
        1.0 / 24.0,
        1.0 / 120.0,
        1.0 / 720.0,
        1.0 / 5_040.0,
        1.0 / 40_320.0,
        1.0 / 362_880.0,
        1.0 / 3_628_800.0,
        1.0 / 39_916_800.0,
        1.0 / 479_001_600.0,
        1.0 / 6_227_020_800.0,
    ];

    #[inline(always)]
    fn lit(v: f64) -> f64 {
        v
    }

    #[inline(always)]
    fn scale_by_pow2(self, k: f64) -> f64 {
        let n = k as i64;
        let n1 = n >> 1;
        let n2 = n - n1;
        let s1 = f64::from_bits(((n1 + 1023) as u64) << 52);
        let s2 = f64::from_bits(((n2 + 1023) as u64) << 52);
        self * s1 * s2
    }

    #[inline(always)]
    fn libm_exp(self) -> f64 {
        libm::exp(self)
    }

    #[inline(always)]
    fn libm_erf(self) -> f64 {
        libm::erf(self)
    }

    #[inline(always)]
    fn libm_tanh(self) -> f64 {
        libm::tanh(self)
    }

    #[inline]
    fn run_unary(backend: &dyn MathBackend, op: UnaryOp, data: &mut [f64]) {
        backend.unary_f64(op, data)
    }

    #[inline]
    fn run_softmax(backend: &dyn MathBackend, data: &mut [f64], row_len: usize) {
        backend.softmax_f64(data, row_len)
    }
}
