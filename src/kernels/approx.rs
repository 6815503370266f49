//! # **Approximation Primitives** - *exp, erf and tanh per element*
//!
//! Two providers of the three transcendental primitives:
//! - [`Libm`] forwards to the `libm` crate and backs the scalar tier.
//! - [`Polynomial`] is branch-free (selects only), so once a lane driver is
//!   monomorphised inside a `#[target_feature]` body the compiler lowers it to
//!   the tier's vector instructions.
//!
//! Every composite operation (sigmoid, GELU, Swish, the normal CDF/PDF and
//! the gradients) is written once against [`Primitives`], so all tiers
//! share one formula per operation and only differ in how the primitives
//! are evaluated.

use std::f64::consts::{FRAC_1_SQRT_2, LOG2_E};

use crate::traits::type_unions::Float;

/// `1 / sqrt(2π)`
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

// Abramowitz & Stegun 7.1.26, |error| <= 1.5e-7.
const ERF_P: f64 = 0.327_591_1;
const ERF_A: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];

/// Elementwise transcendental primitives, generic over the float width.
pub(crate) trait Primitives {
    fn exp<T: Float>(x: T) -> T;
    fn erf<T: Float>(x: T) -> T;
    fn tanh<T: Float>(x: T) -> T;
}

/// Scalar `libm` primitives.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Libm;

impl Primitives for Libm {
    #[inline(always)]
    fn exp<T: Float>(x: T) -> T {
        x.libm_exp()
    }

    #[inline(always)]
    fn erf<T: Float>(x: T) -> T {
        x.libm_erf()
    }

    #[inline(always)]
    fn tanh<T: Float>(x: T) -> T {
        x.libm_tanh()
    }
}

/// Branch-free lane approximations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Polynomial;

impl Primitives for Polynomial {
    /// Cody-Waite reduction `x = k·ln2 + r`, Taylor polynomial in `r`,
    /// then `2^k` written into the exponent bits.
    #[inline(always)]
    fn exp<T: Float>(x: T) -> T {
        let xc = x.max(T::EXP_MIN).min(T::EXP_MAX);
        let k = (xc * T::lit(LOG2_E) + T::ROUND_MAGIC) - T::ROUND_MAGIC;
        let r = (xc - k * T::LN2_HI) - k * T::LN2_LO;

        let mut p = T::zero();
        for &c in T::EXP_POLY.iter().rev() {
            p = p * r + c;
        }
        let y = p.scale_by_pow2(k);

        if x.is_nan() {
            x
        } else if x < T::EXP_MIN {
            T::zero()
        } else {
            y
        }
    }

    #[inline(always)]
    fn erf<T: Float>(x: T) -> T {
        let a = x.abs();
        let t = T::one() / (T::one() + T::lit(ERF_P) * a);
        let mut poly = T::zero();
        for &c in ERF_A.iter().rev() {
            poly = (poly + T::lit(c)) * t;
        }
        let y = T::one() - poly * Self::exp(-(a * a));
        if x < T::zero() { -y } else { y }
    }

    #[inline(always)]
    fn tanh<T: Float>(x: T) -> T {
        let two = T::lit(2.0);
        let e = Self::exp(two * x.abs());
        let t = T::one() - two / (e + T::one());
        if x < T::zero() { -t } else { t }
    }
}

/// Replaces the result at `±∞`, where products like `∞·0` would yield NaN.
#[inline(always)]
fn saturate<T: Float>(x: T, y: T, at_neg_inf: T, at_pos_inf: T) -> T {
    if x == T::infinity() {
        at_pos_inf
    } else if x == T::neg_infinity() {
        at_neg_inf
    } else {
        y
    }
}

#[inline(always)]
pub(crate) fn sigmoid<P: Primitives, T: Float>(x: T) -> T {
    T::one() / (T::one() + P::exp(-x))
}

/// Standard normal CDF `Φ(x)`.
#[inline(always)]
pub(crate) fn normal_cdf<P: Primitives, T: Float>(x: T) -> T {
    T::lit(0.5) * (T::one() + P::erf(x * T::lit(FRAC_1_SQRT_2)))
}

/// Standard normal PDF `φ(x)`.
#[inline(always)]
pub(crate) fn normal_pdf<P: Primitives, T: Float>(x: T) -> T {
    T::lit(INV_SQRT_2PI) * P::exp(T::lit(-0.5) * x * x)
}

#[inline(always)]
pub(crate) fn gelu<P: Primitives, T: Float>(x: T) -> T {
    saturate(x, x * normal_cdf::<P, T>(x), T::zero(), x)
}

#[inline(always)]
pub(crate) fn gelu_backward<P: Primitives, T: Float>(x: T) -> T {
    let y = normal_cdf::<P, T>(x) + x * normal_pdf::<P, T>(x);
    saturate(x, y, T::zero(), T::one())
}

#[inline(always)]
pub(crate) fn swish<P: Primitives, T: Float>(x: T) -> T {
    saturate(x, x * sigmoid::<P, T>(x), T::zero(), x)
}

#[inline(always)]
pub(crate) fn swish_backward<P: Primitives, T: Float>(x: T) -> T {
    let s = sigmoid::<P, T>(x);
    let y = s + x * s * (T::one() - s);
    saturate(x, y, T::zero(), T::one())
}
