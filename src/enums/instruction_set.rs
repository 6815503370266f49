//! # InstructionSet Enum Module
//!
//! Names every binary code path the crate can be compiled with.
//!
//! The derived ordering is the capability ordering used for "best available"
//! selection and for degrading forced tiers. Within one architecture family
//! it is a strict chain (`Scalar < Sse2 < Avx < Avx512F` on x86_64,
//! `Scalar < Neon` on aarch64); `Scalar` is shared by every family and is
//! always usable.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::enums::error::KernelError;

/// One instruction-set tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum InstructionSet {
    /// Portable baseline, one element at a time through `libm`.
    Scalar = 0,
    /// ARM Advanced SIMD, 128-bit.
    Neon = 1,
    /// SSE2, 128-bit.
    Sse2 = 2,
    /// AVX, 256-bit.
    Avx = 3,
    /// AVX-512 Foundation, 512-bit.
    Avx512F = 4,
}

impl InstructionSet {
    /// Every tier in ascending capability order.
    pub const ALL: [InstructionSet; 5] = [
        InstructionSet::Scalar,
        InstructionSet::Neon,
        InstructionSet::Sse2,
        InstructionSet::Avx,
        InstructionSet::Avx512F,
    ];

    #[inline]
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn name(self) -> &'static str {
        match self {
            InstructionSet::Scalar => "scalar",
            InstructionSet::Neon => "neon",
            InstructionSet::Sse2 => "sse2",
            InstructionSet::Avx => "avx",
            InstructionSet::Avx512F => "avx512f",
        }
    }

    /// Register width in bytes. `Scalar` reports one `f64`.
    pub const fn vector_bytes(self) -> usize {
        match self {
            InstructionSet::Scalar => 8,
            InstructionSet::Neon | InstructionSet::Sse2 => 16,
            InstructionSet::Avx => 32,
            InstructionSet::Avx512F => 64,
        }
    }

    /// True when the tier belongs to the architecture this crate was built for.
    pub const fn is_native_family(self) -> bool {
        match self {
            InstructionSet::Scalar => true,
            InstructionSet::Neon => cfg!(target_arch = "aarch64"),
            InstructionSet::Sse2 | InstructionSet::Avx | InstructionSet::Avx512F => {
                cfg!(target_arch = "x86_64")
            }
        }
    }
}

impl Display for InstructionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InstructionSet {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(InstructionSet::Scalar),
            "neon" => Ok(InstructionSet::Neon),
            "sse2" | "sse" => Ok(InstructionSet::Sse2),
            "avx" => Ok(InstructionSet::Avx),
            "avx512f" | "avx512" => Ok(InstructionSet::Avx512F),
            _ => Err(KernelError::UnsupportedInstructionSetRequested {
                requested: s.to_string(),
                reason: "not a known instruction set".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_ascending() {
        let mut sorted = InstructionSet::ALL;
        sorted.sort();
        assert_eq!(sorted, InstructionSet::ALL);
        assert!(InstructionSet::Scalar < InstructionSet::Sse2);
        assert!(InstructionSet::Avx < InstructionSet::Avx512F);
    }

    #[test]
    fn test_parse_round_trips_names() {
        for isa in InstructionSet::ALL {
            assert_eq!(isa.name().parse::<InstructionSet>().unwrap(), isa);
        }
        assert_eq!(
            " AVX512 ".parse::<InstructionSet>().unwrap(),
            InstructionSet::Avx512F
        );
    }

    #[test]
    fn test_parse_unknown_is_rejected() {
        let err = "mmx".parse::<InstructionSet>().unwrap_err();
        assert!(matches!(
            err,
            KernelError::UnsupportedInstructionSetRequested { .. }
        ));
    }

    #[test]
    fn test_bits_are_distinct() {
        let mut seen = 0u8;
        for isa in InstructionSet::ALL {
            assert_eq!(seen & isa.bit(), 0);
            seen |= isa.bit();
        }
    }

    #[test]
    fn test_scalar_is_always_native() {
        assert!(InstructionSet::Scalar.is_native_family());
    }
}
