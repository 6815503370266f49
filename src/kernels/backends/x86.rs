//! x86_64 vector tiers.

use crate::enums::instruction_set::InstructionSet;

lane_backend! {
    /// 128-bit SSE2 tier, 4 × f32 / 2 × f64.
    Sse2Backend, SSE2,
    isa: InstructionSet::Sse2,
    feature: "sse2",
    lanes: (4, 2),
    lower: super::scalar::SCALAR,
}

lane_backend! {
    /// 256-bit AVX tier, 8 × f32 / 4 × f64.
    AvxBackend, AVX,
    isa: InstructionSet::Avx,
    feature: "avx",
    lanes: (8, 4),
    lower: SSE2,
}

#[cfg(feature = "avx512")]
lane_backend! {
    /// 512-bit AVX-512F tier, 16 × f32 / 8 × f64.
    Avx512FBackend, AVX512F,
    isa: InstructionSet::Avx512F,
    feature: "avx512f",
    lanes: (16, 8),
    lower: AVX,
}
