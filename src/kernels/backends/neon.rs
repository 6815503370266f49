//! aarch64 Advanced SIMD tier.

use crate::enums::instruction_set::InstructionSet;

lane_backend! {
    /// 128-bit NEON tier, 4 × f32 / 2 × f64.
    NeonBackend, NEON,
    isa: InstructionSet::Neon,
    feature: "neon",
    lanes: (4, 2),
    lower: super::scalar::SCALAR,
}
