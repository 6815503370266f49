//! # **Dispatch Configuration**
//!
//! Policy knobs for the [`Dispatcher`](crate::Dispatcher): what happens when a
//! forced tier is not usable, and an optional cap on the default tier.
//!
//! ## Environment
//! - `SIMDOPS_MAX_ISA`: tier name (`scalar`, `neon`, `sse2`, `avx`,
//!   `avx512f`) capping the default tier.
//! - `SIMDOPS_STRICT_ISA`: `1`, `true`, `yes` or `on` selects
//!   [`FallbackPolicy::Strict`].
//!
//! Unparseable values are logged at `warn` and ignored.

use crate::enums::instruction_set::InstructionSet;

pub const MAX_ISA_ENV: &str = "SIMDOPS_MAX_ISA";
pub const STRICT_ISA_ENV: &str = "SIMDOPS_STRICT_ISA";

/// What a forced tier does when the host cannot run it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FallbackPolicy {
    /// Activate the strongest usable tier below the requested one.
    #[default]
    Degrade,
    /// Fail with `UnsupportedInstructionSetRequested`.
    Strict,
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchConfig {
    pub fallback: FallbackPolicy,
    /// Caps the default tier. Forced tiers ignore it.
    pub max_instruction_set: Option<InstructionSet>,
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_max_instruction_set(mut self, isa: InstructionSet) -> Self {
        self.max_instruction_set = Some(isa);
        self
    }

    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_ISA_ENV) {
            match raw.parse::<InstructionSet>() {
                Ok(isa) => config.max_instruction_set = Some(isa),
                Err(err) => {
                    tracing::warn!(key = MAX_ISA_ENV, value = %raw, %err, "ignoring unparseable tier")
                }
            }
        }

        if let Some(raw) = lookup(STRICT_ISA_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.fallback = FallbackPolicy::Strict,
                "0" | "false" | "no" | "off" | "" => {}
                _ => tracing::warn!(key = STRICT_ISA_ENV, value = %raw, "ignoring unrecognised flag"),
            }
        }

        config
    }
}
