//! # **Capabilities Module** - *which tiers this host can run*
//!
//! [`probe`] reads the CPU feature flags and intersects them with the tiers
//! compiled into this build. [`capabilities`] caches the first probe for the
//! life of the process; every later read is lock-free.

use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;

use crate::enums::instruction_set::InstructionSet;
use crate::kernels::backends::compiled_backend;

/// Set of usable instruction-set tiers. Always contains `Scalar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityReport {
    bits: u8,
}

impl CapabilityReport {
    /// Report holding only the portable baseline.
    pub const fn scalar_only() -> Self {
        Self {
            bits: InstructionSet::Scalar.bit(),
        }
    }

    pub(crate) fn insert(&mut self, isa: InstructionSet) {
        self.bits |= isa.bit();
    }

    #[inline]
    pub fn contains(&self, isa: InstructionSet) -> bool {
        self.bits & isa.bit() != 0
    }

    /// Tiers in ascending capability order.
    pub fn iter(&self) -> impl Iterator<Item = InstructionSet> + '_ {
        InstructionSet::ALL
            .into_iter()
            .filter(move |isa| self.contains(*isa))
    }

    /// Strongest usable tier.
    pub fn best(&self) -> InstructionSet {
        self.iter().last().unwrap_or(InstructionSet::Scalar)
    }

    /// Strongest usable tier not above `ceiling`.
    pub fn best_at_or_below(&self, ceiling: InstructionSet) -> InstructionSet {
        self.iter()
            .filter(|isa| *isa <= ceiling)
            .last()
            .unwrap_or(InstructionSet::Scalar)
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Never true; `Scalar` is always present.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn to_vec(&self) -> Vec<InstructionSet> {
        self.iter().collect()
    }

    /// Tiers present in both reports, plus `Scalar`.
    pub fn intersection(&self, other: &CapabilityReport) -> CapabilityReport {
        Self {
            bits: (self.bits & other.bits) | InstructionSet::Scalar.bit(),
        }
    }
}

impl Default for CapabilityReport {
    fn default() -> Self {
        Self::scalar_only()
    }
}

impl FromIterator<InstructionSet> for CapabilityReport {
    fn from_iter<I: IntoIterator<Item = InstructionSet>>(iter: I) -> Self {
        let mut report = Self::scalar_only();
        for isa in iter {
            report.insert(isa);
        }
        report
    }
}

impl Display for CapabilityReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, isa) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", isa)?;
        }
        write!(f, "}}")
    }
}

/// True when the running CPU advertises `isa`.
fn cpu_supports(isa: InstructionSet) -> bool {
    match isa {
        InstructionSet::Scalar => true,
        #[cfg(target_arch = "aarch64")]
        InstructionSet::Neon => std::arch::is_aarch64_feature_detected!("neon"),
        #[cfg(target_arch = "x86_64")]
        InstructionSet::Sse2 => is_x86_feature_detected!("sse2"),
        #[cfg(target_arch = "x86_64")]
        InstructionSet::Avx => is_x86_feature_detected!("avx"),
        #[cfg(target_arch = "x86_64")]
        InstructionSet::Avx512F => is_x86_feature_detected!("avx512f"),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// Reads the CPU feature flags and reports every tier that is both
/// advertised by the CPU and compiled into this build.
///
/// Deterministic for a given machine and build. Never fails: hosts with no
/// recognised vector extension report `{scalar}`.
pub fn probe() -> CapabilityReport {
    InstructionSet::ALL
        .into_iter()
        .filter(|isa| cpu_supports(*isa) && compiled_backend(*isa).is_some())
        .collect()
}

static CAPABILITIES: Lazy<CapabilityReport> = Lazy::new(|| {
    let report = probe();
    tracing::info!(
        detected = %report,
        best = %report.best(),
        "instruction-set capabilities probed"
    );
    report
});

/// Process-wide capability report, probed once on first use.
#[inline]
pub fn capabilities() -> &'static CapabilityReport {
    &CAPABILITIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_is_deterministic_and_cached() {
        assert_eq!(probe(), probe());
        assert_eq!(*capabilities(), probe());
        assert!(std::ptr::eq(capabilities(), capabilities()));
    }

    #[test]
    fn test_scalar_always_present() {
        assert!(probe().contains(InstructionSet::Scalar));
        assert!(!probe().is_empty());
        assert_eq!(CapabilityReport::default().to_vec(), vec![InstructionSet::Scalar]);
    }

    #[test]
    fn test_reported_tiers_stay_in_native_family() {
        for isa in capabilities().iter() {
            assert!(isa.is_native_family(), "{isa}");
        }
    }

    #[test]
    fn test_best_and_ceiling() {
        let report: CapabilityReport =
            [InstructionSet::Sse2, InstructionSet::Avx].into_iter().collect();
        assert_eq!(report.len(), 3);
        assert_eq!(report.best(), InstructionSet::Avx);
        assert_eq!(
            report.best_at_or_below(InstructionSet::Avx512F),
            InstructionSet::Avx
        );
        assert_eq!(
            report.best_at_or_below(InstructionSet::Sse2),
            InstructionSet::Sse2
        );
        assert_eq!(
            report.best_at_or_below(InstructionSet::Neon),
            InstructionSet::Scalar
        );
    }

    #[test]
    fn test_iter_is_ascending_and_display() {
        let report: CapabilityReport = [InstructionSet::Avx512F, InstructionSet::Sse2]
            .into_iter()
            .collect();
        assert_eq!(
            report.to_vec(),
            vec![
                InstructionSet::Scalar,
                InstructionSet::Sse2,
                InstructionSet::Avx512F
            ]
        );
        assert_eq!(report.to_string(), "{scalar, sse2, avx512f}");
    }

    #[test]
    fn test_intersection_keeps_scalar() {
        let a: CapabilityReport = [InstructionSet::Avx].into_iter().collect();
        let b: CapabilityReport = [InstructionSet::Neon].into_iter().collect();
        assert_eq!(a.intersection(&b).to_vec(), vec![InstructionSet::Scalar]);
    }
}
