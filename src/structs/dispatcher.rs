//! # **Dispatcher Module** - *tier selection and scoped overrides*
//!
//! The [`Dispatcher`] owns the default backend, chosen once from the
//! capability report, and resolves forced tiers according to its
//! [`FallbackPolicy`].
//!
//! ## Overrides
//! Forcing a tier pushes its backend onto a **thread-local** stack and
//! returns an [`OverrideGuard`]. While the guard lives, every operation on
//! that thread runs on the forced backend; dropping it (normal exit, early
//! return, `?` or unwinding) pops back to exactly the previous state.
//! Guards nest LIFO and are `!Send`, so one thread's override never leaks
//! into another.
//!
//! ```
//! use simdops::{Dispatcher, InstructionSet, active_instruction_set};
//!
//! let dispatcher = Dispatcher::global();
//! let before = active_instruction_set();
//! {
//!     let guard = dispatcher.with_forced_tier(InstructionSet::Scalar).unwrap();
//!     assert_eq!(guard.instruction_set(), InstructionSet::Scalar);
//!     assert_eq!(active_instruction_set(), InstructionSet::Scalar);
//! }
//! assert_eq!(active_instruction_set(), before);
//! ```

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;

use once_cell::sync::Lazy;

use crate::enums::error::{KernelError, KernelResult};
use crate::enums::instruction_set::InstructionSet;
use crate::kernels::backends::{backend_for, scalar::SCALAR};
use crate::structs::capabilities::{CapabilityReport, capabilities};
use crate::structs::config::{DispatchConfig, FallbackPolicy};
use crate::traits::backend::MathBackend;

/// One pushed override, tagged with the token of the guard that owns it.
type Entry = (u64, &'static dyn MathBackend);

thread_local! {
    static OVERRIDES: RefCell<Vec<Entry>> = const { RefCell::new(Vec::new()) };
    static NEXT_TOKEN: Cell<u64> = const { Cell::new(0) };
}

static GLOBAL: Lazy<Dispatcher> = Lazy::new(|| {
    let dispatcher = Dispatcher::new(DispatchConfig::from_env());
    tracing::info!(
        default = %dispatcher.default_backend().instruction_set(),
        fallback = ?dispatcher.config().fallback,
        cap = ?dispatcher.config().max_instruction_set,
        "global dispatcher initialised"
    );
    dispatcher
});

/// Selects the backend every operation runs on.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
    capabilities: CapabilityReport,
    default: &'static dyn MathBackend,
}

impl Dispatcher {
    /// Dispatcher over the host's capability report.
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_capabilities(config, *capabilities())
    }

    /// Dispatcher restricted to `report`.
    ///
    /// The report is intersected with the host's, so a dispatcher can only
    /// ever be narrowed, never widened past what the CPU runs.
    pub fn with_capabilities(config: DispatchConfig, report: CapabilityReport) -> Self {
        let capabilities = report.intersection(capabilities());
        let tier = match config.max_instruction_set {
            Some(ceiling) => capabilities.best_at_or_below(ceiling),
            None => capabilities.best(),
        };
        let default = backend_for(tier).unwrap_or(&SCALAR);
        Self {
            config,
            capabilities,
            default,
        }
    }

    /// Process-wide dispatcher, configured from the environment on first use.
    pub fn global() -> &'static Dispatcher {
        &GLOBAL
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &CapabilityReport {
        &self.capabilities
    }

    /// Backend for the strongest permitted tier.
    pub fn default_backend(&self) -> &'static dyn MathBackend {
        self.default
    }

    /// Every usable tier, ascending.
    pub fn enumerate_supported(&self) -> Vec<InstructionSet> {
        self.capabilities.to_vec()
    }

    /// Backend that forcing `tier` would activate.
    ///
    /// Usable tiers resolve to themselves. Otherwise `Degrade` picks the
    /// strongest usable tier below `tier` and `Strict` fails.
    pub fn resolve(&self, tier: InstructionSet) -> KernelResult<&'static dyn MathBackend> {
        if self.capabilities.contains(tier) {
            if let Some(backend) = backend_for(tier) {
                return Ok(backend);
            }
        }
        match self.config.fallback {
            FallbackPolicy::Strict => Err(KernelError::UnsupportedInstructionSetRequested {
                requested: tier.name().to_string(),
                reason: format!("not usable on this host (usable: {})", self.capabilities),
            }),
            FallbackPolicy::Degrade => {
                let activated = self.capabilities.best_at_or_below(tier);
                tracing::info!(
                    requested = %tier,
                    activated = %activated,
                    "forced instruction set not usable, degrading"
                );
                Ok(backend_for(activated).unwrap_or(&SCALAR))
            }
        }
    }

    /// Innermost override on the calling thread, else the default backend.
    ///
    /// An override outside this dispatcher's capabilities runs on the
    /// strongest tier below it that the dispatcher permits.
    pub fn active_backend(&self) -> &'static dyn MathBackend {
        match innermost_override() {
            Some(backend) if self.capabilities.contains(backend.instruction_set()) => backend,
            Some(backend) => {
                let tier = self.capabilities.best_at_or_below(backend.instruction_set());
                backend_for(tier).unwrap_or(&SCALAR)
            }
            None => self.default,
        }
    }

    /// Forces `tier` on the calling thread until the guard is dropped.
    pub fn with_forced_tier(&self, tier: InstructionSet) -> KernelResult<OverrideGuard> {
        let backend = self.resolve(tier)?;
        let token = NEXT_TOKEN.with(|next| {
            let token = next.get();
            next.set(token.wrapping_add(1));
            token
        });
        let depth = OVERRIDES.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push((token, backend));
            stack.len() - 1
        });
        tracing::debug!(
            requested = %tier,
            activated = %backend.instruction_set(),
            depth,
            "instruction-set override entered"
        );
        Ok(OverrideGuard {
            depth,
            token,
            requested: tier,
            backend,
            _not_send: PhantomData,
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

fn innermost_override() -> Option<&'static dyn MathBackend> {
    OVERRIDES.with(|stack| stack.borrow().last().map(|&(_, backend)| backend))
}

/// Tier the calling thread currently runs operations on.
pub fn active_instruction_set() -> InstructionSet {
    Dispatcher::global().active_backend().instruction_set()
}

/// Number of overrides active on the calling thread.
pub fn override_depth() -> usize {
    OVERRIDES.with(|stack| stack.borrow().len())
}

/// Scope of one forced tier. Restores the previous state on drop.
///
/// Dropping an outer guard before an inner one also ends the inner scope.
/// A guard whose scope was already ended that way leaves the stack alone.
#[must_use = "the override ends when the guard is dropped"]
#[derive(Debug)]
pub struct OverrideGuard {
    depth: usize,
    token: u64,
    requested: InstructionSet,
    backend: &'static dyn MathBackend,
    _not_send: PhantomData<*const ()>,
}

impl OverrideGuard {
    /// Tier actually activated, after any degradation.
    pub fn instruction_set(&self) -> InstructionSet {
        self.backend.instruction_set()
    }

    /// Tier that was asked for.
    pub fn requested(&self) -> InstructionSet {
        self.requested
    }

    pub fn backend(&self) -> &'static dyn MathBackend {
        self.backend
    }

    /// Stack position of this override, 0 for the outermost.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = OVERRIDES.try_with(|stack| {
            if let Ok(mut stack) = stack.try_borrow_mut() {
                if stack.get(self.depth).is_some_and(|&(token, _)| token == self.token) {
                    stack.truncate(self.depth);
                }
            }
        });
        tracing::debug!(
            tier = %self.instruction_set(),
            depth = self.depth,
            "instruction-set override exited"
        );
    }
}
