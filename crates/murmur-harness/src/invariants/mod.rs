//! Session invariants for simulation runs.
//!
//! A scenario or property test freezes what each client shows (plus,
//! optionally, the reference room) into a [`SystemSnapshot`] and hands it
//! to an [`InvariantRegistry`]. Each registered [`Invariant`] inspects the
//! snapshot and reports at most one [`Violation`].
//!
//! ```ignore
//! let snapshot = SystemSnapshot::single(driver.snapshot(0, runtime.bridge()));
//! InvariantRegistry::standard().assert_all(&snapshot, "after rename");
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{EmptyViewWithoutSession, HandleIffIdentity, RosterConvergence, TranscriptAppendOnly};
pub use snapshot::{ClientSnapshot, RoomSnapshot, SystemSnapshot};

/// Outcome of one invariant check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which invariant.
    pub invariant: &'static str,
    /// What the snapshot showed.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property every snapshot must satisfy.
pub trait Invariant: Send + Sync {
    /// Short name used in violation reports.
    fn name(&self) -> &'static str;

    /// Inspect a snapshot.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Ordered set of invariants run together.
#[derive(Default)]
pub struct InvariantRegistry {
    checks: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// No invariants.
    pub fn new() -> Self {
        Self::default()
    }

    /// The session invariants: [`HandleIffIdentity`],
    /// [`EmptyViewWithoutSession`], [`TranscriptAppendOnly`] and
    /// [`RosterConvergence`].
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(HandleIffIdentity);
        registry.add(EmptyViewWithoutSession);
        registry.add(TranscriptAppendOnly);
        registry.add(RosterConvergence);
        registry
    }

    /// Register one more invariant.
    pub fn add(&mut self, invariant: impl Invariant + 'static) {
        self.checks.push(Box::new(invariant));
    }

    /// Run every invariant, collecting all violations.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> =
            self.checks.iter().filter_map(|check| check.check(state).err()).collect();
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Like [`Self::check_all`], but panics with every violation listed.
    #[allow(clippy::panic, reason = "test assertion helper")]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        let Err(violations) = self.check_all(state) else {
            return;
        };
        let report: String = violations.iter().map(|v| format!("\n  {v}")).collect();
        panic!("invariants broken {context}:{report}");
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
