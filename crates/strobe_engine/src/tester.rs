//! The cycle engine: the single global clock of a pattern run.
//!
//! Each call to [`Tester::cycle`] runs two phases against the active DUT's
//! pin set:
//!
//! 1. **Commit**: every pending drive takes effect simultaneously.
//! 2. **Evaluate**: expectations scheduled for this cycle are compared
//!    against the post-commit state.
//!
//! and then advances `cycle_count` by exactly one. A cycle never fails:
//! mismatches come back as [`Verdict`]s for the caller to record.

use crate::error::EngineError;
use crate::pin::{Assertable, Verdict};
use crate::pin_set::PinSet;

/// A comparison scheduled for the evaluate phase of the next cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expectation {
    /// Pin to compare.
    pub pin: String,
    /// Expected value, unmasked.
    pub expected: u64,
}

/// What one call to [`Tester::cycle`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Index of the cycle that ran (the count before it advanced).
    pub cycle: u64,
    /// Verdicts of the expectations evaluated in this cycle, in scheduling order.
    pub verdicts: Vec<(String, Verdict)>,
}

/// The cycle engine.
#[derive(Clone, Debug, Default)]
pub struct Tester {
    cycle_count: u64,
    pending: Vec<Expectation>,
    strict_drive_width: bool,
}

impl Tester {
    /// Creates a tester at cycle 0 that masks over-wide drive values.
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, drives wider than the pin raise [`EngineError::Range`]
    /// instead of being masked.
    pub fn with_strict_drive_width(mut self, strict: bool) -> Self {
        self.strict_drive_width = strict;
        self
    }

    /// Whether over-wide drives are rejected.
    pub fn strict_drive_width(&self) -> bool {
        self.strict_drive_width
    }

    /// Number of cycles executed so far.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Expectations waiting for the next cycle.
    pub fn pending_expectations(&self) -> &[Expectation] {
        &self.pending
    }

    /// Schedules a comparison for the evaluate phase of the next cycle.
    ///
    /// The pin must exist and be assertable; both are checked now so that
    /// the cycle itself cannot fail.
    pub fn expect(&mut self, pins: &PinSet, pin: &str, expected: u64) -> Result<(), EngineError> {
        pins.get(pin)?.check(expected)?;
        self.pending.push(Expectation {
            pin: pin.to_string(),
            expected,
        });
        Ok(())
    }

    /// Runs one cycle: commit, evaluate, advance.
    pub fn cycle(&mut self, pins: &mut PinSet) -> CycleOutcome {
        pins.commit_all();
        let cycle = self.cycle_count;
        let verdicts = self.evaluate_pending(pins);
        self.cycle_count += 1;
        CycleOutcome { cycle, verdicts }
    }

    /// Discards every scheduled expectation without evaluating it.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Evaluates still-pending expectations against the current committed
    /// state without advancing the clock.
    pub fn flush(&mut self, pins: &PinSet) -> Vec<(String, Verdict)> {
        self.evaluate_pending(pins)
    }

    fn evaluate_pending(&mut self, pins: &PinSet) -> Vec<(String, Verdict)> {
        self.pending
            .drain(..)
            .filter_map(|e| {
                // Checked in `expect`; only a different pin set can miss here.
                let verdict = pins.get(&e.pin).ok()?.check(e.expected).ok()?;
                Some((e.pin, verdict))
            })
            .collect()
    }
}
