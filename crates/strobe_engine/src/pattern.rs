//! Pattern recording: the builder accumulated during generation and the
//! frozen, comparable record stream it produces.

use std::fmt;

use serde::{Deserialize, Serialize};
use strobe_common::{ContentHash, PinDirection};

use crate::pin_set::PinSet;

/// The kind of a recorded operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Non-functional banner/comment marker.
    Section,
    /// A drive scheduled on a pin.
    Drive,
    /// One tester cycle.
    Cycle,
    /// A comparison of a pin against an expected value.
    Assert,
}

/// A recorded operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Op {
    /// Section marker carrying only a title.
    Section {
        /// Human-readable title.
        title: String,
    },
    /// Drive of `value` (already masked) onto `pin`.
    Drive {
        /// Pin name.
        pin: String,
        /// Masked drive value.
        value: u64,
    },
    /// One cycle boundary.
    Cycle,
    /// Comparison result.
    Assert {
        /// Pin name.
        pin: String,
        /// Expected value, masked to the pin width.
        expected: u64,
        /// Committed state at evaluation.
        actual: u64,
    },
}

impl Op {
    /// The record kind of this operation.
    pub fn kind(&self) -> RecordKind {
        match self {
            Op::Section { .. } => RecordKind::Section,
            Op::Drive { .. } => RecordKind::Drive,
            Op::Cycle => RecordKind::Cycle,
            Op::Assert { .. } => RecordKind::Assert,
        }
    }
}

/// One entry of a pattern: an operation stamped with the tester's cycle
/// count at the time it was recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Cycle count when the operation was recorded.
    pub cycle: u64,
    /// The operation.
    #[serde(flatten)]
    pub op: Op,
}

impl Record {
    /// The record kind.
    pub fn kind(&self) -> RecordKind {
        self.op.kind()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}  ", self.cycle)?;
        match &self.op {
            Op::Section { title } => write!(f, "// {title}"),
            Op::Drive { pin, value } => write!(f, "drive  {pin} = {value:#x}"),
            Op::Cycle => write!(f, "cycle"),
            Op::Assert {
                pin,
                expected,
                actual,
            } => {
                let status = if expected == actual { "pass" } else { "FAIL" };
                write!(
                    f,
                    "assert {pin} == {expected:#x} (got {actual:#x}) {status}"
                )
            }
        }
    }
}

/// A failed comparison, as exposed to the reporting layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Pin name.
    pub pin: String,
    /// Expected value, masked to the pin width.
    pub expected: u64,
    /// Committed state at evaluation.
    pub actual: u64,
    /// Cycle count when the comparison was recorded.
    pub cycle: u64,
}

/// Initial and final state of one pin across a pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSnapshot {
    /// Pin name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Direction.
    pub direction: PinDirection,
    /// Committed state when the pattern started.
    pub initial: u64,
    /// Drive left pending by whatever ran before the pattern started. It
    /// commits on the pattern's first cycle without a drive record of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carried_drive: Option<u64>,
    /// Committed state when the pattern was frozen.
    pub final_state: u64,
}

/// Accumulates records while a pattern is generated.
#[derive(Clone, Debug)]
pub struct PatternBuilder {
    name: String,
    start_cycle: u64,
    pins: Vec<PinSnapshot>,
    records: Vec<Record>,
}

impl PatternBuilder {
    /// Starts a pattern, snapshotting the committed pin state and any drive
    /// still pending from before the start.
    pub fn new(name: impl Into<String>, pins: &PinSet, start_cycle: u64) -> Self {
        let pins = pins
            .iter()
            .map(|p| PinSnapshot {
                name: p.name().to_string(),
                width: p.width(),
                direction: p.direction(),
                initial: p.current_state(),
                carried_drive: p.pending_drive(),
                final_state: p.current_state(),
            })
            .collect();
        Self {
            name: name.into(),
            start_cycle,
            pins,
            records: Vec::new(),
        }
    }

    /// Appends an operation stamped with `cycle`.
    pub fn record(&mut self, cycle: u64, op: Op) {
        self.records.push(Record { cycle, op });
    }

    /// The records so far.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Freezes the builder into an immutable [`Pattern`].
    pub fn finish(mut self, pins: &PinSet, end_cycle: u64) -> Pattern {
        for snap in &mut self.pins {
            if let Ok(pin) = pins.get(&snap.name) {
                snap.final_state = pin.current_state();
            }
        }
        let failures = self
            .records
            .iter()
            .filter_map(|r| match &r.op {
                Op::Assert {
                    pin,
                    expected,
                    actual,
                } if expected != actual => Some(AssertionFailure {
                    pin: pin.clone(),
                    expected: *expected,
                    actual: *actual,
                    cycle: r.cycle,
                }),
                _ => None,
            })
            .collect();
        Pattern {
            name: self.name,
            start_cycle: self.start_cycle,
            total_cycles: end_cycle.saturating_sub(self.start_cycle),
            pins: self.pins,
            records: self.records,
            failures,
        }
    }
}

/// How two patterns relate record-by-record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternComparison {
    /// Same records in the same order.
    Identical,
    /// First differing record index.
    Diverged {
        /// Index into both record lists.
        index: usize,
    },
    /// One record list is a strict prefix of the other.
    LengthMismatch {
        /// Record count of the left pattern.
        left: usize,
        /// Record count of the right pattern.
        right: usize,
    },
}

/// A frozen pattern: the ordered trace of one generation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    name: String,
    start_cycle: u64,
    total_cycles: u64,
    pins: Vec<PinSnapshot>,
    records: Vec<Record>,
    failures: Vec<AssertionFailure>,
}

impl Pattern {
    /// Pattern name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tester cycle count when the pattern started.
    pub fn start_cycle(&self) -> u64 {
        self.start_cycle
    }

    /// Cycles executed while this pattern was generated.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Ordered record list.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Per-pin initial and final state, in declaration order.
    pub fn pins(&self) -> &[PinSnapshot] {
        &self.pins
    }

    /// Committed state of `pin` when the pattern was frozen.
    pub fn final_state(&self, pin: &str) -> Option<u64> {
        self.pins
            .iter()
            .find(|p| p.name == pin)
            .map(|p| p.final_state)
    }

    /// Failed comparisons in recording order.
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Number of failed comparisons.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of comparisons, passed or failed.
    pub fn assertion_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.kind() == RecordKind::Assert)
            .count()
    }

    /// Returns `true` if no comparison failed.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// XXH3-128 over the rendered record stream.
    ///
    /// Cycle stamps are taken relative to the pattern start so the same
    /// script yields the same signature regardless of where in a tester
    /// session it ran.
    pub fn signature(&self) -> ContentHash {
        let mut text = String::new();
        for r in &self.records {
            let rel = Record {
                cycle: r.cycle.saturating_sub(self.start_cycle),
                op: r.op.clone(),
            };
            text.push_str(&rel.to_string());
            text.push('\n');
        }
        ContentHash::from_bytes(text.as_bytes())
    }

    /// Compares this pattern's records against `other`'s, with cycle stamps
    /// taken relative to each pattern's start.
    pub fn compare(&self, other: &Pattern) -> PatternComparison {
        let lhs = self
            .records
            .iter()
            .map(|r| (r.cycle.saturating_sub(self.start_cycle), &r.op));
        let rhs = other
            .records
            .iter()
            .map(|r| (r.cycle.saturating_sub(other.start_cycle), &r.op));
        if let Some(index) = lhs.zip(rhs).position(|(a, b)| a != b) {
            return PatternComparison::Diverged { index };
        }
        if self.records.len() != other.records.len() {
            return PatternComparison::LengthMismatch {
                left: self.records.len(),
                right: other.records.len(),
            };
        }
        PatternComparison::Identical
    }
}
