//! Cycle-accurate pin/pattern execution engine for the strobe ATE pattern
//! generator.
//!
//! A pattern is a deterministic stream of pin operations (drive a value,
//! advance one tester cycle, compare against an expected value) issued
//! against a model of the device under test. This crate defines what those
//! operations mean and records them into an immutable, comparable trace.
//!
//! # Architecture
//!
//! A [`Dut`] owns a fixed [`PinSet`]. The [`Tester`] is the only clock: each
//! [`Tester::cycle`] commits every pending drive at once, evaluates scheduled
//! expectations, and advances the cycle count by one. A [`Session`] ties one
//! DUT and one tester together for the length of a pattern and records every
//! operation into a [`PatternBuilder`], which [`Session::finish`] freezes
//! into a [`Pattern`]. Failed comparisons are data on the pattern, never
//! errors.
//!
//! # Usage
//!
//! ```
//! use strobe_engine::{library, SimpleDut, Tester};
//!
//! let mut dut = SimpleDut::new()?;
//! let mut tester = Tester::new();
//! let pattern = library::run(library::find("functional_test")?, &mut dut, &mut tester)?;
//! assert!(pattern.passed());
//! # Ok::<(), strobe_engine::EngineError>(())
//! ```
//!
//! # Modules
//!
//! - `error`: Structural error types
//! - `pin`: Pins, pin declarations, drive/assert capabilities
//! - `pin_set`: Name-addressable pin collection
//! - `dut`: Device models and the data-port role mapping
//! - `tester`: The cycle engine
//! - `session`: Explicit generation context and composite operations
//! - `pattern`: Record stream, builder, frozen pattern, comparison
//! - `library`: Built-in pattern scripts
//! - `waveform`: VCD output

#![warn(missing_docs)]

pub mod dut;
pub mod error;
pub mod library;
pub mod pattern;
pub mod pin;
pub mod pin_set;
pub mod session;
pub mod tester;
pub mod waveform;

pub use dut::{DataPort, DeclaredDut, Dut, PortMap, PortRole, SimpleDut};
pub use error::EngineError;
pub use library::{PatternDef, PatternFn};
pub use pattern::{
    AssertionFailure, Op, Pattern, PatternBuilder, PatternComparison, PinSnapshot, Record,
    RecordKind,
};
pub use pin::{Assertable, Drivable, Pin, PinDecl, Verdict};
pub use pin_set::{PinId, PinSet};
pub use session::Session;
pub use tester::{CycleOutcome, Expectation, Tester};
pub use waveform::{write_vcd, VcdRecorder, WaveformRecorder};
