//! Built-in pattern scripts.
//!
//! Each script is a plain function over a [`Session`] for any device with a
//! [`DataPort`]. [`run`] wraps one in a fresh session and returns the frozen
//! pattern.

use crate::dut::{DataPort, PortRole};
use crate::error::EngineError;
use crate::pattern::Pattern;
use crate::session::Session;
use crate::tester::Tester;

/// A pattern script.
pub type PatternFn = fn(&mut Session<'_, dyn DataPort>) -> Result<(), EngineError>;

/// A named entry in the pattern library.
#[derive(Clone, Copy)]
pub struct PatternDef {
    /// Pattern name, used for lookup and output file names.
    pub name: &'static str,
    /// One-line description for `strobe list`.
    pub description: &'static str,
    /// The script.
    pub generate: PatternFn,
}

impl std::fmt::Debug for PatternDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternDef")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Data bus values exercised by the round-trip test.
pub const DATA_PATTERNS: [u64; 6] = [0x00, 0xFF, 0xAA, 0x55, 0x0F, 0xF0];

/// Clock pulses issued by the clock test.
pub const CLOCK_TOGGLES: u64 = 20;

static PATTERNS: &[PatternDef] = &[
    PatternDef {
        name: "functional_test",
        description: "Reset, clock toggle, and data round-trip in one pattern",
        generate: functional_test,
    },
    PatternDef {
        name: "reset_sequence",
        description: "Hold reset for five cycles, then release",
        generate: reset_sequence,
    },
    PatternDef {
        name: "clock_toggle",
        description: "Toggle the clock pin twenty times",
        generate: clock_toggle,
    },
    PatternDef {
        name: "data_roundtrip",
        description: "Write then read back each data test value",
        generate: data_roundtrip,
    },
];

/// All registered patterns, in registration order.
pub fn all() -> &'static [PatternDef] {
    PATTERNS
}

/// Looks up a pattern by name.
pub fn find(name: &str) -> Result<&'static PatternDef, EngineError> {
    PATTERNS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| EngineError::UnknownPattern {
            name: name.to_string(),
        })
}

/// Runs `def` against `dut` on `tester` and freezes the result.
///
/// The tester's clock is shared across runs, so patterns generated back to
/// back continue from where the previous one stopped. A script that fails
/// leaves no scheduled expectations behind on the tester.
pub fn run<'a>(
    def: &PatternDef,
    dut: &'a mut dyn DataPort,
    tester: &'a mut Tester,
) -> Result<Pattern, EngineError> {
    let mut session = Session::new(def.name, dut, tester);
    match (def.generate)(&mut session) {
        Ok(()) => Ok(session.finish()),
        Err(e) => {
            session.abandon();
            Err(e)
        }
    }
}

fn reset_sequence(s: &mut Session<'_, dyn DataPort>) -> Result<(), EngineError> {
    s.section("--- Reset ---");
    s.reset_device()
}

fn clock_toggle(s: &mut Session<'_, dyn DataPort>) -> Result<(), EngineError> {
    s.section("--- Clock Test ---");
    // Resolve once so an unmapped clock fails before any cycle is spent.
    s.dut().port_pin(PortRole::Clock)?;
    for _ in 0..CLOCK_TOGGLES {
        s.pulse_clock()?;
    }
    Ok(())
}

fn data_roundtrip(s: &mut Session<'_, dyn DataPort>) -> Result<(), EngineError> {
    s.section("--- Data Pattern Test ---");
    for value in DATA_PATTERNS {
        s.write_data(value)?;
        s.read_data(value)?;
    }
    Ok(())
}

fn functional_test(s: &mut Session<'_, dyn DataPort>) -> Result<(), EngineError> {
    s.section("Functional Test Pattern");
    s.section("Testing basic device functionality");
    s.reset_device()?;
    clock_toggle(s)?;
    data_roundtrip(s)?;
    s.section("--- Functional Test Complete ---");
    Ok(())
}
