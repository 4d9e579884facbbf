//! The explicit generation context.
//!
//! A [`Session`] borrows one DUT and one [`Tester`] for the duration of a
//! pattern and owns the [`PatternBuilder`] that records every operation
//! issued through it. There is no ambient "current tester" or "current DUT":
//! pattern scripts receive the session and call everything on it.

use crate::dut::{DataPort, Dut, PortRole};
use crate::error::EngineError;
use crate::pattern::{Op, Pattern, PatternBuilder};
use crate::pin::{Assertable, Drivable, Verdict};
use crate::tester::Tester;

/// Cycles `reset` is held high by [`Session::reset_device`].
pub const RESET_HOLD_CYCLES: u64 = 5;

/// A pattern being generated against one DUT and one tester.
pub struct Session<'a, D: ?Sized + 'a> {
    dut: &'a mut D,
    tester: &'a mut Tester,
    builder: PatternBuilder,
}

impl<'a, D: Dut + ?Sized> Session<'a, D> {
    /// Starts a pattern named `name`.
    pub fn new(name: impl Into<String>, dut: &'a mut D, tester: &'a mut Tester) -> Self {
        let builder = PatternBuilder::new(name, dut.pins(), tester.cycle_count());
        Self {
            dut,
            tester,
            builder,
        }
    }

    /// The device under test.
    pub fn dut(&self) -> &D {
        &*self.dut
    }

    /// Current tester cycle count.
    pub fn cycle_count(&self) -> u64 {
        self.tester.cycle_count()
    }

    /// Inserts a section marker.
    pub fn section(&mut self, title: impl Into<String>) {
        let cycle = self.tester.cycle_count();
        self.builder.record(
            cycle,
            Op::Section {
                title: title.into(),
            },
        );
    }

    /// Schedules `value` on `pin` for the next cycle.
    ///
    /// Accepts any integer type; the full `u64` range is drivable.
    pub fn drive(&mut self, pin: &str, value: impl Into<i128>) -> Result<(), EngineError> {
        let value = value.into();
        let strict = self.tester.strict_drive_width();
        let target = self.dut.pins_mut().get_mut(pin)?;
        if strict && value >= 0 && value > i128::from(target.mask()) {
            return Err(EngineError::Range {
                pin: pin.to_string(),
                value,
                width: target.width(),
            });
        }
        target.drive(value)?;
        let masked = value as u64 & target.mask();
        let cycle = self.tester.cycle_count();
        self.builder.record(
            cycle,
            Op::Drive {
                pin: pin.to_string(),
                value: masked,
            },
        );
        Ok(())
    }

    /// Advances one cycle and records any expectations it evaluated.
    pub fn cycle(&mut self) {
        let outcome = self.tester.cycle(self.dut.pins_mut());
        self.builder.record(outcome.cycle, Op::Cycle);
        self.record_verdicts(outcome.verdicts);
    }

    /// Advances `n` cycles.
    pub fn cycles(&mut self, n: u64) {
        for _ in 0..n {
            self.cycle();
        }
    }

    /// Compares `pin`'s committed state against `expected` now.
    ///
    /// A mismatch is recorded and returned as a failed [`Verdict`]; only
    /// structural problems (unknown or input-only pin) are errors.
    pub fn assert(&mut self, pin: &str, expected: u64) -> Result<Verdict, EngineError> {
        let verdict = self.dut.pins().get(pin)?.check(expected)?;
        self.record_verdicts(vec![(pin.to_string(), verdict)]);
        Ok(verdict)
    }

    /// Schedules a comparison for the evaluate phase of the next cycle.
    pub fn expect(&mut self, pin: &str, expected: u64) -> Result<(), EngineError> {
        self.tester.expect(self.dut.pins(), pin, expected)
    }

    /// Freezes the pattern.
    ///
    /// Expectations still pending are evaluated against the final committed
    /// state; pending drives stay pending on the DUT for whatever runs next.
    pub fn finish(mut self) -> Pattern {
        let leftover = self.tester.flush(self.dut.pins());
        self.record_verdicts(leftover);
        self.builder
            .finish(self.dut.pins(), self.tester.cycle_count())
    }

    /// Drops the pattern without freezing it.
    ///
    /// Expectations scheduled through this session are discarded so they
    /// cannot surface in whatever pattern runs next on the same tester.
    /// Pending drives stay on the DUT, as with [`Session::finish`].
    pub fn abandon(self) {
        self.tester.clear_pending();
    }

    fn record_verdicts(&mut self, verdicts: Vec<(String, Verdict)>) {
        let cycle = self.tester.cycle_count();
        for (pin, v) in verdicts {
            self.builder.record(
                cycle,
                Op::Assert {
                    pin,
                    expected: v.expected,
                    actual: v.actual,
                },
            );
        }
    }
}

impl<D: DataPort + ?Sized> Session<'_, D> {
    fn role(&self, role: PortRole) -> Result<String, EngineError> {
        self.dut.port_pin(role).map(str::to_string)
    }

    /// enable=1, cycle, data=`value`, cycle, enable=0.
    ///
    /// There is no trailing cycle: enable low stays pending until the next
    /// operation commits it.
    pub fn write_data(&mut self, value: u64) -> Result<(), EngineError> {
        let enable = self.role(PortRole::Enable)?;
        let data = self.role(PortRole::Data)?;
        self.drive(&enable, 1)?;
        self.cycle();
        self.drive(&data, value)?;
        self.cycle();
        self.drive(&enable, 0)
    }

    /// enable=1, cycle, assert data == `expected`, enable=0.
    ///
    /// The comparison sees the state committed by the enable cycle, so the
    /// data bus still holds whatever the last commit left on it.
    pub fn read_data(&mut self, expected: u64) -> Result<Verdict, EngineError> {
        let enable = self.role(PortRole::Enable)?;
        let data = self.role(PortRole::Data)?;
        self.drive(&enable, 1)?;
        self.cycle();
        let verdict = self.assert(&data, expected)?;
        self.drive(&enable, 0)?;
        Ok(verdict)
    }

    /// reset=1, five cycles, reset=0, one cycle.
    pub fn reset_device(&mut self) -> Result<(), EngineError> {
        let reset = self.role(PortRole::Reset)?;
        self.drive(&reset, 1)?;
        self.cycles(RESET_HOLD_CYCLES);
        self.drive(&reset, 0)?;
        self.cycle();
        Ok(())
    }

    /// clock=1, cycle, clock=0, cycle.
    pub fn pulse_clock(&mut self) -> Result<(), EngineError> {
        let clock = self.role(PortRole::Clock)?;
        self.drive(&clock, 1)?;
        self.cycle();
        self.drive(&clock, 0)?;
        self.cycle();
        Ok(())
    }
}
