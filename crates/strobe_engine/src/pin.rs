//! Pins: named, fixed-width signal lines with committed and pending state.
//!
//! A [`Pin`] holds the value established by the last cycle commit
//! (`current_state`) and, between a drive and the next commit, the value that
//! will take effect (`pending_drive`). The two capabilities a pattern uses,
//! [`Drivable`] and [`Assertable`], are separate traits so device variants
//! can expose pins that support only one of them.

use serde::{Deserialize, Serialize};
use strobe_common::{fits_width, mask, PinDirection, MAX_PIN_WIDTH};

use crate::error::EngineError;

/// Declaration of a single pin, as supplied by the DUT model or configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDecl {
    /// Pin name, unique within its pin set (case-sensitive).
    pub name: String,
    /// Bit width, `1..=64`.
    pub width: u32,
    /// Direction, which decides the pin's capabilities.
    pub direction: PinDirection,
    /// Committed state at construction.
    pub initial: u64,
}

impl PinDecl {
    /// Declares a single-bit bidirectional pin that starts at 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: 1,
            direction: PinDirection::InOut,
            initial: 0,
        }
    }

    /// Sets the bit width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Sets the direction.
    pub fn with_direction(mut self, direction: PinDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the committed state at construction.
    pub fn with_initial(mut self, initial: u64) -> Self {
        self.initial = initial;
        self
    }
}

/// The outcome of comparing a pin's committed state against an expected value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Expected value, masked to the pin width.
    pub expected: u64,
    /// Committed state at the time of the comparison.
    pub actual: u64,
}

impl Verdict {
    /// Returns `true` if the comparison matched.
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

/// A pin the tester can schedule drives on.
pub trait Drivable {
    /// Schedules `value` to take effect at the next commit.
    ///
    /// The value is masked to the pin width, so every `u64` is accepted.
    /// Negative values are rejected with [`EngineError::Range`].
    fn drive(&mut self, value: i128) -> Result<(), EngineError>;
}

/// A pin the tester can compare against an expected value.
pub trait Assertable {
    /// Compares the committed state against `expected` masked to the pin width.
    ///
    /// A mismatch is reported through the returned [`Verdict`], never as an error.
    fn check(&self, expected: u64) -> Result<Verdict, EngineError>;
}

/// A named signal line on the DUT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    name: String,
    width: u32,
    direction: PinDirection,
    current_state: u64,
    pending_drive: Option<u64>,
}

impl Pin {
    /// Creates a pin from its declaration.
    ///
    /// Fails with [`EngineError::InvalidWidth`] for widths outside `1..=64`
    /// and with [`EngineError::Range`] if the initial state does not fit.
    pub fn new(decl: &PinDecl) -> Result<Self, EngineError> {
        if decl.width == 0 || decl.width > MAX_PIN_WIDTH {
            return Err(EngineError::InvalidWidth {
                pin: decl.name.clone(),
                width: decl.width,
            });
        }
        if !fits_width(decl.initial, decl.width) {
            return Err(EngineError::Range {
                pin: decl.name.clone(),
                value: i128::from(decl.initial),
                width: decl.width,
            });
        }
        Ok(Self {
            name: decl.name.clone(),
            width: decl.width,
            direction: decl.direction,
            current_state: decl.initial,
            pending_drive: None,
        })
    }

    /// The pin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bit width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The pin direction.
    pub fn direction(&self) -> PinDirection {
        self.direction
    }

    /// The all-ones mask for this pin's width.
    pub fn mask(&self) -> u64 {
        mask(self.width)
    }

    /// The state established by the most recent commit.
    pub fn current_state(&self) -> u64 {
        self.current_state
    }

    /// The value scheduled for the next commit, if any.
    pub fn pending_drive(&self) -> Option<u64> {
        self.pending_drive
    }

    /// Applies the pending drive, if one was issued since the last commit.
    ///
    /// Only the tester calls this, once per cycle for every pin in the set.
    pub fn commit(&mut self) {
        if let Some(next) = self.pending_drive.take() {
            self.current_state = next;
        }
    }
}

impl Drivable for Pin {
    fn drive(&mut self, value: i128) -> Result<(), EngineError> {
        if !self.direction.is_drivable() {
            return Err(EngineError::NotDrivable {
                pin: self.name.clone(),
            });
        }
        if value < 0 {
            return Err(EngineError::Range {
                pin: self.name.clone(),
                value,
                width: self.width,
            });
        }
        // Truncation keeps the low 64 bits, which the mask then narrows.
        self.pending_drive = Some(value as u64 & self.mask());
        Ok(())
    }
}

impl Assertable for Pin {
    fn check(&self, expected: u64) -> Result<Verdict, EngineError> {
        if !self.direction.is_assertable() {
            return Err(EngineError::NotAssertable {
                pin: self.name.clone(),
            });
        }
        Ok(Verdict {
            expected: expected & self.mask(),
            actual: self.current_state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_pin() -> Pin {
        Pin::new(&PinDecl::new("data").with_width(8)).unwrap()
    }

    #[test]
    fn decl_defaults() {
        let d = PinDecl::new("clk");
        assert_eq!(d.width, 1);
        assert_eq!(d.direction, PinDirection::InOut);
        assert_eq!(d.initial, 0);
    }

    #[test]
    fn new_pin_starts_at_initial() {
        let p = Pin::new(&PinDecl::new("reset").with_initial(1)).unwrap();
        assert_eq!(p.current_state(), 1);
        assert_eq!(p.pending_drive(), None);
    }

    #[test]
    fn zero_width_rejected() {
        let err = Pin::new(&PinDecl::new("bus").with_width(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidWidth { width: 0, .. }));
    }

    #[test]
    fn over_wide_rejected() {
        let err = Pin::new(&PinDecl::new("bus").with_width(65)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidWidth { width: 65, .. }));
    }

    #[test]
    fn initial_must_fit() {
        let err = Pin::new(&PinDecl::new("en").with_initial(2)).unwrap_err();
        assert!(matches!(err, EngineError::Range { value: 2, width: 1, .. }));
    }

    #[test]
    fn drive_is_pending_until_commit() {
        let mut p = data_pin();
        p.drive(0xAA).unwrap();
        assert_eq!(p.current_state(), 0);
        assert_eq!(p.pending_drive(), Some(0xAA));
        p.commit();
        assert_eq!(p.current_state(), 0xAA);
        assert_eq!(p.pending_drive(), None);
    }

    #[test]
    fn drive_masks_to_width() {
        let mut p = data_pin();
        p.drive(0x1AB).unwrap();
        p.commit();
        assert_eq!(p.current_state(), 0xAB);
    }

    #[test]
    fn negative_drive_is_range_error() {
        let mut p = data_pin();
        let err = p.drive(-1).unwrap_err();
        assert!(matches!(err, EngineError::Range { value: -1, .. }));
        assert_eq!(p.pending_drive(), None);
    }

    #[test]
    fn commit_without_drive_keeps_state() {
        let mut p = data_pin();
        p.drive(0x55).unwrap();
        p.commit();
        p.commit();
        p.commit();
        assert_eq!(p.current_state(), 0x55);
    }

    #[test]
    fn last_drive_before_commit_wins() {
        let mut p = data_pin();
        p.drive(0x01).unwrap();
        p.drive(0x02).unwrap();
        p.commit();
        assert_eq!(p.current_state(), 0x02);
    }

    #[test]
    fn check_compares_committed_state() {
        let mut p = data_pin();
        p.drive(0x0F).unwrap();
        let v = p.check(0x0F).unwrap();
        assert!(!v.passed(), "pending drive is not visible before commit");
        p.commit();
        assert!(p.check(0x0F).unwrap().passed());
    }

    #[test]
    fn check_masks_expected() {
        let mut p = data_pin();
        p.drive(0xF0).unwrap();
        p.commit();
        let v = p.check(0x1F0).unwrap();
        assert_eq!(v.expected, 0xF0);
        assert!(v.passed());
    }

    #[test]
    fn output_pin_cannot_be_driven() {
        let mut p = Pin::new(&PinDecl::new("irq").with_direction(PinDirection::Output)).unwrap();
        assert!(matches!(
            p.drive(1).unwrap_err(),
            EngineError::NotDrivable { .. }
        ));
        assert!(p.check(0).unwrap().passed());
    }

    #[test]
    fn input_pin_cannot_be_asserted() {
        let p = Pin::new(&PinDecl::new("clk").with_direction(PinDirection::Input)).unwrap();
        assert!(matches!(
            p.check(0).unwrap_err(),
            EngineError::NotAssertable { .. }
        ));
    }

    #[test]
    fn full_width_pin() {
        let mut p = Pin::new(&PinDecl::new("wide").with_width(64)).unwrap();
        p.drive(i128::from(i64::MAX)).unwrap();
        p.commit();
        assert_eq!(p.current_state(), i64::MAX as u64);
    }

    #[test]
    fn full_width_pin_takes_upper_half() {
        let mut p = Pin::new(&PinDecl::new("bus").with_width(64)).unwrap();
        p.drive(i128::from(u64::MAX)).unwrap();
        p.commit();
        assert_eq!(p.current_state(), u64::MAX);
        p.drive(1 << 63).unwrap();
        p.commit();
        assert_eq!(p.current_state(), 0x8000_0000_0000_0000);
    }

    #[test]
    fn drive_beyond_64_bits_is_masked() {
        let mut p = data_pin();
        p.drive((1i128 << 70) | 0x5A).unwrap();
        p.commit();
        assert_eq!(p.current_state(), 0x5A);
    }
}
