//! Pin direction, which decides whether a pin may be driven, compared, or both.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction of a DUT pin as seen from the tester.
///
/// - `Input`: the tester drives it; the DUT never drives it back
/// - `Output`: the DUT drives it; the tester only compares
/// - `InOut`: bidirectional (default)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Tester-driven pin.
    Input,
    /// DUT-driven pin, compare only.
    Output,
    /// Bidirectional pin.
    #[default]
    #[serde(rename = "io", alias = "inout")]
    InOut,
}

impl PinDirection {
    /// Returns `true` if the tester may schedule drives on this pin.
    pub fn is_drivable(self) -> bool {
        matches!(self, PinDirection::Input | PinDirection::InOut)
    }

    /// Returns `true` if the tester may compare this pin against an expected value.
    pub fn is_assertable(self) -> bool {
        matches!(self, PinDirection::Output | PinDirection::InOut)
    }
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDirection::Input => write!(f, "input"),
            PinDirection::Output => write!(f, "output"),
            PinDirection::InOut => write!(f, "io"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities() {
        assert!(PinDirection::Input.is_drivable());
        assert!(!PinDirection::Input.is_assertable());
        assert!(!PinDirection::Output.is_drivable());
        assert!(PinDirection::Output.is_assertable());
        assert!(PinDirection::InOut.is_drivable());
        assert!(PinDirection::InOut.is_assertable());
    }

    #[test]
    fn default_is_inout() {
        assert_eq!(PinDirection::default(), PinDirection::InOut);
    }

    #[test]
    fn display() {
        assert_eq!(PinDirection::Input.to_string(), "input");
        assert_eq!(PinDirection::Output.to_string(), "output");
        assert_eq!(PinDirection::InOut.to_string(), "io");
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&PinDirection::InOut).unwrap();
        assert_eq!(json, "\"io\"");
        let d: PinDirection = serde_json::from_str("\"inout\"").unwrap();
        assert_eq!(d, PinDirection::InOut);
        let d: PinDirection = serde_json::from_str("\"output\"").unwrap();
        assert_eq!(d, PinDirection::Output);
    }
}
