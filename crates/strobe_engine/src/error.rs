//! Structural error types for the pattern execution engine.
//!
//! Every variant here is a programming error in a DUT model or pattern script
//! and aborts generation. Assertion mismatches are not errors; they are
//! recorded as data in the generated [`Pattern`](crate::Pattern).

use std::io;

/// Errors that can occur while building a DUT or generating a pattern.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Two pins in one pin set share a name.
    #[error("duplicate pin name '{name}'")]
    DuplicateName {
        /// The offending pin name.
        name: String,
    },

    /// An operation referenced a pin that the DUT does not declare.
    #[error("unknown pin '{name}'")]
    UnknownPin {
        /// The name that failed to resolve.
        name: String,
    },

    /// A drive or initial value cannot be represented on the pin.
    #[error("value {value} out of range for pin '{pin}' ({width} bit(s))")]
    Range {
        /// The pin being driven.
        pin: String,
        /// The rejected value.
        value: i128,
        /// The declared width of the pin.
        width: u32,
    },

    /// A pin was declared with a width outside `1..=64`.
    #[error("invalid width {width} for pin '{pin}'")]
    InvalidWidth {
        /// The pin being declared.
        pin: String,
        /// The rejected width.
        width: u32,
    },

    /// A drive was issued on an output-only pin.
    #[error("pin '{pin}' is output-only and cannot be driven")]
    NotDrivable {
        /// The pin name.
        pin: String,
    },

    /// A comparison was issued on an input-only pin.
    #[error("pin '{pin}' is input-only and cannot be asserted")]
    NotAssertable {
        /// The pin name.
        pin: String,
    },

    /// A composite operation needs a port role the DUT does not map.
    #[error("device has no pin mapped to the '{role}' role")]
    MissingRole {
        /// The role name (`clock`, `data`, `enable`, `reset`).
        role: String,
    },

    /// A pattern name was not found in the pattern library.
    #[error("unknown pattern '{name}'")]
    UnknownPattern {
        /// The requested pattern name.
        name: String,
    },

    /// An I/O error occurred while writing pattern output.
    #[error("pattern output I/O error: {0}")]
    Io(#[from] io::Error),

    /// A pattern could not be serialized.
    #[error("pattern serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_display() {
        let e = EngineError::DuplicateName { name: "clk".into() };
        assert_eq!(e.to_string(), "duplicate pin name 'clk'");
    }

    #[test]
    fn unknown_pin_display() {
        let e = EngineError::UnknownPin {
            name: "strobe".into(),
        };
        assert_eq!(e.to_string(), "unknown pin 'strobe'");
    }

    #[test]
    fn range_display() {
        let e = EngineError::Range {
            pin: "data".into(),
            value: -1,
            width: 8,
        };
        assert_eq!(
            e.to_string(),
            "value -1 out of range for pin 'data' (8 bit(s))"
        );
    }

    #[test]
    fn invalid_width_display() {
        let e = EngineError::InvalidWidth {
            pin: "bus".into(),
            width: 0,
        };
        assert_eq!(e.to_string(), "invalid width 0 for pin 'bus'");
    }

    #[test]
    fn capability_display() {
        let e = EngineError::NotDrivable { pin: "irq".into() };
        assert_eq!(e.to_string(), "pin 'irq' is output-only and cannot be driven");
        let e = EngineError::NotAssertable { pin: "clk".into() };
        assert_eq!(e.to_string(), "pin 'clk' is input-only and cannot be asserted");
    }

    #[test]
    fn missing_role_display() {
        let e = EngineError::MissingRole {
            role: "reset".into(),
        };
        assert_eq!(e.to_string(), "device has no pin mapped to the 'reset' role");
    }

    #[test]
    fn unknown_pattern_display() {
        let e = EngineError::UnknownPattern {
            name: "bist".into(),
        };
        assert_eq!(e.to_string(), "unknown pattern 'bist'");
    }

    #[test]
    fn io_display() {
        let e = EngineError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(e.to_string().starts_with("pattern output I/O error"));
    }
}
