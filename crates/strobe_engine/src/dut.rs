//! Device-under-test models.
//!
//! A DUT owns exactly one [`PinSet`], fixed at construction. The [`Dut`]
//! trait is the minimal interface the tester needs (pin access). Devices that
//! expose a clocked data port additionally implement [`DataPort`], which maps
//! the `clock`, `data`, `enable` and `reset` roles to concrete pins; the
//! composite operations built on those roles live on
//! [`Session`](crate::Session).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::pin::PinDecl;
use crate::pin_set::PinSet;

/// The interface every device model exposes to the tester.
pub trait Dut {
    /// Device name, used in reports and waveform scopes.
    fn name(&self) -> &str;

    /// The device's pins.
    fn pins(&self) -> &PinSet;

    /// The device's pins, for drives and commits.
    fn pins_mut(&mut self) -> &mut PinSet;
}

/// The signal roles of a clocked parallel data port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortRole {
    /// Free-running clock.
    Clock,
    /// Parallel data bus.
    Data,
    /// Transfer enable strobe.
    Enable,
    /// Active-high device reset.
    Reset,
}

impl PortRole {
    /// Lowercase role name, as used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            PortRole::Clock => "clock",
            PortRole::Data => "data",
            PortRole::Enable => "enable",
            PortRole::Reset => "reset",
        }
    }
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-to-pin mapping for a [`DataPort`] device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMap {
    /// Pin carrying the clock role.
    pub clock: Option<String>,
    /// Pin carrying the data role.
    pub data: Option<String>,
    /// Pin carrying the enable role.
    pub enable: Option<String>,
    /// Pin carrying the reset role.
    pub reset: Option<String>,
}

impl Default for PortMap {
    fn default() -> Self {
        Self {
            clock: Some("clk".into()),
            data: Some("data".into()),
            enable: Some("enable".into()),
            reset: Some("reset".into()),
        }
    }
}

impl PortMap {
    /// Returns the pin mapped to `role`.
    pub fn pin(&self, role: PortRole) -> Result<&str, EngineError> {
        let slot = match role {
            PortRole::Clock => &self.clock,
            PortRole::Data => &self.data,
            PortRole::Enable => &self.enable,
            PortRole::Reset => &self.reset,
        };
        slot.as_deref().ok_or_else(|| EngineError::MissingRole {
            role: role.as_str().to_string(),
        })
    }

    fn mapped(&self) -> impl Iterator<Item = &str> {
        [&self.clock, &self.data, &self.enable, &self.reset]
            .into_iter()
            .filter_map(|s| s.as_deref())
    }
}

/// A device with a clocked parallel data port.
pub trait DataPort: Dut {
    /// Returns the pin name that carries `role`.
    fn port_pin(&self, role: PortRole) -> Result<&str, EngineError>;
}

/// The built-in four-pin device: `clk`, `data[8]`, `enable`, `reset`.
#[derive(Clone, Debug)]
pub struct SimpleDut {
    pins: PinSet,
    port: PortMap,
}

impl SimpleDut {
    /// Name reported by [`Dut::name`].
    pub const NAME: &'static str = "simple_dut";

    /// The fixed pin table of this device.
    pub fn pin_table() -> Vec<PinDecl> {
        vec![
            PinDecl::new("clk"),
            PinDecl::new("data").with_width(8),
            PinDecl::new("enable"),
            PinDecl::new("reset"),
        ]
    }

    /// Builds the device.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            pins: PinSet::from_decls(&Self::pin_table())?,
            port: PortMap::default(),
        })
    }
}

impl Dut for SimpleDut {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn pins(&self) -> &PinSet {
        &self.pins
    }

    fn pins_mut(&mut self) -> &mut PinSet {
        &mut self.pins
    }
}

impl DataPort for SimpleDut {
    fn port_pin(&self, role: PortRole) -> Result<&str, EngineError> {
        self.port.pin(role)
    }
}

/// A device built from an arbitrary declared pin list and role mapping.
#[derive(Clone, Debug)]
pub struct DeclaredDut {
    name: String,
    pins: PinSet,
    port: PortMap,
}

impl DeclaredDut {
    /// Builds the device.
    ///
    /// Fails with [`EngineError::DuplicateName`] on repeated pin names and
    /// with [`EngineError::UnknownPin`] if the port map names an undeclared pin.
    pub fn new(
        name: impl Into<String>,
        decls: &[PinDecl],
        port: PortMap,
    ) -> Result<Self, EngineError> {
        let pins = PinSet::from_decls(decls)?;
        if let Some(missing) = port.mapped().find(|p| !pins.contains(p)) {
            return Err(EngineError::UnknownPin {
                name: missing.to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            pins,
            port,
        })
    }
}

impl Dut for DeclaredDut {
    fn name(&self) -> &str {
        &self.name
    }

    fn pins(&self) -> &PinSet {
        &self.pins
    }

    fn pins_mut(&mut self) -> &mut PinSet {
        &mut self.pins
    }
}

impl DataPort for DeclaredDut {
    fn port_pin(&self, role: PortRole) -> Result<&str, EngineError> {
        self.port.pin(role)
    }
}
