//! The ordered, name-addressable collection of pins owned by one DUT.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::pin::{Pin, PinDecl};

/// Opaque index of a pin within its [`PinSet`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PinId(u32);

impl PinId {
    /// Creates a `PinId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Pins in declaration order, addressable by case-sensitive name.
///
/// There is no removal: the pin topology is fixed once the owning DUT is built.
#[derive(Clone, Debug, Default)]
pub struct PinSet {
    pins: Vec<Pin>,
    by_name: HashMap<String, PinId>,
}

impl PinSet {
    /// Creates an empty pin set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pin set from a declarative pin list.
    pub fn from_decls(decls: &[PinDecl]) -> Result<Self, EngineError> {
        let mut set = Self::new();
        for decl in decls {
            set.add(decl)?;
        }
        Ok(set)
    }

    /// Adds a pin. Fails with [`EngineError::DuplicateName`] if the name is taken.
    pub fn add(&mut self, decl: &PinDecl) -> Result<PinId, EngineError> {
        if self.by_name.contains_key(&decl.name) {
            return Err(EngineError::DuplicateName {
                name: decl.name.clone(),
            });
        }
        let pin = Pin::new(decl)?;
        let id = PinId(self.pins.len() as u32);
        self.by_name.insert(decl.name.clone(), id);
        self.pins.push(pin);
        Ok(id)
    }

    /// Resolves a pin name to its id.
    pub fn id(&self, name: &str) -> Result<PinId, EngineError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownPin {
                name: name.to_string(),
            })
    }

    /// Looks up a pin by name.
    pub fn get(&self, name: &str) -> Result<&Pin, EngineError> {
        let id = self.id(name)?;
        Ok(&self.pins[id.0 as usize])
    }

    /// Looks up a pin by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Pin, EngineError> {
        let id = self.id(name)?;
        Ok(&mut self.pins[id.0 as usize])
    }

    /// Returns `true` if a pin with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Returns `true` if no pins are declared.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Iterates pins in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter()
    }

    /// Commits every pending drive. All pins latch together; no pin reads another.
    pub fn commit_all(&mut self) {
        for pin in &mut self.pins {
            pin.commit();
        }
    }
}
