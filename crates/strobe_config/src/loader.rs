//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{DutConfig, ProjectConfig};
use std::collections::HashSet;
use std::path::Path;
use strobe_common::{fits_width, MAX_PIN_WIDTH};

/// The configuration file name looked up in a project directory.
pub const CONFIG_FILE: &str = "strobe.toml";

/// Loads and validates a `strobe.toml` configuration from a project directory.
///
/// Reads `<project_dir>/strobe.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `strobe.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.application.name.is_empty() {
        return Err(ConfigError::MissingField("application.name".to_string()));
    }
    if config.application.version.is_empty() {
        return Err(ConfigError::MissingField("application.version".to_string()));
    }
    if config.output.pattern_directory.is_empty() {
        return Err(ConfigError::MissingField(
            "output.pattern_directory".to_string(),
        ));
    }
    if config.output.pattern_prefix.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "pattern_prefix '{}' must not contain path separators",
            config.output.pattern_prefix
        )));
    }
    validate_dut(&config.dut)
}

/// Checks the declared pin table and that every port role names a declared pin.
///
/// An empty pin table selects the built-in device and skips the role check.
fn validate_dut(dut: &DutConfig) -> Result<(), ConfigError> {
    if dut.pins.is_empty() {
        return Ok(());
    }
    let mut seen = HashSet::new();
    for pin in &dut.pins {
        if pin.name.is_empty() {
            return Err(ConfigError::MissingField("dut.pins.name".to_string()));
        }
        if !seen.insert(pin.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate pin '{}'",
                pin.name
            )));
        }
        if pin.width == 0 || pin.width > MAX_PIN_WIDTH {
            return Err(ConfigError::ValidationError(format!(
                "pin '{}' has width {}, expected 1..={MAX_PIN_WIDTH}",
                pin.name, pin.width
            )));
        }
        if !fits_width(pin.initial, pin.width) {
            return Err(ConfigError::ValidationError(format!(
                "pin '{}' initial value {:#x} does not fit in {} bits",
                pin.name, pin.initial, pin.width
            )));
        }
    }
    for (role, pin) in dut.port.roles() {
        if !seen.contains(pin) {
            return Err(ConfigError::ValidationError(format!(
                "port role '{role}' names undeclared pin '{pin}'"
            )));
        }
    }
    Ok(())
}
