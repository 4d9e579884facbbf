//! Shared pipeline helpers for CLI commands.
//!
//! Contains the project root resolution and configuration loading used by
//! `list` and `generate`, and the construction of the device model described
//! by the `[dut]` table.

use std::path::{Path, PathBuf};

use strobe_config::{DutConfig, ProjectConfig, CONFIG_FILE};
use strobe_engine::{DataPort, DeclaredDut, EngineError, PinDecl, PortMap, SimpleDut};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `strobe.toml`.
///
/// Returns the directory containing `strobe.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file: its parent dir, dir: itself).
/// Otherwise walks up from the current directory looking for `strobe.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Resolves the project root and loads its configuration.
///
/// An explicit `--config` file is read as given, so it need not be named
/// `strobe.toml`.
pub fn load_project(
    global: &GlobalArgs,
) -> Result<(PathBuf, ProjectConfig), Box<dyn std::error::Error>> {
    let root = resolve_project_root(global)?;
    let config = match global.config {
        Some(ref path) if Path::new(path).is_file() => {
            strobe_config::load_config_file(Path::new(path))?
        }
        _ => strobe_config::load_config(&root)?,
    };
    Ok((root, config))
}

/// Builds the device described by `[dut]`.
///
/// An empty pin table selects the built-in four-pin device.
pub fn build_dut(config: &DutConfig) -> Result<Box<dyn DataPort>, EngineError> {
    if config.pins.is_empty() {
        return Ok(Box::new(SimpleDut::new()?));
    }
    let decls: Vec<PinDecl> = config
        .pins
        .iter()
        .map(|p| {
            PinDecl::new(p.name.clone())
                .with_width(p.width)
                .with_direction(p.direction)
                .with_initial(p.initial)
        })
        .collect();
    let port = PortMap {
        clock: Some(config.port.clock.clone()),
        data: Some(config.port.data.clone()),
        enable: Some(config.port.enable.clone()),
        reset: Some(config.port.reset.clone()),
    };
    Ok(Box::new(DeclaredDut::new(config.name.clone(), &decls, port)?))
}
