//! `strobe init`: project scaffolding command.
//!
//! Creates a new strobe project directory with a `strobe.toml` config file and
//! the pattern output directory.

use std::fs;
use std::path::{Path, PathBuf};

use strobe_config::{ProjectConfig, CONFIG_FILE};

use crate::{GlobalArgs, TesterArg};

/// Runs the `strobe init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(
    name: Option<String>,
    target: TesterArg,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{}' already exists", n).into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()).into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("test_program");

    if !global.quiet {
        eprintln!("  Creating new strobe project `{project_name}`");
    }

    let mut config = ProjectConfig::default_for(project_name);
    config.tester.target = target.into();

    fs::write(&config_path, render_config(&config))?;
    let pattern_dir = project_dir.join(&config.output.pattern_directory);
    fs::create_dir_all(&pattern_dir)?;

    if !global.quiet {
        eprintln!("     Created {}", config_path.display());
        eprintln!("     Created {}", display_dir(&pattern_dir));
    }

    Ok(0)
}

fn display_dir(path: &Path) -> String {
    format!("{}/", path.display())
}

/// Renders `config` as the text of a `strobe.toml` file.
fn render_config(config: &ProjectConfig) -> String {
    let app = &config.application;
    let formats = config
        .output
        .formats
        .iter()
        .map(|f| format!("\"{}\"", f.extension()))
        .collect::<Vec<_>>()
        .join(", ");
    let port = &config.dut.port;
    format!(
        r#"[application]
name = "{name}"
initials = "{initials}"
version = "{version}"
# test_engineer = "{engineer}"

[tester]
target = "{target}"
strict_drive_width = {strict}

[output]
pattern_prefix = "{prefix}"
pattern_directory = "{directory}"
formats = [{formats}]

[dut]
name = "{dut}"
# Declare pins to replace the built-in clk/data[8]/enable/reset device:
# [[dut.pins]]
# name = "data"
# width = 8
# direction = "io"
# initial = 0

[dut.port]
clock = "{clock}"
data = "{data}"
enable = "{enable}"
reset = "{reset}"
"#,
        name = app.name,
        initials = app.initials,
        version = app.version,
        engineer = app.test_engineer(),
        target = config.tester.target,
        strict = config.tester.strict_drive_width,
        prefix = config.output.pattern_prefix,
        directory = config.output.pattern_directory,
        dut = config.dut.name,
        clock = port.clock,
        data = port.data,
        enable = port.enable,
        reset = port.reset,
    )
}
