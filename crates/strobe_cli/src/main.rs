//! Strobe CLI, the command-line interface for the strobe ATE pattern generator.
//!
//! Provides `strobe init` for project scaffolding, `strobe list` for browsing
//! the pattern library, and `strobe generate` for running patterns against the
//! configured device and writing them out.

#![warn(missing_docs)]

mod generate;
mod init;
mod list;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Strobe: cycle-accurate test pattern generation for ATE.
#[derive(Parser, Debug)]
#[command(name = "strobe", version, about = "Strobe ATE Pattern Generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `strobe.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new strobe project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,

        /// Tester platform the patterns are generated for.
        #[arg(short, long, value_enum, default_value_t = TesterArg::V93k)]
        target: TesterArg,
    },
    /// List the registered patterns.
    List,
    /// Generate patterns against the configured device.
    Generate(GenerateArgs),
}

/// Arguments for the `strobe generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Specific pattern name to generate (optional).
    pub name: Option<String>,

    /// Substring filter for pattern names.
    #[arg(long)]
    pub filter: Option<String>,

    /// Output formats, overriding `output.formats` from `strobe.toml`.
    #[arg(short, long, value_enum)]
    pub format: Vec<FormatArg>,

    /// Run patterns and report results without writing any files.
    #[arg(long)]
    pub no_output: bool,
}

/// Pattern output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Serialized pattern record stream.
    Json,
    /// Value Change Dump (IEEE 1364).
    Vcd,
}

impl From<FormatArg> for strobe_config::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => strobe_config::OutputFormat::Json,
            FormatArg::Vcd => strobe_config::OutputFormat::Vcd,
        }
    }
}

/// Tester platform selection for project scaffolding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TesterArg {
    /// Advantest V93000.
    V93k,
    /// Teradyne J750.
    J750,
    /// Teradyne UltraFLEX.
    #[value(name = "ultraflex")]
    UltraFlex,
}

impl From<TesterArg> for strobe_config::TesterTarget {
    fn from(arg: TesterArg) -> Self {
        match arg {
            TesterArg::V93k => strobe_config::TesterTarget::V93k,
            TesterArg::J750 => strobe_config::TesterTarget::J750,
            TesterArg::UltraFlex => strobe_config::TesterTarget::UltraFlex,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Init { name, target } => init::run(name, target, &global),
        Command::List => list::run(&global),
        Command::Generate(ref args) => generate::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
