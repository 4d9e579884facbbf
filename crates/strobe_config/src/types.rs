//! Configuration types deserialized from `strobe.toml`.

use serde::de::{self, IntoDeserializer, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use strobe_common::PinDirection;

/// The top-level project configuration parsed from `strobe.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Application metadata (name, version, engineer).
    pub application: ApplicationMeta,
    /// Tester target settings.
    #[serde(default)]
    pub tester: TesterConfig,
    /// Pattern output layout.
    #[serde(default)]
    pub output: OutputConfig,
    /// Device-under-test pin table.
    #[serde(default)]
    pub dut: DutConfig,
}

impl ProjectConfig {
    /// The configuration `strobe init` writes for a new project.
    pub fn default_for(name: &str) -> Self {
        Self {
            application: ApplicationMeta {
                name: name.to_string(),
                initials: initials_of(name),
                version: "0.1.0".to_string(),
                test_engineer: None,
            },
            tester: TesterConfig::default(),
            output: OutputConfig::default(),
            dut: DutConfig::default(),
        }
    }
}

/// Uppercase first letters of each `_`/`-`/space separated word.
fn initials_of(name: &str) -> String {
    name.split(['_', '-', ' '])
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Application metadata required in every `strobe.toml`.
#[derive(Debug, Deserialize)]
pub struct ApplicationMeta {
    /// The test program name.
    pub name: String,
    /// Short initials used as a tag in reports.
    #[serde(default)]
    pub initials: String,
    /// The test program version string.
    pub version: String,
    /// Responsible test engineer. Falls back to `$USER`.
    #[serde(default)]
    pub test_engineer: Option<String>,
}

impl ApplicationMeta {
    /// Returns the configured engineer, else `$USER`, else `"test_engineer"`.
    pub fn test_engineer(&self) -> String {
        self.test_engineer
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "test_engineer".to_string())
    }
}

/// Tester settings. Exactly one target is configured per project.
#[derive(Debug, Default, Deserialize)]
pub struct TesterConfig {
    /// The tester platform patterns are generated for.
    #[serde(default)]
    pub target: TesterTarget,
    /// Reject drive values wider than the pin instead of masking them.
    #[serde(default)]
    pub strict_drive_width: bool,
}

/// Supported tester platforms.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TesterTarget {
    /// Advantest V93000 (default).
    #[default]
    V93k,
    /// Teradyne J750.
    J750,
    /// Teradyne UltraFLEX.
    UltraFlex,
}

impl fmt::Display for TesterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TesterTarget::V93k => write!(f, "v93k"),
            TesterTarget::J750 => write!(f, "j750"),
            TesterTarget::UltraFlex => write!(f, "ultraflex"),
        }
    }
}

/// Where and how generated patterns are written.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// File name prefix for every generated pattern.
    #[serde(default = "default_pattern_prefix")]
    pub pattern_prefix: String,
    /// Output directory, relative to the project root.
    #[serde(default = "default_pattern_directory")]
    pub pattern_directory: String,
    /// Output formats to write (e.g., `"json"` or `["json", "vcd"]`).
    #[serde(
        default = "default_formats",
        deserialize_with = "deserialize_format_or_vec"
    )]
    pub formats: Vec<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pattern_prefix: default_pattern_prefix(),
            pattern_directory: default_pattern_directory(),
            formats: default_formats(),
        }
    }
}

fn default_pattern_prefix() -> String {
    "test_".to_string()
}

fn default_pattern_directory() -> String {
    "output/patterns".to_string()
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Json, OutputFormat::Vcd]
}

/// Pattern output file format.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Serialized record stream.
    Json,
    /// Value Change Dump (IEEE 1364) waveform.
    Vcd,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Vcd => "vcd",
        }
    }
}

/// Deserializes a field that can be either a single format or a list of formats.
///
/// Allows both `formats = "vcd"` and `formats = ["json", "vcd"]`.
fn deserialize_format_or_vec<'de, D>(deserializer: D) -> Result<Vec<OutputFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FormatOrVec;

    impl<'de> Visitor<'de> for FormatOrVec {
        type Value = Vec<OutputFormat>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a format name or a list of format names")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let format = OutputFormat::deserialize(v.into_deserializer())?;
            Ok(vec![format])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<OutputFormat>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(FormatOrVec)
}

/// The device-under-test description.
#[derive(Debug, Deserialize)]
pub struct DutConfig {
    /// Device name used in reports and waveform scopes.
    #[serde(default = "default_dut_name")]
    pub name: String,
    /// Declared pins, in order. Empty selects the built-in four-pin device.
    #[serde(default)]
    pub pins: Vec<PinConfig>,
    /// Data-port role mapping.
    #[serde(default)]
    pub port: PortConfig,
}

impl Default for DutConfig {
    fn default() -> Self {
        Self {
            name: default_dut_name(),
            pins: Vec::new(),
            port: PortConfig::default(),
        }
    }
}

fn default_dut_name() -> String {
    "simple_dut".to_string()
}

/// One declared pin.
#[derive(Debug, Clone, Deserialize)]
pub struct PinConfig {
    /// Pin name, unique and case-sensitive.
    pub name: String,
    /// Bit width, `1..=64`.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Direction (`input`, `output`, `io`).
    #[serde(default)]
    pub direction: PinDirection,
    /// Committed state at construction.
    #[serde(default)]
    pub initial: u64,
}

fn default_width() -> u32 {
    1
}

/// Role-to-pin mapping for the data port.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PortConfig {
    /// Clock pin name.
    #[serde(default = "default_clock")]
    pub clock: String,
    /// Data bus pin name.
    #[serde(default = "default_data")]
    pub data: String,
    /// Enable pin name.
    #[serde(default = "default_enable")]
    pub enable: String,
    /// Reset pin name.
    #[serde(default = "default_reset")]
    pub reset: String,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            clock: default_clock(),
            data: default_data(),
            enable: default_enable(),
            reset: default_reset(),
        }
    }
}

impl PortConfig {
    /// `(role, pin)` pairs in a fixed order.
    pub fn roles(&self) -> [(&'static str, &str); 4] {
        [
            ("clock", &self.clock),
            ("data", &self.data),
            ("enable", &self.enable),
            ("reset", &self.reset),
        ]
    }
}

fn default_clock() -> String {
    "clk".to_string()
}

fn default_data() -> String {
    "data".to_string()
}

fn default_enable() -> String {
    "enable".to_string()
}

fn default_reset() -> String {
    "reset".to_string()
}
