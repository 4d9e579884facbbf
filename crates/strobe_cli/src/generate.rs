//! `strobe generate`: run patterns against the configured device.
//!
//! Builds the device described by `strobe.toml`, selects patterns from the
//! library by name or filter, runs each on one shared tester so the cycle
//! count carries across patterns, writes the requested output files, and
//! reports per-pattern status plus a summary line.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use strobe_config::{OutputFormat, ProjectConfig};
use strobe_engine::{library, write_vcd, Dut, EngineError, Pattern, PatternDef, Tester};

use crate::pipeline::{build_dut, load_project};
use crate::{GenerateArgs, GlobalArgs};

/// Result of running a single pattern.
struct GenerateResult {
    /// Pattern name.
    name: String,
    /// The frozen pattern, if generation completed.
    pattern: Option<Pattern>,
    /// Structural error message if generation stopped.
    error: Option<String>,
}

impl GenerateResult {
    fn passed(&self) -> bool {
        self.pattern.as_ref().is_some_and(Pattern::passed)
    }
}

/// Runs the `strobe generate` command.
///
/// Returns exit code 0 if every pattern passed, 1 if any comparison failed or
/// any pattern stopped on a structural error.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = load_project(global)?;

    if !global.quiet {
        eprintln!(
            "   Generating {} v{} (target {})",
            config.application.name, config.application.version, config.tester.target
        );
    }
    if global.verbose {
        eprintln!("   Engineer {}", config.application.test_engineer());
    }

    let selected = select_patterns(library::all(), args.name.as_deref(), args.filter.as_deref())?;
    if selected.is_empty() {
        if !global.quiet {
            eprintln!("warning: no patterns match the given filter");
        }
        return Ok(0);
    }

    let formats = resolve_formats(args, &config);
    let out_dir = project_dir.join(&config.output.pattern_directory);
    if !args.no_output && !formats.is_empty() {
        fs::create_dir_all(&out_dir)?;
    }

    let mut dut = build_dut(&config.dut)?;
    let mut tester = Tester::new().with_strict_drive_width(config.tester.strict_drive_width);

    if global.verbose {
        eprintln!(
            "   Device {} ({} pins)",
            dut.name(),
            dut.pins().len()
        );
    }

    let mut results = Vec::new();
    for def in selected {
        let result = match library::run(def, dut.as_mut(), &mut tester) {
            Ok(pattern) => GenerateResult {
                name: def.name.to_string(),
                pattern: Some(pattern),
                error: None,
            },
            Err(e) => GenerateResult {
                name: def.name.to_string(),
                pattern: None,
                error: Some(e.to_string()),
            },
        };

        if let (Some(pattern), false) = (&result.pattern, args.no_output) {
            for path in write_outputs(pattern, dut.name(), &formats, &out_dir, &config)? {
                if global.verbose {
                    eprintln!("     Wrote {}", path.display());
                }
            }
        }

        if !global.quiet {
            print_result(&result, global.verbose);
        }
        results.push(result);
    }

    let passed = results.iter().filter(|r| r.passed()).count();
    let failed = results.len() - passed;

    if !global.quiet {
        eprintln!();
        eprintln!(
            "   Result: {passed} passed, {failed} failed out of {} pattern(s), {} cycles",
            results.len(),
            tester.cycle_count()
        );
    }

    if failed > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Selects patterns by exact name and/or substring filter.
///
/// An exact name that is not registered is an error; a filter that matches
/// nothing yields an empty selection.
fn select_patterns<'a>(
    defs: &'a [PatternDef],
    name: Option<&str>,
    filter: Option<&str>,
) -> Result<Vec<&'a PatternDef>, EngineError> {
    if let Some(n) = name {
        if !defs.iter().any(|d| d.name == n) {
            return Err(EngineError::UnknownPattern {
                name: n.to_string(),
            });
        }
    }
    Ok(defs
        .iter()
        .filter(|d| name.map_or(true, |n| d.name == n))
        .filter(|d| filter.map_or(true, |f| d.name.contains(f)))
        .collect())
}

/// Formats from `--format`, falling back to `output.formats`.
fn resolve_formats(args: &GenerateArgs, config: &ProjectConfig) -> Vec<OutputFormat> {
    if args.format.is_empty() {
        config.output.formats.clone()
    } else {
        args.format.iter().map(|&f| f.into()).collect()
    }
}

/// Output file path for `pattern` in `format`.
fn output_path(out_dir: &Path, prefix: &str, name: &str, format: OutputFormat) -> PathBuf {
    out_dir.join(format!("{prefix}{name}.{}", format.extension()))
}

/// Writes `pattern` in every requested format and returns the written paths.
fn write_outputs(
    pattern: &Pattern,
    scope: &str,
    formats: &[OutputFormat],
    out_dir: &Path,
    config: &ProjectConfig,
) -> Result<Vec<PathBuf>, EngineError> {
    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = output_path(
            out_dir,
            &config.output.pattern_prefix,
            pattern.name(),
            format,
        );
        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(pattern)?;
                fs::write(&path, json)?;
            }
            OutputFormat::Vcd => {
                let file = File::create(&path)?;
                write_vcd(pattern, scope, BufWriter::new(file))?;
            }
        }
        written.push(path);
    }
    Ok(written)
}

/// Prints the result of a single pattern run.
fn print_result(result: &GenerateResult, verbose: bool) {
    match (&result.pattern, &result.error) {
        (_, Some(err)) => eprintln!("   FAIL  {name}: {err}", name = result.name),
        (Some(pattern), None) if pattern.passed() => eprintln!(
            "   PASS  {name} ({cycles} cycles, {asserts} assertion(s))",
            name = result.name,
            cycles = pattern.total_cycles(),
            asserts = pattern.assertion_count(),
        ),
        (Some(pattern), None) => {
            eprintln!(
                "   FAIL  {name}: {count} assertion(s) failed",
                name = result.name,
                count = pattern.failure_count(),
            );
            if verbose {
                for f in pattern.failures() {
                    eprintln!(
                        "         cycle {}: {} expected {:#x}, got {:#x}",
                        f.cycle, f.pin, f.expected, f.actual
                    );
                }
            }
        }
        (None, None) => eprintln!("   FAIL  {name}", name = result.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TesterArg;
    use tempfile::TempDir;

    fn args() -> GenerateArgs {
        GenerateArgs {
            name: None,
            filter: None,
            format: Vec::new(),
            no_output: false,
        }
    }

    fn global_for(config: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(config.to_str().unwrap().to_string()),
        }
    }

    fn init_project(tmp: &TempDir) -> PathBuf {
        let project_dir = tmp.path().join("test_program");
        crate::init::run(
            Some(project_dir.to_str().unwrap().to_string()),
            TesterArg::V93k,
            &GlobalArgs {
                quiet: true,
                verbose: false,
                config: None,
            },
        )
        .unwrap();
        project_dir
    }

    #[test]
    fn select_by_name() {
        let selected = select_patterns(library::all(), Some("clock_toggle"), None).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "clock_toggle");
    }

    #[test]
    fn select_by_filter() {
        let selected = select_patterns(library::all(), None, Some("data")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "data_roundtrip");
    }

    #[test]
    fn select_all() {
        let selected = select_patterns(library::all(), None, None).unwrap();
        assert_eq!(selected.len(), library::all().len());
    }

    #[test]
    fn select_unknown_name_errors() {
        let err = select_patterns(library::all(), Some("nonexistent"), None).unwrap_err();
        assert!(matches!(err, EngineError::UnknownPattern { .. }));
    }

    #[test]
    fn select_filter_no_match() {
        let selected = select_patterns(library::all(), None, Some("zzz")).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn output_path_uses_prefix() {
        let p = output_path(
            Path::new("out"),
            "test_",
            "functional_test",
            OutputFormat::Vcd,
        );
        assert_eq!(p, Path::new("out").join("test_functional_test.vcd"));
    }

    #[test]
    fn generate_end_to_end_on_init_project() {
        let tmp = TempDir::new().unwrap();
        let project_dir = init_project(&tmp);

        let code = run(&args(), &global_for(&project_dir)).unwrap();
        assert_eq!(code, 0);

        let out = project_dir.join("output").join("patterns");
        for def in library::all() {
            assert!(out.join(format!("test_{}.json", def.name)).exists());
            assert!(out.join(format!("test_{}.vcd", def.name)).exists());
        }

        let json = fs::read_to_string(out.join("test_functional_test.json")).unwrap();
        let pattern: Pattern = serde_json::from_str(&json).unwrap();
        assert!(pattern.passed());
        assert_eq!(pattern.final_state("data"), Some(0xF0));

        let vcd = fs::read_to_string(out.join("test_functional_test.vcd")).unwrap();
        assert!(vcd.contains("$scope module simple_dut $end"));
    }

    #[test]
    fn generate_single_format_override() {
        let tmp = TempDir::new().unwrap();
        let project_dir = init_project(&tmp);

        let mut a = args();
        a.name = Some("reset_sequence".to_string());
        a.format = vec![crate::FormatArg::Json];
        let code = run(&a, &global_for(&project_dir)).unwrap();
        assert_eq!(code, 0);

        let out = project_dir.join("output").join("patterns");
        assert!(out.join("test_reset_sequence.json").exists());
        assert!(!out.join("test_reset_sequence.vcd").exists());
        assert!(!out.join("test_clock_toggle.json").exists());
    }

    #[test]
    fn generate_no_output_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let project_dir = init_project(&tmp);

        let mut a = args();
        a.no_output = true;
        let code = run(&a, &global_for(&project_dir)).unwrap();
        assert_eq!(code, 0);

        let out = project_dir.join("output").join("patterns");
        assert_eq!(fs::read_dir(out).unwrap().count(), 0);
    }

    #[test]
    fn generate_declared_device_without_reset_fails_config() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("strobe.toml");
        fs::write(
            &config,
            "[application]\nname = \"p\"\nversion = \"1\"\n\n[[dut.pins]]\nname = \"clk\"\n",
        )
        .unwrap();
        assert!(run(&args(), &global_for(&config)).is_err());
    }

    #[test]
    fn generate_output_only_device_reports_failure() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("strobe.toml");
        fs::write(
            &config,
            r#"[application]
name = "p"
version = "1"

[[dut.pins]]
name = "clk"

[[dut.pins]]
name = "data"
width = 8
direction = "output"

[[dut.pins]]
name = "enable"

[[dut.pins]]
name = "reset"
"#,
        )
        .unwrap();
        let mut a = args();
        a.name = Some("data_roundtrip".to_string());
        a.no_output = true;
        let code = run(&a, &global_for(&config)).unwrap();
        assert_eq!(code, 1);
    }
}
