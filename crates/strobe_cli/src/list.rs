//! `strobe list`: print the registered patterns.

use strobe_engine::{library, PatternDef};

use crate::GlobalArgs;

/// Runs the `strobe list` command.
///
/// Prints one line per registered pattern to stdout. Returns exit code 0.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if !global.quiet {
        eprintln!("   Listing {} pattern(s)", library::all().len());
    }
    for line in format_listing(library::all()) {
        println!("{line}");
    }
    Ok(0)
}

/// Formats `defs` as aligned `name  description` lines.
fn format_listing(defs: &[PatternDef]) -> Vec<String> {
    let width = defs.iter().map(|d| d.name.len()).max().unwrap_or(0);
    defs.iter()
        .map(|d| format!("{:<width$}  {}", d.name, d.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_has_every_pattern() {
        let lines = format_listing(library::all());
        assert_eq!(lines.len(), library::all().len());
        assert!(lines[0].starts_with("functional_test  "));
    }

    #[test]
    fn listing_aligns_descriptions() {
        let lines = format_listing(library::all());
        let columns: Vec<usize> = lines
            .iter()
            .zip(library::all())
            .map(|(line, def)| line.find(def.description).unwrap())
            .collect();
        assert!(columns.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn empty_listing() {
        assert!(format_listing(&[]).is_empty());
    }
}
