//! Reading time and material figures out of slicer output.
//!
//! PrusaSlicer-style slicers report estimates in the G-code footer and,
//! depending on version and flags, on stdout:
//!
//! ```text
//! ; estimated printing time (normal mode) = 1d 2h 3m 4s
//! ; filament used [g] = 12.34, 1.02
//! ```
//!
//! Cura-style output uses `;TIME:<seconds>` and `;Filament used: <g>g`.
//! The first time figure found wins; multi-extruder gram lists are summed.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{SliceError, SliceResult};

/// Figures found in slicer output. Either may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedOutput {
    /// Estimated print time (s).
    pub time_seconds: Option<f64>,
    /// Estimated filament mass (g).
    pub material_grams: Option<f64>,
}

impl ParsedOutput {
    /// Fill missing figures from `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            time_seconds: self.time_seconds.or(other.time_seconds),
            material_grams: self.material_grams.or(other.material_grams),
        }
    }

    /// Both figures, or an error naming the first missing one.
    pub fn complete(self) -> SliceResult<(f64, f64)> {
        let time = self
            .time_seconds
            .ok_or(SliceError::UnparseableOutput { missing: "time" })?;
        let grams = self
            .material_grams
            .ok_or(SliceError::UnparseableOutput { missing: "material" })?;
        Ok((time, grams))
    }
}

// Patterns are literals; `None` only if one fails to compile, which then
// reads as "figure not found".
static ESTIMATED_TIME: OnceLock<Option<Regex>> = OnceLock::new();
static DURATION_PART: OnceLock<Option<Regex>> = OnceLock::new();
static CURA_TIME: OnceLock<Option<Regex>> = OnceLock::new();
static FILAMENT_GRAMS: OnceLock<Option<Regex>> = OnceLock::new();
static CURA_GRAMS: OnceLock<Option<Regex>> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

/// Extract time and material figures from slicer text.
///
/// # Example
///
/// ```
/// use mesh_slice::parse_slicer_output;
///
/// let footer = "; filament used [g] = 12.5\n; estimated printing time (normal mode) = 1h 2m 3s\n";
/// let parsed = parse_slicer_output(footer);
///
/// assert_eq!(parsed.time_seconds, Some(3723.0));
/// assert_eq!(parsed.material_grams, Some(12.5));
/// ```
#[must_use]
pub fn parse_slicer_output(text: &str) -> ParsedOutput {
    ParsedOutput {
        time_seconds: parse_time(text),
        material_grams: parse_grams(text),
    }
}

fn parse_time(text: &str) -> Option<f64> {
    let estimated = pattern(
        &ESTIMATED_TIME,
        r"(?im)estimated printing time[^=\n]*=\s*([0-9dhms ]+)\r?$",
    )
    .and_then(|re| re.captures(text))
    .and_then(|c| c.get(1))
    .and_then(|m| parse_duration(m.as_str()));

    estimated.or_else(|| {
        pattern(&CURA_TIME, r"(?m)^;TIME:\s*(\d+(?:\.\d+)?)")
            .and_then(|re| re.captures(text))
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    })
}

/// Parse `1d 2h 3m 4s` (any subset, in order) into seconds.
fn parse_duration(text: &str) -> Option<f64> {
    let re = pattern(&DURATION_PART, r"(\d+)\s*([dhms])")?;
    let mut seconds = 0.0;
    let mut found = false;
    for caps in re.captures_iter(text) {
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let unit = match caps.get(2)?.as_str() {
            "d" => 86_400.0,
            "h" => 3600.0,
            "m" => 60.0,
            _ => 1.0,
        };
        seconds += value * unit;
        found = true;
    }
    found.then_some(seconds)
}

fn parse_grams(text: &str) -> Option<f64> {
    let listed = pattern(&FILAMENT_GRAMS, r"(?im)filament used \[g\]\s*=\s*([0-9., ]+)\r?$")
        .and_then(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .and_then(|m| sum_list(m.as_str()));

    listed.or_else(|| {
        pattern(&CURA_GRAMS, r"(?im)^;Filament used:\s*(\d+(?:\.\d+)?)\s*g\b")
            .and_then(|re| re.captures(text))
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    })
}

/// Sum a comma-separated list of per-extruder figures.
fn sum_list(text: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut found = false;
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        total += part.parse::<f64>().ok()?;
        found = true;
    }
    found.then_some(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    const PRUSA_FOOTER: &str = "\
; filament used [mm] = 4321.12
; filament used [cm3] = 10.39
; filament used [g] = 12.89
; filament cost = 0.32
; estimated printing time (normal mode) = 1d 2h 3m 4s
; estimated printing time (silent mode) = 1d 3h 0m 0s
";

    #[test]
    fn test_prusa_footer() {
        let parsed = parse_slicer_output(PRUSA_FOOTER);
        assert_eq!(parsed.time_seconds, Some(93_784.0));
        assert_eq!(parsed.material_grams, Some(12.89));
    }

    #[test]
    fn test_crlf_output() {
        let prusa = PRUSA_FOOTER.replace('\n', "\r\n");
        let parsed = parse_slicer_output(&prusa);
        assert_eq!(parsed.time_seconds, Some(93_784.0));
        assert_eq!(parsed.material_grams, Some(12.89));

        let cura = parse_slicer_output(";TIME:60\r\n;Filament used: 2.5g\r\n");
        assert_eq!(cura.time_seconds, Some(60.0));
        assert_eq!(cura.material_grams, Some(2.5));
    }

    #[test]
    fn test_partial_durations() {
        assert_eq!(parse_duration("42m 7s"), Some(2527.0));
        assert_eq!(parse_duration("2h"), Some(7200.0));
        assert_eq!(parse_duration("   "), None);
    }

    #[test]
    fn test_multi_extruder_grams_are_summed() {
        let parsed = parse_slicer_output("; filament used [g] = 10.5, 2.25\n");
        assert_eq!(parsed.material_grams, Some(12.75));
    }

    #[test]
    fn test_cura_style() {
        let text = ";FLAVOR:Marlin\n;TIME:5400\n;Filament used: 23.4g\n;Layer height: 0.2\n";
        let parsed = parse_slicer_output(text);
        assert_eq!(parsed.time_seconds, Some(5400.0));
        assert_eq!(parsed.material_grams, Some(23.4));
    }

    #[test]
    fn test_cura_metres_are_not_grams() {
        let parsed = parse_slicer_output(";Filament used: 1.23m\n");
        assert_eq!(parsed.material_grams, None);
    }

    #[test]
    fn test_missing_figures() {
        let parsed = parse_slicer_output("Slicing done\n");
        assert_eq!(parsed, ParsedOutput::default());
        assert!(matches!(
            parsed.complete(),
            Err(SliceError::UnparseableOutput { missing: "time" })
        ));

        let time_only = parse_slicer_output(";TIME:60\n");
        assert!(matches!(
            time_only.complete(),
            Err(SliceError::UnparseableOutput { missing: "material" })
        ));
    }

    #[test]
    fn test_or_fills_gaps() {
        let stdout = parse_slicer_output(";TIME:60\n");
        let gcode = parse_slicer_output("; filament used [g] = 3.0\n;TIME:99\n");
        let merged = stdout.or(gcode);
        assert_eq!(merged.complete().unwrap(), (60.0, 3.0));
    }
}
