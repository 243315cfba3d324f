//! Pairwise comparison of one logical field's values across sources.

use defibcheck_core::{is_absent, normalize_serial, parse_date, ParsedDate, Serial, NA};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{FieldComparison, Source};

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("static number pattern"));

/// Floating-point slack on the tolerance boundary, so a gap of exactly the
/// tolerance matches.
const TOLERANCE_EPSILON: f64 = 1e-9;

/// Values shown in the comparison, `"N/A"` for absent ones.
fn display_values(values: &[(Source, Option<&str>)]) -> FieldComparison {
    let mut comparison = FieldComparison::default();
    for (source, raw) in values {
        let shown = raw.filter(|v| !is_absent(v)).unwrap_or(NA);
        comparison.values.insert(*source, shown.trim().to_string());
    }
    comparison
}

/// Record a match flag for every pair of present, normalized values.
fn match_pairs<T>(comparison: &mut FieldComparison, normalized: &[(Source, T)], eq: impl Fn(&T, &T) -> bool) {
    for (i, (a, va)) in normalized.iter().enumerate() {
        for (b, vb) in &normalized[i + 1..] {
            comparison.set_match(*a, *b, eq(va, vb));
        }
    }
}

pub fn compare_serials(values: &[(Source, Option<&str>)]) -> FieldComparison {
    let mut comparison = display_values(values);

    let normalized: Vec<(Source, Serial)> = values
        .iter()
        .filter_map(|(source, raw)| {
            let serial = normalize_serial((*raw)?);
            (!serial.is_absent()).then_some((*source, serial))
        })
        .collect();

    match_pairs(&mut comparison, &normalized, |a, b| a == b);
    comparison
}

/// Dates that fail to parse are reported as `"<source>: <error>"` and left
/// out of the pairs.
pub fn compare_dates(values: &[(Source, Option<&str>)]) -> FieldComparison {
    let mut comparison = display_values(values);

    let mut parsed: Vec<(Source, ParsedDate)> = Vec::new();
    for (source, raw) in values {
        let Some(raw) = raw.filter(|v| !is_absent(v)) else {
            continue;
        };
        match parse_date(raw) {
            Ok(date) => parsed.push((*source, date)),
            Err(e) => comparison.errors.push(format!("{source}: {e}")),
        }
    }

    match_pairs(&mut comparison, &parsed, ParsedDate::matches);
    comparison
}

/// `|a - b| <= tolerance`, inclusive.
pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance + TOLERANCE_EPSILON
}

/// A form level: the whole value is the number, decorations aside.
fn plain_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// A device level: the first number in free text.
fn first_number(raw: &str) -> Option<f64> {
    FIRST_NUMBER.find(raw)?.as_str().replace(',', ".").parse().ok()
}

fn level_side(
    comparison: &mut FieldComparison,
    source: Source,
    label: &str,
    raw: Option<&str>,
    parse: fn(&str) -> Option<f64>,
) -> Option<f64> {
    let Some(raw) = raw.filter(|v| !is_absent(v)) else {
        comparison.values.insert(source, NA.to_string());
        comparison.errors.push(format!("Missing {label} battery data"));
        return None;
    };
    match parse(raw) {
        Some(level) => {
            comparison.values.insert(source, format!("{level:.2}%"));
            Some(level)
        }
        None => {
            comparison.values.insert(source, raw.trim().to_string());
            comparison.errors.push(format!("Invalid {label} battery level format: '{}'", raw.trim()));
            None
        }
    }
}

/// Battery level from the form against the device report. A missing or
/// unreadable side is an error, never a silent mismatch.
pub fn compare_battery_level(rvd: Option<&str>, aed: Option<&str>, tolerance: f64) -> FieldComparison {
    let mut comparison = FieldComparison::default();
    let rvd_level = level_side(&mut comparison, Source::Rvd, "RVD", rvd, plain_number);
    let aed_level = level_side(&mut comparison, Source::Aed, "AED", aed, first_number);

    if let (Some(a), Some(b)) = (rvd_level, aed_level) {
        comparison.set_match(Source::Rvd, Source::Aed, within_tolerance(a, b, tolerance));
    }
    comparison
}
