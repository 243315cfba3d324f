//! Date normalization for the heterogeneous date strings found on inspection
//! forms, device reports and equipment labels.
//!
//! Numeric forms are matched against an ordered pattern table after the input
//! is cleaned down to digits and separators. Order matters: full dates are
//! tried before month/year forms, and day-first before US month-first, so a
//! string is only read as `MM/DD/YYYY` when it cannot be a European date.
//! Month-name forms (`31 décembre 2023`, `Dec 2023`) are tried last, searched
//! for in the raw text, since cleaning strips letters.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// How much of a date the source actually recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateGranularity {
    Day,
    /// Only month and year were present; the day was filled in as 1.
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub granularity: DateGranularity,
}

impl ParsedDate {
    pub fn day(date: NaiveDate) -> Self {
        Self { date, granularity: DateGranularity::Day }
    }

    pub fn month(date: NaiveDate) -> Self {
        Self { date, granularity: DateGranularity::Month }
    }

    pub fn is_month_only(&self) -> bool {
        self.granularity == DateGranularity::Month
    }

    /// Equality across sources. When either side only knows the month, the
    /// day is ignored.
    pub fn matches(&self, other: &ParsedDate) -> bool {
        if self.is_month_only() || other.is_month_only() {
            self.date.year() == other.date.year() && self.date.month() == other.date.month()
        } else {
            self.date == other.date
        }
    }
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            DateGranularity::Day => write!(f, "{}", self.date.format("%Y-%m-%d")),
            DateGranularity::Month => write!(f, "{}", self.date.format("%Y-%m")),
        }
    }
}

/// No known pattern matched. Carries the cleaned input for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    pub cleaned: String,
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unrecognized format: {}", self.cleaned)
    }
}

impl std::error::Error for DateParseError {}

// ---------------------------------------------------------------------------
// Pattern table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum FieldOrder {
    Dmy,
    Ymd,
    Mdy,
    /// Day-first with a two-digit year.
    DmyShort,
    My,
    Ym,
}

struct DatePattern {
    re: Regex,
    order: FieldOrder,
}

static NUMERIC_PATTERNS: Lazy<Vec<DatePattern>> = Lazy::new(|| {
    let table: [(&str, FieldOrder); 7] = [
        (r"^(\d{1,2})-(\d{1,2})-(\d{4})$", FieldOrder::Dmy),
        (r"^(\d{4})-(\d{1,2})-(\d{1,2})$", FieldOrder::Ymd),
        (r"^(\d{1,2})-(\d{1,2})-(\d{4})$", FieldOrder::Mdy),
        (r"^(\d{4})(\d{2})(\d{2})$", FieldOrder::Ymd),
        (r"^(\d{1,2})-(\d{1,2})-(\d{2})$", FieldOrder::DmyShort),
        (r"^(\d{1,2})-(\d{4})$", FieldOrder::My),
        (r"^(\d{4})-(\d{1,2})$", FieldOrder::Ym),
    ];
    table
        .into_iter()
        .map(|(pattern, order)| DatePattern {
            re: Regex::new(pattern).expect("static date pattern"),
            order,
        })
        .collect()
});

static NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d:/ \-]").expect("static noise pattern"));

static MONTH_NAME_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\b(\d{1,2})(?:er)?\s+)?\b(\p{L}+)\.?\s+(\d{4})\b").expect("static month-name pattern")
});

const MONTH_NAMES: &[(&str, u32)] = &[
    ("janvier", 1), ("janv", 1), ("jan", 1), ("january", 1),
    ("février", 2), ("fevrier", 2), ("févr", 2), ("fevr", 2), ("fév", 2), ("fev", 2), ("feb", 2), ("february", 2),
    ("mars", 3), ("mar", 3), ("march", 3),
    ("avril", 4), ("avr", 4), ("apr", 4), ("april", 4),
    ("mai", 5), ("may", 5),
    ("juin", 6), ("jun", 6), ("june", 6),
    ("juillet", 7), ("juil", 7), ("jul", 7), ("july", 7),
    ("août", 8), ("aout", 8), ("aug", 8), ("august", 8),
    ("septembre", 9), ("sept", 9), ("sep", 9), ("september", 9),
    ("octobre", 10), ("oct", 10), ("october", 10),
    ("novembre", 11), ("nov", 11), ("november", 11),
    ("décembre", 12), ("decembre", 12), ("déc", 12), ("dec", 12), ("december", 12),
];

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a raw date string into a calendar date.
///
/// Time of day, when present, is discarded.
pub fn parse_date(raw: &str) -> Result<ParsedDate, DateParseError> {
    let cleaned = clean(raw);
    let date_part = cleaned.split(' ').next().unwrap_or("");

    for pattern in NUMERIC_PATTERNS.iter() {
        if let Some(caps) = pattern.re.captures(date_part) {
            let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i32>().ok());
            if let Some(parsed) = build(pattern.order, num(1), num(2), num(3)) {
                return Ok(parsed);
            }
        }
    }

    if let Some(parsed) = parse_month_name(raw) {
        return Ok(parsed);
    }

    Err(DateParseError { cleaned })
}

/// Strip everything but digits and separators, and unify `/` into `-`.
fn clean(raw: &str) -> String {
    NOISE.replace_all(raw, "").trim().replace('/', "-")
}

fn build(order: FieldOrder, a: Option<i32>, b: Option<i32>, c: Option<i32>) -> Option<ParsedDate> {
    let ymd = |y: i32, m: i32, d: i32| -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, u32::try_from(m).ok()?, u32::try_from(d).ok()?)
    };
    match order {
        FieldOrder::Dmy => ymd(c?, b?, a?).map(ParsedDate::day),
        FieldOrder::Ymd => ymd(a?, b?, c?).map(ParsedDate::day),
        FieldOrder::Mdy => ymd(c?, a?, b?).map(ParsedDate::day),
        FieldOrder::DmyShort => {
            let yy = c?;
            let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
            ymd(year, b?, a?).map(ParsedDate::day)
        }
        FieldOrder::My => ymd(b?, a?, 1).map(ParsedDate::month),
        FieldOrder::Ym => ymd(a?, b?, 1).map(ParsedDate::month),
    }
}

/// First `[day] month year` run in the text whose word is a known month.
/// Surrounding words (`Le`, `fabriqué en`) are ignored.
fn parse_month_name(raw: &str) -> Option<ParsedDate> {
    let lower = raw.trim().to_lowercase();
    let (caps, month) = MONTH_NAME_FORM.captures_iter(&lower).find_map(|caps| {
        let name = caps.get(2)?.as_str();
        let month = MONTH_NAMES.iter().find(|(n, _)| *n == name).map(|(_, m)| *m)?;
        Some((caps, month))
    })?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;

    match caps.get(1) {
        Some(day) => {
            let day: u32 = day.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day).map(ParsedDate::day)
        }
        None => NaiveDate::from_ymd_opt(year, month, 1).map(ParsedDate::month),
    }
}
