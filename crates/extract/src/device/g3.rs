use chrono::NaiveDateTime;
use defibcheck_core::fields::aed_g3;
use defibcheck_core::{DeviceGeneration, DocumentRole, ErrorLogEntry, ExtractedDocument};
use once_cell::sync::Lazy;
use regex::Regex;

use super::DeviceReportParser;
use crate::error::ExtractError;
use crate::text::{next_non_empty, strip_prefix_ci};

const LABELS: [&str; 7] = [
    aed_g3::SERIAL,
    aed_g3::LAST_FAILURE,
    aed_g3::LOT_NUMBER,
    aed_g3::COMMISSIONING_DATE,
    aed_g3::BATTERY_INITIAL,
    aed_g3::BATTERY_REMAINING,
    aed_g3::SELF_TEST,
];

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("static number pattern"));

static ERROR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^\s*((?:erreur|error|code)\s*[\w-]+)\s*:?\s+(\d{2}/\d{2}/\d{4})\s+(\d{2}:\d{2}(?::\d{2})?)")
        .expect("static error line pattern")
});

static BATTERY_INSTALLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Nouvelle batterie installée\s*:?\s*(\d{2}/\d{2}/\d{4}(?:\s+\d{2}:\d{2}(?::\d{2})?)?)")
        .expect("static installation pattern")
});

pub struct G3Parser;

impl DeviceReportParser for G3Parser {
    fn generation(&self) -> DeviceGeneration {
        DeviceGeneration::G3
    }

    fn parse(&self, text: &str) -> ExtractedDocument {
        match parse_report(text) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("G3 report could not be parsed: {e}");
                ExtractedDocument::failed(DocumentRole::AedG3, e.to_string())
            }
        }
    }
}

fn parse_report(text: &str) -> Result<ExtractedDocument, ExtractError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut doc = ExtractedDocument::new(DocumentRole::AedG3);

    for label in LABELS {
        let value = label_value(&lines, label);
        if value.is_none() {
            log::debug!("G3 report: '{label}' not found");
        }
        doc.insert(label, value);
    }

    let serial = doc.get(aed_g3::SERIAL).map(drop_leading_zero);
    doc.insert(aed_g3::SERIAL, serial);
    let lot = doc.get(aed_g3::LOT_NUMBER).map(format_lot);
    doc.insert(aed_g3::LOT_NUMBER, lot);

    let percent = battery_percent(
        doc.get(aed_g3::BATTERY_INITIAL),
        doc.get(aed_g3::BATTERY_REMAINING),
    )?;
    doc.insert(aed_g3::BATTERY_PERCENT, percent);

    let installed = BATTERY_INSTALLED
        .captures_iter(text)
        .last()
        .map(|caps| caps[1].trim().to_string());
    doc.insert(aed_g3::INSTALL_DATE, installed);

    for caps in ERROR_LINE.captures_iter(text) {
        match parse_timestamp(&caps[2], &caps[3]) {
            Ok(timestamp) => doc.error_log.push(ErrorLogEntry {
                timestamp,
                code: caps[1].trim().to_string(),
            }),
            Err(e) => log::warn!("G3 report: skipping error entry: {e}"),
        }
    }

    Ok(doc)
}

/// `label : value`, or the next non-empty line when the label stands alone.
/// A line that continues the label with other words is a different label.
fn label_value(lines: &[&str], label: &str) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        let Some(rest) = strip_prefix_ci(line.trim(), label) else {
            continue;
        };
        let rest = rest.trim_start();
        if rest.is_empty() {
            return wrapped_value(lines, i + 1);
        }
        if let Some(value) = rest.strip_prefix(':') {
            let value = value.trim();
            if value.is_empty() {
                return wrapped_value(lines, i + 1);
            }
            return Some(value.to_string());
        }
    }
    None
}

/// The value printed under its label, unless that line is another label.
fn wrapped_value(lines: &[&str], start: usize) -> Option<String> {
    let next = next_non_empty(lines, start)?;
    if LABELS.iter().any(|label| strip_prefix_ci(next, label).is_some()) {
        return None;
    }
    Some(next.to_string())
}

fn drop_leading_zero(serial: &str) -> String {
    serial.strip_prefix('0').unwrap_or(serial).to_string()
}

/// `1234567890` becomes `12345-67890`. Already separated or short values are
/// left alone.
fn format_lot(lot: &str) -> String {
    let head_is_digits = lot.len() > 5 && lot.as_bytes()[..5].iter().all(u8::is_ascii_digit);
    if head_is_digits && !lot.contains('-') {
        format!("{}-{}", &lot[..5], &lot[5..])
    } else {
        lot.to_string()
    }
}

fn capacity(field: &str, value: Option<&str>) -> Result<Option<f64>, ExtractError> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let invalid = || ExtractError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    };
    let number = NUMBER.find(value).ok_or_else(invalid)?;
    number
        .as_str()
        .replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| invalid())
}

fn battery_percent(initial: Option<&str>, remaining: Option<&str>) -> Result<Option<String>, ExtractError> {
    let initial = capacity(aed_g3::BATTERY_INITIAL, initial)?;
    let remaining = capacity(aed_g3::BATTERY_REMAINING, remaining)?;
    match (initial, remaining) {
        (Some(initial), Some(remaining)) if initial > 0.0 => {
            Ok(Some(format!("{:.2}", remaining / initial * 100.0)))
        }
        (Some(_), Some(_)) => {
            log::debug!("G3 report: initial battery capacity is zero, no percentage");
            Ok(None)
        }
        _ => Ok(None),
    }
}

fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, ExtractError> {
    let stamp = if time.len() == 5 {
        format!("{date} {time}:00")
    } else {
        format!("{date} {time}")
    };
    NaiveDateTime::parse_from_str(&stamp, "%d/%m/%Y %H:%M:%S")
        .map_err(|_| ExtractError::InvalidTimestamp { value: stamp })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> String {
        [
            "RAPPORT DSA G3",
            "Série DSA",
            "0412345678",
            "Dernier échec de DSA : Aucun",
            "Numéro de lot : 1234567890",
            "Date de mise en service : 10/01/2020",
            "Date de mise en service batterie : 11/01/2020",
            "Capacité initiale de la batterie 12V : 4200 mAh",
            "Capacité restante de la batterie 12V : 3570 mAh",
            "Autotest : Réussi",
            "Historique",
            "Nouvelle batterie installée 12/03/2021 09:00",
            "Erreur 102 : 14/02/2024 10:22:05",
            "Nouvelle batterie installée : 01/06/2023 14:12:00",
            "Erreur 7 : 15/02/2024 11:00",
        ]
        .join("\n")
    }

    #[test]
    fn labels_and_transforms() {
        let doc = G3Parser.parse(&sample_report());
        assert!(doc.failure.is_none());
        assert_eq!(doc.role, DocumentRole::AedG3);
        assert_eq!(doc.get(aed_g3::SERIAL), Some("412345678"));
        assert_eq!(doc.get(aed_g3::LOT_NUMBER), Some("12345-67890"));
        assert_eq!(doc.get(aed_g3::LAST_FAILURE), Some("Aucun"));
        // The battery line is a different label
        assert_eq!(doc.get(aed_g3::COMMISSIONING_DATE), Some("10/01/2020"));
        assert_eq!(doc.get(aed_g3::SELF_TEST), Some("Réussi"));
    }

    #[test]
    fn derived_battery_percentage() {
        let doc = G3Parser.parse(&sample_report());
        assert_eq!(doc.get(aed_g3::BATTERY_PERCENT), Some("85.00"));
    }

    #[test]
    fn last_installation_wins() {
        let doc = G3Parser.parse(&sample_report());
        assert_eq!(doc.get(aed_g3::INSTALL_DATE), Some("01/06/2023 14:12:00"));
    }

    #[test]
    fn error_entries() {
        let doc = G3Parser.parse(&sample_report());
        assert_eq!(doc.error_log.len(), 2);
        assert_eq!(doc.error_log[0].code, "Erreur 102");
        assert_eq!(doc.error_log[0].timestamp.to_string(), "2024-02-14 10:22:05");
        assert_eq!(doc.error_log[1].code, "Erreur 7");
        assert_eq!(doc.error_log[1].timestamp.to_string(), "2024-02-15 11:00:00");
    }

    #[test]
    fn percentage_has_two_decimals() {
        assert_eq!(battery_percent(Some("1000 mAh"), Some("800 mAh")).unwrap().as_deref(), Some("80.00"));
        assert_eq!(battery_percent(Some("0"), Some("800")).unwrap(), None);
    }

    #[test]
    fn no_percentage_without_both_readings() {
        let doc = G3Parser.parse("Capacité initiale de la batterie 12V : 4200");
        assert_eq!(doc.get(aed_g3::BATTERY_PERCENT), None);
        assert!(doc.failure.is_none());

        let doc = G3Parser.parse(
            "Capacité initiale de la batterie 12V : 0\nCapacité restante de la batterie 12V : 10",
        );
        assert_eq!(doc.get(aed_g3::BATTERY_PERCENT), None);
    }

    #[test]
    fn malformed_capacity_fails_the_document() {
        let doc = G3Parser.parse(
            "Série DSA : 123\nCapacité initiale de la batterie 12V : inconnue\nCapacité restante de la batterie 12V : 10",
        );
        assert!(doc.is_failed());
        assert!(doc.fields.is_empty());
        assert!(doc.failure.unwrap().contains("Capacité initiale"));
    }

    #[test]
    fn impossible_timestamp_skips_only_that_entry() {
        let doc = G3Parser.parse(
            "Série DSA : 0412345678\nNuméro de lot : 1234567890\nErreur 9 : 31/02/2024 10:00:00\nErreur 4 : 01/03/2024 08:15",
        );
        assert!(doc.failure.is_none());
        assert_eq!(doc.get(aed_g3::SERIAL), Some("412345678"));
        assert_eq!(doc.get(aed_g3::LOT_NUMBER), Some("12345-67890"));
        assert_eq!(doc.error_log.len(), 1);
        assert_eq!(doc.error_log[0].code, "Erreur 4");
    }

    #[test]
    fn standalone_label_does_not_take_the_next_label() {
        let doc = G3Parser.parse("Série DSA\n\nDernier échec de DSA : Aucun");
        assert_eq!(doc.get(aed_g3::SERIAL), None);
        assert_eq!(doc.get(aed_g3::LAST_FAILURE), Some("Aucun"));

        let doc = G3Parser.parse("Série DSA :\n   \n0412345678");
        assert_eq!(doc.get(aed_g3::SERIAL), Some("412345678"));
    }

    #[test]
    fn lot_formatting() {
        assert_eq!(format_lot("1234567890"), "12345-67890");
        assert_eq!(format_lot("12345-67890"), "12345-67890");
        assert_eq!(format_lot("12345"), "12345");
        assert_eq!(format_lot("AB1234567"), "AB1234567");
    }
}
