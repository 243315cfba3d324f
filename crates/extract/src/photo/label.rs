//! Serial and date heuristics over OCR tokens read from equipment labels.
//!
//! Tokens arrive in reading order. Each heuristic is specific to one label
//! layout; none of them uses token positions.

use defibcheck_core::OcrToken;
use once_cell::sync::Lazy;
use regex::Regex;

/// Serial and date read off one label. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelReading {
    pub serial: Option<String>,
    pub date: Option<String>,
}

impl LabelReading {
    pub fn new(serial: Option<String>, date: Option<String>) -> Self {
        Self { serial, date }
    }
}

static G3_SERIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{5,10})\b").expect("static pattern"));
static G3_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2}|\d{6})\b").expect("static pattern"));

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static pattern"));
static G5_SERIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]*\s*[\dOo]+").expect("static pattern"));

// Lot markers include the usual OCR misreadings of "LOT"
static BATTERY_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:SN|LOT|Lon|Loz|Lo|Lool|LOTI|Lotl|LOI|Lod)\b").expect("static pattern")
});
static BATTERY_SERIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9A-Za-z\-]{5,})\b").expect("static pattern"));

/// G3 defibrillator label: first 5-10 digit run is the serial, first ISO or
/// six-digit run is the manufacturing date.
pub fn extract_defibrillator_g3(tokens: &[OcrToken]) -> LabelReading {
    let mut reading = LabelReading::default();
    for token in tokens {
        if reading.serial.is_none() {
            reading.serial = G3_SERIAL.captures(&token.text).map(|c| c[1].to_string());
        }
        if reading.date.is_none() {
            reading.date = G3_DATE.captures(&token.text).map(|c| c[1].to_string());
        }
    }
    reading
}

/// G5 defibrillator label: the serial follows an `SN` / `Serial Number`
/// token, with letter O read as zero. The last ISO date wins.
pub fn extract_defibrillator_g5(tokens: &[OcrToken]) -> LabelReading {
    let mut reading = LabelReading::default();
    let mut marker_seen = false;

    for token in tokens {
        let text = token.text.as_str();
        if text.contains("SN") || text.contains("Serial Number") {
            marker_seen = true;
            continue;
        }
        if marker_seen {
            // A match without any digit is a word, not a serial
            let serial = G5_SERIAL
                .find_iter(text)
                .map(|m| m.as_str())
                .find(|s| s.bytes().any(|b| b.is_ascii_digit()));
            if let Some(serial) = serial {
                reading.serial = Some(serial.trim().replace(['O', 'o'], "0"));
                marker_seen = false;
            }
        }
        if let Some(m) = ISO_DATE.find(text) {
            reading.date = Some(m.as_str().to_string());
        }
    }
    reading
}

/// Battery label: the serial is the first long alphanumeric token after a
/// lot / serial marker. The last ISO date wins.
pub fn extract_battery(tokens: &[OcrToken]) -> LabelReading {
    let mut reading = LabelReading::default();
    let mut marker_seen = false;

    for token in tokens {
        let text = token.text.as_str();
        if BATTERY_MARKER.is_match(text) {
            marker_seen = true;
            continue;
        }
        if marker_seen {
            if let Some(caps) = BATTERY_SERIAL.captures(text) {
                reading.serial = Some(caps[1].to_string());
                marker_seen = false;
            }
        }
        if let Some(m) = ISO_DATE.find(text) {
            reading.date = Some(m.as_str().to_string());
        }
    }
    reading
}
