use chrono::NaiveDateTime;
use defibcheck_core::fields::aed_g5;
use defibcheck_core::{DeviceGeneration, DocumentRole, ErrorLogEntry, ExtractedDocument};
use once_cell::sync::Lazy;
use regex::Regex;

use super::DeviceReportParser;

const KEYWORDS: [&str; 6] = [
    aed_g5::SERIAL,
    aed_g5::BATTERY_SERIAL,
    aed_g5::BATTERY_REMAINING,
    aed_g5::INSTALL_DATE,
    aed_g5::ACTIVE_ERRORS,
    aed_g5::REPORT_DATE,
];

/// Value is the rest of the keyword's line. The separator class spans
/// newlines, so a keyword alone on its line takes the next line.
static KEYWORD_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .map(|kw| {
            let re = Regex::new(&format!(r"{}[\s:]*([^\n]*)", regex::escape(kw)))
                .expect("static keyword pattern");
            (*kw, re)
        })
        .collect()
});

static ERROR_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2})\s+(0x[0-9A-Fa-f]+)").expect("static error entry pattern")
});

pub struct G5Parser;

impl DeviceReportParser for G5Parser {
    fn generation(&self) -> DeviceGeneration {
        DeviceGeneration::G5
    }

    fn parse(&self, text: &str) -> ExtractedDocument {
        let mut doc = ExtractedDocument::new(DocumentRole::AedG5);

        for (keyword, re) in KEYWORD_PATTERNS.iter() {
            let value = re
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string());
            if value.is_none() {
                log::debug!("G5 report: '{keyword}' not found");
            }
            doc.insert(*keyword, value);
        }

        for caps in ERROR_ENTRY.captures_iter(text) {
            let stamp = &caps[1];
            match NaiveDateTime::parse_from_str(stamp, "%d/%m/%Y %H:%M:%S") {
                Ok(timestamp) => doc.error_log.push(ErrorLogEntry {
                    timestamp,
                    code: caps[2].to_string(),
                }),
                Err(_) => log::warn!("G5 report: skipping error entry with invalid timestamp '{stamp}'"),
            }
        }

        doc
    }
}
