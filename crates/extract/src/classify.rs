//! Which document is which, for uploads that arrive without a declared role.

use defibcheck_core::fields::{aed_g3, aed_g5};
use defibcheck_core::{DeviceGeneration, DocumentRole};
use once_cell::sync::Lazy;
use regex::Regex;

const RVD_KEYWORDS: [&str; 3] = [
    "rapport de vérification défibrillateur",
    "commentaire fin d'intervention",
    "numéro de série defibrillateur",
];

/// `g5`/`g3` as a standalone token. `_` and `.` count as separators so file
/// names like `export_g5.pdf` qualify while serials like `AG5123` do not.
static GENERATION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^\p{L}\d])g([35])(?:[^\p{L}\d]|$)").expect("static generation pattern"));

/// A G5 mention wins over a G3 one.
fn named_generation(text: &str) -> Option<DeviceGeneration> {
    let digits: Vec<String> = GENERATION_TOKEN.captures_iter(text).map(|caps| caps[1].to_string()).collect();
    if digits.iter().any(|d| d == "5") {
        Some(DeviceGeneration::G5)
    } else if digits.iter().any(|d| d == "3") {
        Some(DeviceGeneration::G3)
    } else {
        None
    }
}

pub fn is_rvd_document(filename: &str, text: &str) -> bool {
    if filename.to_lowercase().contains("rapport de vérification") {
        return true;
    }
    let text = text.to_lowercase();
    RVD_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// Generation named in the file name or text, else inferred from the report
/// labels each generation prints.
pub fn detect_generation(filename: &str, text: &str) -> Option<DeviceGeneration> {
    if let Some(generation) = named_generation(filename).or_else(|| named_generation(text)) {
        return Some(generation);
    }
    if text.contains(aed_g5::SERIAL) {
        return Some(DeviceGeneration::G5);
    }
    if text.contains(aed_g3::SERIAL) {
        return Some(DeviceGeneration::G3);
    }
    None
}

pub fn detect_role(filename: &str, text: &str) -> Option<DocumentRole> {
    if is_rvd_document(filename, text) {
        return Some(DocumentRole::Rvd);
    }
    detect_generation(filename, text).map(DocumentRole::aed)
}
