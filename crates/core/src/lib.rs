//! `defibcheck-core`: shared types for the defibrillator maintenance checker.
//!
//! Holds the data model that flows between extraction and reconciliation,
//! plus the two value normalizers both sides rely on.

pub mod date;
pub mod fields;
pub mod model;
pub mod serial;

pub use date::{parse_date, DateGranularity, DateParseError, ParsedDate};
pub use fields::{is_not_applicable, is_yes};
pub use model::{
    DeviceGeneration, DocumentRole, EquipmentClass, ErrorLogEntry, ExtractedDocument, ImageRecord,
    OcrToken, NOT_FOUND,
};
pub use serial::{normalize_serial, Serial};

/// Placeholder rendered for an absent value.
pub const NA: &str = "N/A";

/// True when a raw value carries no information: empty, `N/A`, or the
/// extraction "not found" marker.
pub fn is_absent(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case(NA)
        || trimmed.eq_ignore_ascii_case(NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_markers() {
        assert!(is_absent(""));
        assert!(is_absent("   "));
        assert!(is_absent("N/A"));
        assert!(is_absent("n/a"));
        assert!(is_absent("Non trouvé"));
        assert!(!is_absent("0"));
        assert!(!is_absent("ABC123"));
    }
}
