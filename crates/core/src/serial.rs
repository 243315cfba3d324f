//! Serial and lot number canonicalization.
//!
//! OCR confusables (letter O vs digit 0) are resolved by the label extractors
//! before values reach this stage.

use std::fmt;

/// A canonical serial, or the marker for "nothing to compare".
///
/// `Absent` is never equal to anything, including another `Absent`: two
/// sources that both lack a serial do not agree on one.
#[derive(Debug, Clone)]
pub enum Serial {
    Absent,
    Present(String),
}

impl Serial {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Present(s) => Some(s),
        }
    }
}

impl PartialEq for Serial {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Present(a), Self::Present(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "{}", crate::NA),
            Self::Present(s) => write!(f, "{s}"),
        }
    }
}

/// Uppercase, drop separators and punctuation, drop leading zeros.
pub fn normalize_serial(raw: &str) -> Serial {
    if crate::is_absent(raw) {
        return Serial::Absent;
    }

    let canonical: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect();

    let trimmed = canonical.trim_start_matches('0');
    let canonical = match (trimmed.is_empty(), canonical.is_empty()) {
        (_, true) => return Serial::Absent,
        (true, false) => "0".to_string(),
        (false, false) => trimmed.to_string(),
    };

    Serial::Present(canonical)
}
