use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display form of a field the extractor could not locate.
pub const NOT_FOUND: &str = "Non trouvé";

// ---------------------------------------------------------------------------
// Device generation + document role
// ---------------------------------------------------------------------------

/// AED hardware generation. The two generations emit differently laid-out
/// reports and carry different field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceGeneration {
    G3,
    G5,
}

impl fmt::Display for DeviceGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::G3 => write!(f, "G3"),
            Self::G5 => write!(f, "G5"),
        }
    }
}

impl FromStr for DeviceGeneration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g3" | "3" => Ok(Self::G3),
            "g5" | "5" => Ok(Self::G5),
            other => Err(format!("unknown device generation: \"{other}\" (expected g3 or g5)")),
        }
    }
}

/// Which document a set of extracted fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentRole {
    #[serde(rename = "RVD")]
    Rvd,
    #[serde(rename = "AEDG3")]
    AedG3,
    #[serde(rename = "AEDG5")]
    AedG5,
}

impl DocumentRole {
    pub fn aed(generation: DeviceGeneration) -> Self {
        match generation {
            DeviceGeneration::G3 => Self::AedG3,
            DeviceGeneration::G5 => Self::AedG5,
        }
    }

    pub fn generation(&self) -> Option<DeviceGeneration> {
        match self {
            Self::Rvd => None,
            Self::AedG3 => Some(DeviceGeneration::G3),
            Self::AedG5 => Some(DeviceGeneration::G5),
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rvd => write!(f, "RVD"),
            Self::AedG3 => write!(f, "AEDG3"),
            Self::AedG5 => write!(f, "AEDG5"),
        }
    }
}

// ---------------------------------------------------------------------------
// Extracted documents
// ---------------------------------------------------------------------------

/// One entry of a device report's error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub timestamp: NaiveDateTime,
    pub code: String,
}

/// Field values pulled out of one document.
///
/// `None` marks a field that was looked for and not found, which is not the
/// same thing as a field found with an empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub role: DocumentRole,
    pub fields: BTreeMap<String, Option<String>>,
    /// Device error log, in source order. Empty for the RVD form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_log: Vec<ErrorLogEntry>,
    /// Set when the parser hit malformed input and gave up on the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ExtractedDocument {
    pub fn new(role: DocumentRole) -> Self {
        Self {
            role,
            fields: BTreeMap::new(),
            error_log: Vec::new(),
            failure: None,
        }
    }

    /// A document whose parser failed; carries only the failure message.
    pub fn failed(role: DocumentRole, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(role)
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.insert(name.into(), value);
    }

    /// Raw value of a field, `None` when the field is unknown or was not found.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    /// Like [`get`](Self::get) but also hides empty and `N/A` values.
    pub fn present(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !crate::is_absent(v))
    }

    pub fn is_found(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(Some(_)))
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Equipment shown in a photograph, as decided by the external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentClass {
    Defibrillator,
    Battery,
    Electrodes,
}

impl EquipmentClass {
    /// Map a classifier label such as `"Defibrillateur G5"` or `"Batterie"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();
        if lower.contains("defibrillat") || lower.contains("défibrillat") {
            Some(Self::Defibrillator)
        } else if lower.contains("batter") {
            Some(Self::Battery)
        } else if lower.contains("lectrode") {
            Some(Self::Electrodes)
        } else {
            None
        }
    }
}

impl fmt::Display for EquipmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defibrillator => write!(f, "defibrillator"),
            Self::Battery => write!(f, "battery"),
            Self::Electrodes => write!(f, "electrodes"),
        }
    }
}

impl FromStr for EquipmentClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown equipment class: \"{s}\""))
    }
}

/// One recognized text fragment from the OCR collaborator. Position data is
/// not used by any extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl OcrToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }
}

/// Serial and date recovered from one photograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub class: EquipmentClass,
    pub serial: Option<String>,
    pub date: Option<String>,
    /// Where the image came from (file name or upload handle).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ImageRecord {
    pub fn new(class: EquipmentClass, serial: Option<String>, date: Option<String>) -> Self {
        Self {
            class,
            serial,
            date,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
