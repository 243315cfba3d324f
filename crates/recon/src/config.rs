use defibcheck_core::fields::rvd;
use defibcheck_core::{is_yes, DeviceGeneration, EquipmentClass, ExtractedDocument};
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// One inspection visit: which files to read and how to compare them.
/// File paths are relative to the config file.
#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    pub generation: DeviceGeneration,
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub changes: ChangesConfig,
    #[serde(default)]
    pub images: Vec<ImageConfig>,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentsConfig {
    /// Inspection form text. A run without it fails with a missing source.
    #[serde(default)]
    pub rvd: Option<String>,
    /// Device report text.
    #[serde(default)]
    pub aed: Option<String>,
}

// ---------------------------------------------------------------------------
// Change flags
// ---------------------------------------------------------------------------

/// Which parts were replaced during the visit. Decides which form fields
/// hold the values to compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFlags {
    #[serde(default)]
    pub battery: bool,
    #[serde(default)]
    pub adult_electrodes: bool,
    #[serde(default)]
    pub pediatric_electrodes: bool,
}

impl ChangeFlags {
    /// Read the form's `Changement …` answers. Anything but a yes is false.
    pub fn from_rvd(doc: &ExtractedDocument) -> Self {
        let answered_yes = |field: &str| doc.get(field).is_some_and(is_yes);
        Self {
            battery: answered_yes(rvd::BATTERY_CHANGED),
            adult_electrodes: answered_yes(rvd::ADULT_CHANGED),
            pediatric_electrodes: answered_yes(rvd::PEDIATRIC_CHANGED),
        }
    }
}

/// Explicit overrides; unset keys fall back to what the form says.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangesConfig {
    #[serde(default)]
    pub battery: Option<bool>,
    #[serde(default)]
    pub adult_electrodes: Option<bool>,
    #[serde(default)]
    pub pediatric_electrodes: Option<bool>,
}

impl ChangesConfig {
    pub fn resolve(&self, derived: ChangeFlags) -> ChangeFlags {
        ChangeFlags {
            battery: self.battery.unwrap_or(derived.battery),
            adult_electrodes: self.adult_electrodes.unwrap_or(derived.adult_electrodes),
            pediatric_electrodes: self.pediatric_electrodes.unwrap_or(derived.pediatric_electrodes),
        }
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A photographed label, already classified. Exactly one of `ocr`,
/// `barcodes`, or `serial`/`date` supplies the reading.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub class: EquipmentClass,
    /// JSON file of OCR tokens.
    #[serde(default)]
    pub ocr: Option<String>,
    /// Barcode payloads in decode order (electrodes only).
    #[serde(default)]
    pub barcodes: Option<Vec<String>>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Photo file name, carried into the record for reports.
    #[serde(default)]
    pub source: Option<String>,
}

impl ImageConfig {
    fn is_manual(&self) -> bool {
        self.serial.is_some() || self.date.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tolerance + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ToleranceConfig {
    /// Largest battery level gap, in percentage points, that still matches.
    #[serde(default = "default_battery_percent")]
    pub battery_percent: f64,
}

fn default_battery_percent() -> f64 {
    2.0
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            battery_percent: default_battery_percent(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        let tolerance = self.tolerance.battery_percent;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.battery_percent must be a non-negative number, got {tolerance}"
            )));
        }

        for (i, image) in self.images.iter().enumerate() {
            let sources = [image.ocr.is_some(), image.barcodes.is_some(), image.is_manual()];
            if sources.iter().filter(|s| **s).count() != 1 {
                return Err(ReconError::InvalidImage {
                    index: i,
                    reason: "exactly one of ocr, barcodes, or serial/date is required".into(),
                });
            }
            if image.barcodes.is_some() && image.class != EquipmentClass::Electrodes {
                return Err(ReconError::InvalidImage {
                    index: i,
                    reason: format!("barcodes are only read from electrodes, not {}", image.class),
                });
            }
            if image.ocr.is_some() && image.class == EquipmentClass::Electrodes {
                return Err(ReconError::InvalidImage {
                    index: i,
                    reason: "electrodes are read from barcodes, not OCR".into(),
                });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use defibcheck_core::DocumentRole;

    const VALID: &str = r#"
name = "Visite site 42"
generation = "g5"

[documents]
rvd = "rvd.txt"
aed = "aed.txt"

[[images]]
class = "battery"
ocr = "battery.ocr.json"

[[images]]
class = "electrodes"
barcodes = ["EL12345", "2026-05-01"]

[tolerance]
battery_percent = 3.0
"#;

    #[test]
    fn parse_valid() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Visite site 42");
        assert_eq!(config.generation, DeviceGeneration::G5);
        assert_eq!(config.documents.rvd.as_deref(), Some("rvd.txt"));
        assert_eq!(config.images.len(), 2);
        assert_eq!(config.images[1].class, EquipmentClass::Electrodes);
        assert_eq!(config.tolerance.battery_percent, 3.0);
        assert!(config.changes.battery.is_none());
    }

    #[test]
    fn tolerance_defaults_to_two_points() {
        let config = ReconConfig::from_toml(
            r#"
name = "n"
generation = "g3"
[documents]
"#,
        )
        .unwrap();
        assert_eq!(config.tolerance.battery_percent, 2.0);
        assert!(config.documents.rvd.is_none());
        assert!(config.images.is_empty());
    }

    #[test]
    fn rejects_unknown_generation() {
        let input = VALID.replace("\"g5\"", "\"g4\"");
        assert!(matches!(ReconConfig::from_toml(&input), Err(ReconError::ConfigParse(_))));
    }

    #[test]
    fn rejects_negative_tolerance() {
        let input = VALID.replace("3.0", "-1.0");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("battery_percent"), "{err}");
    }

    #[test]
    fn rejects_ambiguous_image() {
        let input = format!(
            r#"{VALID}
[[images]]
class = "battery"
ocr = "b.json"
serial = "X"
"#
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::InvalidImage { index: 2, .. }), "{err}");
    }

    #[test]
    fn rejects_barcodes_on_battery() {
        let input = format!(
            r#"{VALID}
[[images]]
class = "battery"
barcodes = ["A", "B"]
"#
        );
        assert!(ReconConfig::from_toml(&input).is_err());
    }

    #[test]
    fn change_flags_from_form_answers() {
        let mut doc = ExtractedDocument::new(DocumentRole::Rvd);
        doc.insert(rvd::BATTERY_CHANGED, Some("Oui".into()));
        doc.insert(rvd::ADULT_CHANGED, Some("Non".into()));
        doc.insert(rvd::PEDIATRIC_CHANGED, None);

        let flags = ChangeFlags::from_rvd(&doc);
        assert_eq!(
            flags,
            ChangeFlags {
                battery: true,
                adult_electrodes: false,
                pediatric_electrodes: false
            }
        );
    }

    #[test]
    fn overrides_win_over_form() {
        let changes = ChangesConfig {
            battery: Some(false),
            adult_electrodes: None,
            pediatric_electrodes: Some(true),
        };
        let derived = ChangeFlags {
            battery: true,
            adult_electrodes: true,
            pediatric_electrodes: false,
        };
        assert_eq!(
            changes.resolve(derived),
            ChangeFlags {
                battery: false,
                adult_electrodes: true,
                pediatric_electrodes: true
            }
        );
    }
}
