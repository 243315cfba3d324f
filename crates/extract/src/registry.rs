//! The table of inspection form fields the extractor looks for.
//!
//! Each field is found by a keyword that starts its line on the form. The
//! shape decides how the text after the keyword is cleaned up.

use std::collections::HashSet;

use defibcheck_core::fields::rvd;
use serde::Deserialize;

use crate::error::ExtractError;

// ---------------------------------------------------------------------------
// Field specs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Free text, kept as written.
    Text,
    /// Single alphanumeric token.
    Serial,
    /// A date, re-extracted from surrounding text when possible.
    Date,
    /// A number, stripped of `%` and other decoration.
    Percentage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    /// Key in the extracted document.
    pub name: String,
    /// Line prefix on the form. Defaults to `name`.
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default = "default_shape")]
    pub shape: ValueShape,
}

fn default_shape() -> ValueShape {
    ValueShape::Text
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, shape: ValueShape) -> Self {
        Self {
            name: name.into(),
            keyword: None,
            shape,
        }
    }

    pub fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FieldRegistry {
    pub fields: Vec<FieldSpec>,
}

const RVD_FIELDS: &[(&str, ValueShape)] = &[
    (rvd::COMMENT, ValueShape::Text),
    (rvd::REPORT_DATE, ValueShape::Date),
    (rvd::SITE_CODE, ValueShape::Text),
    (rvd::DEFIB_SERIAL, ValueShape::Serial),
    (rvd::DEFIB_SERIAL_RELEVE, ValueShape::Serial),
    (rvd::DEFIB_FAB_DATE, ValueShape::Date),
    (rvd::DEFIB_FAB_DATE_RELEVE, ValueShape::Date),
    (rvd::BATTERY_SERIAL, ValueShape::Serial),
    (rvd::BATTERY_SERIAL_RELEVE, ValueShape::Serial),
    (rvd::BATTERY_FAB_DATE, ValueShape::Date),
    (rvd::BATTERY_FAB_DATE_RELEVE, ValueShape::Date),
    (rvd::BATTERY_INSTALL_DATE, ValueShape::Date),
    (rvd::BATTERY_INSTALL_DATE_RELEVE, ValueShape::Date),
    (rvd::BATTERY_LEVEL, ValueShape::Percentage),
    (rvd::BATTERY_CHANGED, ValueShape::Text),
    (rvd::NEW_BATTERY_SERIAL, ValueShape::Serial),
    (rvd::NEW_BATTERY_INSTALL_DATE, ValueShape::Date),
    (rvd::NEW_BATTERY_FAB_DATE, ValueShape::Date),
    (rvd::NEW_BATTERY_LEVEL, ValueShape::Percentage),
    (rvd::ADULT_SERIAL, ValueShape::Serial),
    (rvd::ADULT_SERIAL_RELEVE, ValueShape::Serial),
    (rvd::ADULT_EXPIRY, ValueShape::Date),
    (rvd::ADULT_EXPIRY_RELEVE, ValueShape::Date),
    (rvd::ADULT_CHANGED, ValueShape::Text),
    (rvd::NEW_ADULT_SERIAL, ValueShape::Serial),
    (rvd::NEW_ADULT_EXPIRY, ValueShape::Date),
    (rvd::PEDIATRIC_SERIAL, ValueShape::Serial),
    (rvd::PEDIATRIC_SERIAL_RELEVE, ValueShape::Serial),
    (rvd::PEDIATRIC_EXPIRY, ValueShape::Date),
    (rvd::PEDIATRIC_EXPIRY_RELEVE, ValueShape::Date),
    (rvd::PEDIATRIC_CHANGED, ValueShape::Text),
    (rvd::NEW_PEDIATRIC_SERIAL, ValueShape::Serial),
    (rvd::NEW_PEDIATRIC_EXPIRY, ValueShape::Date),
];

impl FieldRegistry {
    /// The built-in inspection form layout.
    pub fn rvd() -> Self {
        Self {
            fields: RVD_FIELDS
                .iter()
                .map(|(name, shape)| FieldSpec::new(*name, *shape))
                .collect(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ExtractError> {
        let registry: FieldRegistry =
            toml::from_str(input).map_err(|e| ExtractError::RegistryParse(e.to_string()))?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.fields.is_empty() {
            return Err(ExtractError::RegistryValidation("registry has no fields".into()));
        }

        let mut seen = HashSet::new();
        for spec in &self.fields {
            if spec.name.trim().is_empty() {
                return Err(ExtractError::RegistryValidation("field with empty name".into()));
            }
            if spec.keyword().trim().is_empty() {
                return Err(ExtractError::RegistryValidation(format!(
                    "field '{}': empty keyword",
                    spec.name
                )));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ExtractError::RegistryValidation(format!(
                    "duplicate field '{}'",
                    spec.name
                )));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
