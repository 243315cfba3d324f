use std::collections::BTreeMap;
use std::fmt;

use defibcheck_core::{DeviceGeneration, ExtractedDocument, ImageRecord};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::config::ChangeFlags;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Everything one reconciliation run looks at. Documents are already
/// extracted; the engine never sees raw text.
#[derive(Debug, Clone)]
pub struct ReconInput<'a> {
    pub rvd: Option<&'a ExtractedDocument>,
    pub aed: Option<&'a ExtractedDocument>,
    pub images: &'a [ImageRecord],
    pub generation: DeviceGeneration,
    pub changes: ChangeFlags,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where a compared value came from. Declaration order is the canonical
/// pair order used in match keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    /// Value as printed on the inspection form.
    Rvd,
    /// Value the technician read off the equipment ("relevé").
    RvdReleve,
    /// Device report.
    Aed,
    /// Equipment photograph.
    Image,
}

impl Source {
    pub const ALL: [Source; 4] = [Self::Rvd, Self::RvdReleve, Self::Aed, Self::Image];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Rvd => "rvd",
            Self::RvdReleve => "rvd_releve",
            Self::Aed => "aed",
            Self::Image => "image",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// `match_<a>_<b>` with the pair in canonical order.
pub fn match_key(a: Source, b: Source) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("match_{}_{}", first.key(), second.key())
}

fn parse_match_key(key: &str) -> Option<(Source, Source)> {
    let pairs = Source::ALL
        .into_iter()
        .flat_map(|a| Source::ALL.into_iter().filter(move |b| a < *b).map(move |b| (a, b)));
    pairs.into_iter().find(|(a, b)| match_key(*a, *b) == key)
}

// ---------------------------------------------------------------------------
// Field comparison
// ---------------------------------------------------------------------------

/// Outcome of comparing one logical field across its sources.
///
/// A pair without an entry in `matches` was not comparable (one side absent
/// or unparseable), which is not the same as a recorded mismatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldComparison {
    /// Raw value per source, `"N/A"` when absent.
    pub values: BTreeMap<Source, String>,
    pub matches: BTreeMap<(Source, Source), bool>,
    pub errors: Vec<String>,
}

impl FieldComparison {
    pub fn value(&self, source: Source) -> Option<&str> {
        self.values.get(&source).map(String::as_str)
    }

    /// Match flag for a pair, in either order.
    pub fn matched(&self, a: Source, b: Source) -> Option<bool> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.matches.get(&key).copied()
    }

    pub fn set_match(&mut self, a: Source, b: Source, matched: bool) {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.matches.insert(key, matched);
    }
}

impl Serialize for FieldComparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + self.matches.len() + 1))?;
        for (source, value) in &self.values {
            map.serialize_entry(source.key(), value)?;
        }
        for ((a, b), matched) in &self.matches {
            map.serialize_entry(&match_key(*a, *b), matched)?;
        }
        map.serialize_entry("errors", &self.errors)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldComparison {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
        let mut out = FieldComparison::default();

        for (key, value) in raw {
            if key == "errors" {
                out.errors = serde_json::from_value(value).map_err(de::Error::custom)?;
            } else if let Some((a, b)) = parse_match_key(&key) {
                let matched = value
                    .as_bool()
                    .ok_or_else(|| de::Error::custom(format!("'{key}' must be a boolean")))?;
                out.matches.insert((a, b), matched);
            } else if let Some(source) = Source::from_key(&key) {
                let text = value
                    .as_str()
                    .ok_or_else(|| de::Error::custom(format!("'{key}' must be a string")))?;
                out.values.insert(source, text.to_string());
            } else {
                return Err(de::Error::custom(format!("unknown comparison key '{key}'")));
            }
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Sections + run
// ---------------------------------------------------------------------------

/// Logical field name to comparison. `None` marks a comparison that was
/// deliberately suppressed (equipment not fitted).
pub type SectionResult = BTreeMap<String, Option<FieldComparison>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectrodesResult {
    pub adultes: SectionResult,
    /// Empty, and left out of the JSON, unless pediatric pads were changed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pediatriques: SectionResult,
}

/// A run-level failure. Sections are empty when one is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunFailure {
    MissingSource { role: String },
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource { role } => write!(f, "missing source document: {role}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub generation: DeviceGeneration,
    pub changes: ChangeFlags,
    pub battery_tolerance_percent: f64,
    pub engine_version: String,
    /// Problems with the inputs that did not stop the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRun {
    pub meta: RunMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<RunFailure>,
    pub defibrillateur: SectionResult,
    pub batterie: SectionResult,
    pub electrodes: ElectrodesResult,
}

impl ComparisonRun {
    /// Sections in report order, electrodes split by kind.
    pub fn sections(&self) -> [(&'static str, &SectionResult); 4] {
        [
            ("defibrillateur", &self.defibrillateur),
            ("batterie", &self.batterie),
            ("electrodes/adultes", &self.electrodes.adultes),
            ("electrodes/pediatriques", &self.electrodes.pediatriques),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison() -> FieldComparison {
        let mut c = FieldComparison::default();
        c.values.insert(Source::Rvd, "ABC123".into());
        c.values.insert(Source::RvdReleve, "N/A".into());
        c.values.insert(Source::Aed, "abc-123".into());
        c.set_match(Source::Aed, Source::Rvd, true);
        c
    }

    #[test]
    fn match_keys_use_canonical_order() {
        assert_eq!(match_key(Source::Rvd, Source::Aed), "match_rvd_aed");
        assert_eq!(match_key(Source::Image, Source::RvdReleve), "match_rvd_releve_image");
        assert_eq!(parse_match_key("match_rvd_releve_aed"), Some((Source::RvdReleve, Source::Aed)));
        assert_eq!(parse_match_key("match_aed_rvd"), None);
    }

    #[test]
    fn serializes_flat() {
        let json = serde_json::to_value(comparison()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "rvd": "ABC123",
                "rvd_releve": "N/A",
                "aed": "abc-123",
                "match_rvd_aed": true,
                "errors": []
            })
        );
    }

    #[test]
    fn missing_pair_is_not_a_mismatch() {
        let c = comparison();
        assert_eq!(c.matched(Source::Rvd, Source::Aed), Some(true));
        assert_eq!(c.matched(Source::Aed, Source::Rvd), Some(true));
        assert_eq!(c.matched(Source::Rvd, Source::RvdReleve), None);
    }

    #[test]
    fn comparison_round_trips() {
        let mut c = comparison();
        c.errors.push("image: Unrecognized format: -".into());
        let back: FieldComparison = serde_json::from_str(&serde_json::to_string(&c).unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = serde_json::from_str::<FieldComparison>(r#"{"scanner": "x", "errors": []}"#).unwrap_err();
        assert!(err.to_string().contains("unknown comparison key 'scanner'"));
        assert!(serde_json::from_str::<FieldComparison>(r#"{"match_rvd_aed": "yes"}"#).is_err());
    }

    #[test]
    fn failure_is_tagged() {
        let failure = RunFailure::MissingSource { role: "RVD".into() };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "missing_source", "role": "RVD"}));
        assert_eq!(failure.to_string(), "missing source document: RVD");
    }
}
