//! Keyword-anchored extraction of inspection form fields.
//!
//! The form text comes out of a PDF text extractor, one printed line per
//! line. A field's value is either on its keyword line or on a later line
//! when the form wrapped it.

use std::collections::BTreeMap;

use defibcheck_core::{is_not_applicable, DocumentRole, ExtractedDocument};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::registry::{FieldRegistry, FieldSpec, ValueShape};
use crate::text::strip_keyword_ci;

static ADMIN_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:Vérification|Validation).*$").expect("static admin pattern"));

static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{2}[/-]\d{2}[/-]\d{4}(?:\s+\d{2}:\d{2})?").expect("static date token pattern")
});

/// (field index, text after the keyword)
type Owner<'a> = Option<(usize, &'a str)>;

pub struct FieldExtractor {
    registry: FieldRegistry,
}

impl FieldExtractor {
    pub fn new(registry: FieldRegistry) -> Self {
        Self { registry }
    }

    pub fn rvd() -> Self {
        Self::new(FieldRegistry::rvd())
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Every registered field, keyed by name. Fields absent from the text map
    /// to `None`.
    pub fn extract(&self, text: &str) -> BTreeMap<String, Option<String>> {
        let lines: Vec<&str> = text.lines().collect();
        let owners: Vec<Owner<'_>> = lines.iter().map(|line| self.owner(line)).collect();

        let mut out = BTreeMap::new();
        for (idx, spec) in self.registry.fields.iter().enumerate() {
            let anchor = owners.iter().enumerate().find_map(|(line_no, owner)| match owner {
                Some((field, rest)) if *field == idx => Some((line_no, *rest)),
                _ => None,
            });

            let value = anchor.and_then(|(line_no, rest)| {
                value_for(spec, rest, &lines[line_no + 1..], &owners[line_no + 1..])
            });
            if value.is_none() {
                log::debug!("field '{}' not found", spec.name);
            }
            out.insert(spec.name.clone(), value);
        }
        out
    }

    pub fn extract_document(&self, text: &str, role: DocumentRole) -> ExtractedDocument {
        let mut doc = ExtractedDocument::new(role);
        doc.fields = self.extract(text);
        doc
    }

    /// The field whose keyword is the longest whole-word prefix of `line`.
    fn owner<'a>(&self, line: &'a str) -> Owner<'a> {
        let trimmed = line.trim_start();
        let mut best: Option<(usize, usize, &'a str)> = None;
        for (idx, spec) in self.registry.fields.iter().enumerate() {
            let keyword = spec.keyword();
            if let Some(rest) = strip_keyword_ci(trimmed, keyword) {
                let len = keyword.chars().count();
                if best.map_or(true, |(_, best_len, _)| len > best_len) {
                    best = Some((idx, len, rest));
                }
            }
        }
        best.map(|(idx, _, rest)| (idx, rest))
    }
}

/// Extract the built-in inspection form fields.
pub fn extract_rvd(text: &str) -> ExtractedDocument {
    FieldExtractor::rvd().extract_document(text, DocumentRole::Rvd)
}

fn value_for(spec: &FieldSpec, remainder: &str, following: &[&str], following_owners: &[Owner<'_>]) -> Option<String> {
    let inline = remainder.trim_start_matches(|c: char| c.is_whitespace() || c == ':');
    let inline = strip_admin_suffix(inline);
    if !inline.is_empty() {
        return Some(shape_value(spec.shape, inline));
    }

    for (line, owner) in following.iter().zip(following_owners) {
        if owner.is_some() {
            return None;
        }
        // Blank and boilerplate-only lines both strip to nothing
        let candidate = strip_admin_suffix(line.trim());
        if candidate.is_empty() {
            continue;
        }
        if spec.shape == ValueShape::Date && !DATE_TOKEN.is_match(candidate) {
            continue;
        }
        return Some(shape_value(spec.shape, candidate));
    }
    None
}

fn strip_admin_suffix(value: &str) -> &str {
    match ADMIN_SUFFIX.find(value) {
        Some(m) => value[..m.start()].trim(),
        None => value.trim(),
    }
}

fn shape_value(shape: ValueShape, raw: &str) -> String {
    match shape {
        ValueShape::Text => raw.to_string(),
        ValueShape::Serial => {
            if is_not_applicable(raw) {
                return raw.to_string();
            }
            raw.split_whitespace()
                .next()
                .unwrap_or("")
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect()
        }
        ValueShape::Date => match DATE_TOKEN.find(raw) {
            Some(m) => m.as_str().to_string(),
            None => raw.to_string(),
        },
        ValueShape::Percentage => raw
            .replace(',', ".")
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect(),
    }
}
