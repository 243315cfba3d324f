use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{match_key, ComparisonRun};

/// One pair of sources that disagreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCheck {
    pub section: String,
    pub field: String,
    /// Match key of the pair, e.g. `match_rvd_aed`.
    pub pair: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCounts {
    pub total: usize,
    pub matched: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Pairs that could be compared. Pairs with an absent or unparseable
    /// side are not checks.
    pub total_checks: usize,
    pub matched: usize,
    pub mismatched: usize,
    /// `matched / total_checks`, 1.0 when nothing was comparable.
    pub match_rate: f64,
    /// Per-field error messages across all sections.
    pub errors: usize,
    /// Fields left out because the equipment was not fitted.
    pub suppressed: usize,
    pub sections: BTreeMap<String, SectionCounts>,
    pub failed_checks: Vec<FailedCheck>,
}

impl RunSummary {
    pub fn all_matched(&self) -> bool {
        self.mismatched == 0
    }
}

/// Compliance figures for a finished run.
pub fn summarize(run: &ComparisonRun) -> RunSummary {
    let mut sections = BTreeMap::new();
    let mut failed_checks = Vec::new();
    let mut errors = 0;
    let mut suppressed = 0;

    for (section, result) in run.sections() {
        if result.is_empty() {
            continue;
        }
        let counts: &mut SectionCounts = sections.entry(section.to_string()).or_default();

        for (field, comparison) in result {
            let Some(comparison) = comparison else {
                suppressed += 1;
                continue;
            };
            errors += comparison.errors.len();
            for ((a, b), matched) in &comparison.matches {
                counts.total += 1;
                if *matched {
                    counts.matched += 1;
                } else {
                    failed_checks.push(FailedCheck {
                        section: section.to_string(),
                        field: field.clone(),
                        pair: match_key(*a, *b),
                    });
                }
            }
        }
    }

    let total_checks: usize = sections.values().map(|c| c.total).sum();
    let matched: usize = sections.values().map(|c| c.matched).sum();
    let match_rate = if total_checks == 0 {
        1.0
    } else {
        matched as f64 / total_checks as f64
    };

    RunSummary {
        total_checks,
        matched,
        mismatched: total_checks - matched,
        match_rate,
        errors,
        suppressed,
        sections,
        failed_checks,
    }
}
