//! `defibcheck-recon`: multi-source reconciliation for defibrillator
//! maintenance data.
//!
//! Pure engine crate: receives already-extracted documents and image
//! readings, returns a comparison run. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod fields;
pub mod matcher;
pub mod model;

pub use config::{ChangeFlags, ReconConfig, ToleranceConfig};
pub use engine::reconcile;
pub use error::ReconError;
pub use evidence::{summarize, FailedCheck, RunSummary, SectionCounts};
pub use fields::LogicalField;
pub use model::{ComparisonRun, ElectrodesResult, FieldComparison, ReconInput, RunFailure, SectionResult, Source};
