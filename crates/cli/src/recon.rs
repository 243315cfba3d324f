//! `defibcheck recon`: config-driven reconciliation of one inspection visit.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use defibcheck_core::{DeviceGeneration, EquipmentClass, ImageRecord, OcrToken};
use defibcheck_extract::photo::electrodes_from_barcodes;
use defibcheck_extract::{extract_rvd, parse_device_report, FromOcr};
use defibcheck_recon::config::ImageConfig;
use defibcheck_recon::{reconcile, summarize, ChangeFlags, ComparisonRun, ReconConfig, ReconInput, RunSummary};
use serde::{Deserialize, Serialize};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_RECON_MISMATCH, EXIT_RECON_MISSING_SOURCE};
use crate::{read_text, write_text, CliError};

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Run reconciliation from an inspection TOML file
    #[command(after_help = "\
Examples:
  defibcheck recon run visite.toml
  defibcheck recon run visite.toml --json
  defibcheck recon run visite.toml --output resultat.json")]
    Run {
        /// Path to the inspection config; document paths are relative to it
        config: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides `[output] json`)
        #[arg(long)]
        output: Option<PathBuf>,

        /// No human summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate an inspection config without running
    #[command(after_help = "\
Examples:
  defibcheck recon validate visite.toml")]
    Validate {
        /// Path to the inspection config
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, json, output, quiet } => cmd_recon_run(config, json, output, quiet),
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

fn config_err(msg: impl Into<String>) -> CliError {
    CliError::new(EXIT_INVALID_CONFIG, msg)
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = read_text(path)?;
    ReconConfig::from_toml(&text).map_err(|e| config_err(format!("{}: {e}", path.display())))
}

/// The JSON report: the run itself plus its compliance figures.
#[derive(Serialize)]
struct Report<'a> {
    name: &'a str,
    run: &'a ComparisonRun,
    summary: &'a RunSummary,
}

fn cmd_recon_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let rvd = match &config.documents.rvd {
        Some(file) => Some(extract_rvd(&read_text(&base_dir.join(file))?)),
        None => None,
    };
    let aed = match &config.documents.aed {
        Some(file) => Some(parse_device_report(config.generation, &read_text(&base_dir.join(file))?)),
        None => None,
    };
    let images = config
        .images
        .iter()
        .map(|image| load_image(base_dir, config.generation, image))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(images = images.len(), "inputs loaded for '{}'", config.name);

    let derived = rvd.as_ref().map(ChangeFlags::from_rvd).unwrap_or_default();
    let input = ReconInput {
        rvd: rvd.as_ref(),
        aed: aed.as_ref(),
        images: &images,
        generation: config.generation,
        changes: config.changes.resolve(derived),
    };

    let run = reconcile(&input, &config.tolerance);
    let summary = summarize(&run);

    let report = Report {
        name: &config.name,
        run: &run,
        summary: &summary,
    };
    let json_str = serde_json::to_string_pretty(&report).map_err(CliError::json)?;

    let output_file = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = output_file {
        write_text(path, &json_str)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json_output {
        println!("{json_str}");
    }

    if !quiet {
        print_summary(&config.name, &run, &summary);
    }

    if let Some(failure) = &run.failure {
        return Err(CliError::new(EXIT_RECON_MISSING_SOURCE, failure.to_string())
            .with_hint("set [documents] rvd in the inspection config"));
    }
    if !summary.all_matched() {
        return Err(CliError::new(
            EXIT_RECON_MISMATCH,
            format!("{} of {} checks mismatched", summary.mismatched, summary.total_checks),
        ));
    }
    Ok(())
}

fn print_summary(name: &str, run: &ComparisonRun, summary: &RunSummary) {
    eprintln!(
        "{} ({}): {} checks, {} matched, {} mismatched, {} field errors, {} suppressed",
        name,
        run.meta.generation,
        summary.total_checks,
        summary.matched,
        summary.mismatched,
        summary.errors,
        summary.suppressed,
    );
    for check in &summary.failed_checks {
        eprintln!("  mismatch: {} / {} / {}", check.section, check.field, check.pair);
    }
    for warning in &run.meta.warnings {
        eprintln!("  warning: {warning}");
    }
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: {} visit '{}' with {} image(s){}",
        config.generation,
        config.name,
        config.images.len(),
        if config.documents.rvd.is_none() { " (no inspection form)" } else { "" },
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// One OCR detection as written by the OCR step: a token object, a
/// `[box, text, confidence]` triple, or bare text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OcrEntry {
    Detection(serde_json::Value, String, f32),
    Token(OcrToken),
    Text(String),
}

impl From<OcrEntry> for OcrToken {
    fn from(entry: OcrEntry) -> Self {
        match entry {
            OcrEntry::Detection(_, text, confidence) => OcrToken {
                text,
                confidence: Some(confidence),
            },
            OcrEntry::Token(token) => token,
            OcrEntry::Text(text) => OcrToken::new(text),
        }
    }
}

fn parse_ocr(json: &str) -> Result<Vec<OcrToken>, serde_json::Error> {
    let entries: Vec<OcrEntry> = serde_json::from_str(json)?;
    Ok(entries.into_iter().map(OcrToken::from).collect())
}

/// Config validation guarantees exactly one reading source per image.
fn load_image(base_dir: &Path, generation: DeviceGeneration, image: &ImageConfig) -> Result<ImageRecord, CliError> {
    let record = if let Some(ocr) = &image.ocr {
        let path = base_dir.join(ocr);
        let tokens = parse_ocr(&read_text(&path)?).map_err(|e| config_err(format!("{}: {e}", path.display())))?;
        ImageRecord::from_ocr(image.class, generation, &tokens)
    } else if let Some(barcodes) = &image.barcodes {
        electrodes_from_barcodes(barcodes).into_record(EquipmentClass::Electrodes)
    } else {
        ImageRecord::new(image.class, image.serial.clone(), image.date.clone())
    };

    Ok(match &image.source {
        Some(source) => record.with_source(source.clone()),
        None => record,
    })
}
