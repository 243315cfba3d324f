//! `defibcheck extract`: one document's text in, extracted fields out.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use defibcheck_core::{DeviceGeneration, DocumentRole};
use defibcheck_extract::{detect_generation, detect_role, parse_device_report, FieldExtractor, FieldRegistry};

use crate::exit_codes::EXIT_INVALID_CONFIG;
use crate::{read_text, write_text, CliError};

#[derive(Subcommand)]
pub enum ExtractCommands {
    /// Extract the inspection form (RVD) fields
    Rvd {
        /// Text of the form, as produced by the PDF text extractor
        file: PathBuf,

        /// TOML field registry replacing the built-in form layout
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Write JSON to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Parse an AED device report
    Aed {
        /// Text of the device report
        file: PathBuf,

        /// Device generation (g3 or g5); detected from the file when omitted
        #[arg(long, short = 'g', env = "DEFIBCHECK_GENERATION")]
        generation: Option<DeviceGeneration>,

        /// Write JSON to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print which kind of document a file holds
    Role {
        file: PathBuf,
    },
}

pub fn cmd_extract(cmd: ExtractCommands) -> Result<(), CliError> {
    match cmd {
        ExtractCommands::Rvd { file, registry, output } => cmd_extract_rvd(file, registry, output),
        ExtractCommands::Aed { file, generation, output } => cmd_extract_aed(file, generation, output),
        ExtractCommands::Role { file } => cmd_extract_role(file),
    }
}

fn cmd_extract_rvd(file: PathBuf, registry: Option<PathBuf>, output: Option<PathBuf>) -> Result<(), CliError> {
    let text = read_text(&file)?;
    let extractor = match registry {
        Some(path) => {
            let registry = FieldRegistry::from_toml(&read_text(&path)?)
                .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, format!("{}: {e}", path.display())))?;
            FieldExtractor::new(registry)
        }
        None => FieldExtractor::rvd(),
    };

    let doc = extractor.extract_document(&text, DocumentRole::Rvd);
    emit(&doc, output)
}

fn cmd_extract_aed(
    file: PathBuf,
    generation: Option<DeviceGeneration>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let text = read_text(&file)?;
    let generation = match generation {
        Some(g) => g,
        None => detect_generation(&file_name(&file), &text).ok_or_else(|| {
            CliError::usage(format!("cannot tell the device generation of {}", file.display()))
                .with_hint("pass --generation g3 or --generation g5")
        })?,
    };

    let doc = parse_device_report(generation, &text);
    if let Some(failure) = &doc.failure {
        eprintln!("warning: {} report could not be parsed: {failure}", doc.role);
    }
    emit(&doc, output)
}

fn cmd_extract_role(file: PathBuf) -> Result<(), CliError> {
    let text = read_text(&file)?;
    match detect_role(&file_name(&file), &text) {
        Some(role) => {
            println!("{role}");
            Ok(())
        }
        None => Err(CliError::usage(format!("{}: not an inspection form or a known device report", file.display()))),
    }
}

/// Detection looks at the file name only, never the directories above it.
fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn emit<T: serde::Serialize>(value: &T, output: Option<PathBuf>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::json)?;
    match output {
        Some(path) => {
            write_text(&path, &json)?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
