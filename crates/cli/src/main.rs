// defibcheck - defibrillator maintenance checks from the command line

mod exit_codes;
mod extract;
mod recon;

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use extract::ExtractCommands;
use recon::ReconCommands;

#[derive(Parser)]
#[command(name = "defibcheck")]
#[command(about = "Cross-check defibrillator inspection forms, device reports and label photos")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a single document's text
    #[command(after_help = "\
Examples:
  defibcheck extract rvd rapport.txt
  defibcheck extract aed rapport-dae.txt --generation g5
  defibcheck extract role upload.txt")]
    Extract {
        #[command(subcommand)]
        command: ExtractCommands,
    },

    /// Reconcile one inspection visit
    Recon {
        #[command(subcommand)]
        command: ReconCommands,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("DEFIBCHECK_GIT_HASH"), ")",
        "\nengine:  defibcheck-recon ", env!("CARGO_PKG_VERSION"),
    )
}

/// Library crates log through `log`; the subscriber picks those records up.
/// `DEFIBCHECK_LOG` wins over `RUST_LOG`; the default is warnings only.
fn init_logging() {
    let filter = EnvFilter::try_from_env("DEFIBCHECK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract { command } => extract::cmd_extract(command),
        Commands::Recon { command } => recon::cmd_recon(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn json(err: serde_json::Error) -> Self {
        Self::new(EXIT_ERROR, format!("JSON serialization error: {err}"))
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

pub fn write_text(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))
}
