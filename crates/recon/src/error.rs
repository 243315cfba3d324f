use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty name, bad tolerance, etc.).
    ConfigValidation(String),
    /// An `[[images]]` entry that cannot be read.
    InvalidImage { index: usize, reason: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidImage { index, reason } => write!(f, "images[{index}]: {reason}"),
        }
    }
}

impl std::error::Error for ReconError {}
