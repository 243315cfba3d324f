use std::fmt;

#[derive(Debug)]
pub enum ExtractError {
    /// Field registry TOML parse / deserialization error.
    RegistryParse(String),
    /// Registry validation error (duplicate name, empty keyword, etc.).
    RegistryValidation(String),
    /// A device report value that should be numeric is not.
    InvalidNumber { field: String, value: String },
    /// A device report timestamp that does not name a real instant.
    InvalidTimestamp { value: String },
    /// Image decoding or preprocessing error.
    Image(String),
    /// Barcode decoder reported a failure.
    Barcode(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistryParse(msg) => write!(f, "field registry parse error: {msg}"),
            Self::RegistryValidation(msg) => write!(f, "field registry validation error: {msg}"),
            Self::InvalidNumber { field, value } => {
                write!(f, "field '{field}': expected a number, found '{value}'")
            }
            Self::InvalidTimestamp { value } => write!(f, "invalid timestamp '{value}'"),
            Self::Image(msg) => write!(f, "image error: {msg}"),
            Self::Barcode(msg) => write!(f, "barcode decoder error: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<image::ImageError> for ExtractError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e.to_string())
    }
}
