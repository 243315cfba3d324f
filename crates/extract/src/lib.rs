//! `defibcheck-extract`: field extraction from maintenance documents.
//!
//! Text in, fields out: inspection forms (RVD), AED device reports, and
//! OCR tokens or barcodes from equipment photographs. PDF text extraction,
//! OCR and barcode decoding happen upstream.

pub mod classify;
pub mod device;
pub mod error;
pub mod form;
pub mod photo;
pub mod registry;
mod text;

pub use classify::{detect_generation, detect_role, is_rvd_document};
pub use device::{parse_device_report, parser_for, DeviceReportParser, G3Parser, G5Parser};
pub use error::ExtractError;
pub use form::{extract_rvd, FieldExtractor};
pub use photo::{BarcodeDecoder, FromOcr, LabelReading};
pub use registry::{FieldRegistry, FieldSpec, ValueShape};
