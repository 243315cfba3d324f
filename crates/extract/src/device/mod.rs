//! AED device report parsers, one per hardware generation.

mod g3;
mod g5;

pub use g3::G3Parser;
pub use g5::G5Parser;

use defibcheck_core::{DeviceGeneration, ExtractedDocument};

/// Turns the text of a device report into an extracted document.
///
/// Parsers never fail outright: malformed input yields a document with a
/// `failure` message and no fields.
pub trait DeviceReportParser {
    fn generation(&self) -> DeviceGeneration;

    fn parse(&self, text: &str) -> ExtractedDocument;
}

pub fn parser_for(generation: DeviceGeneration) -> Box<dyn DeviceReportParser> {
    match generation {
        DeviceGeneration::G3 => Box::new(G3Parser),
        DeviceGeneration::G5 => Box::new(G5Parser),
    }
}

pub fn parse_device_report(generation: DeviceGeneration, text: &str) -> ExtractedDocument {
    parser_for(generation).parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use defibcheck_core::DocumentRole;

    #[test]
    fn dispatch_by_generation() {
        assert_eq!(parser_for(DeviceGeneration::G3).generation(), DeviceGeneration::G3);
        assert_eq!(parser_for(DeviceGeneration::G5).generation(), DeviceGeneration::G5);
        assert_eq!(parse_device_report(DeviceGeneration::G5, "").role, DocumentRole::AedG5);
        assert_eq!(parse_device_report(DeviceGeneration::G3, "").role, DocumentRole::AedG3);
    }
}
