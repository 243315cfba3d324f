use std::path::PathBuf;

use defibcheck_core::fields::{aed_g3, aed_g5, rvd};
use defibcheck_core::{DeviceGeneration, DocumentRole};
use defibcheck_extract::{detect_role, extract_rvd, parse_device_report, FieldExtractor, FieldRegistry};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

// -------------------------------------------------------------------------
// Inspection form
// -------------------------------------------------------------------------

#[test]
fn rvd_fixture_fields() {
    let doc = extract_rvd(&fixture("rvd_g5.txt"));

    assert_eq!(doc.role, DocumentRole::Rvd);
    assert_eq!(doc.get(rvd::SITE_CODE), Some("69-LYON-014"));
    assert_eq!(doc.get(rvd::REPORT_DATE), Some("14/02/2024 10:30"));
    assert_eq!(doc.get(rvd::DEFIB_SERIAL), Some("1234567890"));
    assert_eq!(doc.get(rvd::DEFIB_SERIAL_RELEVE), Some("1234567890"));
    assert_eq!(doc.get(rvd::DEFIB_FAB_DATE_RELEVE), Some("03/2019"));
    assert_eq!(doc.get(rvd::BATTERY_SERIAL), Some("BAT-55021"));
    assert_eq!(doc.get(rvd::BATTERY_SERIAL_RELEVE), Some("BAT55021"));
    assert_eq!(doc.get(rvd::BATTERY_INSTALL_DATE_RELEVE), Some("01/06/2022"));
    assert_eq!(doc.get(rvd::BATTERY_LEVEL), Some("86"));
    assert_eq!(doc.get(rvd::ADULT_EXPIRY_RELEVE), Some("11/2025"));
    assert_eq!(doc.get(rvd::PEDIATRIC_SERIAL), Some("Électrodes RCP ?"));
    assert_eq!(doc.get(rvd::COMMENT), Some("Matériel conforme, prochaine visite dans 12 mois."));
}

#[test]
fn rvd_fixture_unfilled_fields() {
    let doc = extract_rvd(&fixture("rvd_g5.txt"));

    assert!(!doc.is_found(rvd::NEW_BATTERY_SERIAL));
    assert!(!doc.is_found(rvd::NEW_ADULT_EXPIRY));
    assert!(!doc.is_found(rvd::PEDIATRIC_EXPIRY));
    // Every registered field is reported, found or not
    assert_eq!(doc.fields.len(), FieldRegistry::rvd().len());
}

#[test]
fn custom_registry_from_toml() {
    let registry = FieldRegistry::from_toml(
        r#"
[[fields]]
name = "site"
keyword = "Code du site"

[[fields]]
name = "battery_level"
keyword = "Niveau de charge de la batterie en %"
shape = "percentage"
"#,
    )
    .unwrap();

    let fields = FieldExtractor::new(registry).extract(&fixture("rvd_g5.txt"));
    assert_eq!(fields.len(), 2);
    assert_eq!(fields["site"].as_deref(), Some("69-LYON-014"));
    assert_eq!(fields["battery_level"].as_deref(), Some("86"));
}

// -------------------------------------------------------------------------
// Device reports
// -------------------------------------------------------------------------

#[test]
fn g5_fixture() {
    let doc = parse_device_report(DeviceGeneration::G5, &fixture("aed_g5.txt"));

    assert_eq!(doc.role, DocumentRole::AedG5);
    assert_eq!(doc.get(aed_g5::SERIAL), Some("1234567890"));
    assert_eq!(doc.get(aed_g5::BATTERY_REMAINING), Some("84 %"));
    assert_eq!(doc.get(aed_g5::REPORT_DATE), Some("14/02/2024 10:22:05"));
    assert_eq!(doc.error_log.len(), 2);
    assert_eq!(doc.error_log[1].code, "0x0102");
}

#[test]
fn g3_fixture() {
    let doc = parse_device_report(DeviceGeneration::G3, &fixture("aed_g3.txt"));

    assert_eq!(doc.role, DocumentRole::AedG3);
    assert!(doc.failure.is_none());
    assert_eq!(doc.get(aed_g3::SERIAL), Some("412345678"));
    assert_eq!(doc.get(aed_g3::LOT_NUMBER), Some("12345-67890"));
    assert_eq!(doc.get(aed_g3::BATTERY_PERCENT), Some("80.00"));
    assert_eq!(doc.get(aed_g3::INSTALL_DATE), Some("01/06/2023 14:12"));
    assert_eq!(doc.error_log.len(), 1);
}

#[test]
fn extracted_documents_serialize() {
    let doc = parse_device_report(DeviceGeneration::G5, &fixture("aed_g5.txt"));
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["role"], "AEDG5");
    assert_eq!(json["fields"][aed_g5::SERIAL], "1234567890");
    assert_eq!(json["error_log"].as_array().unwrap().len(), 2);
}

// -------------------------------------------------------------------------
// Role detection
// -------------------------------------------------------------------------

#[test]
fn roles_of_fixtures() {
    assert_eq!(detect_role("upload1.pdf", &fixture("rvd_g5.txt")), Some(DocumentRole::Rvd));
    assert_eq!(detect_role("upload2.pdf", &fixture("aed_g5.txt")), Some(DocumentRole::AedG5));
    assert_eq!(detect_role("upload3.pdf", &fixture("aed_g3.txt")), Some(DocumentRole::AedG3));
}
