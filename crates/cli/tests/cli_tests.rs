// Integration tests driving the built `defibcheck` binary.
//
// Each test lays out an inspection visit in a temp directory and checks the
// exit code contract plus the --json stdout shape.
//
// Run with: cargo test -p defibcheck-cli --test cli_tests -- --nocapture

use std::path::Path;
use std::process::{Command, Output};

const RVD_G5: &str = include_str!("../../extract/tests/fixtures/rvd_g5.txt");
const AED_G5: &str = include_str!("../../extract/tests/fixtures/aed_g5.txt");
const AED_G3: &str = include_str!("../../extract/tests/fixtures/aed_g3.txt");

fn defibcheck() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_defibcheck"));
    cmd.env_remove("DEFIBCHECK_GENERATION");
    cmd
}

fn run(args: &[&str]) -> Output {
    defibcheck().args(args).output().expect("run defibcheck")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\nstdout:\n{stdout}"))
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

/// A G5 visit where every source agrees, plus `extra` appended to the config.
fn g5_visit(dir: &Path, extra: &str) -> String {
    write(dir, "rvd.txt", RVD_G5);
    write(dir, "aed.txt", AED_G5);
    write(
        dir,
        "battery.ocr.json",
        r#"[[[[0, 0], [9, 0], [9, 4], [0, 4]], "LOT", 0.93], {"text": "BAT55021"}, "2022-01-10"]"#,
    );
    let config = format!(
        r#"
name = "Visite site 69-LYON-014"
generation = "g5"

[documents]
rvd = "rvd.txt"
aed = "aed.txt"

[[images]]
class = "battery"
ocr = "battery.ocr.json"
source = "IMG_0042.jpg"

[[images]]
class = "electrodes"
barcodes = ["EL889900", "2025-11-30"]
{extra}
"#
    );
    write(dir, "visite.toml", &config)
}

// ===========================================================================
// defibcheck recon run
// ===========================================================================

#[test]
fn recon_run_all_sources_agree() {
    let dir = tempfile::tempdir().unwrap();
    let config = g5_visit(dir.path(), "");

    let output = run(&["recon", "run", &config, "--json"]);
    assert!(output.status.success(), "exit: {:?}\nstderr: {}", output.status, stderr(&output));

    let report = json_stdout(&output);
    assert_eq!(report["name"], "Visite site 69-LYON-014");
    assert_eq!(report["run"]["meta"]["generation"], "g5");
    assert_eq!(report["run"]["batterie"]["Numéro de série"]["match_aed_image"], true);
    assert_eq!(report["run"]["electrodes"]["adultes"]["Date de péremption"]["image"], "2025-11-30");
    assert_eq!(report["summary"]["mismatched"], 0);
    assert!(report["summary"]["total_checks"].as_u64().unwrap() > 15);
    assert!(stderr(&output).contains("0 mismatched"));
}

#[test]
fn recon_run_mismatch_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let config = g5_visit(
        dir.path(),
        r#"
[[images]]
class = "defibrillator"
serial = "9999999999"
"#,
    );

    let output = run(&["recon", "run", &config, "--json"]);
    assert_eq!(output.status.code(), Some(5), "stderr: {}", stderr(&output));

    let report = json_stdout(&output);
    let failed = report["summary"]["failed_checks"].as_array().unwrap();
    assert_eq!(failed.len(), 3);
    assert_eq!(failed[0]["section"], "defibrillateur");
    assert!(stderr(&output).contains("mismatch: defibrillateur / Numéro de série"));
}

#[test]
fn recon_run_without_form_exits_6() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "aed.txt", AED_G3);
    let config = write(
        dir.path(),
        "visite.toml",
        r#"
name = "Visite sans rapport"
generation = "g3"
[documents]
aed = "aed.txt"
"#,
    );

    let output = run(&["recon", "run", &config, "--json", "--quiet"]);
    assert_eq!(output.status.code(), Some(6));
    let report = json_stdout(&output);
    assert_eq!(report["run"]["failure"]["kind"], "missing_source");
    assert_eq!(report["summary"]["total_checks"], 0);
    assert!(stderr(&output).contains("missing source document: RVD"));
}

#[test]
fn recon_run_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = g5_visit(dir.path(), "");
    let out = dir.path().join("resultat.json");

    let output = run(&["recon", "run", &config, "--output", out.to_str().unwrap(), "--quiet"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["run"]["defibrillateur"]["Numéro de série"]["match_rvd_aed"], true);
}

#[test]
fn recon_run_missing_document_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "visite.toml",
        r#"
name = "Visite"
generation = "g5"
[documents]
rvd = "absent.txt"
"#,
    );

    let output = run(&["recon", "run", &config]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("absent.txt"));
}

#[test]
fn recon_run_bad_ocr_file_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let config = g5_visit(dir.path(), "");
    write(dir.path(), "battery.ocr.json", r#"{"not": "a list"}"#);

    let output = run(&["recon", "run", &config]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("battery.ocr.json"));
}

// ===========================================================================
// defibcheck recon validate
// ===========================================================================

#[test]
fn recon_validate() {
    let dir = tempfile::tempdir().unwrap();
    let config = g5_visit(dir.path(), "");

    let output = run(&["recon", "validate", &config]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("with 2 image(s)"));
}

#[test]
fn recon_validate_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = g5_visit(
        dir.path(),
        r#"
[tolerance]
battery_percent = -3.0
"#,
    );

    let output = run(&["recon", "validate", &config]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("battery_percent"));
}

// ===========================================================================
// defibcheck extract
// ===========================================================================

#[test]
fn extract_rvd_prints_fields() {
    let dir = tempfile::tempdir().unwrap();
    let rvd = write(dir.path(), "rvd.txt", RVD_G5);

    let output = run(&["extract", "rvd", &rvd]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let doc = json_stdout(&output);
    assert_eq!(doc["role"], "RVD");
    assert_eq!(doc["fields"]["Code du site"], "69-LYON-014");
    assert!(doc["fields"]["N° série nouvelle batterie"].is_null());
}

#[test]
fn extract_aed_detects_generation() {
    let dir = tempfile::tempdir().unwrap();
    let aed = write(dir.path(), "rapport.txt", AED_G3);

    let output = run(&["extract", "aed", &aed]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let doc = json_stdout(&output);
    assert_eq!(doc["role"], "AEDG3");
    assert_eq!(doc["fields"]["Numéro de lot"], "12345-67890");
}

#[test]
fn extract_aed_unknown_generation_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let aed = write(dir.path(), "rapport.txt", "Rapport sans marque\n");

    let output = run(&["extract", "aed", &aed]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--generation"));
}

#[test]
fn extract_role() {
    let dir = tempfile::tempdir().unwrap();
    let rvd = write(dir.path(), "upload.txt", RVD_G5);
    let aed = write(dir.path(), "upload2.txt", AED_G5);

    let output = run(&["extract", "role", &rvd]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "RVD");
    let output = run(&["extract", "role", &aed]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "AEDG5");
}
