//! End-to-end CLI tests (no network: dry-run and failure paths only)

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn dry_run_prints_documents_and_uploads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(&dir, "steel_data.csv", "temp,grade\n950,\n,A\n");

    Command::cargo_bin("datapush")
        .unwrap()
        .arg(&input)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"dry-run[1]: {"temp":950,"grade":null}"#))
        .stdout(predicate::str::contains(r#"dry-run[2]: {"temp":null,"grade":"A"}"#))
        .stdout(predicate::str::contains(
            "2 documents would be uploaded to factories/factory_002/raw_data",
        ));
}

#[test]
fn dry_run_honors_destination_flags() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(&dir, "steel_data.csv", "temp\n950\n");

    Command::cargo_bin("datapush")
        .unwrap()
        .arg(&input)
        .args(["--dry-run", "--factory", "factory_007", "--collection", "melt_logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("factories/factory_007/melt_logs"));
}

#[test]
fn quiet_dry_run_suppresses_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(&dir, "steel_data.csv", "temp\n950\n");

    Command::cargo_bin("datapush")
        .unwrap()
        .arg(&input)
        .args(["--dry-run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rows ×").not())
        .stdout(predicate::str::contains("1 documents would be uploaded"));
}

#[test]
fn missing_input_file_fails_before_upload() {
    Command::cargo_bin("datapush")
        .unwrap()
        .arg("no/such/file.csv")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn non_tabular_json_fails_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scalar.json");
    std::fs::write(&path, "42").unwrap();

    Command::cargo_bin("datapush")
        .unwrap()
        .arg(&path)
        .arg("--dry-run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("expected a JSON array of objects"))
        .stdout(predicate::str::contains("dry-run[").not());
}

#[test]
fn missing_credentials_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(&dir, "steel_data.csv", "temp\n950\n");

    Command::cargo_bin("datapush")
        .unwrap()
        .arg(&input)
        .args(["--credentials", "no/such/key.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to load credentials"));
}
