//! Integration tests for the `scanoss` binary.
//!
//! Runs the compiled binary against temporary targets and an empty store.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn scanoss(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scanoss"))
        .args(args)
        .env("SCANOSS_STORE_ROOT", store)
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should run")
}

#[test]
fn test_version_flag() {
    let store = TempDir::new().unwrap();
    let out = scanoss(store.path(), &["-v"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        format!("scanoss-{}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_missing_target_is_usage_error() {
    let store = TempDir::new().unwrap();
    let out = scanoss(store.path(), &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Missing parameters"));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_unknown_format_fails_before_scanning() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(target.path().join("a.c"), "int main(void) { return 0; }\n").unwrap();

    let out = scanoss(
        store.path(),
        &["-f", "bogus", target.path().to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(out.stdout.is_empty(), "no report should be written");
}

#[test]
fn test_extra_positional_is_rejected() {
    let store = TempDir::new().unwrap();
    let out = scanoss(store.path(), &["a", "b"]);
    assert!(!out.status.success());
}

#[test]
fn test_inaccessible_target_exit_code() {
    let store = TempDir::new().unwrap();
    let missing = store.path().join("no-such-target");
    let out = scanoss(store.path(), &[missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(3));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_missing_sbom_file_is_config_error() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let out = scanoss(
        store.path(),
        &["-s", "/nonexistent/sbom.json", target.path().to_str().unwrap()],
    );
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_plain_scan_of_directory() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(target.path().join("a.c"), "int main(void) { return 0; }\n").unwrap();
    fs::write(target.path().join("b.h"), "#define VALUE 42\n").unwrap();
    fs::create_dir(target.path().join("empty")).unwrap();

    let out = scanoss(store.path(), &[target.path().to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).expect("report should be JSON");
    let entries = doc.as_object().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.values().all(|v| v == &serde_json::json!([])));
}

#[test]
fn test_skipped_target_is_silent_without_debug() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(target.path().join("bad.wfp"), "3=zz\n").unwrap();
    fs::write(target.path().join("ok.c"), "int main(void) { return 0; }\n").unwrap();

    let out = scanoss(store.path(), &[target.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert!(
        out.stderr.is_empty(),
        "stderr should be empty: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc.as_object().unwrap().len(), 1);
}

#[test]
fn test_skipped_target_is_logged_with_debug() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(target.path().join("bad.wfp"), "3=zz\n").unwrap();

    let out = scanoss(store.path(), &["-d", target.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("skipping target"));
}

#[test]
fn test_spdx_scan_of_file() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let file = target.path().join("a.c");
    fs::write(&file, "int main(void) { return 0; }\n").unwrap();

    let out = scanoss(store.path(), &["-f", "spdx", file.to_str().unwrap()]);
    assert!(out.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["spdxVersion"], "SPDX-2.3");
}

#[test]
fn test_quiet_suppresses_report() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(target.path().join("a.c"), "int x;\n").unwrap();

    let out = scanoss(store.path(), &["-q", target.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn test_config_file_sets_format() {
    let store = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let config = target.path().join("scanoss.toml");
    fs::write(&config, "[report]\nformat = \"cyclonedx\"\n").unwrap();
    let src = TempDir::new().unwrap();

    let out = scanoss(
        store.path(),
        &[
            "-c",
            config.to_str().unwrap(),
            src.path().to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let bom: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(bom["bomFormat"], "CycloneDX");
}

#[test]
fn test_benchmark_flag() {
    let store = TempDir::new().unwrap();
    let out = scanoss(store.path(), &["-t"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("keys/sec"));
}
