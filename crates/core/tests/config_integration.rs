//! scanoss.toml 통합 설정 테스트
//!
//! - scanoss.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::fs;

use scanoss_core::config::ScanossConfig;
use scanoss_core::error::{ConfigError, ScanossError};
use serial_test::serial;
use tempfile::TempDir;

// =============================================================================
// scanoss.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../scanoss.toml.example");
    let config = ScanossConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "warn");
    assert_eq!(config.store.root, "/var/lib/ldb");
    assert_eq!(config.store.name, "oss");
    assert_eq!(config.scan.max_targets, 1000);
    assert_eq!(config.scan.max_ranges, 10);
    assert_eq!(config.report.format, "plain");
}

#[test]
fn example_config_matches_defaults() {
    let content = include_str!("../../../scanoss.toml.example");
    let parsed = ScanossConfig::parse(content).expect("should parse");
    let defaults = ScanossConfig::default();

    assert_eq!(parsed.scan.max_file_size, defaults.scan.max_file_size);
    assert_eq!(parsed.scan.gram, defaults.scan.gram);
    assert_eq!(parsed.scan.window, defaults.scan.window);
    assert_eq!(parsed.scan.range_gap, defaults.scan.range_gap);
    parsed.validate().expect("example config should pass validation");
}

// =============================================================================
// 파일 로딩
// =============================================================================

#[test]
#[serial]
fn load_applies_env_over_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("scanoss.toml");
    fs::write(&path, "[scan]\nmax_targets = 10\n[report]\nformat = \"spdx\"\n")
        .expect("should write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("SCANOSS_REPORT_FORMAT", "cyclonedx") };
    let config = ScanossConfig::load(&path).expect("config should load");
    unsafe { std::env::remove_var("SCANOSS_REPORT_FORMAT") };

    assert_eq!(config.scan.max_targets, 10);
    assert_eq!(config.report.format, "cyclonedx");
}

#[test]
#[serial]
fn load_rejects_invalid_env_override() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("scanoss.toml");
    fs::write(&path, "").expect("should write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("SCANOSS_REPORT_FORMAT", "bogus") };
    let result = ScanossConfig::load(&path);
    unsafe { std::env::remove_var("SCANOSS_REPORT_FORMAT") };

    assert!(matches!(
        result,
        Err(ScanossError::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[test]
fn empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("empty.toml");
    fs::write(&path, "").expect("should write empty file");

    let config = ScanossConfig::from_file(&path).expect("empty config should load");
    assert_eq!(config.scan.max_targets, 1000);
}

#[test]
fn malformed_file_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[scan\nmax_targets = 1").expect("should write bad config");

    let err = ScanossConfig::from_file(&path).expect_err("malformed TOML should fail");
    assert!(matches!(
        err,
        ScanossError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn invalid_value_in_file_fails_validation() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("invalid.toml");
    fs::write(&path, "[scan]\nmax_ranges = 0\n").expect("should write config");

    let err = ScanossConfig::from_file(&path).expect_err("zero max_ranges should fail");
    assert!(err.to_string().contains("scan.max_ranges"));
}
