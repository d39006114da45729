//! 설정 관리 -- scanoss.toml 파싱 및 런타임 설정
//!
//! [`ScanossConfig`]는 스캐너 전체 설정을 담는 최상위 구조체입니다.
//! 프로세스 시작 시 한 번 생성되고 이후에는 읽기 전용 참조로만 전달됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SCANOSS_SCAN_MAX_TARGETS=2000` 형식)
//! 3. 설정 파일 (`scanoss.toml`, `-c` 로 지정)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), scanoss_core::error::ScanossError> {
//! use scanoss_core::config::ScanossConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ScanossConfig::load("scanoss.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ScanossConfig::parse("[scan]\nmax_targets = 500")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ScanossError};

/// 지원하는 리포트 형식 이름
pub const REPORT_FORMATS: [&str; 4] = ["plain", "spdx", "cyclonedx", "spdx_xml"];

/// 설정 상한값 상수
const MAX_TARGETS_LIMIT: usize = 1_000_000;
const MAX_RANGES_LIMIT: usize = 255;
const MAX_DEPTH_LIMIT: usize = 4096;
const MAX_PATH_LEN_LIMIT: usize = 65_536;
const MAX_FILE_SIZE_LIMIT: usize = 1024 * 1024 * 1024; // 1 GB

/// SCANOSS 통합 설정
///
/// `scanoss.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanossConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 키-값 스토어 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// 스캔 엔진 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 리포트 설정
    #[serde(default)]
    pub report: ReportConfig,
    /// SBOM / 블랙리스트 필터 설정
    #[serde(default)]
    pub filter: FilterConfig,
}

impl ScanossConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScanossError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수 오버라이드로 설정을 생성합니다.
    pub fn from_env() -> Result<Self, ScanossError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScanossError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScanossError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ScanossError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ScanossError> {
        toml::from_str(toml_str).map_err(|e| {
            ScanossError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SCANOSS_{SECTION}_{FIELD}`
    /// 예: `SCANOSS_STORE_ROOT=/data/ldb`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SCANOSS_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SCANOSS_GENERAL_LOG_FORMAT");

        // Store
        override_string(&mut self.store.root, "SCANOSS_STORE_ROOT");
        override_string(&mut self.store.name, "SCANOSS_STORE_NAME");

        // Scan
        override_usize(&mut self.scan.max_targets, "SCANOSS_SCAN_MAX_TARGETS");
        override_usize(&mut self.scan.max_ranges, "SCANOSS_SCAN_MAX_RANGES");
        override_u32(&mut self.scan.range_gap, "SCANOSS_SCAN_RANGE_GAP");
        override_usize(&mut self.scan.max_depth, "SCANOSS_SCAN_MAX_DEPTH");
        override_usize(&mut self.scan.max_path_len, "SCANOSS_SCAN_MAX_PATH_LEN");
        override_usize(&mut self.scan.max_file_size, "SCANOSS_SCAN_MAX_FILE_SIZE");
        override_usize(&mut self.scan.gram, "SCANOSS_SCAN_GRAM");
        override_usize(&mut self.scan.window, "SCANOSS_SCAN_WINDOW");
        override_bool(
            &mut self.scan.match_extensions,
            "SCANOSS_SCAN_MATCH_EXTENSIONS",
        );
        override_bool(&mut self.scan.force_wfp, "SCANOSS_SCAN_FORCE_WFP");

        // Report
        override_string(&mut self.report.format, "SCANOSS_REPORT_FORMAT");
        override_bool(&mut self.report.quiet, "SCANOSS_REPORT_QUIET");

        // Filter
        override_string(&mut self.filter.sbom, "SCANOSS_FILTER_SBOM");
        override_string(&mut self.filter.blacklist, "SCANOSS_FILTER_BLACKLIST");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ScanossError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.store.root.is_empty() {
            return Err(invalid("store.root", "must not be empty".to_owned()));
        }

        // 스토어 이름은 디렉토리 한 단계로만 사용됩니다
        if self.store.name.is_empty() || self.store.name.contains(['/', '\\']) || self.store.name == ".." {
            return Err(invalid(
                "store.name",
                "must be a single non-empty path component".to_owned(),
            ));
        }

        if self.scan.max_targets == 0 || self.scan.max_targets > MAX_TARGETS_LIMIT {
            return Err(invalid(
                "scan.max_targets",
                format!("must be 1-{MAX_TARGETS_LIMIT}"),
            ));
        }

        if self.scan.max_ranges == 0 || self.scan.max_ranges > MAX_RANGES_LIMIT {
            return Err(invalid(
                "scan.max_ranges",
                format!("must be 1-{MAX_RANGES_LIMIT}"),
            ));
        }

        if self.scan.max_depth == 0 || self.scan.max_depth > MAX_DEPTH_LIMIT {
            return Err(invalid(
                "scan.max_depth",
                format!("must be 1-{MAX_DEPTH_LIMIT}"),
            ));
        }

        if self.scan.max_path_len == 0 || self.scan.max_path_len > MAX_PATH_LEN_LIMIT {
            return Err(invalid(
                "scan.max_path_len",
                format!("must be 1-{MAX_PATH_LEN_LIMIT}"),
            ));
        }

        if self.scan.max_file_size == 0 || self.scan.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(invalid(
                "scan.max_file_size",
                format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            ));
        }

        if self.scan.gram == 0 || self.scan.window == 0 {
            return Err(invalid(
                "scan.gram",
                "gram and window must be greater than 0".to_owned(),
            ));
        }

        if !REPORT_FORMATS.contains(&self.report.format.as_str()) {
            return Err(invalid(
                "report.format",
                format!("must be one of: {}", REPORT_FORMATS.join(", ")),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> ScanossError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

// Default는 derive 매크로로 자동 생성 (각 필드가 Default를 구현하므로)

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 키-값 스토어 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 스토어 루트 디렉토리
    pub root: String,
    /// 스토어 이름 (루트 아래 디렉토리명)
    pub name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: "/var/lib/ldb".to_owned(),
            name: "oss".to_owned(),
        }
    }
}

/// 스캔 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 대상 파일당 매치 누산기 슬롯 수
    pub max_targets: usize,
    /// 슬롯당 기록할 최대 라인 범위 수
    pub max_ranges: usize,
    /// 같은 범위로 병합할 최대 라인 간격
    pub range_gap: u32,
    /// 디렉토리 최대 탐색 깊이
    pub max_depth: usize,
    /// 스캔 대상 경로 최대 길이 (바이트)
    pub max_path_len: usize,
    /// 지문 계산 시 읽을 최대 파일 크기 (바이트)
    pub max_file_size: usize,
    /// winnowing gram 길이 (정규화된 문자 수)
    pub gram: usize,
    /// winnowing window 크기 (gram 수)
    pub window: usize,
    /// 확장자 불일치 결과 후순위 처리 (`-e`)
    pub match_extensions: bool,
    /// 확장자와 무관하게 사전 계산 지문 모드 사용 (`-w`)
    pub force_wfp: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_targets: 1000,
            max_ranges: 10,
            range_gap: 15,
            max_depth: 256,
            max_path_len: 4096,
            max_file_size: 4 * 1024 * 1024, // 4 MB
            gram: 30,
            window: 64,
            match_extensions: false,
            force_wfp: false,
        }
    }
}

/// 리포트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 출력 형식 (plain, spdx, cyclonedx, spdx_xml)
    pub format: String,
    /// 리포트 출력 억제 (진단 로그만 출력)
    pub quiet: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "plain".to_owned(),
            quiet: false,
        }
    }
}

/// SBOM / 블랙리스트 필터 설정
///
/// 빈 문자열이면 해당 필터를 사용하지 않습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 포함 필터 SBOM 파일 경로 (`-s`)
    pub sbom: String,
    /// 제외 필터 파일 경로 (`-b`)
    pub blacklist: String,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = ScanossConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.store.name, "oss");
        assert_eq!(config.scan.max_targets, 1000);
        assert_eq!(config.scan.max_ranges, 10);
        assert_eq!(config.report.format, "plain");
        assert!(config.filter.sbom.is_empty());
    }

    #[test]
    fn default_config_passes_validation() {
        ScanossConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = ScanossConfig::parse("").unwrap();
        assert_eq!(config.store.root, "/var/lib/ldb");
        assert_eq!(config.scan.window, 64);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[scan]
max_targets = 50
match_extensions = true

[report]
format = "cyclonedx"
"#;
        let config = ScanossConfig::parse(toml).unwrap();
        assert_eq!(config.scan.max_targets, 50);
        assert!(config.scan.match_extensions);
        // max_ranges는 기본값 유지
        assert_eq!(config.scan.max_ranges, 10);
        assert_eq!(config.report.format, "cyclonedx");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = ScanossConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            ScanossError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_report_format() {
        let mut config = ScanossConfig::default();
        config.report.format = "bogus".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("report.format"));
    }

    #[test]
    fn validate_accepts_every_report_format() {
        for format in REPORT_FORMATS {
            let mut config = ScanossConfig::default();
            config.report.format = format.to_owned();
            config.validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut config = ScanossConfig::default();
        config.scan.max_targets = 0;
        assert!(config.validate().is_err());

        let mut config = ScanossConfig::default();
        config.scan.max_ranges = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_many_ranges() {
        let mut config = ScanossConfig::default();
        config.scan.max_ranges = 1000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_ranges"));
    }

    #[test]
    fn validate_rejects_store_name_with_separator() {
        let mut config = ScanossConfig::default();
        config.store.name = "a/b".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = ScanossConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    #[serial]
    fn env_override_applies_to_scan_section() {
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("SCANOSS_SCAN_MAX_TARGETS", "77") };
        let mut config = ScanossConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.scan.max_targets, 77);
        unsafe { std::env::remove_var("SCANOSS_SCAN_MAX_TARGETS") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_SCANOSS_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_SCANOSS_BOOL_BAD");
        assert!(!val); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_SCANOSS_BOOL_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_SCANOSS_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = ScanossConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = ScanossConfig::parse(&toml_str).unwrap();
        assert_eq!(config.scan.max_targets, parsed.scan.max_targets);
        assert_eq!(config.store.root, parsed.store.root);
    }

    #[test]
    fn from_file_not_found() {
        let err = ScanossConfig::from_file("/nonexistent/path/scanoss.toml").unwrap_err();
        assert!(matches!(
            err,
            ScanossError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
