//! 스캐너 설정
//!
//! [`ScannerConfig`]는 core의 [`ScanossConfig`](scanoss_core::config::ScanossConfig)에서
//! 파생되며, 문자열 필드를 타입이 있는 값(리포트 형식, 경로)으로 바꿔 담습니다.
//! 한 번 만들어진 뒤에는 `&ScannerConfig`로만 전달됩니다.
//!
//! # 사용 예시
//!
//! ```
//! use scanoss_scanner::{ReportFormat, ScannerConfigBuilder};
//!
//! let config = ScannerConfigBuilder::new()
//!     .store_root("/tmp/ldb")
//!     .format(ReportFormat::Spdx)
//!     .max_targets(64)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.record_length(), 16 + 2 + 6 * 10 + 4);
//! ```

use std::path::PathBuf;

use scanoss_core::config::ScanossConfig;

use crate::error::ScannerError;
use crate::matcher::matchmap;
use crate::types::ReportFormat;

/// 설정 상한값 상수
const MAX_TARGETS_LIMIT: usize = 1_000_000;
const MAX_RANGES_LIMIT: usize = 255;
const MAX_DEPTH_LIMIT: usize = 4096;

/// 스캐너 설정
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// 스토어 루트 디렉토리
    pub store_root: PathBuf,
    /// 스토어 이름
    pub store_name: String,
    /// 누산기 슬롯 수
    pub max_targets: usize,
    /// 슬롯당 라인 범위 수
    pub max_ranges: usize,
    /// 범위 병합 간격 (줄)
    pub range_gap: u32,
    /// 디렉토리 최대 깊이
    pub max_depth: usize,
    /// 대상 경로 최대 길이
    pub max_path_len: usize,
    /// 지문 계산 최대 파일 크기
    pub max_file_size: usize,
    /// winnowing gram 길이
    pub gram: usize,
    /// winnowing window 크기
    pub window: usize,
    /// 확장자 불일치 후순위 처리
    pub match_extensions: bool,
    /// 사전 계산 지문 모드 강제
    pub force_wfp: bool,
    /// 리포트 형식
    pub format: ReportFormat,
    /// SBOM 포함 필터 파일
    pub sbom: Option<PathBuf>,
    /// 블랙리스트 파일
    pub blacklist: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("/var/lib/ldb"),
            store_name: "oss".to_owned(),
            max_targets: 1000,
            max_ranges: 10,
            range_gap: 15,
            max_depth: 256,
            max_path_len: 4096,
            max_file_size: 4 * 1024 * 1024,
            gram: 30,
            window: 64,
            match_extensions: false,
            force_wfp: false,
            format: ReportFormat::Plain,
            sbom: None,
            blacklist: None,
        }
    }
}

impl ScannerConfig {
    /// core 설정에서 스캐너 설정을 생성합니다.
    ///
    /// 형식 이름이 알 수 없는 값이면 설정 에러를 반환합니다.
    pub fn from_core(core: &ScanossConfig) -> Result<Self, ScannerError> {
        let config = Self {
            store_root: PathBuf::from(&core.store.root),
            store_name: core.store.name.clone(),
            max_targets: core.scan.max_targets,
            max_ranges: core.scan.max_ranges,
            range_gap: core.scan.range_gap,
            max_depth: core.scan.max_depth,
            max_path_len: core.scan.max_path_len,
            max_file_size: core.scan.max_file_size,
            gram: core.scan.gram,
            window: core.scan.window,
            match_extensions: core.scan.match_extensions,
            force_wfp: core.scan.force_wfp,
            format: core.report.format.parse()?,
            sbom: non_empty_path(&core.filter.sbom),
            blacklist: non_empty_path(&core.filter.blacklist),
        };
        config.validate()?;
        Ok(config)
    }

    /// 누산기 슬롯 하나의 바이트 길이
    pub fn record_length(&self) -> usize {
        matchmap::record_length(self.max_ranges)
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `max_targets`: 1-1000000
    /// - `max_ranges`: 1-255
    /// - `max_depth`: 1-4096
    /// - `max_path_len`, `max_file_size`, `gram`, `window`: 0보다 커야 함
    /// - `store_name`: 경로 구분자 없는 한 단계 이름
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.max_targets == 0 || self.max_targets > MAX_TARGETS_LIMIT {
            return Err(ScannerError::config(
                "max_targets",
                format!("must be 1-{MAX_TARGETS_LIMIT}"),
            ));
        }

        if self.max_ranges == 0 || self.max_ranges > MAX_RANGES_LIMIT {
            return Err(ScannerError::config(
                "max_ranges",
                format!("must be 1-{MAX_RANGES_LIMIT}"),
            ));
        }

        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ScannerError::config(
                "max_depth",
                format!("must be 1-{MAX_DEPTH_LIMIT}"),
            ));
        }

        if self.max_path_len == 0 {
            return Err(ScannerError::config("max_path_len", "must be greater than 0"));
        }

        if self.max_file_size == 0 {
            return Err(ScannerError::config("max_file_size", "must be greater than 0"));
        }

        if self.gram == 0 || self.window == 0 {
            return Err(ScannerError::config(
                "gram",
                "gram and window must be greater than 0",
            ));
        }

        if self.store_name.is_empty() || self.store_name.contains(['/', '\\']) || self.store_name == ".." {
            return Err(ScannerError::config(
                "store_name",
                "must be a single non-empty path component",
            ));
        }

        Ok(())
    }
}

fn non_empty_path(s: &str) -> Option<PathBuf> {
    if s.is_empty() {
        None
    } else {
        Some(PathBuf::from(s))
    }
}

/// [`ScannerConfig`] 빌더
///
/// CLI 플래그를 설정 위에 덮어쓸 때 사용합니다. `build()`에서 검증합니다.
#[derive(Default)]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl ScannerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 시작하는 빌더를 생성합니다.
    pub fn from_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// 스토어 루트를 설정합니다.
    pub fn store_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.store_root = root.into();
        self
    }

    /// 스토어 이름을 설정합니다.
    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.config.store_name = name.into();
        self
    }

    /// 누산기 슬롯 수를 설정합니다.
    pub fn max_targets(mut self, n: usize) -> Self {
        self.config.max_targets = n;
        self
    }

    /// 슬롯당 범위 수를 설정합니다.
    pub fn max_ranges(mut self, n: usize) -> Self {
        self.config.max_ranges = n;
        self
    }

    /// 범위 병합 간격을 설정합니다.
    pub fn range_gap(mut self, gap: u32) -> Self {
        self.config.range_gap = gap;
        self
    }

    /// 디렉토리 최대 깊이를 설정합니다.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// 대상 경로 최대 길이를 설정합니다.
    pub fn max_path_len(mut self, len: usize) -> Self {
        self.config.max_path_len = len;
        self
    }

    /// winnowing 파라미터를 설정합니다.
    pub fn winnowing(mut self, gram: usize, window: usize) -> Self {
        self.config.gram = gram;
        self.config.window = window;
        self
    }

    /// 확장자 불일치 후순위 처리 여부 (`-e`)
    pub fn match_extensions(mut self, enabled: bool) -> Self {
        self.config.match_extensions = enabled;
        self
    }

    /// 사전 계산 지문 모드 강제 여부 (`-w`)
    pub fn force_wfp(mut self, enabled: bool) -> Self {
        self.config.force_wfp = enabled;
        self
    }

    /// 리포트 형식을 설정합니다 (`-f`).
    pub fn format(mut self, format: ReportFormat) -> Self {
        self.config.format = format;
        self
    }

    /// SBOM 포함 필터 파일을 설정합니다 (`-s`).
    pub fn sbom(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.sbom = Some(path.into());
        self
    }

    /// 블랙리스트 파일을 설정합니다 (`-b`).
    pub fn blacklist(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.blacklist = Some(path.into());
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ScannerError::Config` 반환
    pub fn build(self) -> Result<ScannerConfig, ScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ScannerConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_maps_every_section() {
        let mut core = ScanossConfig::default();
        core.store.root = "/data/ldb".to_owned();
        core.scan.max_targets = 42;
        core.scan.match_extensions = true;
        core.report.format = "cyclonedx".to_owned();
        core.filter.sbom = "sbom.json".to_owned();

        let config = ScannerConfig::from_core(&core).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/data/ldb"));
        assert_eq!(config.max_targets, 42);
        assert!(config.match_extensions);
        assert_eq!(config.format, ReportFormat::CycloneDx);
        assert_eq!(config.sbom, Some(PathBuf::from("sbom.json")));
        assert!(config.blacklist.is_none());
    }

    #[test]
    fn from_core_rejects_unknown_format() {
        let mut core = ScanossConfig::default();
        core.report.format = "bogus".to_owned();
        let err = ScannerConfig::from_core(&core).unwrap_err();
        assert!(matches!(err, ScannerError::Config { .. }));
    }

    #[test]
    fn record_length_follows_max_ranges() {
        let config = ScannerConfigBuilder::new().max_ranges(3).build().unwrap();
        assert_eq!(config.record_length(), 16 + 2 + 3 * 6 + 4);
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        assert!(ScannerConfigBuilder::new().max_targets(0).build().is_err());
        assert!(ScannerConfigBuilder::new().max_ranges(0).build().is_err());
        assert!(ScannerConfigBuilder::new().max_ranges(256).build().is_err());
    }

    #[test]
    fn validate_rejects_bad_store_name() {
        assert!(ScannerConfigBuilder::new().store_name("a/b").build().is_err());
        assert!(ScannerConfigBuilder::new().store_name("").build().is_err());
    }

    #[test]
    fn validate_rejects_zero_winnowing() {
        assert!(ScannerConfigBuilder::new().winnowing(0, 4).build().is_err());
        assert!(ScannerConfigBuilder::new().winnowing(4, 0).build().is_err());
    }

    #[test]
    fn builder_overrides_from_existing_config() {
        let base = ScannerConfig::default();
        let config = ScannerConfigBuilder::from_config(base)
            .force_wfp(true)
            .blacklist("bl.json")
            .build()
            .unwrap();
        assert!(config.force_wfp);
        assert_eq!(config.blacklist, Some(PathBuf::from("bl.json")));
        assert_eq!(config.format, ReportFormat::Plain);
    }
}
