//! 스캐너 에러 타입
//!
//! [`ScannerError`]는 스캐너 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ScannerError> for ScanossError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **설정**: `Config` (치명적, 스캔 시작 전)
//! - **대상 접근**: `TargetAccess` (치명적)
//! - **대상별 I/O**: `Io`, `WfpParse` (디렉토리 스캔에서는 해당 대상만 건너뜀)
//! - **스토어**: `StoreRead` (해당 키 조회만 건너뜀)
//! - **필터**: `Filter`
//! - **리포트**: `Report`, `ReportState`

use scanoss_core::error::{ConfigError, ScanError, ScanossError, StoreError};

/// 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 스캔 대상이 파일도 디렉토리도 아님
    #[error("cannot access target {path}")]
    TargetAccess {
        /// 대상 경로
        path: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 사전 계산 지문(.wfp) 파싱 실패
    #[error("wfp parse error: {path}:{line}: {reason}")]
    WfpParse {
        /// .wfp 파일 경로
        path: String,
        /// 1부터 시작하는 줄 번호
        line: usize,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 스토어 테이블 읽기 / 레코드 해석 실패
    #[error("store read error: {table}: {reason}")]
    StoreRead {
        /// 테이블 이름
        table: String,
        /// 실패 사유
        reason: String,
    },

    /// SBOM / 블랙리스트 필터 로딩 실패
    #[error("filter load error: {path}: {reason}")]
    Filter {
        /// 필터 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 리포트 출력 실패
    #[error("report error: {0}")]
    Report(String),

    /// 리포트 상태 머신에서 허용되지 않는 호출
    #[error("report emitter cannot {op} in state {state}")]
    ReportState {
        /// 현재 상태명
        state: &'static str,
        /// 시도한 연산
        op: &'static str,
    },
}

impl ScannerError {
    /// 파일 I/O 에러를 경로와 함께 생성합니다.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 설정 에러를 생성합니다.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 프로세스를 종료해야 하는 에러인지 여부
    ///
    /// 설정 / 대상 접근 / 필터 에러는 치명적이며,
    /// 나머지는 대상 하나 또는 키 하나 단위로 복구됩니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::TargetAccess { .. } | Self::Filter { .. }
        )
    }
}

impl From<ScannerError> for ScanossError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::Config { field, reason } => {
                ScanossError::Config(ConfigError::InvalidValue { field, reason })
            }
            ScannerError::TargetAccess { path } => ScanossError::Scan(ScanError::TargetAccess(path)),
            ScannerError::Io { path, source } => ScanossError::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),
            ScannerError::WfpParse { path, line, reason } => {
                ScanossError::Scan(ScanError::Fingerprint(format!("{path}:{line}: {reason}")))
            }
            ScannerError::StoreRead { table, reason } => {
                ScanossError::Store(StoreError::Read(format!("{table}: {reason}")))
            }
            ScannerError::Filter { path, reason } => {
                ScanossError::Scan(ScanError::Filter(format!("{path}: {reason}")))
            }
            ScannerError::Report(msg) => ScanossError::Scan(ScanError::Report(msg)),
            err @ ScannerError::ReportState { .. } => {
                ScanossError::Scan(ScanError::Report(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ScannerError::config("format", "unsupported report format 'bogus'");
        let msg = err.to_string();
        assert!(msg.contains("format"));
        assert!(msg.contains("bogus"));
        assert!(err.is_fatal());
    }

    #[test]
    fn wfp_parse_error_display() {
        let err = ScannerError::WfpParse {
            path: "scan.wfp".to_owned(),
            line: 3,
            reason: "invalid hex".to_owned(),
        };
        assert_eq!(err.to_string(), "wfp parse error: scan.wfp:3: invalid hex");
        assert!(!err.is_fatal());
    }

    #[test]
    fn report_state_error_display() {
        let err = ScannerError::ReportState {
            state: "closed",
            op: "emit",
        };
        assert_eq!(err.to_string(), "report emitter cannot emit in state closed");
    }

    #[test]
    fn io_error_is_recoverable() {
        let err = ScannerError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/x"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn converts_target_access_to_scan_error() {
        let err: ScanossError = ScannerError::TargetAccess {
            path: "/missing".to_owned(),
        }
        .into();
        assert!(matches!(err, ScanossError::Scan(ScanError::TargetAccess(_))));
    }

    #[test]
    fn converts_config_to_config_error() {
        let err: ScanossError = ScannerError::config("max_targets", "zero").into();
        assert!(matches!(
            err,
            ScanossError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn converts_store_read_to_store_error() {
        let err: ScanossError = ScannerError::StoreRead {
            table: "wfp".to_owned(),
            reason: "truncated".to_owned(),
        }
        .into();
        assert!(matches!(err, ScanossError::Store(StoreError::Read(_))));
    }

    #[test]
    fn converts_report_state_to_report_error() {
        let err: ScanossError = ScannerError::ReportState {
            state: "unopened",
            op: "close",
        }
        .into();
        assert!(matches!(err, ScanossError::Scan(ScanError::Report(_))));
    }
}
