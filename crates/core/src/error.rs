//! 에러 타입 -- 도메인별 에러 정의

/// SCANOSS 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ScanossError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 처리 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// 키-값 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 스캔 대상에 접근할 수 없음 (파일도 디렉토리도 아님)
    #[error("cannot access target {0}")]
    TargetAccess(String),

    /// 지문(wfp) 소스 파싱 실패
    #[error("fingerprint parse failed: {0}")]
    Fingerprint(String),

    /// 리포트 출력 실패
    #[error("report failed: {0}")]
    Report(String),

    /// SBOM / 블랙리스트 필터 로딩 실패
    #[error("filter load failed: {0}")]
    Filter(String),
}

/// 키-값 스토어 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 테이블 읽기 실패
    #[error("table read failed: {0}")]
    Read(String),

    /// 레코드 형식 오류
    #[error("corrupt record: {0}")]
    Corrupt(String),
}
