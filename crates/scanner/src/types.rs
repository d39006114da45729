//! 도메인 타입 -- 스캐너 전용 데이터 구조
//!
//! 스캔 대상, 지문 키, 매치 결과, 리포트 형식 등 핵심 타입을 정의합니다.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScannerError;

/// 파일 / 컴포넌트 식별자 (MD5, 16바이트)
pub type FileId = [u8; 16];

/// 빈 입력의 MD5 (`d41d8cd98f00b204e9800998ecf8427e`)
pub const EMPTY_MD5: FileId = [
    0xd4, 0x1d, 0x8c, 0xd9, 0x8f, 0x00, 0xb2, 0x04, 0xe9, 0x80, 0x09, 0x98, 0xec, 0xf8, 0x42, 0x7e,
];

/// 리포트 출력 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// 경로별 매치 목록 JSON
    Plain,
    /// SPDX 2.3 JSON
    Spdx,
    /// SPDX 2.3 RDF/XML
    SpdxXml,
    /// CycloneDX 1.5 JSON
    CycloneDx,
}

impl ReportFormat {
    /// 지원하는 모든 형식
    pub const ALL: [ReportFormat; 4] = [Self::Plain, Self::Spdx, Self::CycloneDx, Self::SpdxXml];

    /// 형식 이름 (`-f` 인자 값)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Spdx => "spdx",
            Self::SpdxXml => "spdx_xml",
            Self::CycloneDx => "cyclonedx",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ScannerError;

    /// 형식 이름을 파싱합니다. 알 수 없는 이름은 설정 에러입니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ScannerError::config("format", format!("unsupported report format '{s}'")))
    }
}

/// 파일 내용 다이제스트
///
/// 빈 입력과 실제 내용의 해시를 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileDigest {
    /// 길이 0인 입력
    Empty,
    /// 파일 내용의 MD5
    Contents(FileId),
}

impl FileDigest {
    /// 바이트 슬라이스의 다이제스트를 계산합니다.
    pub fn of(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            Self::Empty
        } else {
            Self::Contents(md5::compute(bytes).0)
        }
    }

    /// 이미 계산된 MD5 값에서 다이제스트를 생성합니다.
    pub fn from_md5(md5: FileId) -> Self {
        if md5 == EMPTY_MD5 {
            Self::Empty
        } else {
            Self::Contents(md5)
        }
    }

    /// 16바이트 MD5 값
    pub fn bytes(&self) -> FileId {
        match self {
            Self::Empty => EMPTY_MD5,
            Self::Contents(md5) => *md5,
        }
    }

    /// 소문자 16진수 표현
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes())
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// 스캔 대상 파일 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    /// 리포트에 사용되는 경로
    pub path: PathBuf,
    /// 파일 크기 (바이트)
    pub size: u64,
    /// 내용 다이제스트
    pub digest: FileDigest,
    /// 소문자 확장자 (없으면 빈 문자열)
    pub extension: String,
}

impl ScanTarget {
    /// 경로와 메타데이터로 스캔 대상을 만듭니다.
    pub fn new(path: impl Into<PathBuf>, size: u64, digest: FileDigest) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            size,
            digest,
            extension,
        }
    }

    /// 리포트용 경로 문자열
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes, md5={})", self.path.display(), self.size, self.digest)
    }
}

/// 경로의 확장자를 소문자로 반환합니다.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// 지문 키 하나와 그 키가 나온 대상 파일의 줄 번호
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// `wfp` 테이블 키
    pub key: [u8; 4],
    /// 1부터 시작하는 줄 번호
    pub line: u32,
}

/// 매치된 라인 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    /// 대상 파일 시작 줄
    pub from: u16,
    /// 대상 파일 끝 줄
    pub to: u16,
    /// 스토어 측 원본 파일의 시작 줄
    pub oss_line: u16,
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// 컴포넌트 메타데이터 (`component` 테이블 레코드)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    /// 벤더
    pub vendor: String,
    /// 컴포넌트 이름
    pub component: String,
    /// 버전
    pub version: String,
    /// Package URL
    pub purl: String,
    /// 다운로드 URL
    pub url: String,
}

/// 순위가 매겨진 매치 결과 하나
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// 해석된 컴포넌트 ID (해석 실패 시 `None`)
    pub component_id: Option<FileId>,
    /// 매치된 스토어 파일 ID
    pub file_id: FileId,
    /// 스토어 파일 경로 (해석 실패 시 `None`)
    pub file_path: Option<String>,
    /// 컴포넌트 메타데이터 (해석 실패 시 `None`)
    pub component: Option<ComponentInfo>,
    /// 히트 수
    pub hits: u32,
    /// 커버리지 비율 (hits / 전체 지문 수, 0.0-1.0)
    pub coverage: f64,
    /// 기록된 라인 범위
    pub ranges: Vec<LineRange>,
    /// 매치 파일 확장자가 대상과 같은지 여부 (경로를 모르면 true)
    pub extension_match: bool,
}

impl MatchResult {
    /// 중복 제거에 사용하는 키 (컴포넌트 ID, 없으면 파일 ID)
    pub fn dedup_key(&self) -> FileId {
        self.component_id.unwrap_or(self.file_id)
    }

    /// 컴포넌트 이름 (없으면 빈 문자열)
    pub fn component_name(&self) -> &str {
        self.component.as_ref().map(|c| c.component.as_str()).unwrap_or("")
    }

    /// 벤더 이름 (없으면 빈 문자열)
    pub fn vendor_name(&self) -> &str {
        self.component.as_ref().map(|c| c.vendor.as_str()).unwrap_or("")
    }
}

/// 히트 수와 전체 지문 수로 커버리지를 계산합니다.
pub fn coverage_ratio(hits: u32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(hits) / total as f64).min(1.0)
}
