//! SBOM 포함 필터와 블랙리스트 제외 필터
//!
//! 두 필터 모두 같은 JSON 형식을 읽습니다.
//!
//! ```json
//! {"components": [{"vendor": "madler", "component": "zlib"}]}
//! ```
//!
//! 배열만 있는 형식(`[{"component": "zlib"}]`)과 `component` 대신 `name` 키도 허용합니다.
//! 이름과 벤더는 대소문자를 구분하지 않으며, 벤더가 없으면 이름만 비교합니다.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::config::ScannerConfig;
use crate::error::ScannerError;
use crate::types::MatchResult;

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterDocument {
    Wrapped { components: Vec<FilterEntry> },
    Bare(Vec<FilterEntry>),
}

#[derive(Deserialize)]
struct FilterEntry {
    #[serde(default)]
    vendor: Option<String>,
    #[serde(alias = "name")]
    component: String,
}

/// 컴포넌트 목록 필터
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    /// (소문자 벤더, 소문자 이름)
    entries: Vec<(Option<String>, String)>,
}

impl ComponentFilter {
    /// 파일에서 필터를 읽습니다.
    pub fn load(path: &Path) -> Result<Self, ScannerError> {
        let source = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ScannerError::Filter {
            path: source.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, &source)
    }

    /// JSON 문자열에서 필터를 파싱합니다.
    pub fn parse(content: &str, source: &str) -> Result<Self, ScannerError> {
        let doc: FilterDocument =
            serde_json::from_str(content).map_err(|e| ScannerError::Filter {
                path: source.to_owned(),
                reason: e.to_string(),
            })?;
        let entries = match doc {
            FilterDocument::Wrapped { components } | FilterDocument::Bare(components) => components,
        };

        let entries = entries
            .into_iter()
            .filter(|e| !e.component.trim().is_empty())
            .map(|e| {
                (
                    e.vendor
                        .filter(|v| !v.trim().is_empty())
                        .map(|v| v.trim().to_lowercase()),
                    e.component.trim().to_lowercase(),
                )
            })
            .collect::<Vec<_>>();
        debug!(path = source, entries = entries.len(), "component filter loaded");
        Ok(Self { entries })
    }

    /// 항목 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 결과의 컴포넌트가 목록에 있는지 여부
    ///
    /// 컴포넌트가 해석되지 않은 결과는 어떤 항목과도 맞지 않습니다.
    pub fn matches(&self, result: &MatchResult) -> bool {
        let Some(component) = &result.component else {
            return false;
        };
        let name = component.component.to_lowercase();
        let vendor = component.vendor.to_lowercase();
        self.entries
            .iter()
            .any(|(v, c)| *c == name && v.as_ref().is_none_or(|v| *v == vendor))
    }
}

/// 결과에 적용할 필터 묶음
#[derive(Debug, Clone, Default)]
pub struct MatchFilters {
    sbom: Option<ComponentFilter>,
    blacklist: Option<ComponentFilter>,
}

impl MatchFilters {
    /// 필터를 직접 지정해 생성합니다.
    pub fn new(sbom: Option<ComponentFilter>, blacklist: Option<ComponentFilter>) -> Self {
        Self { sbom, blacklist }
    }

    /// 설정에 지정된 필터 파일을 읽습니다.
    pub fn load(config: &ScannerConfig) -> Result<Self, ScannerError> {
        let sbom = config
            .sbom
            .as_deref()
            .map(ComponentFilter::load)
            .transpose()?;
        let blacklist = config
            .blacklist
            .as_deref()
            .map(ComponentFilter::load)
            .transpose()?;
        Ok(Self { sbom, blacklist })
    }

    /// 필터가 하나라도 있는지 여부
    pub fn is_active(&self) -> bool {
        self.sbom.is_some() || self.blacklist.is_some()
    }

    /// 포함 필터 후 제외 필터를 적용합니다.
    pub fn apply(&self, results: &mut Vec<MatchResult>) {
        if let Some(sbom) = &self.sbom {
            results.retain(|r| sbom.matches(r));
        }
        if let Some(blacklist) = &self.blacklist {
            results.retain(|r| !blacklist.matches(r));
        }
    }
}
