//! plain JSON 리포트
//!
//! 대상 경로를 키로, 매치 목록을 값으로 하는 JSON 객체 하나를 씁니다.
//!
//! ```text
//! {
//!   "src/inflate.c": [ { "id": "snippet", "lines": "3-9", ... } ],
//!   "src/empty.c": []
//! }
//! ```
//!
//! 키는 출력 순서대로 스트리밍되므로 같은 경로가 두 번 나오면 (예: `.wfp` 안의
//! 중복 `file=` 블록) 객체 키가 중복됩니다. 중복은 `debug` 로그로 남깁니다.

use std::collections::HashSet;
use std::io::{self, Write};

use serde::Serialize;
use tracing::debug;

use super::{ReportFormatter, report_io, report_json, util};
use crate::error::ScannerError;
use crate::session::SessionResults;
use crate::types::MatchResult;

/// plain 형식 매치 항목
#[derive(Serialize)]
struct PlainMatch<'a> {
    id: &'static str,
    lines: String,
    oss_lines: String,
    matched: String,
    hits: u32,
    vendor: &'a str,
    component: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    purl: Vec<&'a str>,
    url: &'a str,
    file: &'a str,
    file_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    component_id: Option<String>,
    source_hash: String,
}

impl<'a> PlainMatch<'a> {
    fn new(r: &'a MatchResult, source_hash: String) -> Self {
        let component = r.component.as_ref();
        Self {
            id: "snippet",
            lines: util::format_ranges(&r.ranges),
            oss_lines: util::format_oss_ranges(&r.ranges),
            matched: format!("{:.0}%", r.coverage * 100.0),
            hits: r.hits,
            vendor: component.map_or("", |c| c.vendor.as_str()),
            component: component.map_or("", |c| c.component.as_str()),
            version: component.map_or("", |c| c.version.as_str()),
            purl: component
                .map(|c| c.purl.as_str())
                .filter(|p| !p.is_empty())
                .into_iter()
                .collect(),
            url: component.map_or("", |c| c.url.as_str()),
            file: r.file_path.as_deref().unwrap_or(""),
            file_id: hex::encode(r.file_id),
            component_id: r.component_id.map(hex::encode),
            source_hash,
        }
    }
}

/// plain 형식 작성기
#[derive(Default)]
pub(super) struct PlainFormatter {
    written: usize,
    seen: HashSet<String>,
    duplicates: usize,
}

impl ReportFormatter for PlainFormatter {
    fn open(&mut self, w: &mut dyn Write) -> io::Result<()> {
        w.write_all(b"{\n")
    }

    fn item(&mut self, w: &mut dyn Write, session: &SessionResults) -> Result<usize, ScannerError> {
        let source_hash = session.target.digest.to_hex();
        let matches: Vec<PlainMatch<'_>> = session
            .results
            .iter()
            .map(|r| PlainMatch::new(r, source_hash.clone()))
            .collect();

        let path = session.target.display_path();
        if !self.seen.insert(path.clone()) {
            self.duplicates += 1;
            debug!(path = %path, duplicates = self.duplicates, "duplicate report key in plain output");
        }
        let key = serde_json::to_string(&path).map_err(report_json)?;
        let value = serde_json::to_string_pretty(&matches).map_err(report_json)?;

        if self.written > 0 {
            w.write_all(b",\n").map_err(report_io)?;
        }
        write!(w, "  {key}: {value}").map_err(report_io)?;
        self.written += 1;
        Ok(1)
    }

    fn close(&mut self, w: &mut dyn Write) -> io::Result<()> {
        if self.written > 0 {
            w.write_all(b"\n")?;
        }
        w.write_all(b"}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_session;
    use super::super::{ReportEmitter, ReportFormatter};
    use super::PlainFormatter;
    use crate::types::ReportFormat;

    fn render(sessions: &[crate::session::SessionResults]) -> serde_json::Value {
        let mut emitter = ReportEmitter::new(Vec::new());
        emitter.open(ReportFormat::Plain).unwrap();
        for s in sessions {
            emitter.emit(s).unwrap();
        }
        emitter.close().unwrap();
        serde_json::from_slice(&emitter.into_inner()).unwrap()
    }

    #[test]
    fn empty_report_is_empty_object() {
        assert_eq!(render(&[]), serde_json::json!({}));
    }

    #[test]
    fn session_without_matches_has_empty_list() {
        let value = render(&[sample_session("src/none.c", false)]);
        assert_eq!(value["src/none.c"], serde_json::json!([]));
    }

    #[test]
    fn match_fields_are_rendered() {
        let value = render(&[sample_session("src/a.c", true)]);
        let m = &value["src/a.c"][0];
        assert_eq!(m["id"], "snippet");
        assert_eq!(m["lines"], "3-9");
        assert_eq!(m["oss_lines"], "120-126");
        assert_eq!(m["matched"], "50%");
        assert_eq!(m["hits"], 4);
        assert_eq!(m["vendor"], "madler");
        assert_eq!(m["component"], "zlib");
        assert_eq!(m["purl"][0], "pkg:github/madler/zlib");
        assert_eq!(m["file"], "lib/inflate.c");
        assert_eq!(m["file_id"], "0a".repeat(16));
    }

    #[test]
    fn paths_are_json_escaped() {
        let value = render(&[sample_session("dir/we\"ird.c", false)]);
        assert!(value.get("dir/we\"ird.c").is_some());
    }

    #[test]
    fn duplicate_paths_are_detected() {
        let mut formatter = PlainFormatter::default();
        let mut out = Vec::new();
        formatter.open(&mut out).unwrap();
        formatter.item(&mut out, &sample_session("dup.c", false)).unwrap();
        formatter.item(&mut out, &sample_session("other.c", false)).unwrap();
        formatter.item(&mut out, &sample_session("dup.c", false)).unwrap();
        formatter.close(&mut out).unwrap();

        assert_eq!(formatter.duplicates, 1);
        assert_eq!(formatter.written, 3);
    }
}
