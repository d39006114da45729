//! SPDX 2.3 JSON 리포트
//!
//! [SPDX](https://spdx.dev/) 2.3 문서 헤더를 `open`에서 쓰고, 매치된 컴포넌트를
//! `packages` 배열 항목으로 스트리밍합니다.

use std::collections::HashSet;
use std::io::{self, Write};

use serde::Serialize;

use super::{ReportFormatter, report_io, report_json, sbom_components, util};
use crate::error::ScannerError;
use crate::session::SessionResults;
use crate::types::{ComponentInfo, FileId, MatchResult};

/// SPDX 문서 네임스페이스 접두사
const NAMESPACE_PREFIX: &str = "https://spdx.org/spdxdocs/scanoss";

/// SPDX 패키지
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: String,
    version_info: String,
    supplier: String,
    download_location: String,
    files_analyzed: bool,
    license_concluded: &'static str,
    copyright_text: &'static str,
    comment: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<SpdxExternalRef>,
}

/// SPDX 외부 참조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_category: &'static str,
    reference_type: &'static str,
    reference_locator: String,
}

impl SpdxPackage {
    fn new(index: usize, r: &MatchResult, c: &ComponentInfo, source: &str) -> Self {
        let external_refs = if c.purl.is_empty() {
            Vec::new()
        } else {
            vec![SpdxExternalRef {
                reference_category: "PACKAGE-MANAGER",
                reference_type: "purl",
                reference_locator: c.purl.clone(),
            }]
        };
        Self {
            spdx_id: format!("SPDXRef-{index}-{}", util::sanitize_spdx_id(&c.component)),
            name: c.component.clone(),
            version_info: util::or_noassertion(&c.version).to_owned(),
            supplier: if c.vendor.is_empty() {
                "NOASSERTION".to_owned()
            } else {
                format!("Organization: {}", c.vendor)
            },
            download_location: util::or_noassertion(&c.url).to_owned(),
            files_analyzed: false,
            license_concluded: "NOASSERTION",
            copyright_text: "NOASSERTION",
            comment: format!(
                "Detected in {source} (lines {}, {} hits)",
                util::format_ranges(&r.ranges),
                r.hits
            ),
            external_refs,
        }
    }
}

/// SPDX JSON 작성기
pub(super) struct SpdxFormatter {
    namespace: String,
    written: usize,
    seen: HashSet<FileId>,
}

impl SpdxFormatter {
    pub(super) fn new() -> Self {
        Self {
            namespace: format!("{NAMESPACE_PREFIX}-{}", uuid::Uuid::new_v4()),
            written: 0,
            seen: HashSet::new(),
        }
    }
}

impl ReportFormatter for SpdxFormatter {
    fn open(&mut self, w: &mut dyn Write) -> io::Result<()> {
        let creator = format!("Tool: {}-{}", util::TOOL_NAME, util::TOOL_VERSION);
        writeln!(w, "{{")?;
        writeln!(w, "  \"spdxVersion\": \"SPDX-2.3\",")?;
        writeln!(w, "  \"dataLicense\": \"CC0-1.0\",")?;
        writeln!(w, "  \"SPDXID\": \"SPDXRef-DOCUMENT\",")?;
        writeln!(w, "  \"name\": \"{}-report\",", util::TOOL_NAME)?;
        writeln!(w, "  \"documentNamespace\": {},", json_str(&self.namespace))?;
        writeln!(w, "  \"creationInfo\": {{")?;
        writeln!(w, "    \"created\": {},", json_str(&util::current_timestamp()))?;
        writeln!(w, "    \"creators\": [{}]", json_str(&creator))?;
        writeln!(w, "  }},")?;
        writeln!(w, "  \"packages\": [")
    }

    fn item(&mut self, w: &mut dyn Write, session: &SessionResults) -> Result<usize, ScannerError> {
        let source = session.target.display_path();
        let mut count = 0;
        for (r, c) in sbom_components(session, &mut self.seen) {
            let package = SpdxPackage::new(self.written + 1, r, c, &source);
            let json = serde_json::to_string(&package).map_err(report_json)?;
            if self.written > 0 {
                w.write_all(b",\n").map_err(report_io)?;
            }
            write!(w, "    {json}").map_err(report_io)?;
            self.written += 1;
            count += 1;
        }
        Ok(count)
    }

    fn close(&mut self, w: &mut dyn Write) -> io::Result<()> {
        if self.written > 0 {
            w.write_all(b"\n")?;
        }
        w.write_all(b"  ]\n}\n")
    }
}

fn json_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}
