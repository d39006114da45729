//! CycloneDX 1.5 JSON 리포트
//!
//! [CycloneDX](https://cyclonedx.org/) 1.5 BOM 헤더를 `open`에서 쓰고,
//! 매치된 컴포넌트를 `components` 배열 항목으로 스트리밍합니다.

use std::collections::HashSet;
use std::io::{self, Write};

use serde::Serialize;

use super::{ReportFormatter, report_io, report_json, sbom_components, util};
use crate::error::ScannerError;
use crate::session::SessionResults;
use crate::types::{ComponentInfo, FileId};

/// CycloneDX 컴포넌트
#[derive(Serialize)]
struct CycloneDxComponent {
    #[serde(rename = "type")]
    component_type: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    publisher: String,
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    purl: String,
    #[serde(rename = "externalReferences", skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<CycloneDxReference>,
}

/// CycloneDX 외부 참조
#[derive(Serialize)]
struct CycloneDxReference {
    #[serde(rename = "type")]
    ref_type: &'static str,
    url: String,
}

impl CycloneDxComponent {
    fn new(index: usize, c: &ComponentInfo) -> Self {
        let external_references = if c.url.is_empty() {
            Vec::new()
        } else {
            vec![CycloneDxReference {
                ref_type: "website",
                url: c.url.clone(),
            }]
        };
        Self {
            component_type: "library",
            bom_ref: format!("{index}-{}", util::sanitize_spdx_id(&c.component)),
            publisher: c.vendor.clone(),
            name: c.component.clone(),
            version: c.version.clone(),
            purl: c.purl.clone(),
            external_references,
        }
    }
}

/// CycloneDX JSON 작성기
pub(super) struct CycloneDxFormatter {
    serial: uuid::Uuid,
    written: usize,
    seen: HashSet<FileId>,
}

impl CycloneDxFormatter {
    pub(super) fn new() -> Self {
        Self {
            serial: uuid::Uuid::new_v4(),
            written: 0,
            seen: HashSet::new(),
        }
    }
}

impl ReportFormatter for CycloneDxFormatter {
    fn open(&mut self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{{")?;
        writeln!(w, "  \"bomFormat\": \"CycloneDX\",")?;
        writeln!(w, "  \"specVersion\": \"1.5\",")?;
        writeln!(w, "  \"serialNumber\": \"urn:uuid:{}\",", self.serial)?;
        writeln!(w, "  \"version\": 1,")?;
        writeln!(w, "  \"metadata\": {{")?;
        writeln!(w, "    \"timestamp\": \"{}\",", util::current_timestamp())?;
        writeln!(
            w,
            "    \"tools\": [{{\"vendor\": \"SCANOSS\", \"name\": \"{}\", \"version\": \"{}\"}}]",
            util::TOOL_NAME,
            util::TOOL_VERSION
        )?;
        writeln!(w, "  }},")?;
        writeln!(w, "  \"components\": [")
    }

    fn item(&mut self, w: &mut dyn Write, session: &SessionResults) -> Result<usize, ScannerError> {
        let mut count = 0;
        for (_, c) in sbom_components(session, &mut self.seen) {
            let component = CycloneDxComponent::new(self.written + 1, c);
            let json = serde_json::to_string(&component).map_err(report_json)?;
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

#[cfg(test)]
mod tests {
    use super::super::ReportEmitter;
    use super::super::tests::sample_session;
    use crate::types::ReportFormat;

    fn render(sessions: &[crate::session::SessionResults]) -> serde_json::Value {
        let mut emitter = ReportEmitter::new(Vec::new());
        emitter.open(ReportFormat::CycloneDx).unwrap();
        for s in sessions {
            emitter.emit(s).unwrap();
        }
        emitter.close().unwrap();
        serde_json::from_slice(&emitter.into_inner()).unwrap()
    }

    #[test]
    fn header_contains_required_fields() {
        let bom = render(&[]);
        assert_eq!(bom["bomFormat"], "CycloneDX");
        assert_eq!(bom["specVersion"], "1.5");
        assert!(bom["serialNumber"].as_str().unwrap().starts_with("urn:uuid:"));
        assert_eq!(bom["metadata"]["tools"][0]["name"], "scanoss");
        assert_eq!(bom["components"], serde_json::json!([]));
    }

    #[test]
    fn components_are_rendered() {
        let bom = render(&[sample_session("a.c", true)]);
        let c = &bom["components"][0];
        assert_eq!(c["type"], "library");
        assert_eq!(c["bom-ref"], "1-zlib");
        assert_eq!(c["publisher"], "madler");
        assert_eq!(c["name"], "zlib");
        assert_eq!(c["version"], "1.2.13");
        assert_eq!(c["purl"], "pkg:github/madler/zlib");
        assert_eq!(c["externalReferences"][0]["url"], "https://github.com/madler/zlib");
    }

    #[test]
    fn repeated_component_is_listed_once() {
        let bom = render(&[sample_session("a.c", true), sample_session("b.c", true)]);
        assert_eq!(bom["components"].as_array().unwrap().len(), 1);
    }
}
