//! SPDX 2.3 RDF/XML 리포트

use std::collections::HashSet;
use std::io::{self, Write};

use super::{ReportFormatter, report_io, sbom_components, util};
use crate::error::ScannerError;
use crate::session::SessionResults;
use crate::types::FileId;

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const SPDX_NS: &str = "http://spdx.org/rdf/terms#";
const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// SPDX RDF/XML 작성기
pub(super) struct SpdxXmlFormatter {
    namespace: String,
    written: usize,
    seen: HashSet<FileId>,
}

impl SpdxXmlFormatter {
    pub(super) fn new() -> Self {
        Self {
            namespace: format!("https://spdx.org/spdxdocs/scanoss-{}", uuid::Uuid::new_v4()),
            written: 0,
            seen: HashSet::new(),
        }
    }
}

impl ReportFormatter for SpdxXmlFormatter {
    fn open(&mut self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(
            w,
            "<rdf:RDF xmlns:rdf=\"{RDF_NS}\" xmlns:spdx=\"{SPDX_NS}\" xmlns:rdfs=\"{RDFS_NS}\">"
        )?;
        writeln!(
            w,
            "  <spdx:SpdxDocument rdf:about=\"{}#SPDXRef-DOCUMENT\">",
            util::xml_escape(&self.namespace)
        )?;
        writeln!(w, "    <spdx:specVersion>SPDX-2.3</spdx:specVersion>")?;
        writeln!(
            w,
            "    <spdx:dataLicense rdf:resource=\"http://spdx.org/licenses/CC0-1.0\"/>"
        )?;
        writeln!(w, "    <spdx:name>{}-report</spdx:name>", util::TOOL_NAME)?;
        writeln!(w, "    <spdx:creationInfo>")?;
        writeln!(w, "      <spdx:CreationInfo>")?;
        writeln!(
            w,
            "        <spdx:created>{}</spdx:created>",
            util::current_timestamp()
        )?;
        writeln!(
            w,
            "        <spdx:creator>Tool: {}-{}</spdx:creator>",
            util::TOOL_NAME,
            util::TOOL_VERSION
        )?;
        writeln!(w, "      </spdx:CreationInfo>")?;
        writeln!(w, "    </spdx:creationInfo>")
    }

    fn item(&mut self, w: &mut dyn Write, session: &SessionResults) -> Result<usize, ScannerError> {
        let source = util::xml_escape(&session.target.display_path());
        let mut count = 0;
        for (r, c) in sbom_components(session, &mut self.seen) {
            let index = self.written + 1;
            let id = format!("SPDXRef-{index}-{}", util::sanitize_spdx_id(&c.component));
            let supplier = if c.vendor.is_empty() {
                "NOASSERTION".to_owned()
            } else {
                format!("Organization: {}", util::xml_escape(&c.vendor))
            };

            let mut xml = String::new();
            xml.push_str("    <spdx:describesPackage>\n");
            xml.push_str(&format!("      <spdx:Package rdf:about=\"#{id}\">\n"));
            xml.push_str(&format!(
                "        <spdx:name>{}</spdx:name>\n",
                util::xml_escape(&c.component)
            ));
            xml.push_str(&format!(
                "        <spdx:versionInfo>{}</spdx:versionInfo>\n",
                util::xml_escape(util::or_noassertion(&c.version))
            ));
            xml.push_str(&format!("        <spdx:supplier>{supplier}</spdx:supplier>\n"));
            xml.push_str(&format!(
                "        <spdx:downloadLocation>{}</spdx:downloadLocation>\n",
                util::xml_escape(util::or_noassertion(&c.url))
            ));
            xml.push_str("        <spdx:filesAnalyzed>false</spdx:filesAnalyzed>\n");
            xml.push_str(&format!(
                "        <rdfs:comment>Detected in {source} (lines {}, {} hits)</rdfs:comment>\n",
                util::format_ranges(&r.ranges),
                r.hits
            ));
            if !c.purl.is_empty() {
                xml.push_str("        <spdx:externalRef>\n");
                xml.push_str("          <spdx:ExternalRef>\n");
                xml.push_str("            <spdx:referenceCategory rdf:resource=\"http://spdx.org/rdf/terms#referenceCategory_packageManager\"/>\n");
                xml.push_str(&format!(
                    "            <spdx:referenceLocator>{}</spdx:referenceLocator>\n",
                    util::xml_escape(&c.purl)
                ));
                xml.push_str("          </spdx:ExternalRef>\n");
                xml.push_str("        </spdx:externalRef>\n");
            }
            xml.push_str("      </spdx:Package>\n");
            xml.push_str("    </spdx:describesPackage>\n");

            w.write_all(xml.as_bytes()).map_err(report_io)?;
            self.written += 1;
            count += 1;
        }
        Ok(count)
    }

    fn close(&mut self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "  </spdx:SpdxDocument>")?;
        writeln!(w, "</rdf:RDF>")
    }
}
