//! 리포트 출력 -- 스트리밍 상태 머신
//!
//! ```text
//! Unopened --open(format)--> Opened --emit--> ItemEmitted --emit--> ItemEmitted
//!                               \                  |
//!                                +------close------+--> Closed
//! ```
//!
//! `open`은 형식별 여는 프레임을, `emit`은 세션 하나의 결과를, `close`는 닫는 프레임을 씁니다.
//! 한 문서 안에서 형식은 바뀌지 않으며, 닫힌 뒤의 호출은 [`ScannerError::ReportState`]입니다.

pub mod cyclonedx;
pub mod plain;
pub mod spdx;
pub mod spdx_xml;
pub mod util;

use std::collections::HashSet;
use std::fmt;
use std::io::{self, Write};

use metrics::counter;
use tracing::debug;

use scanoss_core::metrics as m;

use crate::error::ScannerError;
use crate::session::SessionResults;
use crate::types::{ComponentInfo, FileId, MatchResult, ReportFormat};

/// 리포트 출력기 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    /// 아직 열리지 않음
    Unopened,
    /// 여는 프레임을 씀
    Opened,
    /// 세션 결과를 하나 이상 씀
    ItemEmitted,
    /// 닫는 프레임을 씀
    Closed,
}

impl EmitterState {
    fn name(&self) -> &'static str {
        match self {
            Self::Unopened => "unopened",
            Self::Opened => "opened",
            Self::ItemEmitted => "item_emitted",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for EmitterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 형식별 프레임/항목 작성기
///
/// 항목 구분자(쉼표)는 각 작성기가 자신이 쓴 항목 수로 판단합니다.
trait ReportFormatter {
    fn open(&mut self, w: &mut dyn Write) -> io::Result<()>;

    /// 세션 하나를 쓰고 기록한 항목 수를 반환합니다.
    fn item(&mut self, w: &mut dyn Write, session: &SessionResults) -> Result<usize, ScannerError>;

    fn close(&mut self, w: &mut dyn Write) -> io::Result<()>;
}

fn formatter_for(format: ReportFormat) -> Box<dyn ReportFormatter> {
    match format {
        ReportFormat::Plain => Box::new(plain::PlainFormatter::default()),
        ReportFormat::Spdx => Box::new(spdx::SpdxFormatter::new()),
        ReportFormat::SpdxXml => Box::new(spdx_xml::SpdxXmlFormatter::new()),
        ReportFormat::CycloneDx => Box::new(cyclonedx::CycloneDxFormatter::new()),
    }
}

/// 스트리밍 리포트 출력기
pub struct ReportEmitter<W: Write> {
    writer: W,
    state: EmitterState,
    format: Option<ReportFormat>,
    formatter: Option<Box<dyn ReportFormatter>>,
    items: usize,
}

impl<W: Write> ReportEmitter<W> {
    /// 출력 대상을 감싸는 새 출력기를 만듭니다.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            state: EmitterState::Unopened,
            format: None,
            formatter: None,
            items: 0,
        }
    }

    /// 현재 상태
    pub fn state(&self) -> EmitterState {
        self.state
    }

    /// 열린 형식 (열리기 전에는 `None`)
    pub fn format(&self) -> Option<ReportFormat> {
        self.format
    }

    /// 지금까지 쓴 항목 수
    pub fn items(&self) -> usize {
        self.items
    }

    /// 여는 프레임을 씁니다.
    pub fn open(&mut self, format: ReportFormat) -> Result<(), ScannerError> {
        if self.state != EmitterState::Unopened {
            return Err(self.invalid("open"));
        }
        let mut formatter = formatter_for(format);
        formatter.open(&mut self.writer).map_err(report_io)?;
        self.formatter = Some(formatter);
        self.format = Some(format);
        self.state = EmitterState::Opened;
        debug!(format = %format, "report opened");
        Ok(())
    }

    /// 세션 하나의 결과를 씁니다.
    pub fn emit(&mut self, session: &SessionResults) -> Result<(), ScannerError> {
        if !matches!(self.state, EmitterState::Opened | EmitterState::ItemEmitted) {
            return Err(self.invalid("emit"));
        }
        let state = self.state.name();
        let (Some(formatter), Some(format)) = (self.formatter.as_mut(), self.format) else {
            return Err(ScannerError::ReportState { state, op: "emit" });
        };
        let written = formatter.item(&mut self.writer, session)?;
        self.items += written;
        self.state = EmitterState::ItemEmitted;
        counter!(m::REPORT_ITEMS_EMITTED_TOTAL, m::LABEL_FORMAT => format.as_str())
            .increment(written as u64);
        Ok(())
    }

    /// 닫는 프레임을 쓰고 출력 대상을 flush 합니다.
    pub fn close(&mut self) -> Result<(), ScannerError> {
        if !matches!(self.state, EmitterState::Opened | EmitterState::ItemEmitted) {
            return Err(self.invalid("close"));
        }
        let state = self.state.name();
        let Some(formatter) = self.formatter.as_mut() else {
            return Err(ScannerError::ReportState { state, op: "close" });
        };
        formatter.close(&mut self.writer).map_err(report_io)?;
        self.writer.flush().map_err(report_io)?;
        self.state = EmitterState::Closed;
        debug!(items = self.items, "report closed");
        Ok(())
    }

    /// 출력 대상을 돌려받습니다.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn invalid(&self, op: &'static str) -> ScannerError {
        ScannerError::ReportState {
            state: self.state.name(),
            op,
        }
    }
}

fn report_io(e: io::Error) -> ScannerError {
    ScannerError::Report(e.to_string())
}

fn report_json(e: serde_json::Error) -> ScannerError {
    ScannerError::Report(format!("serialization failed: {e}"))
}

/// SBOM 형식에 들어갈 결과를 고릅니다.
///
/// 컴포넌트가 해석된 결과만, 문서 전체에서 컴포넌트당 한 번만 나옵니다.
fn sbom_components<'r>(
    session: &'r SessionResults,
    seen: &mut HashSet<FileId>,
) -> Vec<(&'r MatchResult, &'r ComponentInfo)> {
    session
        .results
        .iter()
        .filter_map(|r| r.component.as_ref().map(|c| (r, c)))
        .filter(|(r, _)| seen.insert(r.dedup_key()))
        .collect()
}
