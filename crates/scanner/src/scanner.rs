//! 스캐너 오케스트레이터 -- 대상 탐색부터 리포트까지
//!
//! # 처리 흐름
//!
//! ```text
//! root --> TargetWalker --> (computed | precomputed) FingerprintSource
//!                                          |
//!                                   ScanSession::open
//!                                          |
//!                                 Matcher::populate / resolve
//!                                          |
//!                                   MatchFilters::apply
//!                                          |
//!                                  ReportEmitter::emit --> writer
//! ```
//!
//! 단일 스레드, 동기, 탐색 순서대로 처리합니다. 한 대상의 세션이 닫히고
//! 결과가 출력된 뒤에 다음 대상이 열립니다.
//!
//! # 에러 처리
//!
//! - 경로 길이 초과, 접근 불가 루트: 치명적 (I/O 전에 검사)
//! - 디렉토리 스캔 중 대상 하나의 I/O / `.wfp` 파싱 실패, 항목 없는 `.wfp`:
//!   해당 대상만 건너뛰고 `debug` 로그로 남김
//! - 루트가 파일 하나인 경우의 실패: 치명적

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use metrics::counter;
use tracing::{debug, info};

use scanoss_core::metrics as m;

use crate::config::ScannerConfig;
use crate::error::ScannerError;
use crate::filter::MatchFilters;
use crate::matcher::Matcher;
use crate::report::ReportEmitter;
use crate::session::{ScanSession, read_target};
use crate::store::{KvStore, StoreSchema};
use crate::walker::TargetWalker;
use crate::wfp::{FingerprintMode, FingerprintSource, parse_wfp, select_mode};

/// 스캔 한 번의 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// 닫힌 세션 수
    pub sessions: usize,
    /// 건너뛴 대상 수
    pub targets_failed: usize,
    /// 처리한 지문 키 수
    pub fingerprints: usize,
    /// 리포트된 매치 수 (필터 적용 후)
    pub matches: usize,
    /// 용량 초과로 버려진 후보 수
    pub overflow: u64,
}

/// 스캐너 오케스트레이터
pub struct Scanner<'a, S: KvStore + ?Sized> {
    config: &'a ScannerConfig,
    store: &'a S,
    schema: StoreSchema,
    filters: MatchFilters,
}

impl<'a, S: KvStore + ?Sized> Scanner<'a, S> {
    /// 설정에 지정된 필터를 읽어 스캐너를 만듭니다.
    ///
    /// # Errors
    ///
    /// 필터 파일을 읽을 수 없으면 `ScannerError::Filter`
    pub fn new(config: &'a ScannerConfig, store: &'a S) -> Result<Self, ScannerError> {
        let filters = MatchFilters::load(config)?;
        Ok(Self::with_filters(config, store, filters))
    }

    /// 이미 읽은 필터로 스캐너를 만듭니다.
    pub fn with_filters(config: &'a ScannerConfig, store: &'a S, filters: MatchFilters) -> Self {
        Self {
            config,
            store,
            schema: StoreSchema::new(&config.store_name),
            filters,
        }
    }

    /// 스토어 스키마
    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    /// 루트 경로를 스캔하고 리포트를 `writer`에 씁니다.
    ///
    /// 리포트는 세션마다 스트리밍되며, 반환 시 `writer`를 돌려줍니다.
    pub fn run<W: Write>(&self, root: &Path, writer: W) -> Result<(ScanSummary, W), ScannerError> {
        let root = self.prepare_root(root)?;
        let access_error = || ScannerError::TargetAccess {
            path: root.display().to_string(),
        };
        let is_file = match fs::metadata(&root) {
            Ok(meta) if meta.is_file() => true,
            Ok(meta) if meta.is_dir() => {
                // 루트 디렉토리를 읽을 수 없으면 빈 리포트 대신 치명적 에러
                if let Err(e) = fs::read_dir(&root) {
                    debug!(root = %root.display(), error = %e, "root directory is not readable");
                    return Err(access_error());
                }
                false
            }
            _ => return Err(access_error()),
        };

        let matcher =
            Matcher::new(self.store, &self.schema).with_match_extensions(self.config.match_extensions);
        let mut emitter = ReportEmitter::new(writer);
        let mut summary = ScanSummary::default();
        emitter.open(self.config.format)?;

        if is_file {
            // 단일 파일 대상은 `-w`로 강제할 수 있고, 실패는 치명적
            let mode = select_mode(&root, self.config.force_wfp);
            self.scan_target(&root, mode, &matcher, &mut emitter, &mut summary)?;
        } else {
            let mut walker = TargetWalker::new(&root, self.config.max_depth);
            for path in walker.by_ref() {
                let mode = select_mode(&path, false);
                if let Err(e) = self.scan_target(&path, mode, &matcher, &mut emitter, &mut summary) {
                    if e.is_fatal() || matches!(e, ScannerError::Report(_)) {
                        return Err(e);
                    }
                    debug!(path = %path.display(), error = %e, "skipping target");
                    counter!(m::SCANNER_TARGETS_FAILED_TOTAL).increment(1);
                    summary.targets_failed += 1;
                }
            }
            debug!(skipped = walker.skipped(), "walk finished");
        }

        emitter.close()?;
        info!(
            root = %root.display(),
            sessions = summary.sessions,
            failed = summary.targets_failed,
            fingerprints = summary.fingerprints,
            matches = summary.matches,
            overflow = summary.overflow,
            "scan completed"
        );
        Ok((summary, emitter.into_inner()))
    }

    /// 경로 길이를 검사하고 끝의 `/`를 제거합니다.
    fn prepare_root(&self, root: &Path) -> Result<PathBuf, ScannerError> {
        let raw = root.to_string_lossy();
        if raw.is_empty() {
            return Err(ScannerError::config("target", "target path is empty"));
        }
        if raw.len() > self.config.max_path_len {
            return Err(ScannerError::config(
                "target",
                format!(
                    "target path length {} exceeds maximum {}",
                    raw.len(),
                    self.config.max_path_len
                ),
            ));
        }
        let trimmed = raw.trim_end_matches('/');
        Ok(if trimmed.is_empty() {
            PathBuf::from("/")
        } else {
            PathBuf::from(trimmed)
        })
    }

    fn scan_target<W: Write>(
        &self,
        path: &Path,
        mode: FingerprintMode,
        matcher: &Matcher<'_, S>,
        emitter: &mut ReportEmitter<W>,
        summary: &mut ScanSummary,
    ) -> Result<(), ScannerError> {
        debug!(path = %path.display(), mode = %mode, "scanning target");
        match mode {
            FingerprintMode::Computed => {
                let (target, content) = read_target(path, self.config.max_file_size)?;
                let mut session = ScanSession::open(target, self.config);
                session.populate(
                    matcher,
                    FingerprintSource::computed(&content, self.config.gram, self.config.window),
                );
                self.finish(session, matcher, mode, emitter, summary)
            }
            FingerprintMode::Precomputed => {
                let display = path.display().to_string();
                let content = fs::read(path).map_err(|e| ScannerError::io(&display, e))?;
                // 파싱은 출력 전에 끝나므로 실패한 .wfp는 리포트에 흔적을 남기지 않음
                let entries = parse_wfp(&content, &display)?;
                if entries.is_empty() {
                    return Err(ScannerError::io(
                        &display,
                        io::Error::new(io::ErrorKind::InvalidData, "no file= entries"),
                    ));
                }
                for entry in entries {
                    let mut session = ScanSession::open(entry.target(), self.config);
                    session.populate(matcher, FingerprintSource::precomputed(entry.fingerprints));
                    self.finish(session, matcher, mode, emitter, summary)?;
                }
                Ok(())
            }
        }
    }

    fn finish<W: Write>(
        &self,
        session: ScanSession,
        matcher: &Matcher<'_, S>,
        mode: FingerprintMode,
        emitter: &mut ReportEmitter<W>,
        summary: &mut ScanSummary,
    ) -> Result<(), ScannerError> {
        let mut closed = session.close(matcher);
        self.filters.apply(&mut closed.results);
        emitter.emit(&closed)?;

        summary.sessions += 1;
        summary.fingerprints += closed.fingerprints;
        summary.matches += closed.results.len();
        summary.overflow += closed.overflow;
        let mode_label = match mode {
            FingerprintMode::Computed => "computed",
            FingerprintMode::Precomputed => "precomputed",
        };
        counter!(m::SCANNER_TARGETS_SCANNED_TOTAL, m::LABEL_MODE => mode_label).increment(1);
        Ok(())
    }
}
