//! 스캔 세션 -- 대상 하나의 매치 상태 수명 주기
//!
//! `open` -> `populate`* -> `close` 순서로 사용합니다.
//! `close`는 세션을 소비하므로 두 번 닫을 수 없고, 누산기는 결과를 만든 뒤 해제됩니다.
//! 한 세션이 닫힌 뒤에 다음 세션이 열립니다.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::ScannerConfig;
use crate::error::ScannerError;
use crate::matcher::{MatchMap, Matcher};
use crate::store::KvStore;
use crate::types::{FileDigest, Fingerprint, MatchResult, ScanTarget};

/// 대상 하나에 대한 열린 세션
#[derive(Debug)]
pub struct ScanSession {
    target: ScanTarget,
    map: MatchMap,
    fingerprints: usize,
}

/// 닫힌 세션의 결과
#[derive(Debug, Clone)]
pub struct SessionResults {
    /// 스캔 대상
    pub target: ScanTarget,
    /// 처리한 지문 키 수
    pub fingerprints: usize,
    /// 용량 초과로 버려진 후보 수
    pub overflow: u64,
    /// 순위가 매겨진 결과
    pub results: Vec<MatchResult>,
}

impl ScanSession {
    /// 대상에 대한 세션을 열고 설정된 용량으로 누산기를 할당합니다.
    pub fn open(target: ScanTarget, config: &ScannerConfig) -> Self {
        debug!(target = %target, capacity = config.max_targets, "session opened");
        Self {
            target,
            map: MatchMap::new(config.max_targets, config.max_ranges, config.range_gap),
            fingerprints: 0,
        }
    }

    /// 스캔 대상
    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    /// 지금까지 처리한 지문 키 수
    pub fn fingerprints(&self) -> usize {
        self.fingerprints
    }

    /// 지문 소스를 매처에 넘겨 누산기를 채웁니다.
    pub fn populate<S, I>(&mut self, matcher: &Matcher<'_, S>, source: I) -> usize
    where
        S: KvStore + ?Sized,
        I: IntoIterator<Item = Fingerprint>,
    {
        let n = matcher.populate(&mut self.map, source);
        self.fingerprints += n;
        n
    }

    /// 세션을 닫고 결과를 반환합니다.
    pub fn close<S>(self, matcher: &Matcher<'_, S>) -> SessionResults
    where
        S: KvStore + ?Sized,
    {
        let results = matcher.resolve(&self.map, &self.target, self.fingerprints);
        let overflow = self.map.overflow_count();
        debug!(
            target = %self.target.path.display(),
            fingerprints = self.fingerprints,
            candidates = self.map.len(),
            overflow,
            results = results.len(),
            "session closed"
        );
        SessionResults {
            target: self.target,
            fingerprints: self.fingerprints,
            overflow,
            results,
        }
    }
}

/// 일반 파일을 읽어 스캔 대상과 지문 계산용 내용을 반환합니다.
///
/// 다이제스트는 전체 내용으로 계산하고, 반환되는 내용은 `max_file_size`에서 잘립니다.
pub fn read_target(path: &Path, max_file_size: usize) -> Result<(ScanTarget, Vec<u8>), ScannerError> {
    let display = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|e| ScannerError::io(&display, e))?;
    if !metadata.is_file() {
        return Err(ScannerError::io(
            &display,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    let mut content = fs::read(path).map_err(|e| ScannerError::io(&display, e))?;
    let target = ScanTarget::new(path, content.len() as u64, FileDigest::of(&content));
    content.truncate(max_file_size);
    Ok((target, content))
}
