//! 내장 매처 벤치마크 (`-t`)
//!
//! 합성 메모리 스토어와 합성 지문 스트림으로 매처를 돌려 처리량을 측정합니다.
//! 실제 스토어나 파일 시스템에는 접근하지 않습니다.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::ScannerConfig;
use crate::error::ScannerError;
use crate::matcher::Matcher;
use crate::session::ScanSession;
use crate::store::{MemoryStore, StoreSchema, WfpRecord};
use crate::types::{FileDigest, Fingerprint, ScanTarget};

/// 벤치마크 파라미터
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkParams {
    /// 스토어에 넣을 서로 다른 키 수
    pub keys: u32,
    /// 키마다 넣을 레코드 수
    pub records_per_key: u32,
    /// 서로 다른 파일 ID 수
    pub files: u32,
    /// 세션 하나에 흘려 넣을 지문 수
    pub fingerprints: u32,
    /// 세션 반복 횟수
    pub rounds: u32,
}

impl Default for BenchmarkParams {
    fn default() -> Self {
        Self {
            keys: 4096,
            records_per_key: 4,
            files: 512,
            fingerprints: 8192,
            rounds: 16,
        }
    }
}

/// 벤치마크 결과
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// 조회한 지문 키 총수
    pub fingerprints: u64,
    /// 닫힌 세션 수
    pub sessions: u32,
    /// 마지막 세션의 결과 수
    pub results: usize,
    /// 전체 경과 시간
    pub elapsed: Duration,
}

impl BenchmarkReport {
    /// 초당 처리한 지문 키 수
    pub fn keys_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.fingerprints as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sessions, {} keys in {:.3}s ({:.0} keys/sec, {} results per session)",
            self.sessions,
            self.fingerprints,
            self.elapsed.as_secs_f64(),
            self.keys_per_sec(),
            self.results
        )
    }
}

/// 합성 키: 인덱스의 빅엔디언 바이트를 섞어 샤드가 고르게 퍼지도록 합니다.
fn synthetic_key(i: u32) -> [u8; 4] {
    i.wrapping_mul(0x9E37_79B9).to_be_bytes()
}

fn synthetic_file_id(i: u32) -> [u8; 16] {
    let mut id = [0u8; 16];
    id[..4].copy_from_slice(&i.to_be_bytes());
    id[12..].copy_from_slice(&i.wrapping_mul(0x85EB_CA6B).to_be_bytes());
    id
}

/// 합성 스토어를 만듭니다.
pub fn synthetic_store(
    schema: &StoreSchema,
    params: &BenchmarkParams,
) -> Result<MemoryStore, ScannerError> {
    let mut store = MemoryStore::new();
    let files = params.files.max(1);
    for k in 0..params.keys {
        for r in 0..params.records_per_key {
            let record = WfpRecord {
                file_id: synthetic_file_id((k + r * 7) % files),
                oss_line: (k % u32::from(u16::MAX)) as u16,
            };
            store.insert(schema.wfp(), &synthetic_key(k), record.encode().to_vec())?;
        }
    }
    Ok(store)
}

/// 벤치마크를 실행합니다.
pub fn run(config: &ScannerConfig, params: &BenchmarkParams) -> Result<BenchmarkReport, ScannerError> {
    let schema = StoreSchema::new(&config.store_name);
    let store = synthetic_store(&schema, params)?;
    let matcher = Matcher::new(&store, &schema).with_match_extensions(config.match_extensions);
    let keys = params.keys.max(1);

    let start = Instant::now();
    let mut fingerprints = 0u64;
    let mut results = 0;
    for round in 0..params.rounds {
        let target = ScanTarget::new(format!("bench-{round}"), 0, FileDigest::Empty);
        let mut session = ScanSession::open(target, config);
        // 일부 키는 스토어에 없는 값으로 흘려 미스 경로도 측정
        let stream = (0..params.fingerprints).map(|i| Fingerprint {
            key: synthetic_key((i + round) % (keys + keys / 8)),
            line: i / 4 + 1,
        });
        fingerprints += session.populate(&matcher, stream) as u64;
        results = session.close(&matcher).results.len();
    }

    let report = BenchmarkReport {
        fingerprints,
        sessions: params.rounds,
        results,
        elapsed: start.elapsed(),
    };
    info!(
        sessions = report.sessions,
        fingerprints = report.fingerprints,
        keys_per_sec = report.keys_per_sec(),
        "benchmark finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_benchmark_runs() {
        let params = BenchmarkParams {
            keys: 64,
            records_per_key: 2,
            files: 8,
            fingerprints: 128,
            rounds: 2,
        };
        let report = run(&ScannerConfig::default(), &params).unwrap();
        assert_eq!(report.sessions, 2);
        assert_eq!(report.fingerprints, 256);
        assert!(report.results > 0);
        assert!(report.results <= 8);
        assert!(report.to_string().contains("2 sessions"));
    }

    #[test]
    fn synthetic_store_holds_every_key() {
        let schema = StoreSchema::default();
        let params = BenchmarkParams {
            keys: 32,
            ..BenchmarkParams::default()
        };
        let store = synthetic_store(&schema, &params).unwrap();
        assert_eq!(store.key_count(schema.wfp()), 32);
    }
}
