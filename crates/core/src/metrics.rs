//! 메트릭 상수 및 설명 등록
//!
//! 스캐너가 기록하는 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 카운터 호출은 아무 동작도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `scanoss_`
//! - 모듈명: `scanner_`, `matcher_`, `store_`, `report_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(scanoss_core::metrics::SCANNER_TARGETS_SCANNED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 지문 모드 레이블 키 (computed, precomputed)
pub const LABEL_MODE: &str = "mode";

/// 리포트 형식 레이블 키 (plain, spdx, cyclonedx, spdx_xml)
pub const LABEL_FORMAT: &str = "format";

// ─── Scanner 메트릭 ────────────────────────────────────────────────

/// Scanner: 스캔 완료된 대상 파일 수 (counter, label: mode)
pub const SCANNER_TARGETS_SCANNED_TOTAL: &str = "scanoss_scanner_targets_scanned_total";

/// Scanner: I/O 실패로 건너뛴 대상 파일 수 (counter)
pub const SCANNER_TARGETS_FAILED_TOTAL: &str = "scanoss_scanner_targets_failed_total";

/// Scanner: 처리된 지문 수 (counter)
pub const SCANNER_FINGERPRINTS_TOTAL: &str = "scanoss_scanner_fingerprints_total";

// ─── Matcher 메트릭 ────────────────────────────────────────────────

/// Matcher: 누산기 용량 초과로 버려진 후보 수 (counter)
pub const MATCHER_OVERFLOW_DROPS_TOTAL: &str = "scanoss_matcher_overflow_drops_total";

/// Matcher: 리포트된 매치 결과 수 (counter)
pub const MATCHER_MATCHES_REPORTED_TOTAL: &str = "scanoss_matcher_matches_reported_total";

// ─── Store 메트릭 ──────────────────────────────────────────────────

/// Store: 실패한 조회 수 (counter)
pub const STORE_LOOKUP_ERRORS_TOTAL: &str = "scanoss_store_lookup_errors_total";

// ─── Report 메트릭 ─────────────────────────────────────────────────

/// Report: 출력된 리포트 항목 수 (counter, label: format)
pub const REPORT_ITEMS_EMITTED_TOTAL: &str = "scanoss_report_items_emitted_total";

/// 전체 메트릭 이름 목록
pub const ALL_METRIC_NAMES: [&str; 7] = [
    SCANNER_TARGETS_SCANNED_TOTAL,
    SCANNER_TARGETS_FAILED_TOTAL,
    SCANNER_FINGERPRINTS_TOTAL,
    MATCHER_OVERFLOW_DROPS_TOTAL,
    MATCHER_MATCHES_REPORTED_TOTAL,
    STORE_LOOKUP_ERRORS_TOTAL,
    REPORT_ITEMS_EMITTED_TOTAL,
];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        SCANNER_TARGETS_SCANNED_TOTAL,
        "Total number of scan targets whose session was closed"
    );
    describe_counter!(
        SCANNER_TARGETS_FAILED_TOTAL,
        "Total number of scan targets skipped after a per-target I/O error"
    );
    describe_counter!(
        SCANNER_FINGERPRINTS_TOTAL,
        "Total number of fingerprint keys fed to the matcher"
    );
    describe_counter!(
        MATCHER_OVERFLOW_DROPS_TOTAL,
        "Candidates dropped because the match accumulator was full"
    );
    describe_counter!(
        MATCHER_MATCHES_REPORTED_TOTAL,
        "Total number of ranked match results handed to the report emitter"
    );
    describe_counter!(
        STORE_LOOKUP_ERRORS_TOTAL,
        "Store lookups that failed and were skipped"
    );
    describe_counter!(
        REPORT_ITEMS_EMITTED_TOTAL,
        "Report items written, per output format"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_start_with_scanoss_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("scanoss_"),
                "Metric '{}' does not start with 'scanoss_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES {
            assert!(name.ends_with("_total"), "counter '{}' must end with _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // 레코더 없이 호출해도 panic 하지 않아야 함
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_MODE, LABEL_FORMAT] {
            assert_eq!(label.to_lowercase(), label);
        }
    }
}
