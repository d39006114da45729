//! 매처 -- 지문 키 조회, 증거 누적, 순위 결정
//!
//! # 처리 흐름
//!
//! 1. [`Matcher::populate`]: 키마다 `wfp` 테이블을 조회해 레코드별 후보를 [`MatchMap`]에 기록
//! 2. [`Matcher::resolve`]: 순위를 매기고 `file` -> `component` 순으로 메타데이터를 해석
//! 3. 확장자 후순위 처리(선택) 후 컴포넌트 단위로 중복 제거
//!
//! 키 하나의 조회 실패는 건너뛰며 스캔 전체를 멈추지 않습니다.

pub mod matchmap;

pub use matchmap::{Candidate, MatchMap, RecordOutcome};

use std::collections::HashSet;

use metrics::counter;
use tracing::debug;

use scanoss_core::metrics as m;

use crate::store::{ComponentRecord, FileRecord, KvStore, StoreSchema, WfpRecord};
use crate::types::{
    ComponentInfo, FileId, Fingerprint, MatchResult, ScanTarget, coverage_ratio, extension_of,
};

/// 스토어 조회 기반 매처
///
/// 스토어와 스키마를 빌려 쓰며 상태가 없습니다. 대상별 상태는 [`MatchMap`]에 있습니다.
pub struct Matcher<'a, S: KvStore + ?Sized> {
    store: &'a S,
    schema: &'a StoreSchema,
    match_extensions: bool,
}

impl<'a, S: KvStore + ?Sized> Matcher<'a, S> {
    /// 새 매처를 생성합니다.
    pub fn new(store: &'a S, schema: &'a StoreSchema) -> Self {
        Self {
            store,
            schema,
            match_extensions: false,
        }
    }

    /// 확장자 불일치 후순위 처리를 켜거나 끕니다.
    pub fn with_match_extensions(mut self, enabled: bool) -> Self {
        self.match_extensions = enabled;
        self
    }

    /// 지문 키를 모두 조회해 누산기에 기록하고, 처리한 키 수를 반환합니다.
    pub fn populate<I>(&self, map: &mut MatchMap, fingerprints: I) -> usize
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        let table = self.schema.wfp();
        let mut total = 0usize;
        let mut dropped = 0u64;

        for fp in fingerprints {
            total += 1;
            let records = match self.store.fetch(table, &fp.key) {
                Ok(records) => records,
                Err(e) => {
                    debug!(key = %hex::encode(fp.key), error = %e, "wfp lookup failed, skipping key");
                    counter!(m::STORE_LOOKUP_ERRORS_TOTAL).increment(1);
                    continue;
                }
            };

            for raw in records {
                match WfpRecord::decode(&raw) {
                    Ok(rec) => {
                        if map.record(&rec.file_id, fp.key, fp.line, rec.oss_line)
                            == RecordOutcome::Dropped
                        {
                            dropped += 1;
                        }
                    }
                    Err(e) => {
                        debug!(key = %hex::encode(fp.key), error = %e, "skipping corrupt wfp record");
                        counter!(m::STORE_LOOKUP_ERRORS_TOTAL).increment(1);
                    }
                }
            }
        }

        if dropped > 0 {
            debug!(dropped, capacity = map.capacity(), "match accumulator full, candidates dropped");
            counter!(m::MATCHER_OVERFLOW_DROPS_TOTAL).increment(dropped);
        }
        counter!(m::SCANNER_FINGERPRINTS_TOTAL).increment(total as u64);
        total
    }

    /// 누산기를 순위가 매겨진 결과 목록으로 바꿉니다.
    ///
    /// `total`은 대상의 전체 지문 수이며 커버리지 계산에 쓰입니다.
    pub fn resolve(&self, map: &MatchMap, target: &ScanTarget, total: usize) -> Vec<MatchResult> {
        if total == 0 || map.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<MatchResult> = map
            .ranked()
            .into_iter()
            .map(|c| self.resolve_candidate(c, target, total))
            .collect();

        if self.match_extensions {
            // 안정 정렬이므로 같은 그룹 안에서는 ID 순서가 유지됨
            results.sort_by(|a, b| {
                b.hits
                    .cmp(&a.hits)
                    .then_with(|| b.extension_match.cmp(&a.extension_match))
            });
        }

        let mut seen: HashSet<FileId> = HashSet::with_capacity(results.len());
        results.retain(|r| seen.insert(r.dedup_key()));

        counter!(m::MATCHER_MATCHES_REPORTED_TOTAL).increment(results.len() as u64);
        results
    }

    fn resolve_candidate(&self, c: Candidate, target: &ScanTarget, total: usize) -> MatchResult {
        let file = self.lookup_file(&c.id);
        let component = file
            .as_ref()
            .and_then(|f| self.lookup_component(&f.component_id));
        let extension_match = file
            .as_ref()
            .map(|f| extension_of(std::path::Path::new(&f.path)) == target.extension)
            .unwrap_or(true);

        MatchResult {
            component_id: file.as_ref().map(|f| f.component_id),
            file_id: c.id,
            file_path: file.map(|f| f.path),
            component,
            hits: u32::from(c.hits),
            coverage: coverage_ratio(u32::from(c.hits), total),
            ranges: c.ranges,
            extension_match,
        }
    }

    fn lookup_file(&self, id: &FileId) -> Option<FileRecord> {
        let records = self
            .store
            .fetch(self.schema.file(), id)
            .map_err(|e| {
                debug!(file_id = %hex::encode(id), error = %e, "file lookup failed");
                counter!(m::STORE_LOOKUP_ERRORS_TOTAL).increment(1);
            })
            .ok()?;
        let raw = records.first()?;
        FileRecord::decode(raw)
            .map_err(|e| debug!(file_id = %hex::encode(id), error = %e, "corrupt file record"))
            .ok()
    }

    fn lookup_component(&self, id: &FileId) -> Option<ComponentInfo> {
        let records = self
            .store
            .fetch(self.schema.component(), id)
            .map_err(|e| {
                debug!(component_id = %hex::encode(id), error = %e, "component lookup failed");
                counter!(m::STORE_LOOKUP_ERRORS_TOTAL).increment(1);
            })
            .ok()?;
        let raw = records.first()?;
        ComponentRecord::decode(raw)
            .map_err(|e| debug!(component_id = %hex::encode(id), error = %e, "corrupt component record"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::FileDigest;

    fn fp(key: u8, line: u32) -> Fingerprint {
        Fingerprint {
            key: [key, 0, 0, 0],
            line,
        }
    }

    fn wfp(store: &mut MemoryStore, schema: &StoreSchema, key: u8, file: u8, oss_line: u16) {
        let rec = WfpRecord {
            file_id: [file; 16],
            oss_line,
        };
        store
            .insert(schema.wfp(), &[key, 0, 0, 0], rec.encode().to_vec())
            .unwrap();
    }

    fn file(store: &mut MemoryStore, schema: &StoreSchema, file: u8, component: u8, path: &str) {
        let rec = FileRecord {
            component_id: [component; 16],
            path: path.to_owned(),
        };
        store.insert(schema.file(), &[file; 16], rec.encode()).unwrap();
    }

    fn component(store: &mut MemoryStore, schema: &StoreSchema, component: u8, name: &str) {
        let info = ComponentInfo {
            vendor: "acme".to_owned(),
            component: name.to_owned(),
            version: "1.0".to_owned(),
            purl: format!("pkg:github/acme/{name}"),
            url: String::new(),
        };
        store
            .insert(schema.component(), &[component; 16], ComponentRecord::encode(&info))
            .unwrap();
    }

    fn target(path: &str) -> ScanTarget {
        ScanTarget::new(path, 100, FileDigest::of(b"x"))
    }

    #[test]
    fn zero_keys_give_empty_results() {
        let store = MemoryStore::new();
        let schema = StoreSchema::default();
        let matcher = Matcher::new(&store, &schema);
        let mut map = MatchMap::new(4, 2, 5);

        let total = matcher.populate(&mut map, Vec::new());
        assert_eq!(total, 0);
        assert!(matcher.resolve(&map, &target("a.c"), total).is_empty());
    }

    #[test]
    fn unknown_keys_give_empty_results() {
        let store = MemoryStore::new();
        let schema = StoreSchema::default();
        let matcher = Matcher::new(&store, &schema);
        let mut map = MatchMap::new(4, 2, 5);

        let total = matcher.populate(&mut map, vec![fp(1, 1), fp(2, 2)]);
        assert_eq!(total, 2);
        assert!(matcher.resolve(&map, &target("a.c"), total).is_empty());
    }

    #[test]
    fn results_ranked_and_resolved() {
        let schema = StoreSchema::default();
        let mut store = MemoryStore::new();
        wfp(&mut store, &schema, 1, 0xA, 10);
        wfp(&mut store, &schema, 2, 0xA, 11);
        wfp(&mut store, &schema, 2, 0xB, 30);
        file(&mut store, &schema, 0xA, 0xC1, "lib/a.c");
        component(&mut store, &schema, 0xC1, "alpha");

        let matcher = Matcher::new(&store, &schema);
        let mut map = MatchMap::new(4, 2, 5);
        let total = matcher.populate(&mut map, vec![fp(1, 1), fp(2, 2), fp(3, 3), fp(4, 4)]);
        let results = matcher.resolve(&map, &target("src/x.c"), total);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file_id, [0xA; 16]);
        assert_eq!(results[0].hits, 2);
        assert_eq!(results[0].coverage, 0.5);
        assert_eq!(results[0].component_name(), "alpha");
        assert_eq!(results[0].component_id, Some([0xC1; 16]));
        assert_eq!(results[0].file_path.as_deref(), Some("lib/a.c"));

        // 해석되지 않은 후보는 메타데이터 없이 유지
        assert_eq!(results[1].file_id, [0xB; 16]);
        assert!(results[1].component.is_none());
        assert!(results[1].component_id.is_none());
        assert!(results[1].extension_match);
    }

    #[test]
    fn duplicate_components_keep_best_match() {
        let schema = StoreSchema::default();
        let mut store = MemoryStore::new();
        wfp(&mut store, &schema, 1, 0xA, 1);
        wfp(&mut store, &schema, 2, 0xA, 2);
        wfp(&mut store, &schema, 1, 0xB, 1);
        file(&mut store, &schema, 0xA, 0xC1, "a.c");
        file(&mut store, &schema, 0xB, 0xC1, "b.c");
        component(&mut store, &schema, 0xC1, "shared");

        let matcher = Matcher::new(&store, &schema);
        let mut map = MatchMap::new(4, 2, 5);
        let total = matcher.populate(&mut map, vec![fp(1, 1), fp(2, 2)]);
        let results = matcher.resolve(&map, &target("x.c"), total);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_id, [0xA; 16]);
    }

    #[test]
    fn extension_disagreement_is_deprioritized_only_when_enabled() {
        let schema = StoreSchema::default();
        let mut store = MemoryStore::new();
        // 같은 히트 수, ID 순서로는 0x1(.h)이 먼저
        wfp(&mut store, &schema, 1, 0x1, 1);
        wfp(&mut store, &schema, 1, 0x2, 1);
        file(&mut store, &schema, 0x1, 0xC1, "inc/a.h");
        file(&mut store, &schema, 0x2, 0xC2, "src/a.c");
        component(&mut store, &schema, 0xC1, "one");
        component(&mut store, &schema, 0xC2, "two");

        let mut map = MatchMap::new(4, 2, 5);
        let plain = Matcher::new(&store, &schema);
        let total = plain.populate(&mut map, vec![fp(1, 1)]);

        let results = plain.resolve(&map, &target("main.c"), total);
        assert_eq!(results[0].file_id, [0x1; 16]);

        let results = Matcher::new(&store, &schema)
            .with_match_extensions(true)
            .resolve(&map, &target("main.c"), total);
        assert_eq!(results[0].file_id, [0x2; 16]);
        assert!(results[0].extension_match);
        assert!(!results[1].extension_match);
    }

    #[test]
    fn overflow_drops_are_counted_by_the_map() {
        let schema = StoreSchema::default();
        let mut store = MemoryStore::new();
        for file_id in 1..=5 {
            wfp(&mut store, &schema, 1, file_id, 1);
        }
        let matcher = Matcher::new(&store, &schema);
        let mut map = MatchMap::new(2, 1, 5);
        matcher.populate(&mut map, vec![fp(1, 1)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.overflow_count(), 3);
    }
}
