//! 고정 용량 매치 누산기
//!
//! 대상 하나의 후보별 증거를 미리 할당된 바이트 버퍼에 기록합니다.
//! 버퍼 크기는 `capacity × record_length`로 생성 시 한 번 정해지고 다시 할당되지 않습니다.
//!
//! 슬롯 레이아웃:
//!
//! ```text
//! [id:16][hits:2 BE][range:6] × max_ranges [last_wfp:4]
//! range = [from:2 BE][to:2 BE][oss_line:2 BE]
//! ```
//!
//! 용량이 차면 새 후보는 버려지고 overflow 카운터만 증가합니다 (기존 슬롯은 건드리지 않음).
//!
//! `last_wfp`와 별도로 보관하는 마지막 대상 줄이 모두 같을 때만 중복 히트로 봅니다.
//! 같은 키라도 다른 줄에서 다시 나오면 히트로 셉니다.

use std::collections::HashMap;

use crate::types::{FileId, LineRange};

const ID_LEN: usize = 16;
const HITS_LEN: usize = 2;
const RANGE_LEN: usize = 6;
const WFP_LEN: usize = 4;

/// 슬롯 하나의 바이트 길이
pub fn record_length(max_ranges: usize) -> usize {
    ID_LEN + HITS_LEN + RANGE_LEN * max_ranges + WFP_LEN
}

/// [`MatchMap::record`] 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 새 슬롯 할당
    New,
    /// 기존 슬롯 갱신
    Updated,
    /// 같은 후보에 같은 키가 같은 줄에서 연속으로 들어와 무시됨
    Repeated,
    /// 용량 초과로 버려짐
    Dropped,
}

/// 누산기에서 꺼낸 후보 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 스토어 파일 ID
    pub id: FileId,
    /// 히트 수
    pub hits: u16,
    /// 기록된 라인 범위
    pub ranges: Vec<LineRange>,
}

/// 고정 용량 매치 누산기
#[derive(Debug)]
pub struct MatchMap {
    buf: Vec<u8>,
    ranges_used: Vec<u8>,
    last_line: Vec<u16>,
    index: HashMap<FileId, usize>,
    len: usize,
    capacity: usize,
    max_ranges: usize,
    rec_ln: usize,
    range_gap: u32,
    overflow: u64,
}

impl MatchMap {
    /// 누산기를 할당합니다.
    pub fn new(capacity: usize, max_ranges: usize, range_gap: u32) -> Self {
        let max_ranges = max_ranges.clamp(1, usize::from(u8::MAX));
        let rec_ln = record_length(max_ranges);
        Self {
            buf: vec![0; capacity * rec_ln],
            ranges_used: vec![0; capacity],
            last_line: vec![0; capacity],
            index: HashMap::with_capacity(capacity),
            len: 0,
            capacity,
            max_ranges,
            rec_ln,
            range_gap,
            overflow: 0,
        }
    }

    /// 슬롯 수
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 사용 중인 슬롯 수
    pub fn len(&self) -> usize {
        self.len
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 슬롯 하나의 바이트 길이
    pub fn record_length(&self) -> usize {
        self.rec_ln
    }

    /// 용량 초과로 버려진 후보 수
    pub fn overflow_count(&self) -> u64 {
        self.overflow
    }

    /// 원시 슬롯 버퍼
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// 후보 하나의 히트를 기록합니다.
    ///
    /// `line`은 대상 파일 줄, `oss_line`은 스토어 파일 줄입니다.
    pub fn record(&mut self, id: &FileId, key: [u8; 4], line: u32, oss_line: u16) -> RecordOutcome {
        let line = u16::try_from(line).unwrap_or(u16::MAX);

        let Some(&slot) = self.index.get(id) else {
            if self.len == self.capacity {
                self.overflow += 1;
                return RecordOutcome::Dropped;
            }
            let slot = self.len;
            self.len += 1;
            self.index.insert(*id, slot);

            let off = slot * self.rec_ln;
            self.buf[off..off + ID_LEN].copy_from_slice(id);
            self.set_hits(slot, 1);
            self.write_range(
                slot,
                0,
                LineRange {
                    from: line,
                    to: line,
                    oss_line,
                },
            );
            self.ranges_used[slot] = 1;
            self.last_line[slot] = line;
            self.set_last_wfp(slot, key);
            return RecordOutcome::New;
        };

        if self.last_wfp(slot) == key && self.last_line[slot] == line {
            return RecordOutcome::Repeated;
        }
        self.set_last_wfp(slot, key);
        self.last_line[slot] = line;
        self.set_hits(slot, self.hits(slot).saturating_add(1));

        let used = usize::from(self.ranges_used[slot]);
        let mut current = self.read_range(slot, used - 1);
        let reach = u32::from(current.to) + self.range_gap;
        if line >= current.from && u32::from(line) <= reach {
            if line > current.to {
                current.to = line;
                self.write_range(slot, used - 1, current);
            }
        } else if used < self.max_ranges {
            self.write_range(
                slot,
                used,
                LineRange {
                    from: line,
                    to: line,
                    oss_line,
                },
            );
            self.ranges_used[slot] += 1;
        }
        RecordOutcome::Updated
    }

    /// 슬롯 하나를 후보로 읽습니다.
    pub fn candidate(&self, slot: usize) -> Option<Candidate> {
        if slot >= self.len {
            return None;
        }
        let off = slot * self.rec_ln;
        let mut id = [0u8; ID_LEN];
        id.copy_from_slice(&self.buf[off..off + ID_LEN]);
        let ranges = (0..usize::from(self.ranges_used[slot]))
            .map(|k| self.read_range(slot, k))
            .collect();
        Some(Candidate {
            id,
            hits: self.hits(slot),
            ranges,
        })
    }

    /// 히트 수 내림차순, 동률이면 ID 오름차순으로 정렬된 후보 목록
    pub fn ranked(&self) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> =
            (0..self.len).filter_map(|slot| self.candidate(slot)).collect();
        candidates.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.id.cmp(&b.id)));
        candidates
    }

    fn hits(&self, slot: usize) -> u16 {
        let off = slot * self.rec_ln + ID_LEN;
        u16::from_be_bytes([self.buf[off], self.buf[off + 1]])
    }

    fn set_hits(&mut self, slot: usize, hits: u16) {
        let off = slot * self.rec_ln + ID_LEN;
        self.buf[off..off + HITS_LEN].copy_from_slice(&hits.to_be_bytes());
    }

    fn range_offset(&self, slot: usize, k: usize) -> usize {
        slot * self.rec_ln + ID_LEN + HITS_LEN + k * RANGE_LEN
    }

    fn read_range(&self, slot: usize, k: usize) -> LineRange {
        let off = self.range_offset(slot, k);
        let b = &self.buf[off..off + RANGE_LEN];
        LineRange {
            from: u16::from_be_bytes([b[0], b[1]]),
            to: u16::from_be_bytes([b[2], b[3]]),
            oss_line: u16::from_be_bytes([b[4], b[5]]),
        }
    }

    fn write_range(&mut self, slot: usize, k: usize, range: LineRange) {
        let off = self.range_offset(slot, k);
        self.buf[off..off + 2].copy_from_slice(&range.from.to_be_bytes());
        self.buf[off + 2..off + 4].copy_from_slice(&range.to.to_be_bytes());
        self.buf[off + 4..off + 6].copy_from_slice(&range.oss_line.to_be_bytes());
    }

    fn wfp_offset(&self, slot: usize) -> usize {
        slot * self.rec_ln + ID_LEN + HITS_LEN + self.max_ranges * RANGE_LEN
    }

    fn last_wfp(&self, slot: usize) -> [u8; 4] {
        let off = self.wfp_offset(slot);
        let mut key = [0u8; WFP_LEN];
        key.copy_from_slice(&self.buf[off..off + WFP_LEN]);
        key
    }

    fn set_last_wfp(&mut self, slot: usize, key: [u8; 4]) {
        let off = self.wfp_offset(slot);
        self.buf[off..off + WFP_LEN].copy_from_slice(&key);
    }
}
