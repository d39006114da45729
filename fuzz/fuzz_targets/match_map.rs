#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scanoss_scanner::MatchMap;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    capacity: u8,
    max_ranges: u8,
    range_gap: u8,
    /// (후보 ID 바이트, 키, 줄, 스토어 줄)
    hits: Vec<(u8, [u8; 4], u16, u16)>,
}

fuzz_target!(|input: FuzzInput| {
    let capacity = usize::from(input.capacity % 32) + 1;
    let max_ranges = usize::from(input.max_ranges % 16) + 1;
    let mut map = MatchMap::new(capacity, max_ranges, u32::from(input.range_gap));
    let buffer_len = map.as_bytes().len();

    for (id, key, line, oss_line) in input.hits {
        map.record(&[id; 16], key, u32::from(line), oss_line);
        assert!(map.len() <= capacity);
        assert_eq!(map.as_bytes().len(), buffer_len);
    }

    let ranked = map.ranked();
    for pair in ranked.windows(2) {
        assert!(
            pair[0].hits > pair[1].hits || (pair[0].hits == pair[1].hits && pair[0].id < pair[1].id)
        );
    }
    for c in &ranked {
        assert!(c.ranges.len() <= max_ranges);
    }
});
