#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scanoss_scanner::wfp::Winnower;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    gram: u8,
    window: u8,
    content: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let gram = usize::from(input.gram % 64) + 1;
    let window = usize::from(input.window % 128) + 1;
    let lines = input.content.iter().filter(|&&b| b == b'\n').count() as u32 + 1;

    for fp in Winnower::new(&input.content, gram, window) {
        assert!(fp.line >= 1 && fp.line <= lines);
    }
});
