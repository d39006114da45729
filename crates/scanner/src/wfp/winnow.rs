//! winnowing 지문 계산
//!
//! 1. 정규화: ASCII 영숫자만 남기고 소문자로 바꾸며, 문자마다 줄 번호를 기록합니다.
//! 2. gram: 연속한 `gram`개 문자의 MD5 앞 4바이트를 big-endian u32로 읽습니다.
//! 3. window: `window`개 gram마다 최솟값(동률이면 가장 오른쪽)을 고르고,
//!    직전 선택과 다른 위치일 때만 내보냅니다.
//! 4. 키: 선택된 해시 4바이트의 MD5 앞 4바이트.
//!
//! 정규화된 문자가 `gram`보다 적으면 키가 없습니다.

use crate::types::Fingerprint;

/// 파일 내용에서 지문 키를 지연 생성하는 반복자
pub struct Winnower<'a> {
    content: &'a [u8],
    normalized: Vec<u8>,
    lines: Vec<u32>,
    gram: usize,
    window: usize,
    /// gram 해시 (앞에서부터 필요한 만큼만 채움)
    hashes: Vec<u32>,
    /// 다음에 볼 window의 시작 위치
    next_window: usize,
    last_selected: Option<usize>,
    prepared: bool,
}

impl<'a> Winnower<'a> {
    /// 새 winnower를 만듭니다. 실제 계산은 첫 `next()`에서 시작합니다.
    pub fn new(content: &'a [u8], gram: usize, window: usize) -> Self {
        Self {
            content,
            normalized: Vec::new(),
            lines: Vec::new(),
            gram: gram.max(1),
            window: window.max(1),
            hashes: Vec::new(),
            next_window: 0,
            last_selected: None,
            prepared: false,
        }
    }

    fn prepare(&mut self) {
        self.prepared = true;
        let mut line = 1u32;
        for &b in self.content {
            if b == b'\n' {
                line = line.saturating_add(1);
            } else if b.is_ascii_alphanumeric() {
                self.normalized.push(b.to_ascii_lowercase());
                self.lines.push(line);
            }
        }
        // 입력이 짧으면 window를 gram 수에 맞춤
        let grams = self.gram_count();
        if grams > 0 && grams < self.window {
            self.window = grams;
        }
    }

    fn gram_count(&self) -> usize {
        (self.normalized.len() + 1).saturating_sub(self.gram)
    }

    fn gram_hash(&mut self, index: usize) -> u32 {
        while self.hashes.len() <= index {
            let start = self.hashes.len();
            let digest = md5::compute(&self.normalized[start..start + self.gram]);
            self.hashes
                .push(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]));
        }
        self.hashes[index]
    }
}

impl Iterator for Winnower<'_> {
    type Item = Fingerprint;

    fn next(&mut self) -> Option<Fingerprint> {
        if !self.prepared {
            self.prepare();
        }
        let grams = self.gram_count();

        while self.next_window + self.window <= grams {
            let start = self.next_window;
            self.next_window += 1;

            let mut min_index = start;
            let mut min_hash = self.gram_hash(start);
            for i in start + 1..start + self.window {
                let h = self.gram_hash(i);
                if h <= min_hash {
                    min_hash = h;
                    min_index = i;
                }
            }

            if self.last_selected == Some(min_index) {
                continue;
            }
            self.last_selected = Some(min_index);

            let digest = md5::compute(min_hash.to_be_bytes());
            return Some(Fingerprint {
                key: [digest[0], digest[1], digest[2], digest[3]],
                line: self.lines[min_index],
            });
        }
        None
    }
}
