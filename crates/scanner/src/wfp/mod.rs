//! 지문 소스 -- 대상 하나에 대한 지문 키 시퀀스
//!
//! 두 가지 모드가 있습니다.
//!
//! - **Computed**: 파일 바이트에서 winnowing으로 키를 계산합니다 ([`Winnower`]).
//! - **Precomputed**: `.wfp` 파일에 나열된 키를 읽습니다 ([`parse_wfp`]).
//!
//! 두 모드 모두 [`FingerprintSource`] 반복자로 matcher에 전달되며,
//! 유한하고 순서가 안정적입니다.

pub mod parser;
pub mod winnow;

use std::fmt;
use std::path::Path;

pub use parser::{WfpEntry, parse_wfp};
pub use winnow::Winnower;

use crate::types::{Fingerprint, extension_of};

/// 사전 계산 지문 파일 확장자
pub const WFP_EXTENSION: &str = "wfp";

/// 지문 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintMode {
    /// 파일 내용에서 계산
    Computed,
    /// `.wfp` 파일에서 읽음
    Precomputed,
}

impl fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed => write!(f, "computed"),
            Self::Precomputed => write!(f, "precomputed"),
        }
    }
}

/// 대상 경로와 강제 플래그로 지문 모드를 결정합니다.
///
/// 확장자가 `wfp`이면 플래그 없이도 사전 계산 모드입니다.
pub fn select_mode(path: &Path, force_wfp: bool) -> FingerprintMode {
    if force_wfp || extension_of(path) == WFP_EXTENSION {
        FingerprintMode::Precomputed
    } else {
        FingerprintMode::Computed
    }
}

/// 대상 하나의 지문 키 반복자
pub enum FingerprintSource<'a> {
    /// 파일 바이트에서 계산
    Computed(Winnower<'a>),
    /// 파싱된 `.wfp` 블록의 키
    Precomputed(std::vec::IntoIter<Fingerprint>),
}

impl<'a> FingerprintSource<'a> {
    /// 파일 내용에서 계산하는 소스를 만듭니다.
    pub fn computed(content: &'a [u8], gram: usize, window: usize) -> Self {
        Self::Computed(Winnower::new(content, gram, window))
    }

    /// 미리 나열된 키로 소스를 만듭니다.
    pub fn precomputed(fingerprints: Vec<Fingerprint>) -> Self {
        Self::Precomputed(fingerprints.into_iter())
    }

    /// 이 소스의 모드
    pub fn mode(&self) -> FingerprintMode {
        match self {
            Self::Computed(_) => FingerprintMode::Computed,
            Self::Precomputed(_) => FingerprintMode::Precomputed,
        }
    }
}

impl Iterator for FingerprintSource<'_> {
    type Item = Fingerprint;

    fn next(&mut self) -> Option<Fingerprint> {
        match self {
            Self::Computed(w) => w.next(),
            Self::Precomputed(it) => it.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wfp_extension_selects_precomputed() {
        assert_eq!(
            select_mode(Path::new("scan.wfp"), false),
            FingerprintMode::Precomputed
        );
        assert_eq!(
            select_mode(Path::new("SCAN.WFP"), false),
            FingerprintMode::Precomputed
        );
        assert_eq!(
            select_mode(Path::new("main.c"), false),
            FingerprintMode::Computed
        );
    }

    #[test]
    fn force_flag_selects_precomputed() {
        assert_eq!(
            select_mode(Path::new("fingerprints.txt"), true),
            FingerprintMode::Precomputed
        );
    }

    #[test]
    fn precomputed_source_keeps_order() {
        let fps = vec![
            Fingerprint {
                key: [1, 1, 1, 1],
                line: 3,
            },
            Fingerprint {
                key: [2, 2, 2, 2],
                line: 1,
            },
        ];
        let source = FingerprintSource::precomputed(fps.clone());
        assert_eq!(source.mode(), FingerprintMode::Precomputed);
        assert_eq!(source.collect::<Vec<_>>(), fps);
    }

    #[test]
    fn computed_source_of_empty_input_is_empty() {
        let mut source = FingerprintSource::computed(b"", 30, 64);
        assert_eq!(source.mode(), FingerprintMode::Computed);
        assert!(source.next().is_none());
    }
}
