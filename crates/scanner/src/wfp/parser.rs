//! 사전 계산 지문(`.wfp`) 파서
//!
//! 줄 단위 형식입니다.
//!
//! ```text
//! file=5d41402abc4b2a76b9719d911017c592,1024,src/main.c
//! 3=0a1b2c3d,deadbeef
//! 7=00112233
//! file=...
//! ```
//!
//! - `file=<md5>,<size>,<path>`: 새 대상을 시작합니다. 블록 하나가 세션 하나입니다.
//! - `<line>=<hex8>[,<hex8>...]`: 해당 줄의 지문 키 목록입니다.
//! - 그 밖의 이름 태그(`hpsm=`, `bin=` 등)는 무시합니다.
//!
//! `file=` 이전의 키, `=`가 없는 줄, 잘못된 16진수는 파일 전체의 파싱 에러입니다.

use std::path::Path;

use crate::error::ScannerError;
use crate::types::{FileDigest, FileId, Fingerprint, ScanTarget};

/// `.wfp` 파일의 대상 블록 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WfpEntry {
    /// 원본 파일 다이제스트
    pub digest: FileDigest,
    /// 원본 파일 크기
    pub size: u64,
    /// 원본 파일 경로
    pub path: String,
    /// 블록에 나열된 지문 (파일 순서)
    pub fingerprints: Vec<Fingerprint>,
}

impl WfpEntry {
    /// 이 블록이 가리키는 스캔 대상
    pub fn target(&self) -> ScanTarget {
        ScanTarget::new(Path::new(&self.path), self.size, self.digest)
    }
}

/// `.wfp` 내용을 파싱합니다.
///
/// `source`는 에러 메시지에 쓰이는 파일 경로입니다. 빈 입력은 빈 목록입니다.
pub fn parse_wfp(content: &[u8], source: &str) -> Result<Vec<WfpEntry>, ScannerError> {
    let text = std::str::from_utf8(content).map_err(|e| ScannerError::WfpParse {
        path: source.to_owned(),
        line: 0,
        reason: format!("not valid utf-8: {e}"),
    })?;

    let mut entries: Vec<WfpEntry> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let err = |reason: String| ScannerError::WfpParse {
            path: source.to_owned(),
            line: line_no,
            reason,
        };

        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let (tag, value) = line
            .split_once('=')
            .ok_or_else(|| err("missing '='".to_owned()))?;

        if tag == "file" {
            entries.push(parse_file_line(value).map_err(err)?);
            continue;
        }

        let Ok(target_line) = tag.parse::<u32>() else {
            // 알 수 없는 이름 태그
            continue;
        };

        let entry = entries
            .last_mut()
            .ok_or_else(|| err("fingerprint before any file= line".to_owned()))?;

        for token in value.split(',') {
            let key = parse_key(token).map_err(&err)?;
            entry.fingerprints.push(Fingerprint {
                key,
                line: target_line,
            });
        }
    }

    Ok(entries)
}

fn parse_file_line(value: &str) -> Result<WfpEntry, String> {
    let mut parts = value.splitn(3, ',');
    let md5_hex = parts.next().unwrap_or_default();
    let size = parts
        .next()
        .ok_or_else(|| "file= line is missing the size".to_owned())?;
    let path = parts
        .next()
        .ok_or_else(|| "file= line is missing the path".to_owned())?;

    let mut md5: FileId = [0; 16];
    hex::decode_to_slice(md5_hex, &mut md5)
        .map_err(|e| format!("invalid md5 '{md5_hex}': {e}"))?;
    let size = size
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid size '{size}': {e}"))?;
    if path.is_empty() {
        return Err("file= line has an empty path".to_owned());
    }

    Ok(WfpEntry {
        digest: FileDigest::from_md5(md5),
        size,
        path: path.to_owned(),
        fingerprints: Vec::new(),
    })
}

fn parse_key(token: &str) -> Result<[u8; 4], String> {
    let token = token.trim();
    let mut key = [0u8; 4];
    hex::decode_to_slice(token, &mut key).map_err(|e| format!("invalid key '{token}': {e}"))?;
    Ok(key)
}
