//! 디스크 기반 스토어
//!
//! `<root>/<store>/<table>/<kk>.ldb` 샤드 파일에 엔트리를 순서대로 저장합니다.
//! `kk`는 키 첫 바이트의 소문자 16진수입니다.
//!
//! 엔트리 형식: `[key:key_ln][len:ts_ln big-endian][data:len]`
//!
//! 고정 길이 테이블은 `data`가 `rec_ln` 바이트 레코드의 연결이고,
//! 가변 길이 테이블은 엔트리 하나가 레코드 하나입니다.
//! 같은 키를 가진 엔트리가 여러 개 있을 수 있습니다.
//!
//! 샤드는 처음 조회될 때 한 번 읽혀 스토어 값이 살아 있는 동안 메모리에 남습니다
//! (없는 샤드도 빈 샤드로 기억). 스캔 중에는 스토어가 바뀌지 않는다고 가정하며,
//! [`LdbStore::insert`]는 해당 샤드의 캐시만 비웁니다.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use super::{KvStore, TableDescriptor};
use crate::error::ScannerError;

/// 디스크 샤드 파일 스토어
#[derive(Debug, Clone)]
pub struct LdbStore {
    root: PathBuf,
    shards: RefCell<HashMap<PathBuf, Rc<Vec<u8>>>>,
}

impl LdbStore {
    /// 스토어 루트 디렉토리를 지정해 생성합니다.
    ///
    /// 디렉토리가 없어도 에러가 아니며, 이 경우 모든 조회가 빈 결과입니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            shards: RefCell::new(HashMap::new()),
        }
    }

    /// 메모리에 올라와 있는 샤드 수
    pub fn cached_shards(&self) -> usize {
        self.shards.borrow().len()
    }

    fn load_shard(&self, table: &TableDescriptor, path: &Path) -> Result<Rc<Vec<u8>>, ScannerError> {
        if let Some(shard) = self.shards.borrow().get(path) {
            return Ok(Rc::clone(shard));
        }
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "shard not present, treating as miss");
                Vec::new()
            }
            Err(e) => {
                return Err(ScannerError::StoreRead {
                    table: table.table().to_owned(),
                    reason: format!("{}: {e}", path.display()),
                });
            }
        };
        let shard = Rc::new(bytes);
        self.shards
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&shard));
        Ok(shard)
    }

    /// 스토어 루트 디렉토리
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 키가 저장되는 샤드 파일 경로
    pub fn shard_path(&self, table: &TableDescriptor, key: &[u8]) -> PathBuf {
        let shard = key.first().copied().unwrap_or(0);
        self.root
            .join(table.store())
            .join(table.table())
            .join(format!("{shard:02x}.ldb"))
    }

    /// 키에 엔트리 하나를 추가합니다.
    ///
    /// 고정 길이 테이블에서는 `data`가 `rec_ln`의 배수여야 합니다.
    pub fn insert(
        &self,
        table: &TableDescriptor,
        key: &[u8],
        data: &[u8],
    ) -> Result<(), ScannerError> {
        table.check_key(key)?;
        if table.is_fixed() && data.len() % table.rec_ln() != 0 {
            return Err(ScannerError::StoreRead {
                table: table.table().to_owned(),
                reason: format!(
                    "data length {} is not a multiple of {}",
                    data.len(),
                    table.rec_ln()
                ),
            });
        }
        if data.len() > table.max_entry_len() {
            return Err(ScannerError::StoreRead {
                table: table.table().to_owned(),
                reason: format!("entry too large: {} bytes", data.len()),
            });
        }

        let path = self.shard_path(table, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ScannerError::io(parent.display().to_string(), e))?;
        }

        let mut entry = Vec::with_capacity(key.len() + table.ts_ln() + data.len());
        entry.extend_from_slice(key);
        let len_bytes = (data.len() as u64).to_be_bytes();
        entry.extend_from_slice(&len_bytes[len_bytes.len() - table.ts_ln()..]);
        entry.extend_from_slice(data);

        self.shards.borrow_mut().remove(&path);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ScannerError::io(path.display().to_string(), e))?;
        file.write_all(&entry)
            .map_err(|e| ScannerError::io(path.display().to_string(), e))?;
        Ok(())
    }
}

impl KvStore for LdbStore {
    fn fetch(&self, table: &TableDescriptor, key: &[u8]) -> Result<Vec<Vec<u8>>, ScannerError> {
        table.check_key(key)?;
        let path = self.shard_path(table, key);
        let shard = self.load_shard(table, &path)?;
        scan_shard(table, &shard, key)
    }
}

/// 샤드 바이트에서 키에 해당하는 레코드를 모두 꺼냅니다.
///
/// 잘린 엔트리나 `rec_ln`과 맞지 않는 데이터는 샤드 전체를 손상으로 처리합니다.
pub fn scan_shard(
    table: &TableDescriptor,
    shard: &[u8],
    key: &[u8],
) -> Result<Vec<Vec<u8>>, ScannerError> {
    let header_len = table.key_ln() + table.ts_ln();
    let mut records = Vec::new();
    let mut pos = 0usize;

    while pos < shard.len() {
        let header = shard
            .get(pos..pos + header_len)
            .ok_or_else(|| truncated(table, pos))?;
        let (entry_key, len_field) = header.split_at(table.key_ln());
        let len = len_field
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
        let start = pos + header_len;
        let data = shard
            .get(start..start.saturating_add(len))
            .ok_or_else(|| truncated(table, pos))?;

        if entry_key == key {
            if table.is_fixed() {
                if data.len() % table.rec_ln() != 0 {
                    return Err(ScannerError::StoreRead {
                        table: table.table().to_owned(),
                        reason: format!("entry at offset {pos} has a partial record"),
                    });
                }
                records.extend(data.chunks_exact(table.rec_ln()).map(<[u8]>::to_vec));
            } else {
                records.push(data.to_vec());
            }
        }
        pos = start + len;
    }

    Ok(records)
}

fn truncated(table: &TableDescriptor, offset: usize) -> ScannerError {
    ScannerError::StoreRead {
        table: table.table().to_owned(),
        reason: format!("truncated entry at offset {offset}"),
    }
}
