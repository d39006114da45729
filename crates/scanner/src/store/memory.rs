//! 메모리 스토어 -- 벤치마크와 테스트용 [`KvStore`] 구현

use std::collections::HashMap;

use super::{KvStore, TableDescriptor};
use crate::error::ScannerError;

/// 테이블 이름 -> 키 -> 레코드 목록
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<String, HashMap<Vec<u8>, Vec<Vec<u8>>>>,
}

impl MemoryStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 하나를 추가합니다.
    pub fn insert(
        &mut self,
        table: &TableDescriptor,
        key: &[u8],
        record: Vec<u8>,
    ) -> Result<(), ScannerError> {
        table.check_key(key)?;
        if table.is_fixed() && record.len() != table.rec_ln() {
            return Err(ScannerError::StoreRead {
                table: table.table().to_owned(),
                reason: format!("record length {} != {}", record.len(), table.rec_ln()),
            });
        }
        self.tables
            .entry(table.table().to_owned())
            .or_default()
            .entry(key.to_vec())
            .or_default()
            .push(record);
        Ok(())
    }

    /// 테이블에 저장된 키 수
    pub fn key_count(&self, table: &TableDescriptor) -> usize {
        self.tables.get(table.table()).map_or(0, HashMap::len)
    }
}

impl KvStore for MemoryStore {
    fn fetch(&self, table: &TableDescriptor, key: &[u8]) -> Result<Vec<Vec<u8>>, ScannerError> {
        table.check_key(key)?;
        Ok(self
            .tables
            .get(table.table())
            .and_then(|t| t.get(key))
            .cloned()
            .unwrap_or_default())
    }
}
