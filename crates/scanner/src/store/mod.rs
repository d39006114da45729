//! 키-값 스토어 스키마와 레코드 형식
//!
//! 스캐너는 미리 구축된 읽기 전용 스토어를 세 개의 논리 테이블로 바라봅니다.
//!
//! | 테이블 | key_ln | rec_ln | ts_ln | 레코드 |
//! |---|---|---|---|---|
//! | `component` | 16 | 0 (가변) | 2 | `vendor,component,version,purl,url` |
//! | `file` | 16 | 0 (가변) | 2 | `[component_id:16][path]` |
//! | `wfp` | 4 | 18 | 2 | `[file_id:16][oss_line:2]` |
//!
//! [`StoreSchema`]는 프로세스 시작 시 한 번 만들어지고 변경 API가 없습니다.
//! 조회는 [`KvStore`] 트레이트를 통해 이루어지며, 디스크 구현([`LdbStore`])과
//! 메모리 구현([`MemoryStore`])이 있습니다.

pub mod ldb;
pub mod memory;

pub use ldb::LdbStore;
pub use memory::MemoryStore;

use crate::error::ScannerError;
use crate::types::{ComponentInfo, FileId};

/// `component` 테이블 이름
pub const COMPONENT_TABLE: &str = "component";
/// `file` 테이블 이름
pub const FILE_TABLE: &str = "file";
/// `wfp` 테이블 이름
pub const WFP_TABLE: &str = "wfp";

/// `wfp` 레코드 길이 (바이트)
pub const WFP_RECORD_LEN: usize = 18;

/// 논리 테이블 설명자
///
/// 생성 후 변경되지 않으며 읽기 전용으로 공유됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    store: String,
    table: String,
    key_ln: usize,
    rec_ln: usize,
    ts_ln: usize,
    transient: bool,
}

impl TableDescriptor {
    /// 새 테이블 설명자를 생성합니다.
    pub fn new(
        store: impl Into<String>,
        table: impl Into<String>,
        key_ln: usize,
        rec_ln: usize,
        ts_ln: usize,
        transient: bool,
    ) -> Self {
        Self {
            store: store.into(),
            table: table.into(),
            key_ln,
            rec_ln,
            ts_ln,
            transient,
        }
    }

    /// 스토어 이름
    pub fn store(&self) -> &str {
        &self.store
    }

    /// 테이블 이름
    pub fn table(&self) -> &str {
        &self.table
    }

    /// 키 길이 (바이트)
    pub fn key_ln(&self) -> usize {
        self.key_ln
    }

    /// 레코드 길이 (0이면 가변)
    pub fn rec_ln(&self) -> usize {
        self.rec_ln
    }

    /// 엔트리 길이 필드의 바이트 폭
    pub fn ts_ln(&self) -> usize {
        self.ts_ln
    }

    /// 임시 테이블 여부
    pub fn transient(&self) -> bool {
        self.transient
    }

    /// 고정 길이 레코드 테이블인지 여부
    pub fn is_fixed(&self) -> bool {
        self.rec_ln > 0
    }

    /// 엔트리 하나에 담을 수 있는 최대 데이터 길이
    pub fn max_entry_len(&self) -> usize {
        if self.ts_ln >= std::mem::size_of::<usize>() {
            usize::MAX
        } else {
            (1usize << (8 * self.ts_ln)) - 1
        }
    }

    /// 키 길이를 검증합니다.
    pub fn check_key(&self, key: &[u8]) -> Result<(), ScannerError> {
        if key.len() != self.key_ln {
            return Err(ScannerError::StoreRead {
                table: self.table.clone(),
                reason: format!("key length {} != {}", key.len(), self.key_ln),
            });
        }
        Ok(())
    }
}

/// 스토어 스키마 -- 세 개의 논리 테이블
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSchema {
    component: TableDescriptor,
    file: TableDescriptor,
    wfp: TableDescriptor,
}

impl StoreSchema {
    /// 주어진 스토어 이름으로 스키마를 생성합니다.
    pub fn new(store: &str) -> Self {
        Self {
            component: TableDescriptor::new(store, COMPONENT_TABLE, 16, 0, 2, false),
            file: TableDescriptor::new(store, FILE_TABLE, 16, 0, 2, false),
            wfp: TableDescriptor::new(store, WFP_TABLE, 4, WFP_RECORD_LEN, 2, false),
        }
    }

    /// `component` 테이블
    pub fn component(&self) -> &TableDescriptor {
        &self.component
    }

    /// `file` 테이블
    pub fn file(&self) -> &TableDescriptor {
        &self.file
    }

    /// `wfp` 테이블
    pub fn wfp(&self) -> &TableDescriptor {
        &self.wfp
    }

    /// 이름으로 테이블을 찾습니다.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables().into_iter().find(|t| t.table() == name)
    }

    /// 모든 테이블
    pub fn tables(&self) -> [&TableDescriptor; 3] {
        [&self.component, &self.file, &self.wfp]
    }
}

impl Default for StoreSchema {
    fn default() -> Self {
        Self::new("oss")
    }
}

/// 키-값 스토어 조회 인터페이스
///
/// 키 하나에 대해 0개 이상의 레코드를 반환합니다. 없는 키는 빈 벡터이며 에러가 아닙니다.
pub trait KvStore {
    /// 테이블에서 키에 해당하는 레코드를 모두 가져옵니다.
    fn fetch(&self, table: &TableDescriptor, key: &[u8]) -> Result<Vec<Vec<u8>>, ScannerError>;
}

/// `wfp` 테이블 레코드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WfpRecord {
    /// 매치된 스토어 파일 ID
    pub file_id: FileId,
    /// 스토어 파일에서의 줄 번호
    pub oss_line: u16,
}

impl WfpRecord {
    /// 18바이트 레코드를 해석합니다.
    pub fn decode(bytes: &[u8]) -> Result<Self, ScannerError> {
        if bytes.len() != WFP_RECORD_LEN {
            return Err(corrupt(WFP_TABLE, format!("record length {}", bytes.len())));
        }
        let mut file_id = [0u8; 16];
        file_id.copy_from_slice(&bytes[..16]);
        let oss_line = u16::from_be_bytes([bytes[16], bytes[17]]);
        Ok(Self { file_id, oss_line })
    }

    /// 18바이트 레코드로 직렬화합니다.
    pub fn encode(&self) -> [u8; WFP_RECORD_LEN] {
        let mut out = [0u8; WFP_RECORD_LEN];
        out[..16].copy_from_slice(&self.file_id);
        out[16..].copy_from_slice(&self.oss_line.to_be_bytes());
        out
    }
}

/// `file` 테이블 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// 파일이 속한 컴포넌트 ID
    pub component_id: FileId,
    /// 컴포넌트 내 파일 경로
    pub path: String,
}

impl FileRecord {
    /// `[component_id:16][path]` 레코드를 해석합니다.
    pub fn decode(bytes: &[u8]) -> Result<Self, ScannerError> {
        if bytes.len() < 16 {
            return Err(corrupt(FILE_TABLE, format!("record length {}", bytes.len())));
        }
        let mut component_id = [0u8; 16];
        component_id.copy_from_slice(&bytes[..16]);
        let path = std::str::from_utf8(&bytes[16..])
            .map_err(|e| corrupt(FILE_TABLE, format!("path is not utf-8: {e}")))?
            .to_owned();
        Ok(Self { component_id, path })
    }

    /// 레코드 바이트로 직렬화합니다.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.path.len());
        out.extend_from_slice(&self.component_id);
        out.extend_from_slice(self.path.as_bytes());
        out
    }
}

/// `component` 테이블 레코드 (CSV)
pub struct ComponentRecord;

impl ComponentRecord {
    /// `vendor,component,version,purl,url` 레코드를 해석합니다.
    ///
    /// 빠진 뒤쪽 필드는 빈 문자열이 되고, URL의 쉼표는 그대로 유지됩니다.
    pub fn decode(bytes: &[u8]) -> Result<ComponentInfo, ScannerError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| corrupt(COMPONENT_TABLE, format!("record is not utf-8: {e}")))?;
        let mut fields = text.splitn(5, ',').map(str::to_owned);
        let component = ComponentInfo {
            vendor: fields.next().unwrap_or_default(),
            component: fields.next().unwrap_or_default(),
            version: fields.next().unwrap_or_default(),
            purl: fields.next().unwrap_or_default(),
            url: fields.next().unwrap_or_default(),
        };
        if component.component.is_empty() {
            return Err(corrupt(COMPONENT_TABLE, "missing component name".to_owned()));
        }
        Ok(component)
    }

    /// 레코드 바이트로 직렬화합니다.
    pub fn encode(info: &ComponentInfo) -> Vec<u8> {
        format!(
            "{},{},{},{},{}",
            info.vendor, info.component, info.version, info.purl, info.url
        )
        .into_bytes()
    }
}

fn corrupt(table: &str, reason: String) -> ScannerError {
    ScannerError::StoreRead {
        table: table.to_owned(),
        reason,
    }
}
