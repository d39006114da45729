#![no_main]

use libfuzzer_sys::fuzz_target;
use scanoss_scanner::store::ldb::scan_shard;
use scanoss_scanner::store::{ComponentRecord, FileRecord, WfpRecord};
use scanoss_scanner::StoreSchema;

fuzz_target!(|data: &[u8]| {
    let schema = StoreSchema::default();

    // 첫 바이트들을 키로, 나머지를 샤드로 사용
    if data.len() >= 4 {
        let (key, shard) = data.split_at(4);
        if let Ok(records) = scan_shard(schema.wfp(), shard, key) {
            for raw in records {
                assert_eq!(raw.len(), 18);
                let _ = WfpRecord::decode(&raw);
            }
        }
    }

    if data.len() >= 16 {
        let (key, shard) = data.split_at(16);
        if let Ok(records) = scan_shard(schema.file(), shard, key) {
            for raw in records {
                let _ = FileRecord::decode(&raw);
            }
        }
        if let Ok(records) = scan_shard(schema.component(), shard, key) {
            for raw in records {
                let _ = ComponentRecord::decode(&raw);
            }
        }
    }
});
