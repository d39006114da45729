#![no_main]

use libfuzzer_sys::fuzz_target;
use scanoss_scanner::parse_wfp;

fuzz_target!(|data: &[u8]| {
    if let Ok(entries) = parse_wfp(data, "fuzz.wfp") {
        for entry in entries {
            let _ = entry.target();
        }
    }
});
