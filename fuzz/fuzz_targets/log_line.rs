#![no_main]

use libfuzzer_sys::fuzz_target;
use ingestflow_parser::classify_line;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    let (pattern, value) = classify_line(&line);
    // 모든 패턴은 원본 줄을 raw로 보존
    assert!(value.get("raw").is_some(), "pattern {:?} dropped raw", pattern);
});
