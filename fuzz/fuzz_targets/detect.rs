#![no_main]

use std::io::{Cursor, Seek};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ingestflow_parser::{detect_by_extension, detect_file_type, sniff};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    filename: String,
    content: Vec<u8>,
    prefix_len: u16,
}

fuzz_target!(|input: FuzzInput| {
    let prefix_len = usize::from(input.prefix_len);
    let end = prefix_len.min(input.content.len());
    let by_prefix = detect_file_type(&input.filename, &input.content[..end]);

    // sniff는 같은 결과를 내고 읽기 위치를 되돌려야 함
    let mut cursor = Cursor::new(&input.content);
    let sniffed = sniff(&input.filename, &mut cursor, prefix_len).expect("cursor reads never fail");
    assert_eq!(sniffed, by_prefix);
    assert_eq!(cursor.stream_position().expect("position"), 0);

    if let Some(file_type) = detect_by_extension(&input.filename) {
        assert_eq!(by_prefix, file_type);
    }
});
