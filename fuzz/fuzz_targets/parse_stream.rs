#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tokio::sync::mpsc;

use ingestflow_core::config::ParserConfig;
use ingestflow_parser::ParserDispatcher;

/// 파일 이름으로 형식을 고르고 감지 + 파싱 전체를 실행
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    filename: String,
    content: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let config = ParserConfig {
        max_line_length: 4096,
        ..ParserConfig::default()
    };
    let dispatcher = ParserDispatcher::new(config);

    let (tx, mut rx) = mpsc::channel(64);
    let drain = std::thread::spawn(move || {
        let mut count = 0u64;
        while let Some(event) = rx.blocking_recv() {
            // 인덱스는 0부터 빈틈없이 증가
            assert_eq!(event.index, count);
            count += 1;
        }
        count
    });

    let result = dispatcher.parse_stream(&input.filename, Cursor::new(input.content), tx);
    let emitted = drain.join().expect("drain thread");

    if let Ok(info) = result {
        assert_eq!(info.line_count, emitted);
    }
});
