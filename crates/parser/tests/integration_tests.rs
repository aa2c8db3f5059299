//! 통합 테스트 -- 감지부터 이벤트 스트리밍까지 전체 흐름 검증

use std::io::{Cursor, Write};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use ingestflow_core::config::ParserConfig;
use ingestflow_core::types::{FileType, ParseEvent};
use ingestflow_parser::{ParserDispatcher, ParserError, sniff};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn collect(mut rx: mpsc::Receiver<ParseEvent>) -> Vec<ParseEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

/// JSON 배열 N개 원소 → 인덱스 0..N-1 이벤트 N개
#[tokio::test]
async fn test_json_array_end_to_end() {
    let input = serde_json::to_vec(&(0..50).map(|i| serde_json::json!({"id": i})).collect::<Vec<_>>())
        .expect("serialize");
    let size = input.len() as u64;

    let (rx, task) = ParserDispatcher::default().spawn("upload", Cursor::new(input));
    let events = timeout(TEST_TIMEOUT, collect(rx)).await.expect("timed out");
    let info = task.join().await.expect("parse should succeed");

    assert_eq!(info.file_type, FileType::Json);
    assert_eq!(info.line_count, 50);
    assert_eq!(info.size, size);
    assert_eq!(events.len(), 50);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.index, i as u64);
        assert_eq!(event.data["id"], i as u64);
    }
}

/// 잘못된 NDJSON 줄 이전의 이벤트는 이미 전달되고, 에러는 물리적 줄 번호를 가리킴
#[tokio::test]
async fn test_ndjson_failure_after_delivered_events() {
    let input = b"{\"x\":1}\n\nnot-json\n{\"x\":2}\n".to_vec();
    let (rx, task) = ParserDispatcher::default().spawn("events.ndjson", Cursor::new(input));

    let events = timeout(TEST_TIMEOUT, collect(rx)).await.expect("timed out");
    let err = task.join().await.expect_err("parse should fail");

    assert!(matches!(err, ParserError::InvalidLine { line: 3, .. }));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, serde_json::json!({"x": 1}));
}

/// CSV 열 개수 불일치 → 해당 데이터 행 번호
#[tokio::test]
async fn test_csv_column_mismatch_row() {
    let input = b"a,b,c\n1,2,3\n4,5\n".to_vec();
    let (rx, task) = ParserDispatcher::default().spawn("upload", Cursor::new(input));

    let events = timeout(TEST_TIMEOUT, collect(rx)).await.expect("timed out");
    let err = task.join().await.expect_err("parse should fail");

    assert!(matches!(
        err,
        ParserError::ColumnMismatch {
            row: 2,
            expected: 3,
            found: 2
        }
    ));
    assert_eq!(events.len(), 1);
}

/// 자유 텍스트 로그는 실패하지 않음
#[tokio::test]
async fn test_free_text_log_never_fails() {
    let input = b"alpha\n\nbeta gamma\n  delta  \n".to_vec();
    let (rx, task) = ParserDispatcher::default().spawn("app.log", Cursor::new(input));

    let events = timeout(TEST_TIMEOUT, collect(rx)).await.expect("timed out");
    let info = task.join().await.expect("parse should succeed");

    assert_eq!(info.line_count, 3);
    let messages: Vec<_> = events
        .iter()
        .map(|e| e.data["message"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(messages, vec!["alpha", "beta gamma", "delta"]);
}

/// 파일에서 직접 파싱 + 크기 검증
#[tokio::test]
async fn test_spawn_file_reads_from_disk() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("tempfile");
    file.write_all(b"name,score\nkim,10\nlee,20\n").expect("write");

    let dispatcher = ParserDispatcher::default();
    let (rx, task) = dispatcher.spawn_file(file.path()).await.expect("spawn");
    let events = timeout(TEST_TIMEOUT, collect(rx)).await.expect("timed out");
    let info = task.join().await.expect("parse should succeed");

    assert_eq!(info.file_type, FileType::Csv);
    assert_eq!(info.headers, Some(vec!["name".to_owned(), "score".to_owned()]));
    assert_eq!(events[1].data["score"], "20");
}

#[tokio::test]
async fn test_spawn_file_rejects_oversize() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(&[b'x'; 64]).expect("write");

    let dispatcher = ParserDispatcher::new(ParserConfig {
        max_file_size: 16,
        ..ParserConfig::default()
    });
    let err = dispatcher.spawn_file(file.path()).await.expect_err("should reject");
    assert!(matches!(err, ParserError::FileTooLarge { size: 64, max: 16 }));
}

#[tokio::test]
async fn test_spawn_file_rejects_empty() {
    let file = tempfile::NamedTempFile::new().expect("tempfile");
    let err = ParserDispatcher::default()
        .spawn_file(file.path())
        .await
        .expect_err("should reject");
    assert!(matches!(err, ParserError::EmptyFile));
}

/// 탐색 가능한 파일은 감지 후 처음으로 되감김
#[test]
fn test_sniff_then_parse_same_handle() {
    let mut file = tempfile::tempfile().expect("tempfile");
    file.write_all(b"{\"k\":\"v\"}\n").expect("write");
    std::io::Seek::rewind(&mut file).expect("rewind");

    let file_type = sniff("upload", &mut file, 1024).expect("sniff");
    assert_eq!(file_type, FileType::Ndjson);

    let (tx, mut rx) = mpsc::channel(8);
    let info = ParserDispatcher::default()
        .parse_as(file_type, file, tx)
        .expect("parse");
    assert_eq!(info.line_count, 1);
    assert_eq!(rx.try_recv().expect("event").data["k"], "v");
}
