//! 형식별 스트리밍 파서
//!
//! 각 파서는 [`FileParser`] trait을 구현하며, 바이트 스트림을 읽어
//! [`ParseEvent`]를 순서대로 [`EventSink`]에 흘려보내고 성공 시 [`FileInfo`]를 반환합니다.
//!
//! # 지원 형식
//! - JSON 배열 ([`JsonArrayParser`])
//! - JSON Lines ([`NdjsonParser`])
//! - 헤더가 있는 CSV ([`CsvParser`])
//! - 비정형 로그 ([`LogParser`])
//!
//! 파서는 동기식이며 blocking 스레드에서 실행됩니다. 비동기 컨텍스트에서는
//! [`ParserDispatcher::spawn`](crate::ParserDispatcher::spawn)을 사용하세요.

pub mod csv;
pub mod json;
pub mod log;
pub mod ndjson;

pub use self::csv::CsvParser;
pub use self::json::JsonArrayParser;
pub use self::log::{LogParser, LogPattern, classify_line};
pub use self::ndjson::NdjsonParser;

use std::io::BufRead;

use ingestflow_core::types::{FileInfo, FileType, ParseEvent};
use tokio::sync::mpsc;

use crate::error::ParserError;

/// 줄 기반 형식의 기본 최대 줄 길이 (1MB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// 형식별 파서 trait
///
/// 구현체는 입력 전체를 소비한 경우에만 `Ok(FileInfo)`를 반환해야 합니다.
/// 구조적 오류가 나면 즉시 중단하며, 그 전에 방출한 이벤트는 이미 전달된 상태입니다.
pub trait FileParser: Send + Sync {
    /// 이 파서가 처리하는 형식
    fn file_type(&self) -> FileType;

    /// 입력을 파싱하여 이벤트를 `sink`로 보냅니다.
    ///
    /// 반환된 `FileInfo.size`는 0이며, 디스패처가 소비 바이트 수로 채웁니다.
    fn parse(&self, reader: &mut dyn BufRead, sink: &mut EventSink)
    -> Result<FileInfo, ParserError>;
}

/// 이벤트 출력 채널 래퍼
///
/// 인덱스를 0부터 빈틈없이 부여하고, bounded 채널에 blocking 방식으로 전송합니다.
/// 수신자가 사라지면 [`ParserError::ChannelClosed`]로 파싱이 중단됩니다.
///
/// 내부적으로 `blocking_send`를 사용하므로 비동기 런타임 스레드에서 호출하면 안 됩니다.
pub struct EventSink {
    tx: mpsc::Sender<ParseEvent>,
    next_index: u64,
}

impl EventSink {
    /// 새 싱크를 생성합니다.
    pub fn new(tx: mpsc::Sender<ParseEvent>) -> Self {
        Self { tx, next_index: 0 }
    }

    /// 다음 인덱스로 이벤트를 방출합니다.
    pub fn emit(
        &mut self,
        data: serde_json::Value,
        raw: Option<String>,
    ) -> Result<(), ParserError> {
        let mut event = ParseEvent::new(self.next_index, data);
        event.raw = raw;
        self.tx
            .blocking_send(event)
            .map_err(|_| ParserError::ChannelClosed)?;
        self.next_index += 1;
        Ok(())
    }

    /// 지금까지 방출한 이벤트 수 (= 다음 인덱스)
    pub fn emitted(&self) -> u64 {
        self.next_index
    }
}
