//! 파서 디스패처: 형식 감지와 파싱을 묶는 진입점
//!
//! [`ParserDispatcher`]는 감지된 [`FileType`]에 맞는 파서를 고르고 실행합니다.
//!
//! # 사용 예시
//! ```ignore
//! use ingestflow_parser::ParserDispatcher;
//!
//! let dispatcher = ParserDispatcher::new(config.parser.clone());
//! let (mut events, task) = dispatcher.spawn("upload.ndjson", file);
//! while let Some(event) = events.recv().await {
//!     // 이벤트 처리
//! }
//! let info = task.join().await?;
//! ```

use std::io::{BufReader, Read};
use std::time::Instant;

use ingestflow_core::config::ParserConfig;
use ingestflow_core::metrics as m;
use ingestflow_core::types::{FileInfo, FileType, ParseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::detect;
use crate::error::ParserError;
use crate::parser::{CsvParser, EventSink, FileParser, JsonArrayParser, LogParser, NdjsonParser};
use crate::reader::CountingReader;

/// 읽기 버퍼 최소 크기
const MIN_BUFFER_SIZE: usize = 8 * 1024;

/// 파서 디스패처
#[derive(Debug, Clone, Default)]
pub struct ParserDispatcher {
    config: ParserConfig,
}

impl ParserDispatcher {
    /// 파서 설정으로 디스패처를 생성합니다.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// 디스패처 설정
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// 형식에 맞는 파서를 반환합니다.
    ///
    /// `Custom`과 `Unknown`은 NDJSON 파서로 처리합니다.
    pub fn parser_for(&self, file_type: FileType) -> Box<dyn FileParser> {
        let max_line = self.config.max_line_length;
        match file_type {
            FileType::Json => Box::new(JsonArrayParser::new()),
            FileType::Ndjson | FileType::Custom | FileType::Unknown => {
                Box::new(NdjsonParser::new(max_line))
            }
            FileType::Csv => Box::new(CsvParser::new()),
            FileType::Log => Box::new(LogParser::new(max_line)),
        }
    }

    /// 스트림의 형식을 감지하고 파싱합니다 (동기).
    ///
    /// 감지는 버퍼를 들여다보기만 하므로 스트림을 소비하지 않습니다.
    /// blocking 컨텍스트에서 호출해야 합니다.
    pub fn parse_stream<R: Read>(
        &self,
        filename: &str,
        reader: R,
        events: mpsc::Sender<ParseEvent>,
    ) -> Result<FileInfo, ParserError> {
        let mut buffered = self.buffered(reader);
        let file_type = detect::peek(filename, &mut buffered, self.config.detect_prefix_bytes)?;
        debug!(filename, format = %file_type, "detected file type");
        self.run(file_type, buffered, events)
    }

    /// 지정한 형식으로 파싱합니다 (동기, 감지 생략).
    pub fn parse_as<R: Read>(
        &self,
        file_type: FileType,
        reader: R,
        events: mpsc::Sender<ParseEvent>,
    ) -> Result<FileInfo, ParserError> {
        let buffered = self.buffered(reader);
        self.run(file_type, buffered, events)
    }

    /// blocking 스레드에서 감지 + 파싱을 실행합니다.
    ///
    /// 이벤트 채널 용량은 `event_channel_capacity`입니다. 반환된 수신자를 버리면
    /// 파싱은 [`ParserError::ChannelClosed`]로 중단됩니다.
    pub fn spawn<R>(
        &self,
        filename: impl Into<String>,
        reader: R,
    ) -> (mpsc::Receiver<ParseEvent>, ParseTask)
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.config.event_channel_capacity);
        let dispatcher = self.clone();
        let filename = filename.into();
        let handle =
            tokio::task::spawn_blocking(move || dispatcher.parse_stream(&filename, reader, tx));
        (rx, ParseTask { handle })
    }

    /// blocking 스레드에서 지정한 형식으로 파싱합니다 (감지 생략).
    pub fn spawn_as<R>(
        &self,
        file_type: FileType,
        reader: R,
    ) -> (mpsc::Receiver<ParseEvent>, ParseTask)
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.config.event_channel_capacity);
        let dispatcher = self.clone();
        let handle = tokio::task::spawn_blocking(move || dispatcher.parse_as(file_type, reader, tx));
        (rx, ParseTask { handle })
    }

    /// 파일을 열어 blocking 스레드에서 감지 + 파싱을 실행합니다.
    ///
    /// 파일 크기는 먼저 `max_file_size`로 검증됩니다.
    pub async fn spawn_file(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(mpsc::Receiver<ParseEvent>, ParseTask), ParserError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        crate::upload::validate_file_size(metadata.len(), self.config.max_file_size)?;

        let file = tokio::fs::File::open(path).await?.into_std().await;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.spawn(filename, file))
    }

    fn buffered<R: Read>(&self, reader: R) -> BufReader<CountingReader<R>> {
        let capacity = MIN_BUFFER_SIZE.max(self.config.detect_prefix_bytes);
        BufReader::with_capacity(capacity, CountingReader::new(reader))
    }

    fn run<R: Read>(
        &self,
        file_type: FileType,
        mut reader: BufReader<CountingReader<R>>,
        events: mpsc::Sender<ParseEvent>,
    ) -> Result<FileInfo, ParserError> {
        let parser = self.parser_for(file_type);
        let mut sink = EventSink::new(events);
        let started = Instant::now();

        match parser.parse(&mut reader, &mut sink) {
            Ok(mut info) => {
                let elapsed = started.elapsed();
                info.file_type = file_type;
                info.size = reader.get_ref().bytes_read();

                let format = file_type.as_str();
                metrics::counter!(m::PARSER_FILES_TOTAL, m::LABEL_FORMAT => format).increment(1);
                metrics::counter!(m::PARSER_EVENTS_TOTAL, m::LABEL_FORMAT => format)
                    .increment(info.line_count);
                metrics::counter!(m::PARSER_BYTES_TOTAL, m::LABEL_FORMAT => format)
                    .increment(info.size);
                metrics::histogram!(m::PARSER_DURATION_SECONDS, m::LABEL_FORMAT => format)
                    .record(elapsed.as_secs_f64());

                info!(
                    format,
                    events = info.line_count,
                    bytes = info.size,
                    elapsed = ?elapsed,
                    "parse completed"
                );
                Ok(info)
            }
            Err(e) => {
                metrics::counter!(m::PARSER_ERRORS_TOTAL, m::LABEL_FORMAT => file_type.as_str())
                    .increment(1);
                warn!(
                    format = file_type.as_str(),
                    emitted = sink.emitted(),
                    error = %e,
                    "parse aborted"
                );
                Err(e)
            }
        }
    }
}

/// blocking 스레드에서 실행 중인 파싱 작업 핸들
#[derive(Debug)]
pub struct ParseTask {
    handle: JoinHandle<Result<FileInfo, ParserError>>,
}

impl ParseTask {
    /// 파싱이 끝날 때까지 기다립니다.
    pub async fn join(self) -> Result<FileInfo, ParserError> {
        self.handle
            .await
            .map_err(|e| ParserError::Task(e.to_string()))?
    }
}
