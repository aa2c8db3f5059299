//! NDJSON (JSON Lines) 파서
//!
//! 한 줄에 JSON 값 하나. 공백만 있는 줄은 건너뛰고 인덱스를 소비하지 않습니다.
//! 에러의 줄 번호는 빈 줄을 포함한 물리적 줄 번호입니다.

use std::io::BufRead;

use ingestflow_core::types::{FileInfo, FileType};
use serde_json::Value;

use super::{DEFAULT_MAX_LINE_LENGTH, EventSink, FileParser};
use crate::error::ParserError;
use crate::reader::LineReader;

/// NDJSON 파서
#[derive(Debug, Clone)]
pub struct NdjsonParser {
    /// 최대 줄 길이 (바이트)
    max_line_length: usize,
}

impl NdjsonParser {
    /// 줄 길이 제한을 지정하여 새 파서를 생성합니다.
    pub fn new(max_line_length: usize) -> Self {
        Self { max_line_length }
    }
}

impl Default for NdjsonParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl FileParser for NdjsonParser {
    fn file_type(&self) -> FileType {
        FileType::Ndjson
    }

    fn parse(
        &self,
        reader: &mut dyn BufRead,
        sink: &mut EventSink,
    ) -> Result<FileInfo, ParserError> {
        let mut lines = LineReader::new(reader, self.max_line_length);

        while let Some((line, bytes)) = lines.next_line()? {
            let text = std::str::from_utf8(bytes).map_err(|e| ParserError::InvalidLine {
                line,
                reason: e.to_string(),
            })?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            let value: Value =
                serde_json::from_str(trimmed).map_err(|e| ParserError::InvalidLine {
                    line,
                    reason: e.to_string(),
                })?;
            sink.emit(value, Some(trimmed.to_owned()))?;
        }

        Ok(FileInfo::completed(FileType::Ndjson, sink.emitted()))
    }
}
