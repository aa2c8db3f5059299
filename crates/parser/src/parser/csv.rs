//! CSV 파서
//!
//! 첫 행은 헤더입니다. 이후 각 행은 헤더와 열 개수가 같아야 하며,
//! `헤더 → 문자열` 맵(JSON 객체)으로 방출됩니다. 타입 변환은 하지 않습니다.

use std::io::BufRead;

use ingestflow_core::types::{FileInfo, FileType};
use serde_json::{Map, Value};

use super::{EventSink, FileParser};
use crate::error::ParserError;

/// CSV 파서
#[derive(Debug, Clone)]
pub struct CsvParser {
    /// 필드 구분자
    delimiter: u8,
}

impl CsvParser {
    /// 쉼표 구분 파서를 생성합니다.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// 구분자를 변경합니다 (예: `b'\t'`).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser for CsvParser {
    fn file_type(&self) -> FileType {
        FileType::Csv
    }

    fn parse(
        &self,
        reader: &mut dyn BufRead,
        sink: &mut EventSink,
    ) -> Result<FileInfo, ParserError> {
        // 열 개수는 직접 검사해서 데이터 행 번호를 보고함
        let mut rdr = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| csv_error(0, e))?
            .iter()
            .map(str::to_owned)
            .collect();
        if headers.is_empty() {
            return Err(ParserError::MissingHeader);
        }

        let mut record = ::csv::StringRecord::new();
        let mut row: u64 = 0;
        loop {
            let has_record = rdr
                .read_record(&mut record)
                .map_err(|e| csv_error(row + 1, e))?;
            if !has_record {
                break;
            }
            row += 1;

            if record.len() != headers.len() {
                return Err(ParserError::ColumnMismatch {
                    row,
                    expected: headers.len(),
                    found: record.len(),
                });
            }

            let mut object = Map::with_capacity(headers.len());
            for (header, field) in headers.iter().zip(record.iter()) {
                object.insert(header.clone(), Value::String(field.to_owned()));
            }
            let raw = record.iter().collect::<Vec<_>>().join(",");
            sink.emit(Value::Object(object), Some(raw))?;
        }

        Ok(FileInfo::completed(FileType::Csv, sink.emitted()).with_headers(headers))
    }
}

fn csv_error(row: u64, err: ::csv::Error) -> ParserError {
    if err.is_io_error() {
        if let ::csv::ErrorKind::Io(io) = err.into_kind() {
            return ParserError::Io(io);
        }
        return ParserError::Csv {
            row,
            reason: "i/o error".to_owned(),
        };
    }
    ParserError::Csv {
        row,
        reason: err.to_string(),
    }
}
