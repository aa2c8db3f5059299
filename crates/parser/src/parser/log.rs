//! 비정형 로그 파서
//!
//! 줄마다 순서가 정해진 휴리스틱을 적용하고 첫 번째로 성공한 결과를 사용합니다.
//!
//! 1. Apache common 형식 (공백 토큰 8개 이상)
//! 2. JSON 객체 한 줄
//! 3. `timestamp LEVEL message`
//! 4. 그 외: 줄 전체를 `message`로
//!
//! 내용 때문에 실패하지 않습니다. 파일 전체에서 가장 많이 일치한 패턴은
//! `FileInfo.metadata`에 기록됩니다.

use std::io::BufRead;

use ingestflow_core::types::{FileInfo, FileType};
use serde_json::{Map, Value, json};

use super::{DEFAULT_MAX_LINE_LENGTH, EventSink, FileParser};
use crate::error::ParserError;
use crate::reader::LineReader;

/// 줄 분류 결과 (캐스케이드 순서와 같은 순서)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogPattern {
    /// Apache common log 형식
    ApacheCommon,
    /// 한 줄 JSON 객체
    JsonLog,
    /// `timestamp LEVEL message`
    TimestampLevelMessage,
    /// 인식되지 않은 자유 텍스트
    Plain,
}

impl LogPattern {
    /// 캐스케이드 순서대로 나열한 전체 패턴
    pub const ALL: [LogPattern; 4] = [
        Self::ApacheCommon,
        Self::JsonLog,
        Self::TimestampLevelMessage,
        Self::Plain,
    ];

    /// 메타데이터에 기록되는 패턴 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApacheCommon => "apache_common",
            Self::JsonLog => "json_log",
            Self::TimestampLevelMessage => "timestamp_level_message",
            Self::Plain => "plain",
        }
    }

    fn position(self) -> usize {
        match self {
            Self::ApacheCommon => 0,
            Self::JsonLog => 1,
            Self::TimestampLevelMessage => 2,
            Self::Plain => 3,
        }
    }
}

/// 한 줄(앞뒤 공백 제거됨)을 분류하고 페이로드를 만듭니다.
///
/// 순수 함수입니다. 모든 페이로드는 원본 줄을 `raw` 키로 함께 담습니다.
pub fn classify_line(line: &str) -> (LogPattern, Value) {
    if let Some(value) = apache_common(line) {
        return (LogPattern::ApacheCommon, value);
    }
    if let Some(value) = json_log(line) {
        return (LogPattern::JsonLog, value);
    }
    if let Some(value) = timestamp_level_message(line) {
        return (LogPattern::TimestampLevelMessage, value);
    }
    (LogPattern::Plain, json!({ "message": line, "raw": line }))
}

fn apache_common(line: &str) -> Option<Value> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 8 {
        return None;
    }

    let timestamp = format!(
        "{} {}",
        tokens[3].trim_start_matches('['),
        tokens[4].trim_end_matches(']')
    );
    Some(json!({
        "ip": tokens[0],
        "timestamp": timestamp,
        "method": tokens[5].trim_start_matches('"'),
        "path": tokens[6],
        "protocol": tokens[7].trim_end_matches('"'),
        "raw": line,
    }))
}

fn json_log(line: &str) -> Option<Value> {
    if !line.starts_with('{') {
        return None;
    }
    let mut object: Map<String, Value> = serde_json::from_str(line).ok()?;
    object.insert("raw".to_owned(), Value::String(line.to_owned()));
    Some(Value::Object(object))
}

fn timestamp_level_message(line: &str) -> Option<Value> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let timestamp = parts.next().filter(|s| !s.is_empty())?;
    let level = parts.next().filter(|s| !s.is_empty())?;
    let message = parts.next().map(str::trim_start).filter(|s| !s.is_empty())?;

    Some(json!({
        "timestamp": timestamp,
        "level": level,
        "message": message,
        "raw": line,
    }))
}

/// 비정형 로그 파서
#[derive(Debug, Clone)]
pub struct LogParser {
    /// 최대 줄 길이 (바이트)
    max_line_length: usize,
}

impl LogParser {
    /// 줄 길이 제한을 지정하여 새 파서를 생성합니다.
    pub fn new(max_line_length: usize) -> Self {
        Self { max_line_length }
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl FileParser for LogParser {
    fn file_type(&self) -> FileType {
        FileType::Log
    }

    fn parse(
        &self,
        reader: &mut dyn BufRead,
        sink: &mut EventSink,
    ) -> Result<FileInfo, ParserError> {
        // 긴 줄은 잘라서라도 이벤트로 남김
        let mut lines = LineReader::truncating(reader, self.max_line_length);
        let mut counts = [0u64; 4];

        while let Some((_, bytes)) = lines.next_line()? {
            // 로그는 인코딩이 섞여 있을 수 있음
            let text = String::from_utf8_lossy(bytes);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (pattern, value) = classify_line(trimmed);
            counts[pattern.position()] += 1;
            sink.emit(value, Some(trimmed.to_owned()))?;
        }

        Ok(FileInfo::completed(FileType::Log, sink.emitted()).with_metadata(pattern_summary(&counts)))
    }
}

/// 패턴별 개수로 파일 수준 메타데이터를 만듭니다.
///
/// 대표 패턴은 `plain`을 제외한 가장 많이 일치한 패턴이며, 동률이면 캐스케이드 앞쪽이 이깁니다.
fn pattern_summary(counts: &[u64; 4]) -> Value {
    let mut dominant: Option<LogPattern> = None;
    let mut best = 0;
    for pattern in LogPattern::ALL {
        let count = counts[pattern.position()];
        if pattern != LogPattern::Plain && count > best {
            best = count;
            dominant = Some(pattern);
        }
    }

    let pattern_counts: Map<String, Value> = LogPattern::ALL
        .iter()
        .map(|p| (p.as_str().to_owned(), json!(counts[p.position()])))
        .collect();

    json!({
        "pattern": dominant.map(|p| p.as_str()),
        "pattern_counts": pattern_counts,
    })
}
