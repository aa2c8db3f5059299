//! JSON 배열 파서
//!
//! 최상위 JSON 배열을 원소 단위로 스트리밍 디코딩합니다. 배열 전체를
//! 메모리에 올리지 않고 원소 하나를 디코딩할 때마다 이벤트를 방출합니다.
//!
//! 닫는 `]` 뒤의 내용은 읽지 않습니다.

use std::fmt;
use std::io::BufRead;

use ingestflow_core::types::{FileInfo, FileType};
use serde::Deserialize;
use serde::de::{self, DeserializeSeed, Deserializer as _, SeqAccess, Visitor};
use serde_json::Value;

use super::{EventSink, FileParser};
use crate::error::ParserError;

/// JSON 배열 파서
#[derive(Debug, Default, Clone)]
pub struct JsonArrayParser;

impl JsonArrayParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl FileParser for JsonArrayParser {
    fn file_type(&self) -> FileType {
        FileType::Json
    }

    fn parse(
        &self,
        reader: &mut dyn BufRead,
        sink: &mut EventSink,
    ) -> Result<FileInfo, ParserError> {
        let mut state = VisitState::default();
        let mut de = serde_json::Deserializer::from_reader(reader);

        let result = (&mut de).deserialize_seq(ArrayVisitor {
            sink: &mut *sink,
            state: &mut state,
        });

        match result {
            Ok(()) => Ok(FileInfo::completed(FileType::Json, sink.emitted())),
            Err(e) => Err(classify(e, state)),
        }
    }
}

/// 방문 중 관찰한 상태 (에러 분류용)
#[derive(Default)]
struct VisitState {
    /// `[`를 지나 원소 순회를 시작했는지
    started: bool,
    /// 디코딩에 실패한 원소 인덱스
    failed_element: Option<u64>,
    /// 싱크 전송 실패 원인
    sink_error: Option<ParserError>,
}

struct ArrayVisitor<'s> {
    sink: &'s mut EventSink,
    state: &'s mut VisitState,
}

impl<'de> Visitor<'de> for ArrayVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a top-level JSON array")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        self.state.started = true;
        loop {
            let index = self.sink.emitted();
            let mut entered = false;
            match seq.next_element_seed(ElementSeed {
                entered: &mut entered,
            }) {
                Ok(Some(value)) => {
                    if let Err(e) = self.sink.emit(value, None) {
                        let msg = e.to_string();
                        self.state.sink_error = Some(e);
                        return Err(de::Error::custom(msg));
                    }
                }
                Ok(None) => return Ok(()),
                Err(e) => {
                    // 원소 디코딩 전의 실패는 구분자 오류
                    if entered {
                        self.state.failed_element = Some(index);
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// 원소 디코딩에 들어갔는지 기록하는 시드
struct ElementSeed<'a> {
    entered: &'a mut bool,
}

impl<'de> DeserializeSeed<'de> for ElementSeed<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        *self.entered = true;
        Value::deserialize(deserializer)
    }
}

fn classify(err: serde_json::Error, state: VisitState) -> ParserError {
    if let Some(sink_error) = state.sink_error {
        return sink_error;
    }
    if err.is_io() {
        return ParserError::Io(err.into());
    }
    if !state.started {
        return ParserError::MalformedArray {
            reason: format!("expected '[': {}", err),
        };
    }
    if err.is_eof() {
        return ParserError::MalformedArray {
            reason: format!("missing closing ']': {}", err),
        };
    }
    match state.failed_element {
        Some(index) => ParserError::InvalidElement {
            index,
            reason: err.to_string(),
        },
        None => ParserError::MalformedArray {
            reason: err.to_string(),
        },
    }
}
