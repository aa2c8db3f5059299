//! ingestflow 파서 크레이트
//!
//! 업로드된 파일을 형식별로 감지하고, 순서가 보장된 [`ParseEvent`] 스트림으로 디코딩합니다.
//!
//! # 모듈 구성
//!
//! - [`detect`]: 파일 이름과 내용 앞부분으로 [`FileType`] 결정
//! - [`parser`]: [`FileParser`] trait과 형식별 파서 4종
//! - [`dispatch`]: 감지 + 파싱을 묶는 [`ParserDispatcher`]
//! - [`upload`]: 업로드 경계 검증 유틸리티
//! - [`error`]: [`ParserError`]
//!
//! [`ParseEvent`]: ingestflow_core::ParseEvent
//! [`FileType`]: ingestflow_core::FileType

pub mod detect;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod reader;
pub mod upload;

pub use detect::{detect_by_content, detect_by_extension, detect_file_type, peek, sniff};
pub use dispatch::{ParseTask, ParserDispatcher};
pub use error::ParserError;
pub use parser::{
    CsvParser, EventSink, FileParser, JsonArrayParser, LogParser, LogPattern, NdjsonParser,
    classify_line,
};
pub use reader::CountingReader;
pub use upload::{
    check_extension, count_lines, is_allowed_extension, sanitize_filename, validate_file_size,
};
