//! 파서 에러 타입
//!
//! [`ParserError`]는 형식 감지, 파싱, 업로드 검증 중 발생하는 모든 에러를 표현합니다.
//! `From<ParserError> for IngestflowError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use ingestflow_core::error::{IngestflowError, ParseError};

/// 파서 도메인 에러
///
/// 구조적 파싱 에러는 문제가 된 원소 인덱스, 물리적 줄 번호, 데이터 행 번호를 담습니다.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// JSON 배열 구조 오류 (`[` 누락, `]` 누락 등)
    #[error("malformed JSON array: {reason}")]
    MalformedArray {
        /// 실패 사유
        reason: String,
    },

    /// JSON 배열 원소 디코딩 실패
    #[error("invalid JSON element at index {index}: {reason}")]
    InvalidElement {
        /// 0부터 시작하는 원소 인덱스
        index: u64,
        /// 실패 사유
        reason: String,
    },

    /// NDJSON 줄 디코딩 실패
    #[error("invalid JSON at line {line}: {reason}")]
    InvalidLine {
        /// 1부터 시작하는 물리적 줄 번호 (빈 줄 포함)
        line: u64,
        /// 실패 사유
        reason: String,
    },

    /// 줄 길이 제한 초과
    #[error("line {line} exceeds maximum length of {max} bytes")]
    LineTooLong {
        /// 1부터 시작하는 물리적 줄 번호
        line: u64,
        /// 최대 허용 길이
        max: usize,
    },

    /// CSV 헤더 행 없음 (빈 입력)
    #[error("CSV input has no header row")]
    MissingHeader,

    /// CSV 열 개수 불일치
    #[error("CSV row {row} has {found} columns, expected {expected}")]
    ColumnMismatch {
        /// 1부터 시작하는 데이터 행 번호 (헤더 제외)
        row: u64,
        /// 헤더의 열 개수
        expected: usize,
        /// 실제 열 개수
        found: usize,
    },

    /// CSV 레코드 디코딩 실패
    #[error("CSV row {row}: {reason}")]
    Csv {
        /// 1부터 시작하는 데이터 행 번호
        row: u64,
        /// 실패 사유
        reason: String,
    },

    /// 이벤트 수신자가 사라짐 (파싱 취소)
    #[error("event receiver dropped, parse cancelled")]
    ChannelClosed,

    /// 빈 업로드
    #[error("file is empty")]
    EmptyFile,

    /// 업로드 크기 초과
    #[error("file size {size} bytes exceeds maximum allowed size {max} bytes")]
    FileTooLarge {
        /// 실제 크기
        size: u64,
        /// 최대 허용 크기
        max: u64,
    },

    /// 허용되지 않은 확장자
    #[error("file extension not allowed: {0}")]
    ExtensionNotAllowed(String),

    /// 파싱 태스크 실행 실패 (패닉 등)
    #[error("parse task failed: {0}")]
    Task(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParserError {
    /// 에러가 발생한 형식 이름 (메트릭 및 상위 에러 변환용)
    pub fn format_name(&self) -> &'static str {
        match self {
            Self::MalformedArray { .. } | Self::InvalidElement { .. } => "json",
            Self::InvalidLine { .. } => "ndjson",
            Self::MissingHeader | Self::ColumnMismatch { .. } | Self::Csv { .. } => "csv",
            Self::LineTooLong { .. } | Self::ChannelClosed | Self::Task(_) | Self::Io(_) => {
                "stream"
            }
            Self::EmptyFile | Self::FileTooLarge { .. } | Self::ExtensionNotAllowed(_) => "upload",
        }
    }
}

impl From<ParserError> for IngestflowError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::Io(e) => IngestflowError::Io(e),
            ParserError::FileTooLarge { size, max } => {
                IngestflowError::Parse(ParseError::TooLarge { size, max })
            }
            ParserError::ExtensionNotAllowed(ext) => {
                IngestflowError::Parse(ParseError::UnsupportedFormat(ext))
            }
            other => IngestflowError::Parse(ParseError::Failed {
                format: other.format_name().to_owned(),
                reason: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_line_display() {
        let err = ParserError::InvalidLine {
            line: 3,
            reason: "expected value".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn column_mismatch_display() {
        let err = ParserError::ColumnMismatch {
            row: 2,
            expected: 3,
            found: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("row 2"));
        assert!(msg.contains("4 columns"));
        assert!(msg.contains("expected 3"));
    }

    #[test]
    fn converts_to_ingestflow_error() {
        let err = ParserError::InvalidElement {
            index: 1,
            reason: "trailing comma".to_owned(),
        };
        let top: IngestflowError = err.into();
        match top {
            IngestflowError::Parse(ParseError::Failed { format, reason }) => {
                assert_eq!(format, "json");
                assert!(reason.contains("index 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn too_large_maps_to_core_variant() {
        let top: IngestflowError = ParserError::FileTooLarge { size: 10, max: 5 }.into();
        assert!(matches!(
            top,
            IngestflowError::Parse(ParseError::TooLarge { size: 10, max: 5 })
        ));
    }

    #[test]
    fn io_error_keeps_io_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let top: IngestflowError = ParserError::from(io).into();
        assert!(matches!(top, IngestflowError::Io(_)));
    }
}
