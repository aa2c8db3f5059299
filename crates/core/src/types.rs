//! 도메인 타입: 파서와 허브가 공유하는 데이터 구조
//!
//! 파서는 입력 바이트를 [`ParseEvent`] 시퀀스로 바꾸고, 파싱이 끝나면
//! [`FileInfo`] 요약을 만듭니다. 허브의 완료 알림도 같은 `FileInfo`를 싣습니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 입력 스트림 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// 최상위 JSON 배열
    Json,
    /// 줄 단위 JSON (JSON Lines)
    Ndjson,
    /// 헤더 행이 있는 CSV
    Csv,
    /// 비정형 로그 텍스트
    Log,
    /// 사용자 정의 형식
    Custom,
    /// 분류 불가
    Unknown,
}

impl FileType {
    /// 소문자 형식 이름 (`"json"`, `"ndjson"` 등)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Csv => "csv",
            Self::Log => "log",
            Self::Custom => "custom",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            "csv" => Ok(Self::Csv),
            "log" | "txt" => Ok(Self::Log),
            "custom" => Ok(Self::Custom),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "unknown file type '{}' (expected: json, ndjson, csv, log)",
                other
            )),
        }
    }
}

/// 입력에서 디코딩된 레코드 하나
///
/// `index`는 한 번의 파싱 실행 안에서 0부터 빈틈없이 증가합니다.
/// 빈 줄이나 건너뛴 입력은 인덱스를 소비하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseEvent {
    /// 0부터 시작하는 순번
    pub index: u64,
    /// 디코딩된 페이로드
    pub data: serde_json::Value,
    /// 원본 텍스트 (줄 기반 형식만)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// 레코드별 부가 정보
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ParseEvent {
    /// 페이로드만 가진 이벤트를 생성합니다.
    pub fn new(index: u64, data: serde_json::Value) -> Self {
        Self {
            index,
            data,
            raw: None,
            metadata: None,
        }
    }
}

/// 파싱 완료 후 생성되는 요약 정보
///
/// 입력 전체를 에러 없이 소비한 경우에만 만들어집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// 감지된 파일 형식
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// 파서가 소비한 바이트 수
    pub size: u64,
    /// 방출된 레코드 수
    pub line_count: u64,
    /// CSV 헤더
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    /// 인코딩 레이블
    pub encoding: String,
    /// 파싱 완료 시각
    pub processed_at: DateTime<Utc>,
    /// 형식별 메타데이터 (예: 로그 패턴 이름)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl FileInfo {
    /// 현재 시각으로 완료된 요약을 생성합니다.
    pub fn completed(file_type: FileType, line_count: u64) -> Self {
        Self {
            file_type,
            size: 0,
            line_count,
            headers: None,
            encoding: "utf-8".to_owned(),
            processed_at: Utc::now(),
            metadata: None,
        }
    }

    /// 헤더를 설정합니다.
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// 형식별 메타데이터를 설정합니다.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
