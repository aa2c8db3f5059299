//! 알림 메시지: 구독자에게 전달되는 타입이 있는 상태 업데이트
//!
//! 와이어 형식:
//! ```json
//! {"type": "progress", "timestamp": "2024-01-15T12:00:00Z", "request_id": "job-1", "data": {...}}
//! ```
//! `request_id`가 없으면 모든 구독자에게 가는 브로드캐스트입니다.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use ingestflow_core::types::FileInfo;
use serde::{Deserialize, Serialize};

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Progress,
    Complete,
    Error,
    Status,
    Ping,
}

impl MessageKind {
    /// 소문자 종류 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Status => "status",
            Self::Ping => "ping",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 알림 메시지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// 생성 시각 (RFC 3339)
    pub timestamp: DateTime<Utc>,
    /// 작업 ID. 없으면 브로드캐스트
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// 종류별 페이로드 (`type` + `data`)
    #[serde(flatten)]
    pub payload: Payload,
}

impl NotificationMessage {
    /// 현재 시각으로 메시지를 생성합니다. 빈 작업 ID는 브로드캐스트로 취급합니다.
    pub fn new(request_id: Option<String>, payload: Payload) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: normalize_request_id(request_id),
            payload,
        }
    }

    /// 작업 ID 없는 브로드캐스트 메시지
    pub fn broadcast(payload: Payload) -> Self {
        Self::new(None, payload)
    }

    /// 작업 단위 메시지
    pub fn for_job(request_id: impl Into<String>, payload: Payload) -> Self {
        Self::new(Some(request_id.into()), payload)
    }

    /// keep-alive ping
    pub fn ping() -> Self {
        Self::broadcast(Payload::Ping(PingData::default()))
    }

    /// 메시지 종류
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }
}

/// 빈 문자열 작업 ID를 `None`으로 정규화합니다.
pub(crate) fn normalize_request_id(request_id: Option<String>) -> Option<String> {
    request_id.filter(|id| !id.is_empty())
}

/// 종류별 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Progress(ProgressData),
    Complete(CompleteData),
    Error(ErrorData),
    Status(StatusData),
    Ping(PingData),
}

impl Payload {
    /// 페이로드 종류
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Progress(_) => MessageKind::Progress,
            Self::Complete(_) => MessageKind::Complete,
            Self::Error(_) => MessageKind::Error,
            Self::Status(_) => MessageKind::Status,
            Self::Ping(_) => MessageKind::Ping,
        }
    }
}

/// 진행률
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    pub processed_lines: u64,
    pub total_lines: u64,
    /// 0.0 ~ 100.0
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_line: Option<String>,
    /// 초당 레코드 수
    pub speed: f64,
    /// 남은 예상 시간 (알 수 없으면 생략)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
}

/// 작업 완료
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteData {
    pub total_events: u64,
    pub anomaly_count: u64,
    pub processing_time: String,
    pub file_info: FileInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<serde_json::Value>>,
}

/// 작업 실패
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    /// 기계가 읽을 수 있는 에러 코드 (예: `PARSE_ERROR`)
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorData {
    /// 상세 정보 없는 에러 페이로드
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// 상세 정보를 설정합니다.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// 허브 상태 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusData {
    pub active_connections: usize,
    /// 작업 ID → 작업 종류
    pub processing_jobs: BTreeMap<String, String>,
    pub server_uptime: String,
}

/// ping 페이로드 (`{"ping": "pong"}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingData {
    pub ping: String,
}

impl Default for PingData {
    fn default() -> Self {
        Self {
            ping: "pong".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestflow_core::types::FileType;
    use serde_json::json;

    #[test]
    fn progress_wire_shape() {
        let msg = NotificationMessage::for_job(
            "job-1",
            Payload::Progress(ProgressData {
                processed_lines: 50,
                total_lines: 100,
                percentage: 50.0,
                current_line: None,
                speed: 25.0,
                eta: Some("2.00s".to_owned()),
            }),
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "progress");
        assert_eq!(value["request_id"], "job-1");
        assert_eq!(value["data"]["processed_lines"], 50);
        assert_eq!(value["data"]["eta"], "2.00s");
        assert!(value["data"].get("current_line").is_none());
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn broadcast_omits_request_id() {
        let value = serde_json::to_value(NotificationMessage::ping()).unwrap();
        assert_eq!(value["type"], "ping");
        assert_eq!(value["data"], json!({"ping": "pong"}));
        assert!(value.get("request_id").is_none());
    }

    #[test]
    fn empty_request_id_is_broadcast() {
        let msg = NotificationMessage::for_job("", Payload::Ping(PingData::default()));
        assert!(msg.request_id.is_none());
    }

    #[test]
    fn complete_carries_file_info() {
        let msg = NotificationMessage::for_job(
            "job-2",
            Payload::Complete(CompleteData {
                total_events: 2,
                anomaly_count: 0,
                processing_time: "1.50ms".to_owned(),
                file_info: FileInfo::completed(FileType::Json, 2),
                anomalies: None,
            }),
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["data"]["file_info"]["type"], "json");
        assert!(value["data"].get("anomalies").is_none());
    }

    #[test]
    fn error_message_deserializes() {
        let raw = r#"{"type":"error","timestamp":"2024-01-15T12:00:00Z","request_id":"j","data":{"code":"PARSE_ERROR","message":"bad line"}}"#;
        let msg: NotificationMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.kind(), MessageKind::Error);
        assert_eq!(msg.request_id.as_deref(), Some("j"));
        match msg.payload {
            Payload::Error(data) => {
                assert_eq!(data.code, "PARSE_ERROR");
                assert!(data.details.is_none());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
