//! 허브 에러 타입
//!
//! [`HubError`]는 허브 조회와 전송 계층에서 발생하는 에러를 표현합니다.
//! 알림 생산자(`send_*`)는 에러를 받지 않습니다. 제출 채널이 가득 차면 로그를 남기고 버립니다.

use ingestflow_core::error::{IngestflowError, NotifyError};

/// 알림 허브 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// 허브 액터가 종료됨
    #[error("hub is not running")]
    Closed,

    /// 전송 계층 쓰기 실패
    #[error("transport error: {0}")]
    Transport(String),

    /// 메시지 직렬화 실패
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HubError> for IngestflowError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::Closed => IngestflowError::Notify(NotifyError::Closed(err.to_string())),
            HubError::Io(e) => IngestflowError::Io(e),
            other => IngestflowError::Notify(NotifyError::Delivery(other.to_string())),
        }
    }
}
