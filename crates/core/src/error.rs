//! 에러 타입: 도메인별 에러 정의
//!
//! 각 크레이트는 자체 도메인 에러(`ParserError`, `HubError`)를 정의하고
//! `From` 변환으로 [`IngestflowError`]에 합류합니다.

/// ingestflow 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum IngestflowError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 알림 허브 에러
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 지원하지 않는 형식
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// 파싱 실패
    #[error("{format} parse failed: {reason}")]
    Failed { format: String, reason: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },
}

/// 알림 허브 에러
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// 허브가 이미 종료됨
    #[error("hub closed: {0}")]
    Closed(String),

    /// 구독자 전송 실패
    #[error("delivery failed: {0}")]
    Delivery(String),
}
