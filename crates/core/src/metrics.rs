//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! 레코더 설치는 호스트 프로세스의 책임입니다. 레코더가 없으면 기록은 무시됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ingestflow_`
//! - 모듈명: `parser_`, `hub_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(ingestflow_core::metrics::PARSER_EVENTS_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 파일 형식 레이블 키 (json, ndjson, csv, log)
pub const LABEL_FORMAT: &str = "format";

/// 알림 종류 레이블 키 (progress, complete, error, status, ping)
pub const LABEL_MESSAGE_TYPE: &str = "type";

// ─── Parser 메트릭 ──────────────────────────────────────────────────

/// Parser: 파싱을 끝낸 파일 수 (counter, label: format)
pub const PARSER_FILES_TOTAL: &str = "ingestflow_parser_files_total";

/// Parser: 방출된 이벤트 수 (counter, label: format)
pub const PARSER_EVENTS_TOTAL: &str = "ingestflow_parser_events_total";

/// Parser: 소비한 바이트 수 (counter, label: format)
pub const PARSER_BYTES_TOTAL: &str = "ingestflow_parser_bytes_total";

/// Parser: 파싱 실패 수 (counter, label: format)
pub const PARSER_ERRORS_TOTAL: &str = "ingestflow_parser_errors_total";

/// Parser: 파일 하나의 파싱 소요 시간 (histogram, 초, label: format)
pub const PARSER_DURATION_SECONDS: &str = "ingestflow_parser_duration_seconds";

// ─── Hub 메트릭 ─────────────────────────────────────────────────────

/// Hub: 현재 등록된 구독자 수 (gauge)
pub const HUB_SUBSCRIBERS: &str = "ingestflow_hub_subscribers";

/// Hub: 추적 중인 작업 수 (gauge)
pub const HUB_TRACKED_JOBS: &str = "ingestflow_hub_tracked_jobs";

/// Hub: 팬아웃된 메시지 수 (counter, label: type)
pub const HUB_MESSAGES_BROADCAST_TOTAL: &str = "ingestflow_hub_messages_broadcast_total";

/// Hub: 제출 채널이 가득 차서 버려진 메시지 수 (counter)
pub const HUB_MESSAGES_DROPPED_TOTAL: &str = "ingestflow_hub_messages_dropped_total";

/// Hub: 큐 포화로 축출된 구독자 수 (counter)
pub const HUB_SUBSCRIBERS_EVICTED_TOTAL: &str = "ingestflow_hub_subscribers_evicted_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Parser
    describe_counter!(
        PARSER_FILES_TOTAL,
        "Total number of files parsed successfully"
    );
    describe_counter!(
        PARSER_EVENTS_TOTAL,
        "Total number of parse events emitted"
    );
    describe_counter!(PARSER_BYTES_TOTAL, "Total bytes consumed by parsers");
    describe_counter!(
        PARSER_ERRORS_TOTAL,
        "Total number of aborted parses"
    );
    describe_histogram!(
        PARSER_DURATION_SECONDS,
        "Time to parse a single file in seconds"
    );

    // Hub
    describe_gauge!(
        HUB_SUBSCRIBERS,
        "Number of subscribers currently registered with the hub"
    );
    describe_gauge!(
        HUB_TRACKED_JOBS,
        "Number of jobs currently tracked by the hub"
    );
    describe_counter!(
        HUB_MESSAGES_BROADCAST_TOTAL,
        "Total number of notifications fanned out by type"
    );
    describe_counter!(
        HUB_MESSAGES_DROPPED_TOTAL,
        "Total number of notifications dropped because the broadcast channel was full"
    );
    describe_counter!(
        HUB_SUBSCRIBERS_EVICTED_TOTAL,
        "Total number of subscribers evicted because their queue was full"
    );
}
