//! ingestflow.toml 통합 설정 테스트
//!
//! - ingestflow.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 파일 로딩 / 잘못된 형식 에러 테스트

use std::io::Write;

use ingestflow_core::config::IngestflowConfig;
use ingestflow_core::error::{ConfigError, IngestflowError};

const EXAMPLE: &str = include_str!("../../../ingestflow.toml.example");

/// 환경변수를 설정한 상태로 클로저를 실행하고 원래 값을 복원합니다.
fn with_env<T>(key: &str, value: &str, f: impl FnOnce() -> T) -> T {
    let original = std::env::var(key).ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var(key, value);
    }

    let result = f();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var(key, val),
            None => std::env::remove_var(key),
        }
    }
    result
}

// =============================================================================
// ingestflow.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = IngestflowConfig::parse(EXAMPLE).expect("example config should parse");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
}

#[test]
fn example_config_passes_validation() {
    let config = IngestflowConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let example = IngestflowConfig::parse(EXAMPLE).expect("should parse");
    let defaults = IngestflowConfig::default();

    assert_eq!(
        example.parser.detect_prefix_bytes,
        defaults.parser.detect_prefix_bytes
    );
    assert_eq!(
        example.parser.event_channel_capacity,
        defaults.parser.event_channel_capacity
    );
    assert_eq!(
        example.parser.max_line_length,
        defaults.parser.max_line_length
    );
    assert_eq!(example.parser.max_file_size, defaults.parser.max_file_size);
    assert_eq!(
        example.parser.allowed_extensions,
        defaults.parser.allowed_extensions
    );
    assert_eq!(
        example.hub.broadcast_capacity,
        defaults.hub.broadcast_capacity
    );
    assert_eq!(
        example.hub.subscriber_queue_capacity,
        defaults.hub.subscriber_queue_capacity
    );
    assert_eq!(
        example.hub.ping_interval_secs,
        defaults.hub.ping_interval_secs
    );
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_hub_only() {
    let toml = r#"
[hub]
broadcast_capacity = 16
"#;
    let config = IngestflowConfig::parse(toml).expect("should parse");
    assert_eq!(config.hub.broadcast_capacity, 16);
    assert_eq!(config.hub.subscriber_queue_capacity, 256);
    assert_eq!(config.parser.detect_prefix_bytes, 1024);
    config.validate().expect("should validate");
}

#[test]
fn partial_config_parser_only() {
    let toml = r#"
[parser]
allowed_extensions = [".csv"]
max_line_length = 4096
"#;
    let config = IngestflowConfig::parse(toml).expect("should parse");
    assert_eq!(config.parser.allowed_extensions, vec![".csv"]);
    assert_eq!(config.parser.max_line_length, 4096);
    assert_eq!(config.parser.event_channel_capacity, 1024);
}

#[test]
fn wrong_value_type_is_parse_error() {
    let toml = r#"
[hub]
ping_interval_secs = "thirty"
"#;
    let err = IngestflowConfig::parse(toml).unwrap_err();
    assert!(matches!(
        err,
        IngestflowError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;
    let result = with_env("INGESTFLOW_GENERAL_LOG_LEVEL", "error", || {
        let mut config = IngestflowConfig::parse(toml).expect("should parse");
        config.apply_env_overrides();
        config.general.log_level
    });
    assert_eq!(result, "error");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let result = with_env("INGESTFLOW_HUB_PING_INTERVAL_SECS", "5", || {
        let mut config = IngestflowConfig::parse("").expect("should parse");
        config.apply_env_overrides();
        config.hub.ping_interval_secs
    });
    assert_eq!(result, 5);
}

#[test]
#[serial_test::serial]
fn env_override_csv_for_extensions() {
    let result = with_env("INGESTFLOW_PARSER_ALLOWED_EXTENSIONS", ".csv, .log", || {
        let mut config = IngestflowConfig::parse("").expect("should parse");
        config.apply_env_overrides();
        config.parser.allowed_extensions
    });
    assert_eq!(result, vec![".csv", ".log"]);
}

#[test]
#[serial_test::serial]
fn env_override_invalid_number_is_ignored() {
    let result = with_env("INGESTFLOW_HUB_BROADCAST_CAPACITY", "lots", || {
        let mut config = IngestflowConfig::parse("").expect("should parse");
        config.apply_env_overrides();
        config.hub.broadcast_capacity
    });
    assert_eq!(result, 256);
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
#[serial_test::serial]
async fn load_reads_file_and_validates() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[hub]\nping_interval_secs = 7").expect("write");

    let config = IngestflowConfig::load(file.path())
        .await
        .expect("should load");
    assert_eq!(config.hub.ping_interval_secs, 7);
}

#[tokio::test]
async fn from_file_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[general]\nlog_format = \"xml\"").expect("write");

    let err = IngestflowConfig::from_file(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        IngestflowError::Config(ConfigError::InvalidValue { .. })
    ));
}
