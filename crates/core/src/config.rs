//! 설정 관리: ingestflow.toml 파싱 및 런타임 설정
//!
//! [`IngestflowConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`INGESTFLOW_HUB_PING_INTERVAL_SECS=10` 형식)
//! 3. 설정 파일 (`ingestflow.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ingestflow_core::error::IngestflowError> {
//! use ingestflow_core::config::IngestflowConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = IngestflowConfig::load("ingestflow.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = IngestflowConfig::parse("[hub]\nping_interval_secs = 10")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, IngestflowError};

/// ingestflow 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestflowConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 파서 설정
    #[serde(default)]
    pub parser: ParserConfig,
    /// 알림 허브 설정
    #[serde(default)]
    pub hub: HubConfig,
}

impl IngestflowConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IngestflowError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IngestflowError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IngestflowError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IngestflowError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IngestflowError> {
        toml::from_str(toml_str).map_err(|e| {
            IngestflowError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `INGESTFLOW_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "INGESTFLOW_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "INGESTFLOW_GENERAL_LOG_FORMAT");

        // Parser
        override_usize(
            &mut self.parser.detect_prefix_bytes,
            "INGESTFLOW_PARSER_DETECT_PREFIX_BYTES",
        );
        override_usize(
            &mut self.parser.event_channel_capacity,
            "INGESTFLOW_PARSER_EVENT_CHANNEL_CAPACITY",
        );
        override_usize(
            &mut self.parser.max_line_length,
            "INGESTFLOW_PARSER_MAX_LINE_LENGTH",
        );
        override_u64(
            &mut self.parser.max_file_size,
            "INGESTFLOW_PARSER_MAX_FILE_SIZE",
        );
        override_csv(
            &mut self.parser.allowed_extensions,
            "INGESTFLOW_PARSER_ALLOWED_EXTENSIONS",
        );

        // Hub
        override_usize(
            &mut self.hub.broadcast_capacity,
            "INGESTFLOW_HUB_BROADCAST_CAPACITY",
        );
        override_usize(
            &mut self.hub.subscriber_queue_capacity,
            "INGESTFLOW_HUB_SUBSCRIBER_QUEUE_CAPACITY",
        );
        override_u64(
            &mut self.hub.ping_interval_secs,
            "INGESTFLOW_HUB_PING_INTERVAL_SECS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IngestflowError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.parser.validate()?;
        self.hub.validate()?;
        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 파서 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 내용 기반 형식 감지에 사용할 앞부분 크기 (바이트)
    pub detect_prefix_bytes: usize,
    /// 이벤트 채널 용량
    pub event_channel_capacity: usize,
    /// 줄 기반 형식의 최대 줄 길이 (바이트)
    pub max_line_length: usize,
    /// 업로드 허용 최대 크기 (바이트)
    pub max_file_size: u64,
    /// 업로드 허용 확장자 (점 포함, 소문자)
    pub allowed_extensions: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            detect_prefix_bytes: 1024,
            event_channel_capacity: 1024,
            max_line_length: 1024 * 1024,     // 1MB
            max_file_size: 100 * 1024 * 1024, // 100MB
            allowed_extensions: [".json", ".ndjson", ".jsonl", ".csv", ".log", ".txt"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

impl ParserConfig {
    /// 파서 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_PREFIX_BYTES: usize = 64 * 1024;
        const MAX_CHANNEL_CAPACITY: usize = 1_000_000;

        if self.detect_prefix_bytes == 0 || self.detect_prefix_bytes > MAX_PREFIX_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "parser.detect_prefix_bytes".to_owned(),
                reason: format!("must be 1-{}", MAX_PREFIX_BYTES),
            });
        }

        if self.event_channel_capacity == 0 || self.event_channel_capacity > MAX_CHANNEL_CAPACITY
        {
            return Err(ConfigError::InvalidValue {
                field: "parser.event_channel_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CHANNEL_CAPACITY),
            });
        }

        if self.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "parser.max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "parser.max_file_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if let Some(ext) = self
            .allowed_extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(ConfigError::InvalidValue {
                field: "parser.allowed_extensions".to_owned(),
                reason: format!("extension '{}' must start with '.'", ext),
            });
        }

        Ok(())
    }
}

/// 알림 허브 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// 브로드캐스트 제출 채널 용량
    pub broadcast_capacity: usize,
    /// 구독자별 송신 큐 용량
    pub subscriber_queue_capacity: usize,
    /// keep-alive ping 주기 (초)
    pub ping_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 256,
            subscriber_queue_capacity: 256,
            ping_interval_secs: 30,
        }
    }
}

impl HubConfig {
    /// 허브 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_CAPACITY: usize = 100_000;
        const MAX_PING_INTERVAL_SECS: u64 = 3600;

        if self.broadcast_capacity == 0 || self.broadcast_capacity > MAX_CAPACITY {
            return Err(ConfigError::InvalidValue {
                field: "hub.broadcast_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CAPACITY),
            });
        }

        if self.subscriber_queue_capacity == 0 || self.subscriber_queue_capacity > MAX_CAPACITY {
            return Err(ConfigError::InvalidValue {
                field: "hub.subscriber_queue_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CAPACITY),
            });
        }

        if self.ping_interval_secs == 0 || self.ping_interval_secs > MAX_PING_INTERVAL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "hub.ping_interval_secs".to_owned(),
                reason: format!("must be 1-{}", MAX_PING_INTERVAL_SECS),
            });
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
