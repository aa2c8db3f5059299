//! ingestflow 공통 크레이트
//!
//! 파서 크레이트와 허브 크레이트가 함께 사용하는 타입, 에러, 설정,
//! 메트릭 이름을 정의합니다.
//!
//! # 모듈 구성
//!
//! - [`types`]: [`FileType`], [`ParseEvent`], [`FileInfo`]
//! - [`error`]: 최상위 에러 [`IngestflowError`]와 도메인별 에러
//! - [`config`]: `ingestflow.toml` 파싱 및 환경변수 오버라이드
//! - [`metrics`]: 메트릭 이름 상수 및 설명 등록

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, IngestflowError, NotifyError, ParseError};

// 설정
pub use config::{GeneralConfig, HubConfig, IngestflowConfig, ParserConfig};

// 도메인 타입
pub use types::{FileInfo, FileType, ParseEvent};
