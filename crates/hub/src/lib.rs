//! ingestflow 알림 허브 크레이트
//!
//! 작업 진행 상황을 실시간으로 구독자에게 팬아웃합니다.
//!
//! # 모듈 구성
//!
//! - [`message`]: [`NotificationMessage`]와 종류별 페이로드
//! - [`hub`]: 허브 액터 [`Hub`]와 [`HubHandle`]
//! - [`subscriber`]: [`Subscription`]과 구독자별 [`SubscriberSender`]
//! - [`transport`]: [`Transport`] trait과 채널/JSON Lines 구현
//! - [`progress`]: [`ProgressTracker`]
//! - [`error`]: [`HubError`]
//!
//! # 전달 정책
//!
//! - 작업 ID가 있는 메시지는 같은 작업을 구독한 구독자와 필터 없는 구독자에게만 갑니다.
//! - 제출 채널이 가득 차면 메시지를 버리고, 구독자 큐가 가득 차면 그 구독자를 축출합니다.

pub mod error;
pub mod hub;
pub mod message;
pub mod progress;
pub mod subscriber;
pub mod transport;

pub use error::HubError;
pub use hub::{Hub, HubBuilder, HubHandle, HubStats, SubscriberId};
pub use message::{
    CompleteData, ErrorData, MessageKind, NotificationMessage, Payload, PingData, ProgressData,
    StatusData,
};
pub use progress::{ProgressTracker, format_duration};
pub use subscriber::{CloseReason, SenderOutcome, SubscriberSender, Subscription};
pub use transport::{ChannelTransport, JsonLinesTransport, Transport};
