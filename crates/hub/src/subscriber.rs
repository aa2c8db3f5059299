//! 구독과 구독자별 송신자
//!
//! [`Subscription`]은 허브에 등록된 구독자 하나의 수신 측입니다.
//! [`SubscriberSender`]는 구독 큐를 비우며 [`Transport`]에 씁니다.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::hub::{HubHandle, SubscriberId};
use crate::message::NotificationMessage;
use crate::transport::Transport;

/// 허브에 등록된 구독
///
/// 허브가 구독자를 해제하거나 축출하면 큐가 닫히고 [`recv`](Self::recv)는 `None`을 반환합니다.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<NotificationMessage>,
    hub: HubHandle,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        rx: mpsc::Receiver<NotificationMessage>,
        hub: HubHandle,
    ) -> Self {
        Self { id, rx, hub }
    }

    /// 구독자 식별자
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// 다음 메시지를 기다립니다. 큐가 닫히면 `None`.
    pub async fn recv(&mut self) -> Option<NotificationMessage> {
        self.rx.recv().await
    }

    /// 기다리지 않고 메시지를 꺼냅니다.
    pub fn try_recv(&mut self) -> Option<NotificationMessage> {
        self.rx.try_recv().ok()
    }

    /// 구독을 해제합니다.
    pub fn unsubscribe(self) {
        self.hub.unregister(self.id);
    }

    /// 전송 계층과 묶어 송신자를 만듭니다.
    pub fn into_sender<T: Transport>(self, transport: T) -> SubscriberSender<T> {
        SubscriberSender {
            id: self.id,
            rx: self.rx,
            hub: self.hub,
            transport,
        }
    }
}

/// 송신자 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// 허브가 큐를 닫음 (해제, 축출, 허브 종료)
    QueueClosed,
    /// 전송 계층 쓰기 실패
    TransportFailed,
    /// 취소 토큰
    Cancelled,
}

/// 송신자 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderOutcome {
    /// 전송 계층에 쓴 메시지 수
    pub delivered: u64,
    /// 종료 사유
    pub reason: CloseReason,
}

/// 구독자별 송신자
///
/// 자기 큐만 비우므로 느린 전송이 다른 구독자를 지연시키지 않습니다.
pub struct SubscriberSender<T> {
    id: SubscriberId,
    rx: mpsc::Receiver<NotificationMessage>,
    hub: HubHandle,
    transport: T,
}

impl<T: Transport> SubscriberSender<T> {
    /// 구독자 식별자
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// 큐가 닫히거나, 전송이 실패하거나, 취소될 때까지 메시지를 씁니다.
    ///
    /// 전송 실패와 취소 시에는 허브에서 구독을 해제합니다.
    pub async fn run(mut self, cancel: CancellationToken) -> SenderOutcome {
        let mut delivered = 0u64;

        let reason = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break CloseReason::Cancelled,
                message = self.rx.recv() => {
                    let Some(message) = message else {
                        break CloseReason::QueueClosed;
                    };
                    match self.transport.send(&message).await {
                        Ok(()) => delivered += 1,
                        Err(e) => {
                            warn!(
                                subscriber = %self.id,
                                kind = %message.kind(),
                                error = %e,
                                "transport write failed"
                            );
                            break CloseReason::TransportFailed;
                        }
                    }
                }
            }
        };

        if reason != CloseReason::QueueClosed {
            self.hub.unregister(self.id);
        }
        if let Err(e) = self.transport.close().await {
            debug!(subscriber = %self.id, error = %e, "transport close failed");
        }

        debug!(subscriber = %self.id, delivered, ?reason, "subscriber sender stopped");
        SenderOutcome { delivered, reason }
    }
}
