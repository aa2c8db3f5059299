//! 알림 허브 액터
//!
//! [`Hub`]는 구독자 집합과 작업 레지스트리를 소유하는 단일 tokio 태스크입니다.
//! 다른 태스크는 [`HubHandle`]을 통해 채널로만 허브와 통신합니다.
//!
//! # 채널 구성
//! - 제어 채널 (unbounded): 등록, 해제, 작업 등록/종료, 통계 조회
//! - 브로드캐스트 채널 (bounded): 알림 제출. 가득 차면 메시지를 버림
//! - 구독자별 큐 (bounded): 가득 차면 해당 구독자를 축출
//!
//! # 사용 예시
//! ```ignore
//! let (hub, handle) = HubBuilder::new().config(config.hub.clone()).build();
//! let cancel = CancellationToken::new();
//! tokio::spawn(hub.run(cancel.clone()));
//!
//! let mut sub = handle.subscribe(Some("job-1".to_owned()));
//! handle.register_job("job-1", "upload");
//! handle.send_progress("job-1", progress);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ingestflow_core::config::HubConfig;
use ingestflow_core::metrics as m;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::HubError;
use crate::message::{
    CompleteData, ErrorData, NotificationMessage, Payload, ProgressData, StatusData,
    normalize_request_id,
};
use crate::progress::format_duration;
use crate::subscriber::Subscription;

/// 구독자 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    /// 새 무작위 식별자를 생성합니다.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 허브 통계 (액터 왕복으로 조회)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubStats {
    /// 등록된 구독자 수
    pub active_connections: usize,
    /// 추적 중인 작업 (작업 ID → 종류)
    pub processing_jobs: BTreeMap<String, String>,
    /// 가동 시간
    pub uptime: String,
    /// 시작 시각
    pub started_at: DateTime<Utc>,
}

/// 허브 제어 메시지
enum Control {
    Register {
        id: SubscriberId,
        filter: Option<String>,
        tx: mpsc::Sender<NotificationMessage>,
    },
    Unregister(SubscriberId),
    RegisterJob {
        request_id: String,
        kind: String,
    },
    FinishJob(String),
    Stats(oneshot::Sender<HubStats>),
}

/// 브로드캐스트 채널 항목
enum Outbound {
    Message(NotificationMessage),
    /// 팬아웃 시점에 액터가 상태 스냅샷을 만듦
    StatusSnapshot,
}

/// 허브 내부 구독자 레코드
struct SubscriberEntry {
    filter: Option<String>,
    tx: mpsc::Sender<NotificationMessage>,
}

impl SubscriberEntry {
    /// 작업 ID가 없는 메시지와 필터가 없는 구독자는 모두 통과
    fn accepts(&self, message: &NotificationMessage) -> bool {
        match (&message.request_id, &self.filter) {
            (None, _) | (_, None) => true,
            (Some(job), Some(filter)) => job == filter,
        }
    }
}

/// 허브 빌더
#[derive(Debug, Clone, Default)]
pub struct HubBuilder {
    config: HubConfig,
}

impl HubBuilder {
    /// 기본 설정으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 허브 설정을 지정합니다.
    pub fn config(mut self, config: HubConfig) -> Self {
        self.config = config;
        self
    }

    /// 브로드캐스트 채널 용량을 지정합니다.
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.config.broadcast_capacity = capacity;
        self
    }

    /// 구독자 큐 용량을 지정합니다.
    pub fn subscriber_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.subscriber_queue_capacity = capacity;
        self
    }

    /// ping 주기를 지정합니다.
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval_secs = interval.as_secs().max(1);
        self
    }

    /// 허브 액터와 핸들을 생성합니다.
    ///
    /// 용량이 0이면 1로 올립니다.
    pub fn build(self) -> (Hub, HubHandle) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::channel(self.config.broadcast_capacity.max(1));

        let hub = Hub {
            control_rx,
            broadcast_rx,
            subscribers: HashMap::new(),
            jobs: BTreeMap::new(),
            started: Instant::now(),
            started_at: Utc::now(),
            ping_interval: Duration::from_secs(self.config.ping_interval_secs.max(1)),
        };
        let handle = HubHandle {
            control_tx,
            broadcast_tx,
            queue_capacity: self.config.subscriber_queue_capacity.max(1),
        };
        (hub, handle)
    }
}

/// 알림 허브 액터
///
/// [`run`](Self::run)을 별도 태스크로 실행해야 합니다.
pub struct Hub {
    control_rx: mpsc::UnboundedReceiver<Control>,
    broadcast_rx: mpsc::Receiver<Outbound>,
    subscribers: HashMap<SubscriberId, SubscriberEntry>,
    jobs: BTreeMap<String, String>,
    started: Instant,
    started_at: DateTime<Utc>,
    ping_interval: Duration,
}

impl Hub {
    /// 조정 루프를 실행합니다.
    ///
    /// 취소되거나 모든 핸들이 사라지면 제출된 알림을 마저 전달하고
    /// 모든 구독자 큐를 닫은 뒤 반환합니다.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            ping_interval = ?self.ping_interval,
            started_at = %self.started_at,
            "notification hub started"
        );

        let mut ping = tokio::time::interval_at(Instant::now() + self.ping_interval, self.ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("hub cancelled");
                    break;
                }
                control = self.control_rx.recv() => match control {
                    Some(control) => self.handle_control(control),
                    None => {
                        debug!("all hub handles dropped");
                        break;
                    }
                },
                Some(outbound) = self.broadcast_rx.recv() => self.fan_out(outbound),
                _ = ping.tick() => self.ping_all(),
            }
        }

        // 이미 제출된 알림은 전달한 뒤 큐를 닫음
        while let Ok(outbound) = self.broadcast_rx.try_recv() {
            self.fan_out(outbound);
        }

        let closed = self.subscribers.len();
        self.subscribers.clear();
        metrics::gauge!(m::HUB_SUBSCRIBERS).set(0.0);
        info!(closed_subscribers = closed, "notification hub stopped");
    }

    fn handle_control(&mut self, control: Control) {
        match control {
            Control::Register { id, filter, tx } => self.register(id, filter, tx),
            Control::Unregister(id) => self.unregister(id),
            Control::RegisterJob { request_id, kind } => {
                debug!(request_id = %request_id, kind = %kind, "job registered");
                self.jobs.insert(request_id, kind);
                metrics::gauge!(m::HUB_TRACKED_JOBS).set(self.jobs.len() as f64);
            }
            Control::FinishJob(request_id) => {
                if self.jobs.remove(&request_id).is_some() {
                    debug!(request_id = %request_id, "job finished");
                }
                metrics::gauge!(m::HUB_TRACKED_JOBS).set(self.jobs.len() as f64);
            }
            Control::Stats(reply) => {
                let _ = reply.send(self.stats());
            }
        }
    }

    fn register(
        &mut self,
        id: SubscriberId,
        filter: Option<String>,
        tx: mpsc::Sender<NotificationMessage>,
    ) {
        self.subscribers.insert(
            id,
            SubscriberEntry {
                filter: filter.clone(),
                tx: tx.clone(),
            },
        );
        metrics::gauge!(m::HUB_SUBSCRIBERS).set(self.subscribers.len() as f64);
        info!(
            subscriber = %id,
            filter = filter.as_deref().unwrap_or("*"),
            total = self.subscribers.len(),
            "subscriber registered"
        );

        // 환영 메시지: 큐가 가득 차면 메시지만 버리고 구독자는 유지
        let welcome = NotificationMessage::broadcast(Payload::Status(self.status_data()));
        match tx.try_send(welcome) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(subscriber = %id, "queue full, welcome status dropped");
            }
            Err(TrySendError::Closed(_)) => self.unregister(id),
        }
    }

    fn unregister(&mut self, id: SubscriberId) {
        // 송신자를 버리면 큐가 닫히고 송신 태스크가 종료됨
        if self.subscribers.remove(&id).is_some() {
            metrics::gauge!(m::HUB_SUBSCRIBERS).set(self.subscribers.len() as f64);
            info!(
                subscriber = %id,
                total = self.subscribers.len(),
                "subscriber unregistered"
            );
        }
    }

    fn fan_out(&mut self, outbound: Outbound) {
        let message = match outbound {
            Outbound::Message(message) => message,
            Outbound::StatusSnapshot => {
                NotificationMessage::broadcast(Payload::Status(self.status_data()))
            }
        };
        metrics::counter!(m::HUB_MESSAGES_BROADCAST_TOTAL, m::LABEL_MESSAGE_TYPE => message.kind().as_str())
            .increment(1);

        let mut evicted = Vec::new();
        for (id, entry) in &self.subscribers {
            if !entry.accepts(&message) {
                continue;
            }
            if entry.tx.try_send(message.clone()).is_err() {
                evicted.push(*id);
            }
        }
        self.evict(evicted, "broadcast");
    }

    fn ping_all(&mut self) {
        let message = NotificationMessage::ping();
        let mut evicted = Vec::new();
        for (id, entry) in &self.subscribers {
            if entry.tx.try_send(message.clone()).is_err() {
                evicted.push(*id);
            }
        }
        self.evict(evicted, "ping");
    }

    fn evict(&mut self, ids: Vec<SubscriberId>, during: &'static str) {
        for id in ids {
            if let Some(entry) = self.subscribers.remove(&id) {
                let reason = if entry.tx.is_closed() {
                    "receiver closed"
                } else {
                    "queue full"
                };
                warn!(subscriber = %id, during, reason, "subscriber evicted");
                metrics::counter!(m::HUB_SUBSCRIBERS_EVICTED_TOTAL).increment(1);
            }
        }
        metrics::gauge!(m::HUB_SUBSCRIBERS).set(self.subscribers.len() as f64);
    }

    fn uptime(&self) -> String {
        format_duration(self.started.elapsed())
    }

    fn status_data(&self) -> StatusData {
        StatusData {
            active_connections: self.subscribers.len(),
            processing_jobs: self.jobs.clone(),
            server_uptime: self.uptime(),
        }
    }

    fn stats(&self) -> HubStats {
        HubStats {
            active_connections: self.subscribers.len(),
            processing_jobs: self.jobs.clone(),
            uptime: self.uptime(),
            started_at: self.started_at,
        }
    }
}

/// 허브 핸들: 복제해서 여러 태스크에서 사용할 수 있습니다.
///
/// 알림 전송 메서드는 블로킹하지 않으며 에러를 반환하지 않습니다.
#[derive(Debug, Clone)]
pub struct HubHandle {
    control_tx: mpsc::UnboundedSender<Control>,
    broadcast_tx: mpsc::Sender<Outbound>,
    queue_capacity: usize,
}

impl HubHandle {
    /// 새 구독자를 등록합니다.
    ///
    /// `filter`가 있으면 해당 작업의 메시지와 브로드캐스트만 받습니다.
    /// 허브가 종료된 경우 반환된 구독의 큐는 즉시 닫힌 상태입니다.
    pub fn subscribe(&self, filter: Option<String>) -> Subscription {
        let id = SubscriberId::new();
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let filter = normalize_request_id(filter);
        if self
            .control_tx
            .send(Control::Register { id, filter, tx })
            .is_err()
        {
            debug!(subscriber = %id, "hub closed, subscription is inert");
        }
        Subscription::new(id, rx, self.clone())
    }

    /// 구독자를 해제합니다. 여러 번 호출해도 안전합니다.
    pub fn unregister(&self, id: SubscriberId) {
        let _ = self.control_tx.send(Control::Unregister(id));
    }

    /// 작업을 레지스트리에 등록합니다.
    pub fn register_job(&self, request_id: impl Into<String>, kind: impl Into<String>) {
        let Some(request_id) = normalize_request_id(Some(request_id.into())) else {
            return;
        };
        let _ = self.control_tx.send(Control::RegisterJob {
            request_id,
            kind: kind.into(),
        });
    }

    /// 진행률을 보냅니다.
    pub fn send_progress(&self, request_id: impl Into<String>, data: ProgressData) {
        self.broadcast(NotificationMessage::for_job(request_id, Payload::Progress(data)));
    }

    /// 완료를 보내고 작업을 레지스트리에서 제거합니다.
    pub fn send_complete(&self, request_id: impl Into<String>, data: CompleteData) {
        let request_id = request_id.into();
        self.broadcast(NotificationMessage::for_job(
            request_id.clone(),
            Payload::Complete(data),
        ));
        self.finish_job(request_id);
    }

    /// 에러를 보내고 작업을 레지스트리에서 제거합니다.
    pub fn send_error(&self, request_id: impl Into<String>, data: ErrorData) {
        let request_id = request_id.into();
        self.broadcast(NotificationMessage::for_job(
            request_id.clone(),
            Payload::Error(data),
        ));
        self.finish_job(request_id);
    }

    /// 현재 상태 스냅샷을 모든 구독자에게 보냅니다.
    pub fn send_status(&self) {
        self.submit(Outbound::StatusSnapshot, "status");
    }

    /// 메시지를 제출합니다. 제출 채널이 가득 차면 버립니다.
    pub fn broadcast(&self, message: NotificationMessage) {
        let kind = message.kind().as_str();
        self.submit(Outbound::Message(message), kind);
    }

    /// 허브 통계를 조회합니다.
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (tx, rx) = oneshot::channel();
        self.control_tx
            .send(Control::Stats(tx))
            .map_err(|_| HubError::Closed)?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// 허브가 종료되었는지 확인합니다.
    pub fn is_closed(&self) -> bool {
        self.control_tx.is_closed()
    }

    fn finish_job(&self, request_id: String) {
        if let Some(request_id) = normalize_request_id(Some(request_id)) {
            let _ = self.control_tx.send(Control::FinishJob(request_id));
        }
    }

    fn submit(&self, outbound: Outbound, kind: &'static str) {
        match self.broadcast_tx.try_send(outbound) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(kind, "broadcast channel is full, dropping message");
                metrics::counter!(m::HUB_MESSAGES_DROPPED_TOTAL).increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                debug!(kind, "hub closed, dropping message");
            }
        }
    }
}
