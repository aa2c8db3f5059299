//! 전송 계층: 구독자 한 명에게 메시지를 실제로 쓰는 경계
//!
//! [`Transport`]는 연결 하나를 추상화합니다. 웹소켓, SSE 등 외부 전송은
//! 이 trait을 구현하여 [`SubscriberSender`](crate::SubscriberSender)에 연결합니다.

use std::future::Future;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::error::HubError;
use crate::message::NotificationMessage;

/// 구독자 연결 하나에 대한 쓰기 trait
///
/// `send`가 에러를 반환하면 송신자는 구독을 해제하고 종료합니다.
pub trait Transport: Send {
    /// 메시지 하나를 씁니다.
    fn send(
        &mut self,
        message: &NotificationMessage,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// 연결을 정리합니다. 송신자 종료 시 한 번 호출됩니다.
    fn close(&mut self) -> impl Future<Output = Result<(), HubError>> + Send {
        async { Ok(()) }
    }
}

/// 프로세스 내부 채널 전송
///
/// 메시지를 다른 태스크로 넘깁니다. 수신자가 사라지면 전송 에러가 됩니다.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<NotificationMessage>,
}

impl ChannelTransport {
    /// 채널 전송과 수신자를 생성합니다.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    async fn send(&mut self, message: &NotificationMessage) -> Result<(), HubError> {
        self.tx
            .send(message.clone())
            .await
            .map_err(|_| HubError::Transport("channel receiver dropped".to_owned()))
    }
}

/// JSON Lines 전송: 메시지마다 한 줄의 JSON을 씁니다.
#[derive(Debug)]
pub struct JsonLinesTransport<W> {
    writer: W,
    buf: Vec<u8>,
}

impl<W> JsonLinesTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// 쓰기 대상으로 전송을 생성합니다.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: Vec::with_capacity(512),
        }
    }

    /// 내부 writer를 돌려받습니다.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> Transport for JsonLinesTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, message: &NotificationMessage) -> Result<(), HubError> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, message)?;
        self.buf.push(b'\n');
        self.writer.write_all(&self.buf).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), HubError> {
        self.writer.flush().await?;
        Ok(())
    }
}
