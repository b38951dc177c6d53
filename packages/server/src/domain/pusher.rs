//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ送信を抽象化します。
//! WebSocket の受付は UI 層、sender の管理と送信は Infrastructure 層が担当します。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

use super::{MessagePushError, SessionId};

/// 1 本の接続へ JSON テキストを届けるチャネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register(&self, session_id: SessionId, sender: PusherChannel);

    async fn unregister(&self, session_id: &SessionId);

    /// 一部の送信失敗は許容する
    async fn broadcast(&self, targets: Vec<SessionId>, content: &str)
    -> Result<(), MessagePushError>;
}
