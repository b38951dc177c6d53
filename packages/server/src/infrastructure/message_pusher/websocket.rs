//! WebSocket を使った MessagePusher 実装
//!
//! WebSocket の受付は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は UI 層が生成した `UnboundedSender` を接続ごとに保持し、送信に使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, SessionId};

/// 接続中のセッションと WebSocket sender のマップ
#[derive(Debug, Default)]
pub struct WebSocketMessagePusher {
    sessions: Mutex<HashMap<SessionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register(&self, session_id: SessionId, sender: PusherChannel) {
        self.sessions.lock().await.insert(session_id, sender);
        tracing::debug!("Session '{}' registered to MessagePusher", session_id);
    }

    async fn unregister(&self, session_id: &SessionId) {
        self.sessions.lock().await.remove(session_id);
        tracing::debug!("Session '{}' unregistered from MessagePusher", session_id);
    }

    async fn broadcast(
        &self,
        targets: Vec<SessionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let sessions = self.sessions.lock().await;

        for target in targets {
            match sessions.get(&target) {
                Some(sender) => {
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("Failed to push message to session '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("Session '{}' not found during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - broadcast: 複数セッションへの送信（未登録・切断済みは読み飛ばす）
    // - unregister: 登録解除で sender が破棄されること
    // ========================================

    #[tokio::test]
    async fn test_broadcast_skips_missing_and_closed_sessions() {
        // テスト項目: broadcast は未登録・切断済みのセッションを読み飛ばし、他には届ける
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let alive = SessionId::generate();
        let closed = SessionId::generate();
        let missing = SessionId::generate();
        let (alive_tx, mut alive_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        drop(closed_rx);
        pusher.register(alive, alive_tx).await;
        pusher.register(closed, closed_tx).await;

        // when (操作):
        let result = pusher.broadcast(vec![closed, missing, alive], "cheers").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(alive_rx.recv().await, Some("cheers".to_string()));
    }

    #[tokio::test]
    async fn test_unregistered_session_receives_nothing() {
        // テスト項目: unregister 後のセッションには届かず、受信側のチャネルが閉じる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let session = SessionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(session, tx).await;

        // when (操作):
        pusher.unregister(&session).await;
        let result = pusher.broadcast(vec![session], "late").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, None);
    }
}
