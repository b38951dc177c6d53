//! UseCase: WebSocket 接続の受付
//!
//! 接続ごとに SessionId を採番し、MessagePusher に登録します。
//! 部屋への入室は ENTER フレームを受け取ってから（[`super::EnterRoomUseCase`]）。

use std::sync::Arc;

use crate::domain::{MessagePusher, PusherChannel, SessionId};

/// 接続受付のユースケース
pub struct ConnectSessionUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectSessionUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録し、採番した SessionId を返す
    pub async fn execute(&self, sender: PusherChannel) -> SessionId {
        let session_id = SessionId::generate();
        self.message_pusher.register(session_id, sender).await;
        tracing::info!("Session '{}' connected", session_id);
        session_id
    }
}
