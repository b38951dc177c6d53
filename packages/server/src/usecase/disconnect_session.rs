//! UseCase: WebSocket 接続の切断
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute()
//!
//! ### どのような状況を想定しているか
//! - 正常系：入室中の部屋から退室し、MessagePusher から登録解除される
//! - エッジケース：どの部屋にも入室していない接続の切断

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomRepository, SessionId};

/// 接続切断のユースケース
pub struct DisconnectSessionUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を全ての部屋から退室させて登録解除する
    ///
    /// # Returns
    ///
    /// 退室した部屋の ID
    pub async fn execute(&self, session_id: &SessionId) -> Vec<String> {
        let left = self.repository.leave_all(session_id).await;
        self.message_pusher.unregister(session_id).await;
        tracing::info!(
            "Session '{}' disconnected (left {} room(s))",
            session_id,
            left.len()
        );
        left
    }
}
