//! UseCase: 退室（CLOSE フレーム）

use std::sync::Arc;

use crate::domain::{RoomRepository, SessionId};

/// 退室のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 接続を部屋から退室させる。入室していなかった場合や部屋がない場合は `false`
    pub async fn execute(&self, session_id: &SessionId, room_id: &str) -> bool {
        match self.repository.leave(room_id, session_id).await {
            Ok(left) => {
                if left {
                    tracing::info!("Session '{}' left room {}", session_id, room_id);
                }
                left
            }
            Err(e) => {
                tracing::debug!("CLOSE for unknown room: {}", e);
                false
            }
        }
    }
}
