//! UseCase: 入室（ENTER フレーム）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EnterRoomUseCase::execute()
//!
//! ### なぜこのテストが必要か
//! - クライアントの事前チェックと入室の間に他の会員が入室しうるため、
//!   サーバー側でも定員を守る必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：空きのある部屋への入室
//! - 異常系：満員の部屋、存在しない部屋

use std::sync::Arc;

use barcart_shared::{protocol::MemberId, time::Clock};

use crate::domain::{RepositoryError, RoomMember, RoomRepository, SessionId};

use super::error::EnterRoomError;

/// 入室のユースケース
pub struct EnterRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl EnterRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        room_id: &str,
        member_id: MemberId,
    ) -> Result<(), EnterRoomError> {
        let member = RoomMember {
            session_id,
            member_id,
            entered_at: self.clock.now_millis(),
        };
        self.repository
            .enter(room_id, member)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomFull(id) => EnterRoomError::RoomFull(id),
                RepositoryError::RoomNotFound(id) | RepositoryError::RoomOccupied(id) => {
                    EnterRoomError::RoomNotFound(id)
                }
            })?;
        tracing::info!("Member {} entered room {}", member_id, room_id);
        Ok(())
    }
}
