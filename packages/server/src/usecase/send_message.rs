//! UseCase: メッセージ送信（TALK フレーム）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - id・regDate の付与、履歴への追加、部屋全員へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - クライアントはサーバーの id で重複排除するため、id は必ず付与されなければならない
//! - 送信者自身もブロードキャストを受け取る（クライアントはローカルエコーしない）
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者を含む全員へのブロードキャスト
//! - 異常系：入室していない部屋への送信、空メッセージ
//! - エッジケース：regDate のないフレーム

use std::sync::Arc;

use barcart_shared::{
    protocol::{ChatFrame, FrameType},
    time::Clock,
};

use crate::domain::{MessagePusher, RepositoryError, RoomRepository, SessionId};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatFrame)` - id と regDate を付与して保存・配信したフレーム
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        session_id: &SessionId,
        mut frame: ChatFrame,
    ) -> Result<ChatFrame, SendMessageError> {
        if frame.msg.as_deref().is_none_or(|msg| msg.trim().is_empty()) {
            return Err(SendMessageError::EmptyMessage);
        }

        // 1. ENTER 済みの接続からの送信か確認
        let room = self
            .repository
            .get_room(&frame.room_id)
            .await
            .map_err(|_| SendMessageError::RoomNotFound(frame.room_id.clone()))?;
        if !room.has_session(session_id) {
            return Err(SendMessageError::NotInRoom(frame.room_id));
        }

        // 2. id・regDate を付与して履歴に追加
        frame.r#type = FrameType::Talk;
        frame.reg_date.get_or_insert_with(|| self.clock.now_millis());
        let stored = self
            .repository
            .append_message(frame)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound(id) => SendMessageError::RoomNotFound(id),
                other => SendMessageError::BroadcastFailed(other.to_string()),
            })?;

        // 3. 送信者を含む部屋の全員にブロードキャスト
        let targets = self
            .repository
            .session_ids(&stored.room_id)
            .await
            .map_err(|_| SendMessageError::RoomNotFound(stored.room_id.clone()))?;
        let json = serde_json::to_string(&stored)
            .map_err(|e| SendMessageError::BroadcastFailed(e.to_string()))?;
        self.message_pusher
            .broadcast(targets, &json)
            .await
            .map_err(|e| SendMessageError::BroadcastFailed(e.to_string()))?;

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{NewRoom, RoomMember},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use barcart_shared::{protocol::RoomType, time::FixedClock};
    use tokio::sync::mpsc;

    const NOW: i64 = 1_700_000_000_000;

    struct Fixture {
        usecase: SendMessageUseCase,
        room_id: String,
        alice: SessionId,
        alice_rx: mpsc::UnboundedReceiver<String>,
        bob_rx: mpsc::UnboundedReceiver<String>,
        outsider: SessionId,
    }

    async fn setup() -> Fixture {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let room = repository
            .create_room(
                NewRoom {
                    name: "Speakeasy".to_string(),
                    room_type: RoomType::Group,
                    capacity: 4,
                },
                0,
            )
            .await;

        let mut receivers = Vec::new();
        let mut sessions = Vec::new();
        for member_id in [1, 2] {
            let session_id = SessionId::generate();
            let (tx, rx) = mpsc::unbounded_channel();
            pusher.register(session_id, tx).await;
            repository
                .enter(
                    &room.id,
                    RoomMember {
                        session_id,
                        member_id,
                        entered_at: 0,
                    },
                )
                .await
                .unwrap();
            receivers.push(rx);
            sessions.push(session_id);
        }
        let bob_rx = receivers.pop().unwrap();
        let alice_rx = receivers.pop().unwrap();

        Fixture {
            usecase: SendMessageUseCase::new(
                repository,
                pusher,
                Arc::new(FixedClock::new(NOW)),
            ),
            room_id: room.id,
            alice: sessions[0],
            alice_rx,
            bob_rx,
            outsider: SessionId::generate(),
        }
    }

    #[tokio::test]
    async fn test_talk_is_broadcast_to_everyone_including_sender() {
        // テスト項目: TALK は id が付与され、送信者を含む部屋の全員に配信される
        // given (前提条件):
        let mut f = setup().await;
        let frame = ChatFrame::talk(f.room_id.clone(), 1, "Negroni, please", 123);

        // when (操作):
        let stored = f.usecase.execute(&f.alice, frame).await.unwrap();

        // then (期待する結果):
        assert_eq!(stored.id, Some(1));
        assert_eq!(stored.reg_date, Some(123));
        let expected = serde_json::to_string(&stored).unwrap();
        assert_eq!(f.alice_rx.recv().await, Some(expected.clone()));
        assert_eq!(f.bob_rx.recv().await, Some(expected));
    }

    #[tokio::test]
    async fn test_missing_reg_date_is_stamped() {
        // テスト項目: regDate のない TALK にはサーバー時刻が付与される
        // given (前提条件):
        let f = setup().await;
        let mut frame = ChatFrame::talk(f.room_id.clone(), 1, "hi", 0);
        frame.reg_date = None;

        // when (操作):
        let stored = f.usecase.execute(&f.alice, frame).await.unwrap();

        // then (期待する結果):
        assert_eq!(stored.reg_date, Some(NOW));
    }

    #[tokio::test]
    async fn test_talk_without_enter_is_rejected() {
        // テスト項目: ENTER していない接続からの TALK は NotInRoom になる
        // given (前提条件):
        let f = setup().await;
        let frame = ChatFrame::talk(f.room_id.clone(), 9, "let me in", 1);

        // when (操作):
        let result = f.usecase.execute(&f.outsider, frame).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::NotInRoom(f.room_id.clone())));
    }

    #[tokio::test]
    async fn test_blank_talk_is_rejected() {
        // テスト項目: 空白のみの TALK は EmptyMessage になる
        // given (前提条件):
        let f = setup().await;
        let frame = ChatFrame::talk(f.room_id.clone(), 1, "   ", 1);

        // when (操作):
        let result = f.usecase.execute(&f.alice, frame).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::EmptyMessage));
    }
}
