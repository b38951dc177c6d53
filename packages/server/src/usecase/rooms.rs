//! UseCase: 部屋の参照・作成・削除（REST の `/chat/*`）

use std::sync::Arc;

use barcart_shared::{
    protocol::{ChatFrame, CreateRoomRequest, MemberId, RoomInfo},
    time::Clock,
};

use crate::domain::{NewRoom, RepositoryError, RoomRepository};

use super::error::RoomQueryError;

/// 部屋の参照・管理のユースケース
pub struct RoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl RoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 全ての部屋（作成順）
    pub async fn list(&self) -> Vec<RoomInfo> {
        self.repository
            .list_rooms()
            .await
            .iter()
            .map(|room| room.info())
            .collect()
    }

    /// 会員が入室している部屋
    pub async fn my_rooms(&self, member_id: MemberId) -> Vec<RoomInfo> {
        self.repository
            .rooms_of_member(member_id)
            .await
            .iter()
            .map(|room| room.info())
            .collect()
    }

    pub async fn get(&self, room_id: &str) -> Result<RoomInfo, RoomQueryError> {
        let room = self.repository.get_room(room_id).await.map_err(not_found)?;
        Ok(room.info())
    }

    /// 現在の入室数
    pub async fn member_count(&self, room_id: &str) -> Result<u32, RoomQueryError> {
        let room = self.repository.get_room(room_id).await.map_err(not_found)?;
        Ok(room.member_count())
    }

    /// メッセージ履歴（id の昇順）
    pub async fn history(&self, room_id: &str) -> Result<Vec<ChatFrame>, RoomQueryError> {
        let room = self.repository.get_room(room_id).await.map_err(not_found)?;
        Ok(room.messages)
    }

    /// 部屋を作成する
    ///
    /// # Errors
    ///
    /// 名前が空、または定員が 0 の場合は [`RoomQueryError::InvalidRoom`]
    pub async fn create(&self, request: CreateRoomRequest) -> Result<RoomInfo, RoomQueryError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(RoomQueryError::InvalidRoom("name is empty".to_string()));
        }
        if request.person_cnt == 0 {
            return Err(RoomQueryError::InvalidRoom(
                "personCnt must be at least 1".to_string(),
            ));
        }

        let spec = NewRoom {
            name: name.to_string(),
            room_type: request.room_type,
            capacity: request.person_cnt,
        };
        let room = self
            .repository
            .create_room(spec, self.clock.now_millis())
            .await;
        tracing::info!("Room {} ({}) created", room.id, room.name);
        Ok(room.info())
    }

    /// 部屋を削除する。入室中の接続が残っていれば削除せず `false`
    pub async fn delete(&self, room_id: &str) -> Result<bool, RoomQueryError> {
        match self.repository.delete_room(room_id).await {
            Ok(()) => {
                tracing::info!("Room {} deleted", room_id);
                Ok(true)
            }
            Err(RepositoryError::RoomOccupied(_)) => {
                tracing::info!("Room {} still has members, not deleted", room_id);
                Ok(false)
            }
            Err(e) => Err(not_found(e)),
        }
    }
}

fn not_found(_: RepositoryError) -> RoomQueryError {
    RoomQueryError::RoomNotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, RoomMember, SessionId},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use barcart_shared::{protocol::RoomType, time::FixedClock};

    const NOW: i64 = 1_700_000_000_000;

    fn request(name: &str, person_cnt: u32) -> CreateRoomRequest {
        CreateRoomRequest {
            name: name.to_string(),
            room_type: RoomType::Group,
            person_cnt,
        }
    }

    fn setup() -> (RoomsUseCase, Arc<InMemoryRoomRepository>) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase = RoomsUseCase::new(repository.clone(), Arc::new(FixedClock::new(NOW)));
        (usecase, repository)
    }

    #[tokio::test]
    async fn test_create_then_list_and_get() {
        // テスト項目: 作成した部屋が一覧と詳細で取得でき、作成時刻が regDate になる
        // given (前提条件):
        let (usecase, _) = setup();

        // when (操作):
        let created = usecase.create(request("  Tiki Bar ", 3)).await.unwrap();

        // then (期待する結果):
        assert_eq!(created.name, "Tiki Bar");
        assert_eq!(created.person_cnt, 3);
        assert_eq!(created.reg_date, NOW);
        assert_eq!(usecase.list().await, vec![created.clone()]);
        assert_eq!(usecase.get(&created.room_id).await, Ok(created));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_rooms() {
        // テスト項目: 名前が空、または定員 0 の部屋は作成できない
        // given (前提条件):
        let (usecase, _) = setup();

        // when (操作):
        let blank = usecase.create(request("   ", 3)).await;
        let zero = usecase.create(request("Lounge", 0)).await;

        // then (期待する結果):
        assert!(matches!(blank, Err(RoomQueryError::InvalidRoom(_))));
        assert!(matches!(zero, Err(RoomQueryError::InvalidRoom(_))));
        assert!(usecase.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_member_count_and_my_rooms_follow_entries() {
        // テスト項目: 入室数と「自分の部屋」が入室状況を反映する
        // given (前提条件):
        let (usecase, repository) = setup();
        let lounge = usecase.create(request("Lounge", 3)).await.unwrap();
        let cellar = usecase.create(request("Cellar", 3)).await.unwrap();
        repository
            .enter(
                &lounge.room_id,
                RoomMember {
                    session_id: SessionId::generate(),
                    member_id: 7,
                    entered_at: NOW,
                },
            )
            .await
            .unwrap();

        // when (操作):
        let lounge_count = usecase.member_count(&lounge.room_id).await;
        let cellar_count = usecase.member_count(&cellar.room_id).await;
        let mine = usecase.my_rooms(7).await;

        // then (期待する結果):
        assert_eq!(lounge_count, Ok(1));
        assert_eq!(cellar_count, Ok(0));
        assert_eq!(mine, vec![lounge]);
    }

    #[tokio::test]
    async fn test_delete_occupied_room_returns_false() {
        // テスト項目: 入室中の接続が残る部屋は削除されず false、空なら true
        // given (前提条件):
        let (usecase, repository) = setup();
        let room = usecase.create(request("Lounge", 3)).await.unwrap();
        let session_id = SessionId::generate();
        repository
            .enter(
                &room.room_id,
                RoomMember {
                    session_id,
                    member_id: 7,
                    entered_at: NOW,
                },
            )
            .await
            .unwrap();

        // when (操作):
        let occupied = usecase.delete(&room.room_id).await;
        repository.leave_all(&session_id).await;
        let emptied = usecase.delete(&room.room_id).await;

        // then (期待する結果):
        assert_eq!(occupied, Ok(false));
        assert_eq!(emptied, Ok(true));
        assert_eq!(usecase.get(&room.room_id).await, Err(RoomQueryError::RoomNotFound));
    }

    #[tokio::test]
    async fn test_history_of_unknown_room_is_not_found() {
        // テスト項目: 存在しない部屋の履歴は RoomNotFound になる
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_get_room()
            .returning(|room_id| Err(RepositoryError::RoomNotFound(room_id.to_string())));
        let usecase = RoomsUseCase::new(Arc::new(repository), Arc::new(FixedClock::new(NOW)));

        // when (操作):
        let result = usecase.history("missing").await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomQueryError::RoomNotFound));
    }
}
