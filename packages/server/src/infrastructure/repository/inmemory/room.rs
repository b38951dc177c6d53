//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! ドメインモデル（`Room`）をそのままストレージとして使用します。

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use barcart_shared::protocol::{ChatFrame, MemberId};

use crate::domain::{
    NewRoom, RepositoryError, Room, RoomError, RoomMember, RoomRepository, SessionId,
};

#[derive(Debug)]
struct Store {
    /// 作成順
    rooms: Vec<Room>,
    /// 次に採番するメッセージ id（全部屋で共通）
    next_message_id: i64,
}

impl Store {
    fn room(&self, room_id: &str) -> Result<&Room, RepositoryError> {
        self.rooms
            .iter()
            .find(|room| room.id == room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }

    fn room_mut(&mut self, room_id: &str) -> Result<&mut Room, RepositoryError> {
        self.rooms
            .iter_mut()
            .find(|room| room.id == room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }
}

/// インメモリ Room Repository 実装
#[derive(Debug)]
pub struct InMemoryRoomRepository {
    store: Mutex<Store>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store {
                rooms: Vec::new(),
                next_message_id: 1,
            }),
        }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn list_rooms(&self) -> Vec<Room> {
        self.store.lock().await.rooms.clone()
    }

    async fn get_room(&self, room_id: &str) -> Result<Room, RepositoryError> {
        self.store.lock().await.room(room_id).cloned()
    }

    async fn create_room(&self, spec: NewRoom, created_at: i64) -> Room {
        let room = Room::new(Uuid::new_v4().to_string(), spec, created_at);
        self.store.lock().await.rooms.push(room.clone());
        room
    }

    async fn delete_room(&self, room_id: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        if !store.room(room_id)?.is_empty() {
            return Err(RepositoryError::RoomOccupied(room_id.to_string()));
        }
        store.rooms.retain(|room| room.id != room_id);
        Ok(())
    }

    async fn enter(&self, room_id: &str, member: RoomMember) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        store
            .room_mut(room_id)?
            .enter(member)
            .map_err(|RoomError::Full { .. }| RepositoryError::RoomFull(room_id.to_string()))
    }

    async fn leave_all(&self, session_id: &SessionId) -> Vec<String> {
        let mut store = self.store.lock().await;
        store
            .rooms
            .iter_mut()
            .filter_map(|room| room.leave(session_id).then(|| room.id.clone()))
            .collect()
    }

    async fn leave(&self, room_id: &str, session_id: &SessionId) -> Result<bool, RepositoryError> {
        let mut store = self.store.lock().await;
        Ok(store.room_mut(room_id)?.leave(session_id))
    }

    async fn append_message(&self, mut frame: ChatFrame) -> Result<ChatFrame, RepositoryError> {
        let mut store = self.store.lock().await;
        let id = store.next_message_id;
        let room = store.room_mut(&frame.room_id)?;
        frame.id = Some(id);
        room.messages.push(frame.clone());
        store.next_message_id += 1;
        Ok(frame)
    }

    async fn session_ids(&self, room_id: &str) -> Result<Vec<SessionId>, RepositoryError> {
        Ok(self.store.lock().await.room(room_id)?.session_ids())
    }

    async fn rooms_of_member(&self, member_id: MemberId) -> Vec<Room> {
        let store = self.store.lock().await;
        store
            .rooms
            .iter()
            .filter(|room| room.members.iter().any(|m| m.member_id == member_id))
            .cloned()
            .collect()
    }
}
