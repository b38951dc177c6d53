//! Room directory: read-only room queries used before a join.
//!
//! [`RoomDirectory`] is the seam the chat session depends on;
//! [`RestRoomDirectory`] implements it over the token guard, with no retries
//! beyond what the guard already does.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use barcart_shared::protocol::{ChatFrame, CreateRoomRequest, RoomInfo, RoomType};

use crate::{
    error::ApiError,
    guard::TokenGuard,
    http::{ApiRequest, ApiResponse},
};

/// Capacity snapshot read right before a join.
///
/// Never cached: the count can change between this read and the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    pub room_id: String,
    pub capacity: u32,
    pub current_count: u32,
}

impl RoomMembership {
    pub fn has_vacancy(&self) -> bool {
        self.current_count < self.capacity
    }
}

/// Room queries needed by the chat session
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// All rooms, oldest first
    async fn list_rooms(&self) -> Result<Vec<RoomInfo>, ApiError>;

    /// Metadata of one room
    async fn room(&self, room_id: &str) -> Result<RoomInfo, ApiError>;

    /// Live member count of one room
    async fn member_count(&self, room_id: &str) -> Result<u32, ApiError>;

    /// Message history of one room
    async fn history(&self, room_id: &str) -> Result<Vec<ChatFrame>, ApiError>;

    /// Capacity and live count, read together for the join precondition
    async fn membership(&self, room_id: &str) -> Result<RoomMembership, ApiError> {
        let room = self.room(room_id).await?;
        let current_count = self.member_count(room_id).await?;
        Ok(RoomMembership {
            room_id: room.room_id,
            capacity: room.person_cnt,
            current_count,
        })
    }
}

/// REST implementation over the guarded client
#[derive(Clone)]
pub struct RestRoomDirectory {
    guard: TokenGuard,
}

impl RestRoomDirectory {
    pub fn new(guard: TokenGuard) -> Self {
        Self { guard }
    }

    async fn fetch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let path = request.path.clone();
        self.guard.execute(request).await?.error_for_status(&path)
    }

    /// Rooms the current member has joined
    pub async fn my_rooms(&self) -> Result<Vec<RoomInfo>, ApiError> {
        self.fetch(ApiRequest::get("/chat/myRooms")).await?.json()
    }

    /// Open a new room
    pub async fn create_room(
        &self,
        name: impl Into<String>,
        room_type: RoomType,
        person_cnt: u32,
    ) -> Result<RoomInfo, ApiError> {
        let body = CreateRoomRequest {
            name: name.into(),
            room_type,
            person_cnt,
        };
        self.fetch(ApiRequest::post("/chat/new", &body)?)
            .await?
            .json()
    }

    /// Delete a room; `false` when members are still inside
    pub async fn delete_room(&self, room_id: &str) -> Result<bool, ApiError> {
        self.fetch(ApiRequest::delete(format!("/chat/delRoom/{}", room_id)))
            .await?
            .json()
    }
}

#[async_trait]
impl RoomDirectory for RestRoomDirectory {
    async fn list_rooms(&self) -> Result<Vec<RoomInfo>, ApiError> {
        self.fetch(ApiRequest::get("/chat/roomList")).await?.json()
    }

    async fn room(&self, room_id: &str) -> Result<RoomInfo, ApiError> {
        self.fetch(ApiRequest::get(format!("/chat/room/{}", room_id)))
            .await?
            .json()
    }

    async fn member_count(&self, room_id: &str) -> Result<u32, ApiError> {
        self.fetch(ApiRequest::get(format!("/chat/cntRoomMember/{}", room_id)))
            .await?
            .json()
    }

    async fn history(&self, room_id: &str) -> Result<Vec<ChatFrame>, ApiError> {
        self.fetch(ApiRequest::get(format!("/chat/message/{}", room_id)))
            .await?
            .json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        credential::{Credential, CredentialStore},
        guard::GuardOptions,
        http::MockHttpTransport,
    };
    use std::sync::Arc;

    fn directory_with(transport: MockHttpTransport) -> RestRoomDirectory {
        let guard = TokenGuard::new(
            CredentialStore::with_credential(Credential::new("access", "refresh")),
            Arc::new(transport),
            GuardOptions::default(),
        );
        RestRoomDirectory::new(guard)
    }

    fn room_json(room_id: &str, person_cnt: u32) -> String {
        serde_json::json!({
            "roomId": room_id,
            "name": "Negroni night",
            "regDate": 1000,
            "roomType": "GROUP",
            "personCnt": person_cnt
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_membership_reads_room_and_count() {
        // テスト項目: membership は部屋情報と参加人数を組み合わせて返す
        // given (前提条件):
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|request| request.path == "/chat/room/r1")
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, room_json("r1", 4))));
        transport
            .expect_send()
            .withf(|request| request.path == "/chat/cntRoomMember/r1")
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, "4")));
        let directory = directory_with(transport);

        // when (操作):
        let membership = directory.membership("r1").await.unwrap();

        // then (期待する結果):
        assert_eq!(
            membership,
            RoomMembership {
                room_id: "r1".to_string(),
                capacity: 4,
                current_count: 4
            }
        );
        assert!(!membership.has_vacancy());
    }

    #[tokio::test]
    async fn test_missing_room_maps_to_status_error() {
        // テスト項目: 存在しない部屋は Status エラーとして返される
        // given (前提条件):
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(ApiResponse::new(404, "")));
        let directory = directory_with(transport);

        // when (操作):
        let result = directory.room("missing").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ApiError::Status {
                status: 404,
                path: "/chat/room/missing".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_create_room_posts_request_body() {
        // テスト項目: create_room がリクエストボディ付きで POST する
        // given (前提条件):
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.path == "/chat/new"
                    && request.body
                        == Some(serde_json::json!({
                            "name": "Negroni night",
                            "roomType": "GROUP",
                            "personCnt": 2
                        }))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, room_json("new-room", 2))));
        let directory = directory_with(transport);

        // when (操作):
        let room = directory
            .create_room("Negroni night", RoomType::Group, 2)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.room_id, "new-room");
        assert_eq!(room.person_cnt, 2);
    }
}
