//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use barcart_shared::protocol::{ChatFrame, MemberId};

use super::{Account, NewRoom, RepositoryError, Room, RoomMember, SessionId};

/// Room Repository trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 全ての部屋（作成順）
    async fn list_rooms(&self) -> Vec<Room>;

    async fn get_room(&self, room_id: &str) -> Result<Room, RepositoryError>;

    /// 部屋を作成して返す（ID は Repository が採番）
    async fn create_room(&self, spec: NewRoom, created_at: i64) -> Room;

    /// 部屋を削除する。参加者が残っていれば [`RepositoryError::RoomOccupied`]
    async fn delete_room(&self, room_id: &str) -> Result<(), RepositoryError>;

    /// 接続を入室させる
    async fn enter(&self, room_id: &str, member: RoomMember) -> Result<(), RepositoryError>;

    /// 接続を全ての部屋から退室させ、退室した部屋の ID を返す
    async fn leave_all(&self, session_id: &SessionId) -> Vec<String>;

    /// 接続を 1 つの部屋から退室させる
    async fn leave(&self, room_id: &str, session_id: &SessionId) -> Result<bool, RepositoryError>;

    /// メッセージに id を採番して履歴に追加し、保存したフレームを返す
    async fn append_message(&self, frame: ChatFrame) -> Result<ChatFrame, RepositoryError>;

    /// 部屋に入室中の接続
    async fn session_ids(&self, room_id: &str) -> Result<Vec<SessionId>, RepositoryError>;

    /// 会員が入室している部屋
    async fn rooms_of_member(&self, member_id: MemberId) -> Vec<Room>;
}

/// 会員アカウントの参照
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<Account>;

    async fn find_by_id(&self, member_id: MemberId) -> Option<Account>;
}
