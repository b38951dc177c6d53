//! ドメイン層のエラー定義

use thiserror::Error;

/// Room エンティティのルール違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// 定員に達している
    #[error("Room is full (capacity {capacity})")]
    Full { capacity: u32 },
}

/// Repository のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Room '{0}' is full")]
    RoomFull(String),

    /// 参加者が残っている部屋は削除できない
    #[error("Room '{0}' still has members")]
    RoomOccupied(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
