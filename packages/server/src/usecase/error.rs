//! UseCase 層のエラー定義

use thiserror::Error;

/// 認証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unknown access token")]
    InvalidAccessToken,

    #[error("Access token expired")]
    ExpiredAccessToken,

    #[error("Unknown refresh token")]
    InvalidRefreshToken,
}

/// 部屋の参照・管理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomQueryError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Invalid room: {0}")]
    InvalidRoom(String),
}

/// 入室のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnterRoomError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Room '{0}' is full")]
    RoomFull(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    /// ENTER していない部屋への TALK
    #[error("Session has not entered room '{0}'")]
    NotInRoom(String),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Failed to broadcast: {0}")]
    BroadcastFailed(String),
}
