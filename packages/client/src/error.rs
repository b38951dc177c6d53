//! Error types for the Barcart session core.
//!
//! Every failure resolves to one of these typed outcomes; nothing here
//! terminates the process.

use thiserror::Error;

/// Errors surfaced by guarded REST calls
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No access token is present; the call was not attempted
    #[error("Not authenticated")]
    Unauthenticated,

    /// The backend answered 401 and recovery (refresh + single retry) was exhausted
    #[error("Request was rejected as unauthorized")]
    Unauthorized,

    /// Non-success status other than 401
    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    /// Network-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Why a token refresh did not produce a new access token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("No refresh token is stored")]
    MissingRefreshToken,

    #[error("Refresh was rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("Refresh transport error: {0}")]
    Transport(String),

    #[error("Failed to decode refresh response: {0}")]
    Decode(String),

    #[error("Refresh did not complete in time")]
    Timeout,
}

/// Chat session errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Capacity check failed before join; no ENTER frame was sent
    #[error("Room '{room_id}' is full")]
    RoomFull { room_id: String },

    /// Message is empty after trimming
    #[error("Message is empty")]
    EmptyMessage,

    /// The session is not in a state that allows the operation
    #[error("Not connected to a chat room")]
    NotConnected,

    /// `connect()` called while a connection is already open or opening
    #[error("Chat session is already connected")]
    AlreadyConnected,

    /// Socket failed or closed unexpectedly
    #[error("Chat transport error: {0}")]
    Transport(String),

    /// Room directory lookup failed
    #[error("Room directory error: {0}")]
    Directory(String),
}

impl From<ApiError> for ChatError {
    fn from(err: ApiError) -> Self {
        Self::Directory(err.to_string())
    }
}
