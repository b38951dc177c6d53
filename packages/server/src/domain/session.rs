//! WebSocket 接続を識別する値オブジェクト

use uuid::Uuid;

/// 1 本の WebSocket 接続の ID
///
/// 同じ会員が複数の接続を持てるため、会員 ID とは別に採番します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
