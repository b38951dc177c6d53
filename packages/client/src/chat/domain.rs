//! Domain logic for the chat session.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use std::time::Duration;

use crate::{config::ReconnectPolicy, error::ChatError};

/// Connection lifecycle of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
    Joined,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Joined => write!(f, "joined"),
        }
    }
}

/// Validate an outgoing message and return the text to send.
///
/// # Errors
///
/// [`ChatError::EmptyMessage`] if the message is blank.
pub fn validate_message(msg: &str) -> Result<&str, ChatError> {
    if msg.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    Ok(msg)
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The error that closed the connection
/// * `current_attempt` - The number of attempts already made (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ChatError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // A full room will not become joinable by retrying.
    if matches!(error, ChatError::RoomFull { .. }) {
        return false;
    }

    current_attempt < max_attempts
}

/// Delay before reconnect attempt `attempt` (1-indexed): doubles from
/// `base_delay`, capped at `max_delay`.
pub fn backoff_delay(policy: &ReconnectPolicy, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    policy
        .base_delay
        .saturating_mul(1u32 << exponent)
        .min(policy.max_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_message_rejects_whitespace() {
        // テスト項目: 空白のみのメッセージは EmptyMessage になる
        // given (前提条件):
        let msg = "  \n\t ";

        // when (操作):
        let result = validate_message(msg);

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::EmptyMessage));
    }

    #[test]
    fn test_validate_message_keeps_original_text() {
        // テスト項目: 有効なメッセージは前後の空白を含めてそのまま返される
        // given (前提条件):
        let msg = " shaken, not stirred ";

        // when (操作):
        let result = validate_message(msg);

        // then (期待する結果):
        assert_eq!(result, Ok(" shaken, not stirred "));
    }

    #[test]
    fn test_should_attempt_reconnect_with_room_full() {
        // テスト項目: RoomFull の場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ChatError::RoomFull {
            room_id: "r1".to_string(),
        };

        // when (操作):
        let result = should_attempt_reconnect(&error, 0, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 再接続回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let error = ChatError::Transport("connection reset".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 3, 5);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ChatError::Transport("connection reset".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_not_reconnect_when_disabled() {
        // テスト項目: 上限 0（無効）の場合、初回から再接続しない
        // given (前提条件):
        let error = ChatError::Transport("connection reset".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 0, 0);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        // テスト項目: バックオフは倍々に増え、上限で頭打ちになる
        // given (前提条件):
        let policy = ReconnectPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        };

        // when (操作):
        let delays: Vec<_> = (1..=5).map(|attempt| backoff_delay(&policy, attempt)).collect();

        // then (期待する結果):
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(500),
                Duration::from_millis(500),
            ]
        );
    }
}
