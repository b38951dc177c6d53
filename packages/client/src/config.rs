//! Client configuration.

use std::time::Duration;

/// Default REST base URL of the backend
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8111";
/// Default chat socket URL
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8111/ws/chat";
/// Path of the refresh endpoint
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Bounded reconnect policy for the chat socket.
///
/// `max_attempts == 0` disables auto-reconnect: an unexpected close only
/// surfaces a disconnected notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    /// Policy that never reconnects
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Policy with `max_attempts` retries and the default backoff
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 0
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Configuration for the session core
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL (e.g. `http://127.0.0.1:8111`)
    pub base_url: String,
    /// Chat socket URL (e.g. `ws://127.0.0.1:8111/ws/chat`)
    pub ws_url: String,
    /// Per-request timeout for REST calls
    pub request_timeout: Duration,
    /// Upper bound for the refresh round-trip; on expiry waiters resolve to `false`
    pub refresh_timeout: Duration,
    pub refresh_path: String,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            refresh_timeout: Duration::from_secs(5),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reconnect_policy_is_disabled() {
        // テスト項目: 既定の再接続ポリシーは自動再接続を行わない
        // given (前提条件):
        let config = ClientConfig::default();

        // when (操作):
        let enabled = config.reconnect.is_enabled();

        // then (期待する結果):
        assert!(!enabled);
    }

    #[test]
    fn test_bounded_policy_keeps_default_backoff() {
        // テスト項目: bounded で試行回数のみ変更され、バックオフは既定値のまま
        // given (前提条件):
        let policy = ReconnectPolicy::bounded(3);

        // when (操作):
        let defaults = ReconnectPolicy::default();

        // then (期待する結果):
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, defaults.base_delay);
        assert!(policy.is_enabled());
    }
}
