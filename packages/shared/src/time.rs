//! Time-related utilities with clock abstraction for testability.
//!
//! Timestamps are Unix milliseconds. Display uses KST (UTC+9), the local
//! time of the platform's users.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `None` when the timestamp is outside chrono's range
fn to_kst(timestamp_millis: i64) -> Option<DateTime<FixedOffset>> {
    FixedOffset::east_opt(KST_OFFSET_SECS)?
        .timestamp_millis_opt(timestamp_millis)
        .single()
}

/// Convert Unix timestamp (milliseconds) to KST RFC 3339 format
///
/// Out-of-range timestamps fall back to the raw millisecond value.
pub fn timestamp_to_kst_rfc3339(timestamp_millis: i64) -> String {
    to_kst(timestamp_millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| timestamp_millis.to_string())
}

/// Format a timestamp as `HH:MM` in KST, used for chat lines
pub fn timestamp_to_kst_clock(timestamp_millis: i64) -> String {
    to_kst(timestamp_millis)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
