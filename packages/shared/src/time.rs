//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp in milliseconds
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_timestamp()
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

fn jst_offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap() // JST is UTC+9
}

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to a JST datetime
fn to_jst(timestamp_millis: i64) -> DateTime<FixedOffset> {
    let seconds = timestamp_millis.div_euclid(1000);
    let nanos = (timestamp_millis.rem_euclid(1000) * 1_000_000) as u32;
    jst_offset().timestamp_opt(seconds, nanos).unwrap()
}

/// Convert Unix timestamp (milliseconds) to JST RFC 3339 format
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> String {
    to_jst(timestamp_millis).to_rfc3339()
}

/// Format a message timestamp for display, relative to `now_millis`.
///
/// Same calendar day: `h:mm A`. Previous calendar day: `Yesterday h:mm A`.
/// Anything older: `MMM D, h:mm A`. Used identically by the chat view and
/// the chat-list preview.
pub fn format_message_timestamp(timestamp_millis: i64, now_millis: i64) -> String {
    let message = to_jst(timestamp_millis);
    let now = to_jst(now_millis);

    let clock = message.format("%-I:%M %p");
    if message.date_naive() == now.date_naive() {
        return format!("{}", clock);
    }
    if Some(message.date_naive()) == now.date_naive().pred_opt() {
        return format!("Yesterday {}", clock);
    }
    format!("{}, {}", message.format("%b %-d"), clock)
}

/// Format an elapsed-time label for the chat-list row (`Just now`, `5m`,
/// `3h`, `2d`, or the date once a week has passed).
pub fn format_elapsed(timestamp_millis: i64, now_millis: i64) -> String {
    let diff_millis = (now_millis - timestamp_millis).max(0);
    let minutes = diff_millis / 60_000;
    let hours = diff_millis / 3_600_000;
    let days = diff_millis / 86_400_000;

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    if hours < 24 {
        return format!("{}h", hours);
    }
    if days < 7 {
        return format!("{}d", days);
    }
    let date = to_jst(timestamp_millis);
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}
