//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// RFC 3339 timestamp with second precision, for log lines
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Strictly increasing millisecond stamps
///
/// Two calls within the same millisecond still yield distinct values, so stamps
/// can be used to name files that must never overwrite each other.
#[derive(Debug, Default)]
pub struct MonotonicStamp {
    last: Option<i64>,
}

impl MonotonicStamp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next stamp: the wall clock, or last stamp + 1 if the clock did not advance
    pub fn next(&mut self) -> i64 {
        let now = now_millis();
        let stamp = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}
