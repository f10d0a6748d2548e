//! Time utilities for plaintext envelope timestamps.
//!
//! All timestamps are RFC 3339 UTC strings with millisecond precision and a
//! trailing `Z` (`2024-01-02T03:04:05.678Z`). The fixed width and fixed
//! offset make the strings lexicographically comparable, which the envelope
//! index and the last-write-wins merge rely on.

use chrono::{SecondsFormat, Utc};

/// Returns the current UTC time as an RFC 3339 string.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
