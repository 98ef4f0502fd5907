//! Time helpers pinned to KST (UTC+9), the platform's home timezone.
//!
//! Chat timestamps arrive as epoch milliseconds; rendering them in a fixed
//! offset keeps log lines deterministic regardless of the host timezone.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// The fixed KST offset (UTC+9).
pub fn kst() -> FixedOffset {
    // 9 hours is always in range for FixedOffset
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap()
}

/// Current time in KST.
pub fn now_kst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst())
}

/// Render an epoch-milliseconds timestamp as `YYYY-MM-DD HH:MM:SS` in KST.
///
/// Millisecond values chrono cannot represent degrade to the raw number
/// instead of panicking, so a garbage timestamp cannot take down a batch.
pub fn format_kst_timestamp(timestamp_millis: i64) -> String {
    match kst().timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp_millis.to_string(),
    }
}
