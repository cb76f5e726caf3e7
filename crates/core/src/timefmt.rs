//! Civil-time rendering.
//!
//! Storage and domain logic work in UTC throughout; only user-facing text
//! renders in Baku time. Azerbaijan has had no daylight saving since 2016,
//! so a fixed UTC+4 offset is exact.

use chrono::FixedOffset;

use crate::types::Timestamp;

/// Baku is UTC+4 year-round.
pub const UTC_OFFSET_HOURS: i32 = 4;

fn local(ts: Timestamp) -> chrono::DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(UTC_OFFSET_HOURS * 3600).expect("valid offset");
    ts.with_timezone(&offset)
}

/// Short datetime used in summaries: `28.02.26 14:05:59`.
pub fn datetime_short(ts: Timestamp) -> String {
    local(ts).format("%d.%m.%y %H:%M:%S").to_string()
}

/// Full datetime used in the CSV export: `28.02.2026 14:05:59`.
pub fn datetime_long(ts: Timestamp) -> String {
    local(ts).format("%d.%m.%Y %H:%M:%S").to_string()
}

/// Date only, used in digests and blacklist listings: `28.02.2026`.
pub fn date(ts: Timestamp) -> String {
    local(ts).format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_in_baku_time() {
        // 23:30 UTC rolls over to 03:30 next day in Baku.
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 5).unwrap();
        assert_eq!(datetime_short(ts), "02.03.25 03:30:05");
        assert_eq!(datetime_long(ts), "02.03.2025 03:30:05");
        assert_eq!(date(ts), "02.03.2025");
    }
}
