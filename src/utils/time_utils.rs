use chrono::{DateTime, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const SEC_IN_MIN: i64 = 60;
    pub const SEC_IN_HOUR: i64 = Self::SEC_IN_MIN * 60;
    pub const SEC_IN_DAY: i64 = Self::SEC_IN_HOUR * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Truncate a unix timestamp (seconds) to the top of its hour. Hourly
    /// digests are keyed by these truncated timestamps.
    pub fn truncate_to_hour(epoch_sec: i64) -> i64 {
        epoch_sec - epoch_sec.rem_euclid(Self::SEC_IN_HOUR)
    }
}

pub fn epoch_sec_to_utc(epoch_sec: i64) -> String {
    // Used for display purposes
    match DateTime::<Utc>::from_timestamp(epoch_sec, 0) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}

pub fn utc_now_as_timestamp_sec() -> i64 {
    Utc::now().timestamp()
}
