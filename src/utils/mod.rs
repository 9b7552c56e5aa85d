pub mod maths_utils;
pub mod time_utils;

pub use maths_utils::{get_max, get_min, ols_slope, percentile_rank};
pub use time_utils::{TimeUtils, epoch_sec_to_utc, utc_now_as_timestamp_sec};
