use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

use crate::utils::constants::{FALLBACK_WINDOW_SECONDS, QUERY_TIME_FORMAT};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Start of the look-back window used when no cursor is known,
/// formatted the way the readings endpoint expects it in the path.
pub fn fallback_query_time(now: DateTime<Utc>) -> String {
    (now - Duration::seconds(FALLBACK_WINDOW_SECONDS))
        .format(QUERY_TIME_FORMAT)
        .to_string()
}
