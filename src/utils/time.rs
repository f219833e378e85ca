use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 timestamp, so string order matches time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
