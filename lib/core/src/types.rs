use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// New random identifier, hex without dashes. Used to correlate a
/// request with its log lines.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current UTC time as RFC 3339 with second precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
