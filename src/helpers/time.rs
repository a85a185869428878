use chrono::Utc;

/// Milliseconds since the UNIX epoch, the unit token expiries use.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
