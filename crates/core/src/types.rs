/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Milliseconds since the Unix epoch, as stored in persisted records.
pub type EpochMillis = i64;

/// Current time as epoch milliseconds.
pub fn now_millis() -> EpochMillis {
    chrono::Utc::now().timestamp_millis()
}
