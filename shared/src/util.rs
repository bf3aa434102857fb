/// Current UTC timestamp in milliseconds.
///
/// All persisted timestamps (`created_at`, `updated_at`, `purchased_at`)
/// use Unix millis stored as `i64`.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
