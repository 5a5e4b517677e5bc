/// Current Unix time in milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// New random marker id: 128 bits, 32 lowercase hex chars, no dashes.
pub fn new_marker_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
