use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Process-independent 64-bit hash: the first eight bytes of SHA-256,
/// big-endian.
pub fn stable_hash(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Index of the `bucket_secs`-wide time bucket containing `now`.
pub fn time_bucket(now: DateTime<Utc>, bucket_secs: i64) -> i64 {
    now.timestamp().div_euclid(bucket_secs.max(1))
}

/// Symbol-dependent base score in `[floor, floor + span)`.
pub fn base_score(symbol: &str, floor: u64, span: u64) -> f64 {
    (floor + (stable_hash(symbol) % 10_000) % span) as f64
}

/// Multiplier in `[low, low + width)` derived from `key`, on a 1/1000 grid.
pub fn jitter(key: &str, low: f64, width: f64) -> f64 {
    let fraction = (stable_hash(key) % 1_000) as f64 / 1_000.0;
    low + fraction * width
}
