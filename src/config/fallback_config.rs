//! Moving-average fallback and confidence bucket configuration.

use super::parse_env;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackEnvConfig {
    pub min_records: usize,
    pub lookback: usize,
    pub ml_bucket_secs: i64,
    pub traditional_bucket_secs: i64,
}

impl FallbackEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            min_records: parse_env("FALLBACK_MIN_RECORDS", 20)?,
            lookback: parse_env("FALLBACK_LOOKBACK", 30)?,
            ml_bucket_secs: parse_env("ML_CONFIDENCE_BUCKET_SECS", 10)?,
            traditional_bucket_secs: parse_env("TRADITIONAL_CONFIDENCE_BUCKET_SECS", 8)?,
        })
    }
}
