use super::hashing::{base_score, jitter, time_bucket};
use super::ml_confidence::round2;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const TRADITIONAL_CONFIDENCE_MIN: f64 = 48.0;
pub const TRADITIONAL_CONFIDENCE_MAX: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraditionalConfidenceFactors {
    pub base: f64,
    pub trend: f64,
    pub volatility: f64,
    pub data: f64,
    pub random: f64,
}

impl TraditionalConfidenceFactors {
    pub fn product(&self) -> f64 {
        self.base * self.trend * self.volatility * self.data * self.random
    }
}

pub fn trend_factor(trend_strength: f64) -> f64 {
    if trend_strength > 0.08 {
        1.12
    } else if trend_strength > 0.04 {
        1.08
    } else if trend_strength > 0.02 {
        1.03
    } else if trend_strength > 0.01 {
        0.98
    } else {
        0.92
    }
}

pub fn volatility_factor(volatility: f64) -> f64 {
    if volatility < 0.015 {
        1.15
    } else if volatility < 0.035 {
        1.0
    } else if volatility < 0.07 {
        0.88
    } else {
        0.75
    }
}

pub fn data_factor(records: usize) -> f64 {
    if records >= 30 {
        1.06
    } else if records >= 25 {
        1.02
    } else if records >= 20 {
        1.0
    } else {
        0.94
    }
}

pub fn traditional_confidence_factors(
    symbol: &str,
    trend_strength: f64,
    volatility: f64,
    records: usize,
    now: DateTime<Utc>,
    bucket_secs: i64,
) -> TraditionalConfidenceFactors {
    let bucket = time_bucket(now, bucket_secs);
    TraditionalConfidenceFactors {
        base: base_score(symbol, 50, 18),
        trend: trend_factor(trend_strength),
        volatility: volatility_factor(volatility),
        data: data_factor(records),
        random: jitter(&format!("{}_trad_{}", symbol, bucket), 0.88, 0.24),
    }
}

/// Confidence of a moving-average forecast, in [48, 72] with two decimals.
pub fn calculate_traditional_confidence(
    symbol: &str,
    trend_strength: f64,
    volatility: f64,
    records: usize,
    now: DateTime<Utc>,
    bucket_secs: i64,
) -> f64 {
    let factors =
        traditional_confidence_factors(symbol, trend_strength, volatility, records, now, bucket_secs);
    debug!("{}: traditional confidence factors {:?}", symbol, factors);

    let raw = factors.product();
    if !raw.is_finite() {
        return TRADITIONAL_CONFIDENCE_MIN;
    }
    round2(raw.clamp(TRADITIONAL_CONFIDENCE_MIN, TRADITIONAL_CONFIDENCE_MAX))
}
