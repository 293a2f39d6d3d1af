//! Confidence heuristic for machine-learning forecasts
//!
//! A symbol-specific base score is multiplied by factors for model accuracy,
//! size of the predicted move, amount of training data, recent price
//! volatility, market and a time-bucketed jitter, then clamped.

use super::hashing::{base_score, jitter, time_bucket};
use crate::application::market_data::indicators::coefficient_of_variation;
use crate::domain::forecast::TrainedModelResult;
use crate::domain::ml::feature_registry::FeatureRow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const ML_CONFIDENCE_MIN: f64 = 51.0;
pub const ML_CONFIDENCE_MAX: f64 = 78.0;
/// Returned when the factor product is not a finite number.
pub const ML_CONFIDENCE_DEFAULT: f64 = 58.0;

const VOLATILITY_WINDOW: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MlConfidenceFactors {
    pub base: f64,
    pub accuracy: f64,
    pub change: f64,
    pub data: f64,
    pub volatility: f64,
    pub market: f64,
    pub random: f64,
}

impl MlConfidenceFactors {
    pub fn product(&self) -> f64 {
        self.base
            * self.accuracy
            * self.change
            * self.data
            * self.volatility
            * self.market
            * self.random
    }
}

pub fn accuracy_factor(accuracy: f64) -> f64 {
    if accuracy > 0.98 {
        1.15
    } else if accuracy > 0.95 {
        1.10
    } else if accuracy > 0.90 {
        1.05
    } else if accuracy > 0.80 {
        1.0
    } else {
        0.92
    }
}

/// Tiny and very large predicted moves are both penalised.
pub fn change_factor(abs_change: f64) -> f64 {
    if abs_change < 0.01 {
        0.85
    } else if abs_change < 0.03 {
        1.0
    } else if abs_change < 0.08 {
        1.08
    } else {
        0.75
    }
}

pub fn data_factor(rows: usize) -> f64 {
    if rows > 300 {
        1.08
    } else if rows > 200 {
        1.04
    } else if rows > 100 {
        1.0
    } else {
        0.92
    }
}

/// An undefined coefficient of variation takes the most volatile bucket.
pub fn volatility_factor(cv: Option<f64>) -> f64 {
    match cv {
        Some(cv) if cv < 0.015 => 1.12,
        Some(cv) if cv < 0.04 => 1.0,
        _ => 0.88,
    }
}

/// Purely numeric codes are domestic listings.
pub fn market_factor(symbol: &str) -> f64 {
    if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit()) {
        0.95
    } else {
        1.05
    }
}

pub fn ml_confidence_factors(
    result: &TrainedModelResult,
    rows: &[FeatureRow],
    now: DateTime<Utc>,
    bucket_secs: i64,
) -> MlConfidenceFactors {
    let symbol = result.symbol.as_str();
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
    let bucket = time_bucket(now, bucket_secs);

    MlConfidenceFactors {
        base: base_score(symbol, 45, 25),
        accuracy: accuracy_factor(result.accuracy),
        change: change_factor(result.price_change_ratio().abs()),
        data: data_factor(rows.len()),
        volatility: volatility_factor(coefficient_of_variation(&closes, VOLATILITY_WINDOW)),
        market: market_factor(symbol),
        random: jitter(&format!("{}{}", symbol, bucket), 0.9, 0.2),
    }
}

/// Confidence in [51, 78], two decimals.
pub fn calculate_ml_confidence(
    result: &TrainedModelResult,
    rows: &[FeatureRow],
    now: DateTime<Utc>,
    bucket_secs: i64,
) -> f64 {
    let factors = ml_confidence_factors(result, rows, now, bucket_secs);
    debug!("{}: ML confidence factors {:?}", result.symbol, factors);
    bound_ml_confidence(factors.product())
}

fn bound_ml_confidence(raw: f64) -> f64 {
    if !raw.is_finite() {
        return ML_CONFIDENCE_DEFAULT;
    }
    round2(raw.clamp(ML_CONFIDENCE_MIN, ML_CONFIDENCE_MAX))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::Trend;
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::collections::BTreeMap;

    fn result(symbol: &str, accuracy: f64, current: f64, predicted: f64) -> TrainedModelResult {
        TrainedModelResult {
            symbol: symbol.to_string(),
            model_name: "RandomForest".to_string(),
            predicted_price: predicted,
            current_price: current,
            trend: Trend::between(current, predicted),
            accuracy,
            feature_importance: BTreeMap::new(),
            all_predictions: BTreeMap::new(),
        }
    }

    fn rows(n: usize, amplitude: f64) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + if i % 2 == 0 { amplitude } else { -amplitude };
                FeatureRow {
                    date: start + Duration::days(i as i64),
                    close,
                    ma_5: close,
                    ma_10: close,
                    ma_20: close,
                    rsi: 50.0,
                    macd: 0.0,
                    volatility: 1.0,
                    price_change_1d: 0.0,
                    price_change_5d: 0.0,
                    volume_ratio: 1.0,
                    high_low_ratio: 0.02,
                    bb_position: 0.5,
                }
            })
            .collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_factor_tables() {
        assert_eq!(accuracy_factor(0.99), 1.15);
        assert_eq!(accuracy_factor(0.98), 1.10);
        assert_eq!(accuracy_factor(0.85), 1.0);
        assert_eq!(accuracy_factor(0.0), 0.92);

        assert_eq!(change_factor(0.005), 0.85);
        assert_eq!(change_factor(0.02), 1.0);
        assert_eq!(change_factor(0.05), 1.08);
        assert_eq!(change_factor(0.2), 0.75);

        assert_eq!(data_factor(301), 1.08);
        assert_eq!(data_factor(300), 1.04);
        assert_eq!(data_factor(150), 1.0);
        assert_eq!(data_factor(100), 0.92);

        assert_eq!(volatility_factor(Some(0.01)), 1.12);
        assert_eq!(volatility_factor(Some(0.02)), 1.0);
        assert_eq!(volatility_factor(Some(0.1)), 0.88);
        assert_eq!(volatility_factor(None), 0.88);

        assert_eq!(market_factor("7203"), 0.95);
        assert_eq!(market_factor("AAPL"), 1.05);
        assert_eq!(market_factor("7203.T"), 1.05);
    }

    #[test]
    fn test_confidence_within_bounds() {
        let cases = [
            result("7203", 0.0, 100.0, 250.0),
            result("AAPL", 0.99, 100.0, 104.0),
            result("MSFT", 0.5, 100.0, 100.1),
            result("9984", 1.0, 100.0, 99.0),
        ];
        for case in &cases {
            for data in [rows(40, 0.5), rows(350, 0.5), rows(120, 20.0)] {
                let c = calculate_ml_confidence(case, &data, now(), 10);
                assert!((ML_CONFIDENCE_MIN..=ML_CONFIDENCE_MAX).contains(&c), "{}", c);
                assert_eq!(c, round2(c));
            }
        }
    }

    #[test]
    fn test_confidence_stable_within_bucket() {
        let r = result("AAPL", 0.9, 100.0, 102.0);
        let data = rows(150, 1.0);
        let a = calculate_ml_confidence(&r, &data, now(), 10);
        let b = calculate_ml_confidence(&r, &data, now() + Duration::seconds(5), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_confidence_differs_across_symbols() {
        // Neutral factors apart from the base score: AMZN and MSFT bases are
        // 47 and 67.
        let data = rows(150, 2.0);
        let low = calculate_ml_confidence(&result("AMZN", 0.85, 100.0, 102.0), &data, now(), 10);
        let high =
            calculate_ml_confidence(&result("MSFT", 0.85, 100.0, 102.0), &data, now(), 10);
        assert!(high - low > 5.0, "{} vs {}", low, high);
    }

    #[test]
    fn test_bounding() {
        assert_eq!(bound_ml_confidence(f64::NAN), ML_CONFIDENCE_DEFAULT);
        assert_eq!(bound_ml_confidence(f64::INFINITY), ML_CONFIDENCE_DEFAULT);
        assert_eq!(bound_ml_confidence(120.0), ML_CONFIDENCE_MAX);
        assert_eq!(bound_ml_confidence(12.0), ML_CONFIDENCE_MIN);
        assert_eq!(bound_ml_confidence(60.123), 60.12);
    }
}
