use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// `Up` only on a strict increase.
    pub fn between(current: f64, predicted: f64) -> Self {
        if predicted > current {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
        }
    }
}

/// Output of one training/selection run. Lives only for a single forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainedModelResult {
    pub symbol: String,
    pub model_name: String,
    pub predicted_price: f64,
    pub current_price: f64,
    pub trend: Trend,
    /// Test-split R², floored at 0
    pub accuracy: f64,
    pub feature_importance: BTreeMap<String, f64>,
    pub all_predictions: BTreeMap<String, f64>,
}

impl TrainedModelResult {
    pub fn price_change_ratio(&self) -> f64 {
        (self.predicted_price - self.current_price) / self.current_price
    }
}

/// Persisted forecast. At most one per (symbol, target_date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub symbol: String,
    pub target_date: NaiveDate,
    pub predicted_price: Decimal,
    pub confidence: f64,
    pub method: String,
    pub created_at: DateTime<Utc>,
}

/// Method-specific diagnostics returned alongside the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastDetails {
    MachineLearning {
        model_name: String,
        accuracy: f64,
        feature_importance: BTreeMap<String, f64>,
        all_predictions: BTreeMap<String, f64>,
    },
    Traditional {
        ma_5: f64,
        ma_20: f64,
        volatility: f64,
        trend_strength: f64,
    },
}

impl ForecastDetails {
    pub fn is_machine_learning(&self) -> bool {
        matches!(self, ForecastDetails::MachineLearning { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOutcome {
    pub record: ForecastRecord,
    pub trend: Trend,
    pub current_price: f64,
    /// Unrounded model output
    pub raw_predicted_price: f64,
    pub details: ForecastDetails,
}

pub fn ml_method_label(model_name: &str) -> String {
    format!("Machine learning ({})", model_name)
}

pub fn traditional_method_label(trend: Trend) -> String {
    format!("Moving average crossover ({} trend)", trend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_requires_strict_increase() {
        assert_eq!(Trend::between(100.0, 100.5), Trend::Up);
        assert_eq!(Trend::between(100.0, 100.0), Trend::Down);
        assert_eq!(Trend::between(100.0, 99.0), Trend::Down);
    }

    #[test]
    fn test_method_labels_distinguish_paths() {
        let ml = ml_method_label("RandomForest");
        let trad = traditional_method_label(Trend::Up);
        assert!(ml.contains("RandomForest"));
        assert!(trad.contains("up trend"));
        assert_ne!(ml, trad);
    }
}
