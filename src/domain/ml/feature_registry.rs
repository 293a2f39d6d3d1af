use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered list of model input columns.
/// This order defines the column layout of every training matrix and of the
/// feature-importance keys.
pub const FEATURE_NAMES: &[&str] = &[
    "ma_5",
    "ma_10",
    "ma_20",
    "rsi",
    "macd",
    "volatility",
    "price_change_1d",
    "price_change_5d",
    "volume_ratio",
    "high_low_ratio",
    "bb_position",
];

/// Fully populated indicator row for one date.
///
/// Rows only exist once every trailing window is covered and every indicator
/// is defined; partial rows are never materialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// Training target, aligned by date
    pub close: f64,
    pub ma_5: f64,
    pub ma_10: f64,
    pub ma_20: f64,
    pub rsi: f64,
    pub macd: f64,
    pub volatility: f64,
    pub price_change_1d: f64,
    pub price_change_5d: f64,
    pub volume_ratio: f64,
    pub high_low_ratio: f64,
    pub bb_position: f64,
}

/// Converts a row into the model input vector, in `FEATURE_NAMES` order.
pub fn features_to_vector(row: &FeatureRow) -> Vec<f64> {
    vec![
        row.ma_5,
        row.ma_10,
        row.ma_20,
        row.rsi,
        row.macd,
        row.volatility,
        row.price_change_1d,
        row.price_change_5d,
        row.volume_ratio,
        row.high_low_ratio,
        row.bb_position,
    ]
}

pub fn features_to_matrix(rows: &[FeatureRow]) -> Vec<Vec<f64>> {
    rows.iter().map(features_to_vector).collect()
}

pub fn targets(rows: &[FeatureRow]) -> Vec<f64> {
    rows.iter().map(|r| r.close).collect()
}
