//! Model training and selection
//!
//! Fits every candidate model family on a chronological train split, scores
//! each on the held-out tail with R² and keeps the best. Ties keep the family
//! evaluated first.

use super::importance::permutation_importance;
use super::model::{FittedModel, ModelKind, r2_score};
use super::scaler::StandardScaler;
use crate::domain::config::forecast_config::ModelParams;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::{Trend, TrainedModelResult};
use crate::domain::ml::feature_registry::{
    FeatureRow, features_to_matrix, features_to_vector, targets,
};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Chronological split: the last `ceil(n * test_ratio)` rows are held out.
///
/// Returns the number of training rows.
pub fn split_point(n: usize, test_ratio: f64) -> usize {
    let n_test = (n as f64 * test_ratio).ceil() as usize;
    n.saturating_sub(n_test.min(n))
}

struct Candidate {
    model: FittedModel,
    score: f64,
    latest_prediction: f64,
}

pub struct ModelTrainer {
    params: ModelParams,
}

impl ModelTrainer {
    pub fn new(params: ModelParams) -> Self {
        Self { params }
    }

    /// Trains every family on `rows` and returns the best one's prediction for
    /// the most recent row.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` when fewer than `min_feature_rows` rows exist or
    ///   the split leaves a side empty
    /// - `NoViableModel` when every family fails
    pub fn train_and_select(
        &self,
        symbol: &str,
        rows: &[FeatureRow],
    ) -> Result<TrainedModelResult, ForecastError> {
        let n = rows.len();
        if n < self.params.min_feature_rows {
            return Err(ForecastError::InsufficientData {
                stage: "model training",
                required: self.params.min_feature_rows,
                available: n,
            });
        }

        let n_train = split_point(n, self.params.test_ratio);
        if n_train < 2 || n_train == n {
            return Err(ForecastError::InsufficientData {
                stage: "train/test split",
                required: 3,
                available: n,
            });
        }

        let Some(latest) = rows.last() else {
            return Err(ForecastError::NoViableModel);
        };

        let x = features_to_matrix(rows);
        let y = targets(rows);
        let (x_train, x_test) = x.split_at(n_train);
        let (y_train, y_test) = y.split_at(n_train);

        let scaler = StandardScaler::fit(x_train);
        let x_train_scaled = scaler.transform(x_train);
        let x_test_scaled = scaler.transform(x_test);
        let latest_raw = features_to_vector(latest);
        let latest_scaled = scaler.transform_row(&latest_raw);

        let mut all_predictions = BTreeMap::new();
        let mut best: Option<Candidate> = None;

        for kind in ModelKind::ALL {
            let (train, test, latest_input) = if kind.uses_scaled_features() {
                (&x_train_scaled[..], &x_test_scaled[..], &latest_scaled)
            } else {
                (x_train, x_test, &latest_raw)
            };

            let evaluated = kind.fit(train, y_train, &self.params).and_then(|model| {
                let score = r2_score(y_test, &model.predict(test)?);
                let latest_prediction = model.predict_row(latest_input)?;
                Ok(Candidate {
                    model,
                    score,
                    latest_prediction,
                })
            });

            match evaluated {
                Ok(candidate) => {
                    info!(
                        "{}: {} R²={:.4}, latest prediction {:.2}",
                        symbol,
                        kind.name(),
                        candidate.score,
                        candidate.latest_prediction
                    );
                    all_predictions.insert(kind.name().to_string(), candidate.latest_prediction);
                    let better = best
                        .as_ref()
                        .is_none_or(|current| candidate.score > current.score);
                    if better {
                        best = Some(candidate);
                    }
                }
                Err(e) => warn!("{}: skipping {}: {}", symbol, kind.name(), e),
            }
        }

        let best = best.ok_or(ForecastError::NoViableModel)?;
        let kind = best.model.kind();

        let feature_importance = match kind {
            ModelKind::RandomForest => {
                permutation_importance(&best.model, x_test, y_test, self.params.seed)
                    .unwrap_or_else(|e| {
                        warn!("{}: feature importance unavailable: {}", symbol, e);
                        BTreeMap::new()
                    })
            }
            ModelKind::LinearRegression => BTreeMap::new(),
        };

        let current_price = latest.close;
        info!(
            "{}: selected {} (R²={:.4}) predicting {:.2} from {:.2}",
            symbol,
            kind.name(),
            best.score,
            best.latest_prediction,
            current_price
        );

        Ok(TrainedModelResult {
            symbol: symbol.to_string(),
            model_name: kind.name().to_string(),
            predicted_price: best.latest_prediction,
            current_price,
            trend: Trend::between(current_price, best.latest_prediction),
            accuracy: best.score.max(0.0),
            feature_importance,
            all_predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FEATURE_NAMES;
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn rows(n: usize) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let t = i as f64;
                let close = 100.0 + t + (t * 0.9).sin();
                FeatureRow {
                    date: start + Duration::days(i as i64),
                    close,
                    ma_5: close - 2.0,
                    ma_10: close - 4.5 + (t * 0.35).sin() * 0.5,
                    ma_20: close - 9.5 + (t * 0.15).cos(),
                    rsi: 55.0 + (t * 0.3).sin() * 10.0,
                    macd: 1.0 + (t * 0.2).cos(),
                    volatility: 1.0 + (t * 0.5).sin().abs(),
                    price_change_1d: 0.01 + (t * 0.7).sin() * 0.005,
                    price_change_5d: 0.04 + (t * 0.4).cos() * 0.01,
                    volume_ratio: 1.0 + (t * 1.1).sin() * 0.2,
                    high_low_ratio: 0.02 + (t * 0.8).cos() * 0.005,
                    bb_position: 0.8 + (t * 0.6).sin() * 0.1,
                }
            })
            .collect()
    }

    /// Independent noise features; the close sits in a raised band whenever
    /// ma_5 falls in the middle of its range.
    fn banded_rows(n: usize) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(23);
        (0..n)
            .map(|i| {
                let mut noise = || rng.random_range(0.0..1.0);
                let ma_5: f64 = noise();
                let close = if (0.25..0.75).contains(&ma_5) { 120.0 } else { 100.0 };
                FeatureRow {
                    date: start + Duration::days(i as i64),
                    close,
                    ma_5,
                    ma_10: noise(),
                    ma_20: noise(),
                    rsi: noise(),
                    macd: noise(),
                    volatility: noise(),
                    price_change_1d: noise(),
                    price_change_5d: noise(),
                    volume_ratio: noise(),
                    high_low_ratio: noise(),
                    bb_position: noise(),
                }
            })
            .collect()
    }

    fn fast_params() -> ModelParams {
        ModelParams {
            n_trees: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_point_rounds_test_side_up() {
        assert_eq!(split_point(100, 0.3), 70);
        assert_eq!(split_point(31, 0.3), 21);
        assert_eq!(split_point(30, 0.3), 21);
        assert_eq!(split_point(1, 0.3), 0);
    }

    #[test]
    fn test_rejects_too_few_rows() {
        let trainer = ModelTrainer::new(fast_params());
        let err = trainer.train_and_select("TEST", &rows(29)).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                required: 30,
                available: 29,
                ..
            }
        ));
    }

    #[test]
    fn test_trending_rows_select_a_model() {
        let trainer = ModelTrainer::new(fast_params());
        let data = rows(120);
        let result = trainer.train_and_select("TEST", &data).unwrap();

        assert_eq!(result.symbol, "TEST");
        assert_eq!(result.all_predictions.len(), 2);
        assert!(result.all_predictions.contains_key(&result.model_name));
        assert_eq!(result.current_price, data.last().unwrap().close);
        assert!((0.0..=1.0).contains(&result.accuracy));
        assert!(result.predicted_price.is_finite());
        assert_eq!(
            result.trend,
            Trend::between(result.current_price, result.predicted_price)
        );
    }

    #[test]
    fn test_linear_wins_on_extrapolation() {
        // Target is an exact linear function of ma_5, and test rows lie beyond
        // every training value, where trees cannot follow.
        let trainer = ModelTrainer::new(fast_params());
        let result = trainer.train_and_select("TEST", &rows(120)).unwrap();

        assert_eq!(result.model_name, "LinearRegression");
        assert!(result.accuracy > 0.99);
        assert!(result.feature_importance.is_empty());
    }

    #[test]
    fn test_forest_wins_on_non_linear_target() {
        let trainer = ModelTrainer::new(fast_params());
        let result = trainer.train_and_select("TEST", &banded_rows(200)).unwrap();

        assert_eq!(result.model_name, "RandomForest");
        assert!(result.accuracy > 0.5);

        let importance = &result.feature_importance;
        assert_eq!(importance.len(), FEATURE_NAMES.len());
        assert!((importance.values().sum::<f64>() - 1.0).abs() < 1e-9);
        let top = importance
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, _)| name.as_str());
        assert_eq!(top, Some("ma_5"));
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let trainer = ModelTrainer::new(fast_params());
        let data = rows(80);
        let first = trainer.train_and_select("TEST", &data).unwrap();
        let second = trainer.train_and_select("TEST", &data).unwrap();
        assert_eq!(first, second);
    }
}
