//! Forecast orchestration
//!
//! Each request tries the ML path first and falls back to the moving-average
//! predictor. Whatever succeeds is persisted under (symbol, target_date),
//! replacing any earlier forecast for the same key. When both paths fail
//! nothing is written.

use super::traditional::{TraditionalPrediction, predict_traditional};
use crate::application::confidence::ml_confidence::calculate_ml_confidence;
use crate::application::market_data::chart_summary::summarize_series;
use crate::application::market_data::feature_builder::build_feature_table;
use crate::application::market_data::price_updater::validate_symbol;
use crate::application::ml::trainer::ModelTrainer;
use crate::domain::config::forecast_config::ForecastConfig;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::{
    ForecastDetails, ForecastOutcome, ForecastRecord, TrainedModelResult, Trend, ml_method_label,
    traditional_method_label,
};
use crate::domain::market::price::{PriceSeries, SeriesSummary};
use crate::domain::ml::feature_registry::FeatureRow;
use crate::domain::ports::PriceHistoryStore;
use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::sync::Arc;
use tracing::{info, warn};

struct MachineLearningForecast {
    result: TrainedModelResult,
    confidence: f64,
    price: Decimal,
}

pub struct ForecastService {
    store: Arc<dyn PriceHistoryStore>,
    config: ForecastConfig,
    trainer: ModelTrainer,
}

impl ForecastService {
    pub fn new(store: Arc<dyn PriceHistoryStore>, config: ForecastConfig) -> Self {
        let trainer = ModelTrainer::new(config.model.clone());
        Self {
            store,
            config,
            trainer,
        }
    }

    /// Forecasts `symbol` `horizon_days` ahead of today and stores the result.
    pub async fn compute_forecast(
        &self,
        symbol: &str,
        horizon_days: u32,
    ) -> Result<ForecastOutcome, ForecastError> {
        self.compute_forecast_at(symbol, horizon_days, Utc::now()).await
    }

    /// Same as [`compute_forecast`](Self::compute_forecast) with an explicit
    /// clock, which fixes the target date and the confidence time buckets.
    pub async fn compute_forecast_at(
        &self,
        symbol: &str,
        horizon_days: u32,
        now: DateTime<Utc>,
    ) -> Result<ForecastOutcome, ForecastError> {
        validate_symbol(symbol)?;

        let series = self.store.read_series(symbol).await?;
        let outcome = self.forecast_series(&series, horizon_days, now)?;

        self.store
            .replace_forecast(symbol, outcome.record.target_date, outcome.record.clone())
            .await?;

        info!(
            "{}: stored forecast {} for {} ({}, confidence {:.2})",
            symbol,
            outcome.record.predicted_price,
            outcome.record.target_date,
            outcome.record.method,
            outcome.record.confidence
        );
        Ok(outcome)
    }

    /// Feature table for the stored history of `symbol`.
    pub async fn build_features(&self, symbol: &str) -> Result<Vec<FeatureRow>, ForecastError> {
        validate_symbol(symbol)?;
        let series = self.store.read_series(symbol).await?;
        Ok(build_feature_table(&series))
    }

    pub async fn chart_summary(
        &self,
        symbol: &str,
        window_days: usize,
    ) -> Result<SeriesSummary, ForecastError> {
        validate_symbol(symbol)?;
        let series = self.store.read_series(symbol).await?;
        Ok(summarize_series(&series, window_days))
    }

    /// Runs the ML path, then the fallback, on an in-memory series. Stores
    /// nothing.
    pub fn forecast_series(
        &self,
        series: &PriceSeries,
        horizon_days: u32,
        now: DateTime<Utc>,
    ) -> Result<ForecastOutcome, ForecastError> {
        let symbol = series.symbol();
        let target_date = target_date(now, horizon_days).ok_or_else(|| {
            ForecastError::Unavailable {
                symbol: symbol.to_string(),
                reason: format!("horizon of {} days is out of range", horizon_days),
            }
        })?;

        let ml_error = match self.try_machine_learning(series, now) {
            Ok(ml) => return Ok(ml_outcome(ml, target_date, now)),
            Err(e) => e,
        };
        info!("{}: using moving-average fallback ({})", symbol, ml_error);

        let fallback = predict_traditional(
            series,
            &self.config.fallback,
            now,
            self.config.buckets.traditional_secs,
        )
        .and_then(|p| {
            let price = to_price(p.predicted_price, "traditional")?;
            Ok((p, price))
        });

        match fallback {
            Ok((prediction, price)) => Ok(traditional_outcome(
                symbol,
                prediction,
                price,
                target_date,
                now,
            )),
            Err(e) => {
                warn!("{}: no forecast possible: {}", symbol, e);
                Err(ForecastError::Unavailable {
                    symbol: symbol.to_string(),
                    reason: format!("{}; {}", ml_error, e),
                })
            }
        }
    }

    fn try_machine_learning(
        &self,
        series: &PriceSeries,
        now: DateTime<Utc>,
    ) -> Result<MachineLearningForecast, ForecastError> {
        if !self.config.ml_enabled {
            return Err(ForecastError::MachineLearningDisabled);
        }
        if series.len() < self.config.model.min_history {
            return Err(ForecastError::InsufficientData {
                stage: "machine learning",
                required: self.config.model.min_history,
                available: series.len(),
            });
        }

        let rows = build_feature_table(series);
        let result = self.trainer.train_and_select(series.symbol(), &rows)?;
        let price = to_price(result.predicted_price, "machine learning")?;
        let confidence =
            calculate_ml_confidence(&result, &rows, now, self.config.buckets.ml_secs);

        Ok(MachineLearningForecast {
            result,
            confidence,
            price,
        })
    }
}

fn target_date(now: DateTime<Utc>, horizon_days: u32) -> Option<NaiveDate> {
    now.date_naive()
        .checked_add_days(Days::new(u64::from(horizon_days)))
}

fn to_price(value: f64, stage: &'static str) -> Result<Decimal, ForecastError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| ForecastError::ModelFitFailure {
            model: stage.to_string(),
            reason: format!("prediction {} is not representable", value),
        })
}

fn ml_outcome(
    ml: MachineLearningForecast,
    target_date: NaiveDate,
    now: DateTime<Utc>,
) -> ForecastOutcome {
    let MachineLearningForecast {
        result,
        confidence,
        price,
    } = ml;

    ForecastOutcome {
        record: ForecastRecord {
            symbol: result.symbol.clone(),
            target_date,
            predicted_price: price,
            confidence,
            method: ml_method_label(&result.model_name),
            created_at: now,
        },
        trend: result.trend,
        current_price: result.current_price,
        raw_predicted_price: result.predicted_price,
        details: ForecastDetails::MachineLearning {
            model_name: result.model_name,
            accuracy: result.accuracy,
            feature_importance: result.feature_importance,
            all_predictions: result.all_predictions,
        },
    }
}

fn traditional_outcome(
    symbol: &str,
    prediction: TraditionalPrediction,
    price: Decimal,
    target_date: NaiveDate,
    now: DateTime<Utc>,
) -> ForecastOutcome {
    ForecastOutcome {
        record: ForecastRecord {
            symbol: symbol.to_string(),
            target_date,
            predicted_price: price,
            confidence: prediction.confidence,
            method: traditional_method_label(prediction.trend),
            created_at: now,
        },
        trend: Trend::between(prediction.current_price, prediction.predicted_price),
        current_price: prediction.current_price,
        raw_predicted_price: prediction.predicted_price,
        details: ForecastDetails::Traditional {
            ma_5: prediction.ma_5,
            ma_20: prediction.ma_20,
            volatility: prediction.volatility,
            trend_strength: prediction.trend_strength,
        },
    }
}
