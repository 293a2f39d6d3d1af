//! Configuration module for pricecast.
//!
//! Loads every setting from environment variables (a `.env` file is honoured
//! by the binary), grouped by concern: model training, fallback and
//! confidence, and the price data source.

mod data_source_config;
mod fallback_config;
mod model_config;

pub use data_source_config::{DataSourceEnvConfig, PriceSourceMode};
pub use fallback_config::FallbackEnvConfig;
pub use model_config::ModelEnvConfig;

use crate::domain::config::forecast_config::{
    ConfidenceBuckets, FallbackParams, ForecastConfig, ModelParams,
};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub horizon_days: u32,
    pub model: ModelEnvConfig,
    pub fallback: FallbackEnvConfig,
    pub data_source: DataSourceEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            horizon_days: parse_env("FORECAST_HORIZON_DAYS", 7)?,
            model: ModelEnvConfig::from_env().context("Failed to load model config")?,
            fallback: FallbackEnvConfig::from_env().context("Failed to load fallback config")?,
            data_source: DataSourceEnvConfig::from_env()
                .context("Failed to load data source config")?,
        })
    }

    /// Create a validated ForecastConfig domain value object from this Config
    pub fn to_forecast_config(&self) -> Result<ForecastConfig> {
        ForecastConfig::new(
            self.horizon_days,
            self.model.ml_enabled,
            ModelParams {
                min_history: self.model.min_history,
                min_feature_rows: self.model.min_feature_rows,
                test_ratio: self.model.test_ratio,
                n_trees: self.model.n_trees,
                max_depth: self.model.max_depth,
                min_samples_split: self.model.min_samples_split,
                seed: self.model.seed,
            },
            FallbackParams {
                min_records: self.fallback.min_records,
                lookback: self.fallback.lookback,
            },
            ConfidenceBuckets {
                ml_secs: self.fallback.ml_bucket_secs,
                traditional_secs: self.fallback.traditional_bucket_secs,
            },
        )
        .map_err(|e| anyhow::anyhow!("Invalid forecast config: {}", e))
    }
}

/// Reads `key`, falling back to `default` when unset.
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        Err(_) => Ok(default),
    }
}
