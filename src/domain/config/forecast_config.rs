//! Forecast Configuration Domain Value Object
//!
//! Groups every tunable of the forecasting engine and validates it on
//! construction. Confidence bounds are not tunable; they live as constants
//! next to the scorers.

use thiserror::Error;

/// Error type for ForecastConfig validation
#[derive(Debug, Error, PartialEq)]
pub enum ForecastConfigError {
    #[error("Invalid ratio: {field} = {value}. Must be strictly between 0.0 and 1.0")]
    InvalidRatio { field: String, value: f64 },

    #[error("Invalid limit: {field} = {value}. Must be positive")]
    InvalidLimit { field: String, value: usize },

    #[error("Inconsistent limits: {field} = {value} must be >= {min}")]
    InconsistentLimit {
        field: String,
        value: usize,
        min: usize,
    },
}

/// Parameters of the model trainer and selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    /// Records required before the ML path is attempted
    pub min_history: usize,
    /// Complete feature rows required to train
    pub min_feature_rows: usize,
    /// Chronological hold-out fraction (no shuffling)
    pub test_ratio: f64,
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    /// Seed for the forest bootstrap and permutation importance
    pub seed: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            min_history: 60,
            min_feature_rows: 30,
            test_ratio: 0.3,
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Parameters of the moving-average fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackParams {
    pub min_records: usize,
    /// Preferred number of recent records
    pub lookback: usize,
}

impl Default for FallbackParams {
    fn default() -> Self {
        Self {
            min_records: 20,
            lookback: 30,
        }
    }
}

/// Width of the time buckets keying the pseudo-random confidence factors.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBuckets {
    pub ml_secs: i64,
    pub traditional_secs: i64,
}

impl Default for ConfidenceBuckets {
    fn default() -> Self {
        Self {
            ml_secs: 10,
            traditional_secs: 8,
        }
    }
}

/// Forecasting engine configuration value object
///
/// # Invariants
///
/// - `horizon_days` > 0
/// - `model.test_ratio` in (0.0, 1.0)
/// - every count and bucket width > 0
/// - `fallback.lookback` >= `fallback.min_records`, and
///   `fallback.min_records` >= 20 so both moving averages are defined
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub horizon_days: u32,
    pub ml_enabled: bool,
    pub model: ModelParams,
    pub fallback: FallbackParams,
    pub buckets: ConfidenceBuckets,
}

impl ForecastConfig {
    /// Create a new ForecastConfig with validation
    ///
    /// # Errors
    ///
    /// Returns `ForecastConfigError` if any parameter violates invariants
    pub fn new(
        horizon_days: u32,
        ml_enabled: bool,
        model: ModelParams,
        fallback: FallbackParams,
        buckets: ConfidenceBuckets,
    ) -> Result<Self, ForecastConfigError> {
        let config = Self {
            horizon_days,
            ml_enabled,
            model,
            fallback,
            buckets,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ForecastConfigError> {
        Self::validate_positive("horizon_days", self.horizon_days as usize)?;

        let ratio = self.model.test_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(ForecastConfigError::InvalidRatio {
                field: "test_ratio".to_string(),
                value: ratio,
            });
        }

        Self::validate_positive("min_history", self.model.min_history)?;
        Self::validate_positive("min_feature_rows", self.model.min_feature_rows)?;
        Self::validate_positive("n_trees", self.model.n_trees)?;
        Self::validate_positive("max_depth", self.model.max_depth as usize)?;
        Self::validate_positive("min_samples_split", self.model.min_samples_split)?;
        Self::validate_positive("ml_bucket_secs", self.buckets.ml_secs.max(0) as usize)?;
        Self::validate_positive(
            "traditional_bucket_secs",
            self.buckets.traditional_secs.max(0) as usize,
        )?;

        if self.fallback.min_records < 20 {
            return Err(ForecastConfigError::InconsistentLimit {
                field: "fallback_min_records".to_string(),
                value: self.fallback.min_records,
                min: 20,
            });
        }
        if self.fallback.lookback < self.fallback.min_records {
            return Err(ForecastConfigError::InconsistentLimit {
                field: "fallback_lookback".to_string(),
                value: self.fallback.lookback,
                min: self.fallback.min_records,
            });
        }

        Ok(())
    }

    fn validate_positive(field: &str, value: usize) -> Result<(), ForecastConfigError> {
        if value == 0 {
            return Err(ForecastConfigError::InvalidLimit {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// Same configuration with the ML path switched off.
    pub fn without_ml(mut self) -> Self {
        self.ml_enabled = false;
        self
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            ml_enabled: true,
            model: ModelParams::default(),
            fallback: FallbackParams::default(),
            buckets: ConfidenceBuckets::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        model: ModelParams,
        fallback: FallbackParams,
    ) -> Result<ForecastConfig, ForecastConfigError> {
        ForecastConfig::new(7, true, model, fallback, ConfidenceBuckets::default())
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizon_days, 7);
        assert_eq!(config.model.n_trees, 100);
        assert_eq!(config.model.max_depth, 10);
        assert_eq!(config.fallback.lookback, 30);
    }

    #[test]
    fn test_invalid_test_ratio() {
        let model = ModelParams {
            test_ratio: 1.0,
            ..Default::default()
        };
        assert_eq!(
            build(model, FallbackParams::default()).unwrap_err(),
            ForecastConfigError::InvalidRatio {
                field: "test_ratio".to_string(),
                value: 1.0,
            }
        );
    }

    #[test]
    fn test_zero_trees_rejected() {
        let model = ModelParams {
            n_trees: 0,
            ..Default::default()
        };
        assert_eq!(
            build(model, FallbackParams::default()).unwrap_err(),
            ForecastConfigError::InvalidLimit {
                field: "n_trees".to_string(),
                value: 0,
            }
        );
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = ForecastConfig::new(
            0,
            true,
            ModelParams::default(),
            FallbackParams::default(),
            ConfidenceBuckets::default(),
        );
        assert!(matches!(
            result,
            Err(ForecastConfigError::InvalidLimit { .. })
        ));
    }

    #[test]
    fn test_lookback_below_minimum_rejected() {
        let fallback = FallbackParams {
            min_records: 25,
            lookback: 22,
        };
        assert_eq!(
            build(ModelParams::default(), fallback).unwrap_err(),
            ForecastConfigError::InconsistentLimit {
                field: "fallback_lookback".to_string(),
                value: 22,
                min: 25,
            }
        );
    }

    #[test]
    fn test_without_ml() {
        let config = ForecastConfig::default().without_ml();
        assert!(!config.ml_enabled);
    }
}
