//! Model training configuration parsing from environment variables.

use super::parse_env;
use anyhow::Result;

/// ML path environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub ml_enabled: bool,
    pub min_history: usize,
    pub min_feature_rows: usize,
    pub test_ratio: f64,
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            ml_enabled: parse_env("ML_ENABLED", true)?,
            min_history: parse_env("ML_MIN_HISTORY", 60)?,
            min_feature_rows: parse_env("ML_MIN_FEATURE_ROWS", 30)?,
            test_ratio: parse_env("ML_TEST_RATIO", 0.3)?,
            n_trees: parse_env("RF_N_TREES", 100)?,
            max_depth: parse_env("RF_MAX_DEPTH", 10)?,
            min_samples_split: parse_env("RF_MIN_SAMPLES_SPLIT", 2)?,
            seed: parse_env("RF_SEED", 42)?,
        })
    }
}
