//! Configuration domain module
//!
//! Validated value objects consumed by the forecasting services. Parsing from
//! the environment lives in the top-level `config` module.

pub mod forecast_config;

pub use forecast_config::{ConfidenceBuckets, FallbackParams, ForecastConfig, ModelParams};
