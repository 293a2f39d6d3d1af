//! Price data source configuration parsing from environment variables.

use crate::domain::market::history_period::HistoryPeriod;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where price history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSourceMode {
    Synthetic,
    Csv,
}

impl FromStr for PriceSourceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synthetic" => Ok(PriceSourceMode::Synthetic),
            "csv" => Ok(PriceSourceMode::Csv),
            _ => anyhow::bail!("Invalid PRICE_SOURCE: {}. Must be 'synthetic' or 'csv'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceEnvConfig {
    pub mode: PriceSourceMode,
    pub csv_path: PathBuf,
    pub history_period: HistoryPeriod,
    /// Fixed seed for synthetic data; random when unset
    pub synthetic_seed: Option<u64>,
}

impl DataSourceEnvConfig {
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("PRICE_SOURCE").unwrap_or_else(|_| "synthetic".to_string());
        let period_str = env::var("HISTORY_PERIOD").unwrap_or_else(|_| "1y".to_string());
        let synthetic_seed = match env::var("SYNTHETIC_SEED") {
            Ok(s) => Some(
                s.parse::<u64>()
                    .context("Failed to parse SYNTHETIC_SEED")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            mode: PriceSourceMode::from_str(&mode_str)?,
            csv_path: PathBuf::from(
                env::var("PRICE_CSV_PATH").unwrap_or_else(|_| "data/prices.csv".to_string()),
            ),
            history_period: HistoryPeriod::from_str(&period_str)?,
            synthetic_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_source_mode_parsing() {
        assert_eq!(
            PriceSourceMode::from_str("CSV").unwrap(),
            PriceSourceMode::Csv
        );
        assert_eq!(
            PriceSourceMode::from_str("synthetic").unwrap(),
            PriceSourceMode::Synthetic
        );
        assert!(PriceSourceMode::from_str("yahoo").is_err());
    }
}
