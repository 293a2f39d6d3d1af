use crate::config::{Config, PriceSourceMode};
use crate::domain::market::history_period::HistoryPeriod;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const KEYS: &[&str] = &[
    "FORECAST_HORIZON_DAYS",
    "ML_ENABLED",
    "ML_MIN_HISTORY",
    "ML_MIN_FEATURE_ROWS",
    "ML_TEST_RATIO",
    "RF_N_TREES",
    "RF_MAX_DEPTH",
    "RF_MIN_SAMPLES_SPLIT",
    "RF_SEED",
    "FALLBACK_MIN_RECORDS",
    "FALLBACK_LOOKBACK",
    "ML_CONFIDENCE_BUCKET_SECS",
    "TRADITIONAL_CONFIDENCE_BUCKET_SECS",
    "PRICE_SOURCE",
    "PRICE_CSV_PATH",
    "HISTORY_PERIOD",
    "SYNTHETIC_SEED",
];

fn clear_env() {
    for key in KEYS {
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.horizon_days, 7);
    assert!(config.model.ml_enabled);
    assert_eq!(config.model.n_trees, 100);
    assert_eq!(config.model.max_depth, 10);
    assert_eq!(config.model.min_feature_rows, 30);
    assert_eq!(config.model.min_samples_split, 2);
    assert_eq!(config.model.seed, 42);
    assert_eq!(config.fallback.lookback, 30);
    assert_eq!(config.data_source.mode, PriceSourceMode::Synthetic);
    assert_eq!(config.data_source.history_period, HistoryPeriod::OneYear);
    assert!(config.data_source.synthetic_seed.is_none());

    let forecast = config.to_forecast_config().unwrap();
    assert_eq!(forecast.model.min_history, 60);
    assert_eq!(forecast.buckets.ml_secs, 10);
    assert_eq!(forecast.buckets.traditional_secs, 8);
}

#[test]
fn test_config_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    unsafe {
        env::set_var("FORECAST_HORIZON_DAYS", "14");
        env::set_var("ML_ENABLED", "false");
        env::set_var("RF_N_TREES", "25");
        env::set_var("PRICE_SOURCE", "csv");
        env::set_var("PRICE_CSV_PATH", "/tmp/prices.csv");
        env::set_var("HISTORY_PERIOD", "6mo");
        env::set_var("SYNTHETIC_SEED", "99");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.horizon_days, 14);
    assert!(!config.model.ml_enabled);
    assert_eq!(config.model.n_trees, 25);
    assert_eq!(config.data_source.mode, PriceSourceMode::Csv);
    assert_eq!(config.data_source.csv_path.to_str(), Some("/tmp/prices.csv"));
    assert_eq!(config.data_source.history_period, HistoryPeriod::SixMonths);
    assert_eq!(config.data_source.synthetic_seed, Some(99));

    clear_env();
}

#[test]
fn test_training_and_bucket_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    unsafe {
        env::set_var("ML_MIN_FEATURE_ROWS", "40");
        env::set_var("RF_MIN_SAMPLES_SPLIT", "4");
        env::set_var("RF_SEED", "7");
        env::set_var("ML_CONFIDENCE_BUCKET_SECS", "30");
        env::set_var("TRADITIONAL_CONFIDENCE_BUCKET_SECS", "12");
    }

    let forecast = Config::from_env().unwrap().to_forecast_config().unwrap();
    assert_eq!(forecast.model.min_feature_rows, 40);
    assert_eq!(forecast.model.min_samples_split, 4);
    assert_eq!(forecast.model.seed, 7);
    assert_eq!(forecast.buckets.ml_secs, 30);
    assert_eq!(forecast.buckets.traditional_secs, 12);

    clear_env();
}

#[test]
fn test_config_rejects_bad_values() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    unsafe { env::set_var("RF_MAX_DEPTH", "deep") };
    assert!(Config::from_env().is_err());
    clear_env();

    unsafe { env::set_var("HISTORY_PERIOD", "2y") };
    assert!(Config::from_env().is_err());
    clear_env();

    // Parses, but fails domain validation
    unsafe { env::set_var("ML_TEST_RATIO", "1.5") };
    let config = Config::from_env().unwrap();
    assert!(config.to_forecast_config().is_err());
    clear_env();

    unsafe {
        env::set_var("FALLBACK_MIN_RECORDS", "25");
        env::set_var("FALLBACK_LOOKBACK", "20");
    }
    let config = Config::from_env().unwrap();
    assert!(config.to_forecast_config().is_err());
    clear_env();
}
