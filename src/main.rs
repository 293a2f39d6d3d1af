//! pricecast - closing price forecasts from daily history
//!
//! Loads history for a symbol from the configured source into an in-memory
//! store, then prints the requested view as JSON on stdout. Logs go to
//! stderr.
//!
//! # Usage
//! ```sh
//! pricecast forecast 7203 --horizon 7
//! PRICE_SOURCE=csv PRICE_CSV_PATH=data/prices.csv pricecast chart AAPL --days 30
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use pricecast::application::market_data::price_updater::refresh_prices;
use pricecast::application::prediction::forecast_service::ForecastService;
use pricecast::config::{Config, PriceSourceMode};
use pricecast::domain::market::history_period::HistoryPeriod;
use pricecast::domain::ports::PriceDataSource;
use pricecast::infrastructure::csv_prices::CsvPriceSource;
use pricecast::infrastructure::repositories::InMemoryPriceHistoryStore;
use pricecast::infrastructure::simulation::SyntheticPriceSource;
use serde::Serialize;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// History window to load (1d, 5d, 1mo, 3mo, 6mo, 1y); overrides HISTORY_PERIOD
    #[arg(long, global = true)]
    period: Option<HistoryPeriod>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forecast the closing price `horizon` days ahead
    Forecast {
        symbol: String,

        /// Days ahead of today; defaults to FORECAST_HORIZON_DAYS
        #[arg(long)]
        horizon: Option<u32>,

        /// Skip the ML path and use the moving-average fallback
        #[arg(long)]
        no_ml: bool,
    },
    /// Recent closes and volumes for charting
    Chart {
        symbol: String,

        #[arg(long, default_value_t = 30)]
        days: usize,
    },
    /// Technical indicator feature table
    Features { symbol: String },
    /// Load history and report how many records were stored
    Refresh { symbol: String },
}

impl Command {
    fn symbol(&self) -> &str {
        match self {
            Command::Forecast { symbol, .. }
            | Command::Chart { symbol, .. }
            | Command::Features { symbol }
            | Command::Refresh { symbol } => symbol,
        }
    }
}

fn build_source(config: &Config) -> Box<dyn PriceDataSource> {
    match config.data_source.mode {
        PriceSourceMode::Csv => {
            Box::new(CsvPriceSource::new(config.data_source.csv_path.clone()))
        }
        PriceSourceMode::Synthetic => {
            let mut source = SyntheticPriceSource::new();
            if let Some(seed) = config.data_source.synthetic_seed {
                source = source.with_seed(seed);
            }
            Box::new(source)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let mut forecast_config = config.to_forecast_config()?;

    let store = Arc::new(InMemoryPriceHistoryStore::new());
    let source = build_source(&config);
    let period = cli.period.unwrap_or(config.data_source.history_period);
    let symbol = cli.command.symbol().to_string();

    let report = refresh_prices(store.as_ref(), source.as_ref(), &symbol, period).await?;
    info!(
        "pricecast {}: {} records loaded for {} from {}",
        env!("CARGO_PKG_VERSION"),
        report.inserted,
        symbol,
        source.name()
    );

    match cli.command {
        Command::Forecast { horizon, no_ml, .. } => {
            if no_ml {
                forecast_config = forecast_config.without_ml();
            }
            let horizon = horizon.unwrap_or(forecast_config.horizon_days);
            let service = ForecastService::new(store.clone(), forecast_config);
            let outcome = service.compute_forecast(&symbol, horizon).await?;
            print_json(&outcome)?;
        }
        Command::Chart { days, .. } => {
            let service = ForecastService::new(store.clone(), forecast_config);
            print_json(&service.chart_summary(&symbol, days).await?)?;
        }
        Command::Features { .. } => {
            let service = ForecastService::new(store.clone(), forecast_config);
            print_json(&service.build_features(&symbol).await?)?;
        }
        Command::Refresh { .. } => print_json(&report)?,
    }

    Ok(())
}
