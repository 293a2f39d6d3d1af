//! Technical-indicator feature table
//!
//! Turns an ascending daily price series into one `FeatureRow` per date on
//! which every indicator is defined. Columns are computed once over the whole
//! series; rows are then assembled date by date and any row with an undefined
//! value is dropped.

use crate::application::market_data::indicators::{
    bollinger_position, macd, pct_change, rolling_mean, rolling_std, rsi,
};
use crate::domain::errors::ForecastError;
use crate::domain::market::price::{PriceRecord, PriceSeries};
use crate::domain::ml::feature_registry::FeatureRow;
use chrono::NaiveDate;
use tracing::debug;

pub const RSI_WINDOW: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const VOLATILITY_WINDOW: usize = 10;
pub const VOLUME_WINDOW: usize = 20;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_K: f64 = 2.0;

/// Longest trailing window; rows before `LONGEST_WINDOW - 1` never exist.
pub const LONGEST_WINDOW: usize = 20;

struct FeatureColumns {
    ma_5: Vec<Option<f64>>,
    ma_10: Vec<Option<f64>>,
    ma_20: Vec<Option<f64>>,
    rsi: Vec<Option<f64>>,
    macd: Vec<f64>,
    volatility: Vec<Option<f64>>,
    change_1d: Vec<Option<f64>>,
    change_5d: Vec<Option<f64>>,
    volume_mean: Vec<Option<f64>>,
    bb_mean: Vec<Option<f64>>,
    bb_std: Vec<Option<f64>>,
}

impl FeatureColumns {
    fn compute(closes: &[f64], volumes: &[f64]) -> Option<Self> {
        Some(Self {
            ma_5: rolling_mean(closes, 5),
            ma_10: rolling_mean(closes, 10),
            ma_20: rolling_mean(closes, 20),
            rsi: rsi(closes, RSI_WINDOW),
            macd: macd(closes, MACD_FAST, MACD_SLOW)?,
            volatility: rolling_std(closes, VOLATILITY_WINDOW),
            change_1d: pct_change(closes, 1),
            change_5d: pct_change(closes, 5),
            volume_mean: rolling_mean(volumes, VOLUME_WINDOW),
            bb_mean: rolling_mean(closes, BOLLINGER_WINDOW),
            bb_std: rolling_std(closes, BOLLINGER_WINDOW),
        })
    }
}

fn require(
    value: Option<f64>,
    indicator: &'static str,
    date: NaiveDate,
) -> Result<f64, ForecastError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ForecastError::UndefinedIndicator { indicator, date }),
    }
}

/// Builds the feature table for `series`.
///
/// Rows come out in date order. On a clean series the first row sits at index
/// `LONGEST_WINDOW - 1`; zero-width Bollinger bands, windows without any price
/// movement (RSI) and zero reference prices or volumes drop further rows.
pub fn build_feature_table(series: &PriceSeries) -> Vec<FeatureRow> {
    let records = series.ascending();
    let closes: Vec<f64> = records.iter().map(|r| r.close_f64()).collect();
    let volumes: Vec<f64> = records.iter().map(|r| r.volume as f64).collect();

    let Some(columns) = FeatureColumns::compute(&closes, &volumes) else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(records.len().saturating_sub(LONGEST_WINDOW - 1));
    let mut dropped = 0usize;

    for (i, record) in records.iter().enumerate() {
        if i + 1 < LONGEST_WINDOW {
            continue;
        }
        match assemble_row(i, record, &closes, &columns) {
            Ok(row) => rows.push(row),
            Err(e) => {
                dropped += 1;
                debug!("Dropping feature row for {}: {}", series.symbol(), e);
            }
        }
    }

    if dropped > 0 {
        debug!(
            "{}: {} feature rows dropped after warmup, {} kept",
            series.symbol(),
            dropped,
            rows.len()
        );
    }

    rows
}

fn assemble_row(
    i: usize,
    record: &PriceRecord,
    closes: &[f64],
    c: &FeatureColumns,
) -> Result<FeatureRow, ForecastError> {
    let date = record.date;
    let close = closes[i];

    let volume_mean = require(c.volume_mean[i], "volume_ratio", date)?;
    let volume_ratio = if volume_mean > 0.0 {
        Some(record.volume as f64 / volume_mean)
    } else {
        None
    };

    let high_low_ratio = if close != 0.0 {
        Some((record.high_f64() - record.low_f64()) / close)
    } else {
        None
    };

    let bb_mean = require(c.bb_mean[i], "bb_position", date)?;
    let bb_std = require(c.bb_std[i], "bb_position", date)?;

    Ok(FeatureRow {
        date,
        close,
        ma_5: require(c.ma_5[i], "ma_5", date)?,
        ma_10: require(c.ma_10[i], "ma_10", date)?,
        ma_20: require(c.ma_20[i], "ma_20", date)?,
        rsi: require(c.rsi[i], "rsi", date)?,
        macd: require(Some(c.macd[i]), "macd", date)?,
        volatility: require(c.volatility[i], "volatility", date)?,
        price_change_1d: require(c.change_1d[i], "price_change_1d", date)?,
        price_change_5d: require(c.change_5d[i], "price_change_5d", date)?,
        volume_ratio: require(volume_ratio, "volume_ratio", date)?,
        high_low_ratio: require(high_low_ratio, "high_low_ratio", date)?,
        bb_position: require(
            bollinger_position(close, bb_mean, bb_std, BOLLINGER_K),
            "bb_position",
            date,
        )?,
    })
}
