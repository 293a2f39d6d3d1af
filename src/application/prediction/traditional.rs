//! Moving-average crossover fallback
//!
//! Used whenever the ML path is disabled or fails. Projects the last close by
//! a tenth of the relative gap between the 5- and 20-day averages, in the
//! direction of the crossover.

use crate::application::confidence::traditional_confidence::calculate_traditional_confidence;
use crate::application::market_data::indicators::{
    calculate_moving_average, return_volatility,
};
use crate::domain::config::forecast_config::FallbackParams;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::Trend;
use crate::domain::market::price::PriceSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

const SHORT_WINDOW: usize = 5;
const LONG_WINDOW: usize = 20;
const VOLATILITY_WINDOW: usize = 10;
const STRENGTH_DAMPING: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraditionalPrediction {
    pub predicted_price: f64,
    pub current_price: f64,
    /// Crossover direction, not the sign of the predicted move
    pub trend: Trend,
    pub ma_5: f64,
    pub ma_20: f64,
    pub volatility: f64,
    pub trend_strength: f64,
    pub records_used: usize,
    pub confidence: f64,
}

pub fn predict_traditional(
    series: &PriceSeries,
    params: &FallbackParams,
    now: DateTime<Utc>,
    bucket_secs: i64,
) -> Result<TraditionalPrediction, ForecastError> {
    let window = series.tail(params.lookback);
    if window.len() < params.min_records {
        return Err(ForecastError::FallbackInsufficientData {
            required: params.min_records,
            available: window.len(),
        });
    }

    let closes: Vec<f64> = window.iter().map(|r| r.close_f64()).collect();
    let insufficient = || ForecastError::FallbackInsufficientData {
        required: LONG_WINDOW,
        available: closes.len(),
    };
    let ma_5 = calculate_moving_average(&closes, SHORT_WINDOW).ok_or_else(insufficient)?;
    let ma_20 = calculate_moving_average(&closes, LONG_WINDOW).ok_or_else(insufficient)?;
    let (current_price, last_date) = match window.last() {
        Some(last) => (last.close_f64(), last.date),
        None => return Err(insufficient()),
    };

    if ma_20 <= 0.0 {
        return Err(ForecastError::UndefinedIndicator {
            indicator: "trend_strength",
            date: last_date,
        });
    }

    let trend = if ma_5 > ma_20 { Trend::Up } else { Trend::Down };
    let trend_strength = (ma_5 - ma_20).abs() / ma_20;
    let predicted_price = match trend {
        Trend::Up => current_price * (1.0 + trend_strength * STRENGTH_DAMPING),
        Trend::Down => current_price * (1.0 - trend_strength * STRENGTH_DAMPING),
    };

    let recent_start = closes.len().saturating_sub(VOLATILITY_WINDOW);
    let volatility = return_volatility(&closes[recent_start..]);

    let confidence = calculate_traditional_confidence(
        series.symbol(),
        trend_strength,
        volatility,
        closes.len(),
        now,
        bucket_secs,
    );

    debug!(
        "{}: MA5={:.2} MA20={:.2} strength={:.4} volatility={:.4}",
        series.symbol(),
        ma_5,
        ma_20,
        trend_strength,
        volatility
    );

    Ok(TraditionalPrediction {
        predicted_price,
        current_price,
        trend,
        ma_5,
        ma_20,
        volatility,
        trend_strength,
        records_used: closes.len(),
        confidence,
    })
}
