//! Rolling technical indicators over daily close/volume sequences
//!
//! Every function takes values ordered oldest first and returns one entry per
//! input position. `None` marks positions where the trailing window is not yet
//! covered or the indicator is undefined (division by zero), mirroring how a
//! partially warmed-up indicator has no value.

use statrs::statistics::{Data, Distribution};
use ta::Next;
use ta::indicators::ExponentialMovingAverage;

/// Band widths below this are treated as zero.
pub const MIN_BAND_WIDTH: f64 = 1e-9;

/// Simple moving average of the last `window` values.
///
/// Returns `None` whenever fewer than `window` values are available.
pub fn calculate_moving_average(prices: &[f64], window: usize) -> Option<f64> {
    if window == 0 || prices.len() < window {
        return None;
    }
    let tail = &prices[prices.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

/// Rolling sample standard deviation (n - 1 denominator).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| {
        if w.len() < 2 {
            return None;
        }
        Data::new(w.to_vec()).std_dev().filter(|v| v.is_finite())
    })
}

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                f(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

/// Fractional change versus the value `periods` positions earlier.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i < periods {
                return None;
            }
            let prev = values[i - periods];
            if prev == 0.0 {
                None
            } else {
                Some(values[i] / prev - 1.0)
            }
        })
        .collect()
}

/// Relative Strength Index over simple rolling averages of gains and losses.
///
/// The first position has no delta and contributes zero to both averages, so
/// the first value appears at index `window - 1`. A window without losses
/// reads 100; a window with neither gains nor losses is undefined.
pub fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let delta = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    let avg_gain = rolling_mean(&gains, window);
    let avg_loss = rolling_mean(&losses, window);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) if l > 0.0 => Some(100.0 - 100.0 / (1.0 + g / l)),
            (Some(g), Some(_)) if g > 0.0 => Some(100.0),
            _ => None,
        })
        .collect()
}

/// Exponential moving average seeded with the first value, no bias adjustment.
pub fn ema(values: &[f64], span: usize) -> Option<Vec<f64>> {
    let mut indicator = ExponentialMovingAverage::new(span).ok()?;
    Some(values.iter().map(|v| indicator.next(*v)).collect())
}

/// MACD line: fast EMA minus slow EMA. Defined from the first position.
pub fn macd(closes: &[f64], fast: usize, slow: usize) -> Option<Vec<f64>> {
    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;
    Some(
        fast_ema
            .into_iter()
            .zip(slow_ema)
            .map(|(f, s)| f - s)
            .collect(),
    )
}

/// Position of `close` inside mean ± `k` standard deviations.
///
/// Unbounded (can leave [0, 1]); `None` when the band has no width.
pub fn bollinger_position(close: f64, mean: f64, std_dev: f64, k: f64) -> Option<f64> {
    let upper = mean + std_dev * k;
    let lower = mean - std_dev * k;
    let width = upper - lower;
    if width > MIN_BAND_WIDTH {
        Some((close - lower) / width)
    } else {
        None
    }
}

/// Population standard deviation of simple daily returns.
pub fn return_volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.is_empty() {
        return 0.0;
    }

    let mean: f64 = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance: f64 = returns
        .iter()
        .map(|r| {
            let diff = r - mean;
            diff * diff
        })
        .sum::<f64>()
        / returns.len() as f64;

    variance.sqrt()
}

/// Sample standard deviation over mean of the last `window` values.
pub fn coefficient_of_variation(values: &[f64], window: usize) -> Option<f64> {
    let start = values.len().saturating_sub(window);
    let tail = &values[start..];
    if tail.len() < 2 {
        return None;
    }
    let data = Data::new(tail.to_vec());
    let mean = data.mean()?;
    let std_dev = data.std_dev()?;
    if mean == 0.0 {
        return None;
    }
    Some(std_dev / mean)
}
