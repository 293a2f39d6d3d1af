use crate::domain::market::price::{PriceSeries, SeriesSummary};

/// Projects the `window_days` most recent records for chart rendering.
///
/// The window is selected newest first and emitted oldest first; dates are
/// formatted as zero-padded `MM/DD`.
pub fn summarize_series(series: &PriceSeries, window_days: usize) -> SeriesSummary {
    let mut summary = SeriesSummary::default();

    for record in series.latest(window_days).into_iter().rev() {
        summary.dates.push(record.date.format("%m/%d").to_string());
        summary.closes.push(record.close_f64());
        summary.volumes.push(record.volume);
    }

    summary
}
