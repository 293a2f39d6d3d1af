use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar for an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl PriceRecord {
    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(0.0)
    }

    pub fn high_f64(&self) -> f64 {
        self.high.to_f64().unwrap_or(0.0)
    }

    pub fn low_f64(&self) -> f64 {
        self.low.to_f64().unwrap_or(0.0)
    }
}

/// Daily history of a single instrument, kept sorted by date ascending.
///
/// Construction sorts the input and drops duplicate dates (the first record
/// seen for a date wins), so every consumer can rely on a strictly increasing
/// date sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut records: Vec<PriceRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        records.dedup_by_key(|r| r.date);
        Self {
            symbol: symbol.into(),
            records,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records oldest first.
    pub fn ascending(&self) -> &[PriceRecord] {
        &self.records
    }

    /// The `n` most recent records, newest first.
    pub fn latest(&self, n: usize) -> Vec<&PriceRecord> {
        self.records.iter().rev().take(n).collect()
    }

    /// The `n` most recent records, oldest first.
    pub fn tail(&self, n: usize) -> &[PriceRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}

/// Chart-oriented projection of the most recent part of a series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// `MM/DD`, oldest first
    pub dates: Vec<String>,
    pub closes: Vec<f64>,
    pub volumes: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(day: u32, close: Decimal) -> PriceRecord {
        PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = PriceSeries::new(
            "AAPL",
            vec![
                record(3, dec!(103)),
                record(1, dec!(101)),
                record(2, dec!(102)),
                record(1, dec!(999)),
            ],
        );

        assert_eq!(series.len(), 3);
        let closes: Vec<f64> = series.ascending().iter().map(|r| r.close_f64()).collect();
        assert_eq!(closes, vec![101.0, 102.0, 103.0]);
    }

    #[test]
    fn test_latest_is_newest_first() {
        let series = PriceSeries::new(
            "AAPL",
            (1..=10).map(|d| record(d, Decimal::from(100 + d))).collect(),
        );

        let latest = series.latest(3);
        assert_eq!(latest.len(), 3);
        assert_eq!(latest[0].close, dec!(110));
        assert_eq!(latest[2].close, dec!(108));

        let tail = series.tail(3);
        assert_eq!(tail[0].close, dec!(108));
        assert_eq!(tail[2].close, dec!(110));
    }

    #[test]
    fn test_tail_longer_than_series() {
        let series = PriceSeries::new("AAPL", vec![record(1, dec!(100))]);
        assert_eq!(series.tail(30).len(), 1);
    }
}
