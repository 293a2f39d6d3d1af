//! CSV-backed price data source
//!
//! Reads daily bars from a file with the header
//! `date,open,high,low,close,volume` and an optional `symbol` column. When the
//! symbol column is present only matching rows are returned.

use crate::domain::market::history_period::HistoryPeriod;
use crate::domain::market::price::PriceRecord;
use crate::domain::ports::{FetchedPrices, PriceDataSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CsvPriceRow {
    #[serde(default)]
    symbol: Option<String>,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<u64>,
}

impl CsvPriceRow {
    fn into_record(self) -> Option<PriceRecord> {
        Some(PriceRecord {
            date: self.date,
            open: Decimal::from_f64(self.open)?,
            high: Decimal::from_f64(self.high)?,
            low: Decimal::from_f64(self.low)?,
            close: Decimal::from_f64(self.close)?,
            volume: self.volume.unwrap_or(0),
        })
    }
}

pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses `content`, keeping rows for `symbol` with a positive close.
    /// Output is sorted by date.
    pub fn parse(content: &str, symbol: &str) -> Result<Vec<PriceRecord>> {
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (line, row) in reader.deserialize::<CsvPriceRow>().enumerate() {
            let row = row.with_context(|| format!("Malformed price row {}", line + 2))?;
            if let Some(row_symbol) = &row.symbol
                && row_symbol != symbol
            {
                continue;
            }
            if row.close.is_nan() || row.close <= 0.0 {
                skipped += 1;
                continue;
            }
            match row.into_record() {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("{}: skipped {} unusable CSV rows", symbol, skipped);
        }
        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}

#[async_trait]
impl PriceDataSource for CsvPriceSource {
    async fn fetch(&self, symbol: &str, period: HistoryPeriod) -> Result<FetchedPrices> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read price file {:?}", self.path))?;

        let mut records = Self::parse(&content, symbol)?;

        // Keep the requested window, measured back from the newest row.
        if let Some(last) = records.last().map(|r| r.date) {
            let cutoff = last
                .checked_sub_days(Days::new(u64::from(period.days().saturating_sub(1))))
                .unwrap_or(NaiveDate::MIN);
            records.retain(|r| r.date >= cutoff);
        } else {
            warn!("No rows for {} in {:?}", symbol, self.path);
        }

        Ok(FetchedPrices {
            records,
            synthetic: false,
        })
    }

    fn name(&self) -> &str {
        "csv"
    }
}
