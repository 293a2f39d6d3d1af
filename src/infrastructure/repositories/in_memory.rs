//! In-Memory Price History Store
//!
//! Thread-safe implementation of `PriceHistoryStore` backed by maps behind
//! `Arc<RwLock>`. Used by the CLI and the tests; data does not survive a
//! restart.

use crate::domain::forecast::ForecastRecord;
use crate::domain::market::price::{PriceRecord, PriceSeries};
use crate::domain::ports::PriceHistoryStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type PriceTable = HashMap<String, BTreeMap<NaiveDate, PriceRecord>>;
type ForecastTable = HashMap<(String, NaiveDate), ForecastRecord>;

#[derive(Clone, Default)]
pub struct InMemoryPriceHistoryStore {
    prices: Arc<RwLock<PriceTable>>,
    forecasts: Arc<RwLock<ForecastTable>>,
}

impl InMemoryPriceHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored forecasts for `symbol`, ordered by target date.
    pub async fn forecasts_for(&self, symbol: &str) -> Vec<ForecastRecord> {
        let forecasts = self.forecasts.read().await;
        let mut records: Vec<ForecastRecord> = forecasts
            .iter()
            .filter(|((s, _), _)| s == symbol)
            .map(|(_, r)| r.clone())
            .collect();
        records.sort_by_key(|r| r.target_date);
        records
    }

    pub async fn forecast_count(&self) -> usize {
        self.forecasts.read().await.len()
    }

    pub async fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.prices.read().await.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

#[async_trait]
impl PriceHistoryStore for InMemoryPriceHistoryStore {
    async fn read_series(&self, symbol: &str) -> Result<PriceSeries> {
        let prices = self.prices.read().await;
        let records = prices
            .get(symbol)
            .map(|by_date| by_date.values().cloned().collect())
            .unwrap_or_default();
        Ok(PriceSeries::new(symbol, records))
    }

    async fn upsert_records(&self, symbol: &str, records: Vec<PriceRecord>) -> Result<usize> {
        let mut prices = self.prices.write().await;
        let by_date = prices.entry(symbol.to_string()).or_default();

        let mut inserted = 0;
        for record in records {
            if let std::collections::btree_map::Entry::Vacant(slot) = by_date.entry(record.date) {
                slot.insert(record);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn replace_forecast(
        &self,
        symbol: &str,
        target_date: NaiveDate,
        record: ForecastRecord,
    ) -> Result<()> {
        self.forecasts
            .write()
            .await
            .insert((symbol.to_string(), target_date), record);
        Ok(())
    }
}
