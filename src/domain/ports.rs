use crate::domain::forecast::ForecastRecord;
use crate::domain::market::history_period::HistoryPeriod;
use crate::domain::market::price::{PriceRecord, PriceSeries};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Storage of daily prices and forecasts, owned outside the engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistoryStore: Send + Sync {
    /// Full history for `symbol`, sorted ascending. Unknown symbols yield an
    /// empty series.
    async fn read_series(&self, symbol: &str) -> Result<PriceSeries>;

    /// Insert records whose date is not stored yet; existing dates are left
    /// untouched. Returns the number inserted.
    async fn upsert_records(&self, symbol: &str, records: Vec<PriceRecord>) -> Result<usize>;

    /// Drop any forecast for (symbol, target_date) and store `record` in its
    /// place.
    async fn replace_forecast(
        &self,
        symbol: &str,
        target_date: NaiveDate,
        record: ForecastRecord,
    ) -> Result<()>;
}

/// Records produced by a price data source.
#[derive(Debug, Clone, Default)]
pub struct FetchedPrices {
    /// Sorted by date ascending
    pub records: Vec<PriceRecord>,
    /// True when the records were generated rather than observed
    pub synthetic: bool,
}

#[async_trait]
pub trait PriceDataSource: Send + Sync {
    async fn fetch(&self, symbol: &str, period: HistoryPeriod) -> Result<FetchedPrices>;

    fn name(&self) -> &str;
}
