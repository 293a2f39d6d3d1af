use crate::domain::errors::ForecastError;
use crate::domain::market::history_period::HistoryPeriod;
use crate::domain::ports::{PriceDataSource, PriceHistoryStore};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub fetched: usize,
    pub inserted: usize,
    pub synthetic: bool,
}

/// Rejects symbols a data source cannot address.
pub fn validate_symbol(symbol: &str) -> Result<(), ForecastError> {
    if symbol.trim().is_empty() || symbol.contains(',') {
        return Err(ForecastError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}

/// Pulls history for `symbol` from `source` and stores every date not yet
/// known. Existing records are never overwritten.
pub async fn refresh_prices(
    store: &dyn PriceHistoryStore,
    source: &dyn PriceDataSource,
    symbol: &str,
    period: HistoryPeriod,
) -> Result<RefreshReport, ForecastError> {
    validate_symbol(symbol)?;

    let fetched = source.fetch(symbol, period).await?;
    if fetched.records.is_empty() {
        warn!("{}: source {} returned no records", symbol, source.name());
        return Ok(RefreshReport {
            fetched: 0,
            inserted: 0,
            synthetic: fetched.synthetic,
        });
    }

    let count = fetched.records.len();
    let inserted = store.upsert_records(symbol, fetched.records).await?;

    let kind = if fetched.synthetic { "SYNTHETIC" } else { "REAL" };
    info!(
        "Updated {} {} price records for {} ({} fetched from {})",
        inserted,
        kind,
        symbol,
        count,
        source.name()
    );

    Ok(RefreshReport {
        fetched: count,
        inserted,
        synthetic: fetched.synthetic,
    })
}
