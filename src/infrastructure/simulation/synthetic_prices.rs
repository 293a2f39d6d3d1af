use crate::domain::market::history_period::HistoryPeriod;
use crate::domain::market::price::PriceRecord;
use crate::domain::ports::{FetchedPrices, PriceDataSource};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::info;

const DEFAULT_BASE_PRICE: f64 = 3000.0;
/// Maximum absolute daily close-to-close move.
const MAX_DAILY_CHANGE: f64 = 0.03;

/// Starting price for well-known codes, 3000 otherwise.
pub fn base_price(symbol: &str) -> f64 {
    match symbol {
        "7203" => 2800.0,
        "9984" => 6000.0,
        "6758" => 1200.0,
        "7974" => 9000.0,
        "4063" => 12000.0,
        _ => DEFAULT_BASE_PRICE,
    }
}

/// Random walk of `days` daily records ending on `end_date`.
///
/// Each close moves at most ±3% from the previous one; high, low and open are
/// drawn around the close and every price is rounded to two decimals.
pub fn generate_history<R: Rng>(
    symbol: &str,
    days: u32,
    end_date: NaiveDate,
    rng: &mut R,
) -> Vec<PriceRecord> {
    let mut price = base_price(symbol);
    let mut records = Vec::with_capacity(days as usize);

    for i in 0..days {
        let Some(date) = end_date.checked_sub_days(Days::new(u64::from(days - i - 1))) else {
            continue;
        };

        price *= 1.0 + rng.random_range(-MAX_DAILY_CHANGE..MAX_DAILY_CHANGE);
        let high = price * rng.random_range(1.0..1.02);
        let low = price * rng.random_range(0.98..1.0);
        let open = price * rng.random_range(0.99..1.01);
        let volume = rng.random_range(1_000_000u64..=10_000_000);

        records.push(PriceRecord {
            date,
            open: to_cents(open),
            high: to_cents(high),
            low: to_cents(low),
            close: to_cents(price),
            volume,
        });
    }

    records
}

fn to_cents(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .unwrap_or_default()
}

/// Price source that fabricates history. Results are flagged as synthetic.
#[derive(Debug, Clone, Default)]
pub struct SyntheticPriceSource {
    seed: Option<u64>,
    end_date: Option<NaiveDate>,
}

impl SyntheticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the generator so repeated fetches return identical data.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Last generated date; today (UTC) when unset.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

#[async_trait]
impl PriceDataSource for SyntheticPriceSource {
    async fn fetch(&self, symbol: &str, period: HistoryPeriod) -> Result<FetchedPrices> {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let end_date = self.end_date.unwrap_or_else(|| Utc::now().date_naive());

        let records = generate_history(symbol, period.days(), end_date, &mut rng);
        info!(
            "Generated {} synthetic records for {} ({})",
            records.len(),
            symbol,
            period
        );

        Ok(FetchedPrices {
            records,
            synthetic: true,
        })
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
