pub mod csv_prices;
pub mod repositories;
pub mod simulation;

pub use repositories::InMemoryPriceHistoryStore;
