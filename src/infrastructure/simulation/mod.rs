pub mod synthetic_prices;

pub use synthetic_prices::SyntheticPriceSource;
