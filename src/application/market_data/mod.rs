// Market data processing modules
pub mod chart_summary;
pub mod feature_builder;
pub mod indicators;
pub mod price_updater;
