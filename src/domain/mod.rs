// Forecasting configuration value objects
pub mod config;

// Domain-specific error types
pub mod errors;

// Forecast records and model results
pub mod forecast;

// Daily prices and history windows
pub mod market;

// Feature schema
pub mod ml;

// Port interfaces
pub mod ports;
