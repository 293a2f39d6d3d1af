// Confidence heuristics for both forecast paths
pub mod confidence;

// Indicators, feature table and price ingestion
pub mod market_data;

// Model fitting and selection
pub mod ml;

// Forecast orchestration
pub mod prediction;
