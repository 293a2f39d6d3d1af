//! Forecast confidence scoring
//!
//! Both scorers are deterministic for a fixed (symbol, inputs, time bucket);
//! hashing uses SHA-256 so scores agree across processes.

pub mod hashing;
pub mod ml_confidence;
pub mod traditional_confidence;
