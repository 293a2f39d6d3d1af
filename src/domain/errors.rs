use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while turning a price history into a forecast.
///
/// Only `Unavailable`, `InvalidSymbol` and `Store` ever reach a caller of the
/// forecast service; the remaining variants are stage-local and are absorbed
/// (logged, then the next stage or path is tried).
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Insufficient data for {stage}: need {required} records, have {available}")]
    InsufficientData {
        stage: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Model {model} failed: {reason}")]
    ModelFitFailure { model: String, reason: String },

    #[error("Machine learning path disabled")]
    MachineLearningDisabled,

    #[error("No viable model: every model family failed to fit")]
    NoViableModel,

    #[error("Fallback needs {required} records, have {available}")]
    FallbackInsufficientData { required: usize, available: usize },

    #[error("Indicator {indicator} undefined on {date}")]
    UndefinedIndicator {
        indicator: &'static str,
        date: NaiveDate,
    },

    #[error("Forecast unavailable for {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_formatting() {
        let err = ForecastError::InsufficientData {
            stage: "ml",
            required: 60,
            available: 15,
        };

        let msg = err.to_string();
        assert!(msg.contains("ml"));
        assert!(msg.contains("60"));
        assert!(msg.contains("15"));
    }

    #[test]
    fn test_unavailable_names_symbol_and_reason() {
        let err = ForecastError::Unavailable {
            symbol: "AAPL".to_string(),
            reason: "no data".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("AAPL"));
        assert!(msg.contains("no data"));
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: ForecastError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
