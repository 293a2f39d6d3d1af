use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Window of history requested from a price data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HistoryPeriod {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
}

impl HistoryPeriod {
    /// Calendar days covered by this period
    pub fn days(&self) -> u32 {
        match self {
            HistoryPeriod::OneDay => 1,
            HistoryPeriod::FiveDays => 5,
            HistoryPeriod::OneMonth => 30,
            HistoryPeriod::ThreeMonths => 90,
            HistoryPeriod::SixMonths => 180,
            HistoryPeriod::OneYear => 365,
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryPeriod::OneDay => "1d",
            HistoryPeriod::FiveDays => "5d",
            HistoryPeriod::OneMonth => "1mo",
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for HistoryPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(HistoryPeriod::OneDay),
            "5d" => Ok(HistoryPeriod::FiveDays),
            "1mo" => Ok(HistoryPeriod::OneMonth),
            "3mo" => Ok(HistoryPeriod::ThreeMonths),
            "6mo" => Ok(HistoryPeriod::SixMonths),
            "1y" => Ok(HistoryPeriod::OneYear),
            _ => anyhow::bail!(
                "Invalid HISTORY_PERIOD: {}. Must be one of 1d, 5d, 1mo, 3mo, 6mo, 1y",
                s
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing() {
        assert_eq!(HistoryPeriod::from_str("1y").unwrap(), HistoryPeriod::OneYear);
        assert_eq!(HistoryPeriod::from_str("3MO").unwrap(), HistoryPeriod::ThreeMonths);
        assert!(HistoryPeriod::from_str("2w").is_err());
    }

    #[test]
    fn test_period_days() {
        assert_eq!(HistoryPeriod::OneDay.days(), 1);
        assert_eq!(HistoryPeriod::OneMonth.days(), 30);
        assert_eq!(HistoryPeriod::default().days(), 365);
        assert_eq!(HistoryPeriod::SixMonths.to_string(), "6mo");
    }
}
