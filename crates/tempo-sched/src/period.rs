//! Schedule periods.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tempo_core::TempoError;

/// How often a calendar-aligned schedule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Hourly,
    Minutely,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Hourly => "hourly",
            Self::Minutely => "minutely",
        }
    }

    /// Whether the fire time is a clock time (`HH:MM`) rather than an
    /// offset.
    pub fn uses_clock_time(&self) -> bool {
        matches!(self, Self::Daily | Self::Weekly | Self::Monthly)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "hourly" => Ok(Self::Hourly),
            "minutely" => Ok(Self::Minutely),
            _ => Err(TempoError::InvalidPeriod(format!(
                "'{s}' (expected daily, weekly, monthly, hourly or minutely)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("daily".parse::<Period>().unwrap(), Period::Daily);
        assert_eq!("WEEKLY".parse::<Period>().unwrap(), Period::Weekly);
        assert_eq!("Minutely".parse::<Period>().unwrap(), Period::Minutely);
        assert!(matches!(
            "yearly".parse::<Period>(),
            Err(TempoError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_clock_time_periods() {
        assert!(Period::Monthly.uses_clock_time());
        assert!(!Period::Hourly.uses_clock_time());
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Period::Hourly).unwrap(), "\"hourly\"");
        let period: Period = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(period, Period::Monthly);
    }
}
