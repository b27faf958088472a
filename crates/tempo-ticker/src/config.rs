//! Ticker configuration.

use crate::mode::TickMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tempo_core::{HumanDuration, Result, TempoError};

/// Longest accepted interval, about a century.
pub const MAX_INTERVAL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Configuration for a [`Ticker`](crate::Ticker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Time between ticks. `None` runs the handler in a tight loop
    /// (continuous mode).
    #[serde(default)]
    pub interval: Option<HumanDuration>,

    /// Whether the first scheduled tick fires at start or one interval later.
    /// Default: true
    #[serde(default = "default_fire_immediately")]
    pub fire_immediately: bool,

    /// Catch-up policy for scheduled ticking.
    /// Default: strict
    #[serde(default)]
    pub mode: TickMode,
}

fn default_fire_immediately() -> bool {
    true
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval: None,
            fire_immediately: default_fire_immediately(),
            mode: TickMode::default(),
        }
    }
}

impl TickerConfig {
    /// Continuous-mode configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduled-mode configuration with the given interval.
    pub fn every(interval: Duration) -> Self {
        Self::default().with_interval(Some(interval))
    }

    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval.map(HumanDuration);
        self
    }

    pub fn with_mode(mut self, mode: TickMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fire_immediately(mut self, fire_immediately: bool) -> Self {
        self.fire_immediately = fire_immediately;
        self
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval.map(|interval| interval.as_duration())
    }

    pub fn validate(&self) -> Result<()> {
        match self.interval() {
            Some(interval) if interval.is_zero() => Err(TempoError::InvalidInterval(
                "interval must be greater than 0".into(),
            )),
            Some(interval) if interval > MAX_INTERVAL => Err(TempoError::InvalidInterval(
                format!("interval must be at most {}", HumanDuration(MAX_INTERVAL)),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TickerConfig::default();
        assert_eq!(config.interval(), None);
        assert!(config.fire_immediately);
        assert_eq!(config.mode, TickMode::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_is_invalid() {
        let config = TickerConfig::every(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(TempoError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_oversized_interval_is_invalid() {
        assert!(TickerConfig::every(MAX_INTERVAL).validate().is_ok());
        for interval in [MAX_INTERVAL + Duration::from_secs(1), Duration::MAX] {
            assert!(matches!(
                TickerConfig::every(interval).validate(),
                Err(TempoError::InvalidInterval(_))
            ));
        }
    }

    #[test]
    fn test_deserialize() {
        let config: TickerConfig =
            serde_json::from_str(r#"{"interval": "1m30s", "mode": "spaced"}"#).unwrap();
        assert_eq!(config.interval(), Some(Duration::from_secs(90)));
        assert_eq!(config.mode, TickMode::Spaced);
        assert!(config.fire_immediately);

        let config: TickerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TickerConfig::default());
    }
}
