//! Scheduler configuration.

use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tempo_core::HumanDuration;

/// Configuration for a [`Sched`](crate::Sched).
///
/// ```json
/// { "period": "weekly", "at": "09:00", "weekday": 0, "poll_interval": "30s" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedConfig {
    pub period: Period,

    /// `HH:MM` for daily, weekly and monthly periods; an offset `0-59` for
    /// hourly and minutely periods.
    pub at: String,

    /// Day of week for weekly schedules, 0 = Monday.
    #[serde(default)]
    pub weekday: Option<u32>,

    /// How often the run loop re-checks the clock.
    /// Default: 10s
    #[serde(default = "default_poll_interval")]
    pub poll_interval: HumanDuration,

    /// How often the run loop logs time remaining until the next fire.
    /// Default: 1h
    #[serde(default = "default_status_interval")]
    pub status_interval: HumanDuration,

    /// Fire once as soon as the run loop starts.
    #[serde(default)]
    pub instant: bool,
}

fn default_poll_interval() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_status_interval() -> HumanDuration {
    HumanDuration::from_secs(3600)
}

impl SchedConfig {
    pub fn new(period: Period, at: impl Into<String>) -> Self {
        Self {
            period,
            at: at.into(),
            weekday: None,
            poll_interval: default_poll_interval(),
            status_interval: default_status_interval(),
            instant: false,
        }
    }

    pub fn with_weekday(mut self, weekday: u32) -> Self {
        self.weekday = Some(weekday);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = HumanDuration(poll_interval);
        self
    }

    pub fn with_status_interval(mut self, status_interval: Duration) -> Self {
        self.status_interval = HumanDuration(status_interval);
        self
    }

    pub fn with_instant(mut self, instant: bool) -> Self {
        self.instant = instant;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config: SchedConfig =
            serde_json::from_str(r#"{"period":"daily","at":"14:30"}"#).unwrap();
        assert_eq!(config, SchedConfig::new(Period::Daily, "14:30"));
        assert_eq!(config.poll_interval.as_duration(), Duration::from_secs(10));
        assert_eq!(
            config.status_interval.as_duration(),
            Duration::from_secs(3600)
        );
        assert!(!config.instant);
    }

    #[test]
    fn test_full_json() {
        let config: SchedConfig = serde_json::from_str(
            r#"{"period":"weekly","at":"09:00","weekday":4,"poll_interval":"500ms","status_interval":"10m","instant":true}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            SchedConfig::new(Period::Weekly, "09:00")
                .with_weekday(4)
                .with_poll_interval(Duration::from_millis(500))
                .with_status_interval(Duration::from_secs(600))
                .with_instant(true)
        );
    }
}
