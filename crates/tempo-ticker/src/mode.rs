//! Catch-up policies for scheduled ticking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tempo_core::TempoError;

/// How the next fire time is chosen after a tick, in particular when the
/// tick overran its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickMode {
    /// Next fire is always `slot + interval`. Missed slots fire back to back
    /// until the schedule catches up, so the long-run rate is exactly
    /// `1 / interval`.
    #[default]
    Strict,

    /// Next fire is `max(slot + interval, completion)`. Missed slots collapse
    /// into a single immediate tick and the cadence re-anchors there.
    Flex,

    /// Next fire is `completion + interval`: a guaranteed minimum gap between
    /// ticks, with a long-run rate that drops below `1 / interval` when ticks
    /// are slow.
    Spaced,
}

impl TickMode {
    /// Next fire time for a tick that was due at `slot` and finished at
    /// `completed`. `None` when the result is past the clock's range.
    pub fn next_fire(
        self,
        slot: Instant,
        completed: Instant,
        interval: Duration,
    ) -> Option<Instant> {
        match self {
            Self::Strict => slot.checked_add(interval),
            Self::Flex => slot
                .checked_add(interval)
                .map(|next| next.max(completed)),
            Self::Spaced => completed.checked_add(interval),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Flex => "flex",
            Self::Spaced => "spaced",
        }
    }
}

impl fmt::Display for TickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickMode {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "flex" => Ok(Self::Flex),
            "spaced" => Ok(Self::Spaced),
            other => Err(TempoError::Config(format!(
                "unknown tick mode '{other}' (expected strict, flex or spaced)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(10);

    #[test]
    fn test_on_time_tick_is_identical_across_modes() {
        let slot = Instant::now();
        let completed = slot + Duration::from_secs(1);
        assert_eq!(
            TickMode::Strict.next_fire(slot, completed, INTERVAL),
            Some(slot + INTERVAL)
        );
        assert_eq!(
            TickMode::Flex.next_fire(slot, completed, INTERVAL),
            Some(slot + INTERVAL)
        );
        assert_eq!(
            TickMode::Spaced.next_fire(slot, completed, INTERVAL),
            Some(completed + INTERVAL)
        );
    }

    #[test]
    fn test_overrun() {
        let slot = Instant::now();
        let completed = slot + Duration::from_secs(35);
        assert_eq!(
            TickMode::Strict.next_fire(slot, completed, INTERVAL),
            Some(slot + INTERVAL)
        );
        assert_eq!(
            TickMode::Flex.next_fire(slot, completed, INTERVAL),
            Some(completed)
        );
        assert_eq!(
            TickMode::Spaced.next_fire(slot, completed, INTERVAL),
            Some(completed + INTERVAL)
        );
    }

    #[test]
    fn test_unrepresentable_next_fire() {
        let slot = Instant::now();
        for mode in [TickMode::Strict, TickMode::Flex, TickMode::Spaced] {
            assert_eq!(mode.next_fire(slot, slot, Duration::MAX), None);
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("STRICT".parse::<TickMode>().unwrap(), TickMode::Strict);
        assert_eq!(" flex ".parse::<TickMode>().unwrap(), TickMode::Flex);
        assert_eq!(TickMode::Spaced.to_string(), "spaced");
        assert!("burst".parse::<TickMode>().is_err());
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&TickMode::Flex).unwrap(), "\"flex\"");
        let mode: TickMode = serde_json::from_str("\"spaced\"").unwrap();
        assert_eq!(mode, TickMode::Spaced);
    }
}
