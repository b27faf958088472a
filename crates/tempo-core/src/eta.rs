//! Completion-time estimation for a bounded task.
//!
//! # Example
//!
//! ```
//! use tempo_core::Eta;
//!
//! let mut eta = Eta::new(1_000.0).unwrap();
//! eta.update(0.0);
//! // ... do some work ...
//! eta.update(250.0);
//! assert_eq!(eta.percent(), 25.0);
//! ```

use crate::clock::{MonotonicClock, SystemClock};
use crate::error::{Result, TempoError};
use crate::ewma::Ewma;
use std::sync::Arc;
use std::time::Instant;

/// Default EWMA age for the rate estimate.
pub const DEFAULT_RATE_AGE: f64 = 10.0;

/// Estimates time to completion from absolute progress updates.
pub struct Eta {
    total: f64,
    rate: Ewma,
    completed: f64,
    last: Option<(Instant, f64)>,
    clock: Arc<dyn MonotonicClock>,
}

impl Eta {
    /// Create an estimator for `total` units of work.
    pub fn new(total: f64) -> Result<Self> {
        Self::with_age(total, DEFAULT_RATE_AGE)
    }

    /// Create an estimator whose rate is smoothed with the given EWMA age.
    pub fn with_age(total: f64, age: f64) -> Result<Self> {
        if !total.is_finite() || total <= 0.0 {
            return Err(TempoError::Config(format!(
                "ETA total must be a positive number, got {total}"
            )));
        }
        Ok(Self {
            total,
            rate: Ewma::new(age)?,
            completed: 0.0,
            last: None,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used to timestamp updates.
    pub fn with_clock(mut self, clock: Arc<dyn MonotonicClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record absolute progress.
    ///
    /// A rate sample is taken only when both the elapsed time and the
    /// progress since the previous update are strictly positive. The
    /// previous observation is replaced either way, so a backward step
    /// leaves the rate untouched but becomes the new baseline.
    pub fn update(&mut self, completed: f64) {
        let now = self.clock.now();
        if let Some((last_time, last_completed)) = self.last {
            let elapsed = now.saturating_duration_since(last_time).as_secs_f64();
            let progressed = completed - last_completed;
            if elapsed > 0.0 && progressed > 0.0 {
                self.rate.add(progressed / elapsed);
            }
        }
        self.last = Some((now, completed));
        self.completed = completed;
    }

    /// Smoothed units per second, `0.0` before any valid sample.
    pub fn rate(&self) -> f64 {
        self.rate.value()
    }

    /// Seconds until completion at the current rate.
    ///
    /// `Some(0.0)` once the work is done, `None` while no positive rate is
    /// known.
    pub fn remaining_secs(&self) -> Option<f64> {
        let remaining = self.total - self.completed;
        if remaining <= 0.0 {
            return Some(0.0);
        }
        let rate = self.rate();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining / rate)
    }

    /// Progress as a percentage of the total. Not clamped.
    pub fn percent(&self) -> f64 {
        self.completed / self.total * 100.0
    }

    pub fn completed(&self) -> f64 {
        self.completed
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

impl std::fmt::Debug for Eta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eta")
            .field("total", &self.total)
            .field("completed", &self.completed)
            .field("rate", &self.rate.value())
            .finish()
    }
}
