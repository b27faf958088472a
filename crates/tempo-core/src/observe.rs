//! Optional metrics instrumentation.
//!
//! With the `observe` feature enabled, ticks and scheduler fires emit
//! counters and histograms through the [`metrics`] crate. The application
//! installs the recorder. Without the feature every function here is a no-op.

/// Record one tick.
///
/// - `tempo.ticker.ticks_total` – counter with `outcome` label (`ok` / `fail`)
/// - `tempo.ticker.tick_duration_seconds` – histogram
#[inline]
pub fn record_tick(duration: std::time::Duration, success: bool) {
    #[cfg(feature = "observe")]
    {
        let outcome = if success { "ok" } else { "fail" };
        metrics::counter!("tempo.ticker.ticks_total", "outcome" => outcome).increment(1);
        metrics::histogram!("tempo.ticker.tick_duration_seconds").record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, success);
    }
}

/// Record a tick that fired later than one full interval after its slot.
///
/// - `tempo.ticker.overruns_total` – counter
#[inline]
pub fn record_tick_overrun() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("tempo.ticker.overruns_total").increment(1);
    }
}

/// Record a scheduler fire.
///
/// - `tempo.sched.fires_total` – counter with `period` label
#[inline]
pub fn record_sched_fire(period: &'static str) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("tempo.sched.fires_total", "period" => period).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = period;
    }
}
