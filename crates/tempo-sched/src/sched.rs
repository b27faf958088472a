//! Calendar-aligned scheduler.
//!
//! A [`Sched`] tracks a single next-fire time. Each [`sync`](Sched::sync)
//! compares it with the wall clock: once the clock reaches it, the call
//! reports a trigger and advances the fire time by one period. The
//! [`run`](Sched::run) iterator wraps `sync` in a poll loop that sleeps on a
//! shutdown signal, so [`stop`](Sched::stop) from any thread ends it
//! promptly.

use crate::cadence::Cadence;
use crate::config::SchedConfig;
use crate::period::Period;
use chrono::NaiveDateTime;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempo_core::{format_duration, observe, Result, ShutdownSignal, SystemClock, WallClock};
use tracing::{debug, info};

/// Default poll interval for [`Sched::run`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Result of one [`Sched::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Whether the schedule fired on this call.
    pub triggered: bool,
    /// Time from now until the (possibly advanced) next fire time. Negative
    /// when the schedule is behind after a long gap between syncs.
    pub delay: chrono::Duration,
}

impl SyncOutcome {
    pub fn delay_secs(&self) -> f64 {
        match self.delay.num_microseconds() {
            Some(us) => us as f64 / 1e6,
            None => self.delay.num_seconds() as f64,
        }
    }
}

pub struct Sched {
    cadence: Cadence,
    next_fire: Option<NaiveDateTime>,
    poll_interval: Duration,
    clock: Arc<dyn WallClock>,
    running: Arc<AtomicBool>,
    signal: Arc<ShutdownSignal>,
}

impl Sched {
    /// Create a scheduler for `period`.
    ///
    /// `at` is `HH:MM` for daily, weekly and monthly periods and a bare
    /// offset `0-59` for hourly (minute past the hour) and minutely (second
    /// past the minute) periods. `weekday` (0 = Monday) is required for
    /// weekly periods and ignored otherwise.
    pub fn new(period: Period, at: &str, weekday: Option<u32>) -> Result<Self> {
        Ok(Self {
            cadence: Cadence::parse(period, at, weekday)?,
            next_fire: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            clock: Arc::new(SystemClock),
            running: Arc::new(AtomicBool::new(false)),
            signal: Arc::new(ShutdownSignal::new()),
        })
    }

    /// Like [`new`](Self::new) with the period given by name.
    pub fn parse(period: &str, at: &str, weekday: Option<u32>) -> Result<Self> {
        Self::new(period.parse()?, at, weekday)
    }

    pub fn from_config(config: &SchedConfig) -> Result<Self> {
        Ok(Self::new(config.period, &config.at, config.weekday)?
            .with_poll_interval(config.poll_interval.as_duration()))
    }

    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn period(&self) -> Period {
        self.cadence.period()
    }

    /// Next fire time, or `None` before the first [`sync`](Self::sync).
    pub fn next_fire_time(&self) -> Option<NaiveDateTime> {
        self.next_fire
    }

    /// Compare the wall clock with the next fire time.
    ///
    /// The first call establishes the schedule and triggers only when
    /// `instant` is set. Later calls trigger once the clock has reached the
    /// fire time and advance it by exactly one period, so a long gap
    /// between calls is caught up one fire per call.
    pub fn sync(&mut self, instant: bool) -> SyncOutcome {
        let now = self.clock.now();
        let period = self.cadence.period();

        let Some(next) = self.next_fire else {
            let next = self.cadence.next_after(now);
            self.next_fire = Some(next);
            debug!(%period, next_fire = %next, instant, "Schedule established");
            if instant {
                observe::record_sched_fire(period.as_str());
            }
            return SyncOutcome {
                triggered: instant,
                delay: next - now,
            };
        };

        if now < next {
            return SyncOutcome {
                triggered: false,
                delay: next - now,
            };
        }

        let advanced = self.cadence.advance(next);
        self.next_fire = Some(advanced);
        observe::record_sched_fire(period.as_str());
        info!(%period, fired_at = %next, next_fire = %advanced, "Schedule fired");
        SyncOutcome {
            triggered: true,
            delay: advanced - now,
        }
    }

    /// `true` from [`run`](Self::run) until [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// End the run loop. Wakes a sleeping poll immediately.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!(period = %self.cadence.period(), "Scheduler stop requested");
        }
        self.signal.trigger();
    }

    /// A handle that can stop the run loop from another thread.
    pub fn stop_handle(&self) -> SchedStopHandle {
        SchedStopHandle {
            running: Arc::clone(&self.running),
            signal: Arc::clone(&self.signal),
        }
    }

    /// Poll the schedule until stopped, yielding the current wall time at
    /// each trigger. Starting a run clears an earlier stop.
    ///
    /// The first poll happens immediately, so `instant` fires without
    /// waiting. Time remaining until the next fire is logged every
    /// `status_interval`. Dropping the iterator stops the scheduler.
    pub fn run(&mut self, status_interval: Duration, instant: bool) -> SchedRun<'_> {
        self.signal.reset();
        self.running.store(true, Ordering::SeqCst);
        info!(
            period = %self.cadence.period(),
            poll_interval = %format_duration(self.poll_interval),
            instant,
            "Scheduler started"
        );
        SchedRun {
            sched: self,
            status_interval,
            instant,
            polled: false,
            last_status: None,
        }
    }
}

impl fmt::Debug for Sched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sched")
            .field("cadence", &self.cadence)
            .field("next_fire", &self.next_fire)
            .field("poll_interval", &self.poll_interval)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Stops a [`Sched`] run loop from anywhere.
#[derive(Debug, Clone)]
pub struct SchedStopHandle {
    running: Arc<AtomicBool>,
    signal: Arc<ShutdownSignal>,
}

impl SchedStopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.signal.trigger();
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.is_triggered()
    }
}

/// Iterator returned by [`Sched::run`].
#[derive(Debug)]
pub struct SchedRun<'a> {
    sched: &'a mut Sched,
    status_interval: Duration,
    instant: bool,
    polled: bool,
    last_status: Option<NaiveDateTime>,
}

impl SchedRun<'_> {
    fn log_status(&mut self, outcome: &SyncOutcome) {
        let now = self.sched.clock.now();
        let due = match self.last_status {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .map_or(true, |since| since >= self.status_interval),
        };
        if !due {
            return;
        }
        self.last_status = Some(now);
        if let Some(next) = self.sched.next_fire {
            info!(
                period = %self.sched.cadence.period(),
                next_fire = %next,
                remaining = %format_duration(outcome.delay.to_std().unwrap_or_default()),
                "Waiting for next scheduled fire"
            );
        }
    }
}

impl Iterator for SchedRun<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<NaiveDateTime> {
        loop {
            if !self.sched.is_running() {
                return None;
            }
            if self.polled && self.sched.signal.wait_timeout(self.sched.poll_interval) {
                return None;
            }
            self.polled = true;

            let outcome = self.sched.sync(self.instant);
            if outcome.triggered {
                return Some(self.sched.clock.now());
            }
            self.log_status(&outcome);
        }
    }
}

impl Drop for SchedRun<'_> {
    fn drop(&mut self) {
        self.sched.stop();
        info!(period = %self.sched.cadence.period(), "Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::thread;
    use tempo_core::{ManualClock, TempoError};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn sched_at(
        period: Period,
        time: &str,
        weekday: Option<u32>,
        now: NaiveDateTime,
    ) -> (Sched, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let sched = Sched::new(period, time, weekday)
            .unwrap()
            .with_clock(clock.clone())
            .with_poll_interval(Duration::from_millis(5));
        (sched, clock)
    }

    #[test]
    fn test_first_sync_establishes_schedule() {
        let (mut sched, _clock) = sched_at(Period::Daily, "14:30", None, at(2024, 3, 15, 10, 0));
        assert_eq!(sched.next_fire_time(), None);

        let outcome = sched.sync(false);
        assert!(!outcome.triggered);
        assert_eq!(outcome.delay, chrono::Duration::minutes(270));
        assert_eq!(sched.next_fire_time(), Some(at(2024, 3, 15, 14, 30)));
    }

    #[test]
    fn test_first_sync_after_fire_time_rolls_over() {
        let (mut sched, _clock) = sched_at(Period::Daily, "14:30", None, at(2024, 3, 15, 15, 0));
        sched.sync(false);
        assert_eq!(sched.next_fire_time(), Some(at(2024, 3, 16, 14, 30)));
    }

    #[test]
    fn test_instant_triggers_first_sync_only() {
        let (mut sched, _clock) = sched_at(Period::Daily, "14:30", None, at(2024, 3, 15, 10, 0));
        assert!(sched.sync(true).triggered);
        assert!(!sched.sync(true).triggered);
        assert_eq!(sched.next_fire_time(), Some(at(2024, 3, 15, 14, 30)));
    }

    #[test]
    fn test_hourly_fire_and_advance() {
        let (mut sched, clock) = sched_at(Period::Hourly, "15", None, at(2024, 3, 15, 10, 20));

        let first = sched.sync(false);
        assert!(!first.triggered);
        assert!(first.delay_secs() > 0.0 && first.delay_secs() <= 3600.0);

        clock.advance(Duration::from_secs(56 * 60));
        let fired = sched.sync(false);
        assert!(fired.triggered);
        assert_eq!(fired.delay_secs(), 3540.0);
        assert_eq!(sched.next_fire_time(), Some(at(2024, 3, 15, 12, 15)));

        assert!(!sched.sync(false).triggered);
    }

    #[test]
    fn test_weekly_rollover() {
        // 2024-03-11 is a Monday.
        let (mut sched, _clock) =
            sched_at(Period::Weekly, "09:00", Some(0), at(2024, 3, 11, 9, 1));
        sched.sync(false);
        assert_eq!(sched.next_fire_time(), Some(at(2024, 3, 18, 9, 0)));
    }

    #[test]
    fn test_monthly_year_rollover() {
        let (mut sched, clock) = sched_at(Period::Monthly, "00:00", None, at(2024, 12, 15, 8, 0));
        sched.sync(false);
        assert_eq!(sched.next_fire_time(), Some(at(2025, 1, 1, 0, 0)));

        clock.set_wall(at(2025, 1, 1, 0, 0));
        assert!(sched.sync(false).triggered);
        assert_eq!(sched.next_fire_time(), Some(at(2025, 2, 1, 0, 0)));
    }

    #[test]
    fn test_long_gap_catches_up_one_fire_per_sync() {
        let (mut sched, clock) = sched_at(Period::Daily, "14:30", None, at(2024, 3, 15, 10, 0));
        sched.sync(false);

        clock.set_wall(at(2024, 3, 18, 10, 0));
        let outcome = sched.sync(false);
        assert!(outcome.triggered);
        assert!(outcome.delay_secs() < 0.0);
        assert_eq!(sched.next_fire_time(), Some(at(2024, 3, 16, 14, 30)));

        assert!(sched.sync(false).triggered);
        assert!(sched.sync(false).triggered);
        let caught_up = sched.sync(false);
        assert!(!caught_up.triggered);
        assert_eq!(sched.next_fire_time(), Some(at(2024, 3, 18, 14, 30)));
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            Sched::new(Period::Weekly, "09:00", None),
            Err(TempoError::MissingWeekday)
        ));
        assert!(matches!(
            Sched::new(Period::Weekly, "09:00", Some(7)),
            Err(TempoError::InvalidWeekday(7))
        ));
        assert!(matches!(
            Sched::new(Period::Daily, "25:00", None),
            Err(TempoError::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            Sched::parse("fortnightly", "09:00", None),
            Err(TempoError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = SchedConfig::new(Period::Minutely, "30")
            .with_poll_interval(Duration::from_millis(250));
        let sched = Sched::from_config(&config).unwrap();
        assert_eq!(sched.period(), Period::Minutely);
        assert_eq!(sched.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_run_yields_instant_fire_without_waiting() {
        let now = at(2024, 3, 15, 10, 0);
        let (mut sched, _clock) = sched_at(Period::Daily, "14:30", None, now);
        let mut run = sched.run(Duration::from_secs(3600), true);
        assert_eq!(run.next(), Some(now));
    }

    #[test]
    fn test_run_yields_due_fire() {
        let (mut sched, clock) = sched_at(Period::Minutely, "0", None, at(2024, 3, 15, 10, 0));
        sched.sync(false);
        clock.advance(Duration::from_secs(60));

        let mut run = sched.run(Duration::from_secs(3600), false);
        assert_eq!(run.next(), Some(at(2024, 3, 15, 10, 1)));
    }

    #[test]
    fn test_stop_handle_ends_run() {
        let (mut sched, _clock) = sched_at(Period::Daily, "14:30", None, at(2024, 3, 15, 10, 0));
        let handle = sched.stop_handle();

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            handle.stop();
        });

        let fires: Vec<_> = sched.run(Duration::from_secs(3600), false).collect();
        stopper.join().unwrap();

        assert!(fires.is_empty());
        assert!(!sched.is_running());
    }

    #[test]
    fn test_idle_sched_is_not_running() {
        let (sched, _clock) = sched_at(Period::Hourly, "15", None, at(2024, 3, 15, 10, 0));
        assert!(!sched.is_running());
        assert!(!format!("{sched:?}").contains("running: true"));
    }

    #[test]
    fn test_dropping_run_stops_sched() {
        let (mut sched, _clock) = sched_at(Period::Daily, "14:30", None, at(2024, 3, 15, 10, 0));
        assert!(!sched.is_running());
        {
            let mut run = sched.run(Duration::from_secs(3600), true);
            assert!(run.sched.is_running());
            assert!(run.next().is_some());
        }
        assert!(!sched.is_running());

        // A new run clears the stop.
        let run = sched.run(Duration::from_secs(3600), false);
        assert!(run.sched.is_running());
    }
}
