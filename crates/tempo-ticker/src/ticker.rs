//! Periodic executor.
//!
//! A [`Ticker`] drives a [`Handler`] either on a fixed interval (scheduled
//! mode, with a [`TickMode`] catch-up policy) or in a tight loop
//! (continuous mode, when no interval is configured).
//!
//! `start` blocks the calling thread until `stop` is called from another
//! thread or from inside one of the handler's callbacks. Event loops that
//! cannot block use [`Ticker::time_until_next_tick`] and
//! [`Ticker::try_tick`] instead.
//!
//! # Example
//!
//! ```no_run
//! use tempo_ticker::{Ticker, TickMode};
//! use std::time::Duration;
//!
//! # fn main() -> tempo_core::Result<()> {
//! let ticker = Ticker::builder()
//!     .interval(Duration::from_secs(5))
//!     .mode(TickMode::Spaced)
//!     .callback(|| {
//!         println!("tick");
//!         Ok(())
//!     })
//!     .build()?;
//!
//! let stopper = ticker.clone();
//! std::thread::spawn(move || {
//!     std::thread::sleep(Duration::from_secs(30));
//!     stopper.stop();
//! });
//!
//! ticker.start(&[])?;
//! # Ok(())
//! # }
//! ```

use crate::config::TickerConfig;
use crate::handler::{Handler, TickerHandler};
use crate::mode::TickMode;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use tempo_core::{observe, MonotonicClock, Result, SystemClock, TempoError};
use tracing::{debug, error, info, warn};

/// Point-in-time view of a ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerStatus {
    pub mode: TickMode,
    pub interval: Option<Duration>,
    pub running: bool,
    pub first_tick_pending: bool,
    pub stop_requested: bool,
    /// Ticks executed, including failed ones.
    pub ticks: u64,
    pub tick_errors: u64,
}

/// Periodic executor. Cloning yields another handle to the same ticker.
#[derive(Clone)]
pub struct Ticker {
    inner: Arc<Inner>,
}

struct Inner {
    interval: Option<Duration>,
    fire_immediately: bool,
    mode: TickMode,
    clock: Arc<dyn MonotonicClock>,
    state: Mutex<TickerState>,
    wake: Condvar,
    handler: Mutex<Handler>,
}

struct TickerState {
    running: bool,
    stop_requested: bool,
    /// `on_stop` has been dispatched for the current run.
    stop_dispatched: bool,
    /// `stop` was called while no run was active; the next `start` returns
    /// without running.
    stopped_while_idle: bool,
    /// `stop` was called from inside a callback; `on_stop` runs once that
    /// callback returns.
    stop_deferred: bool,
    callback_thread: Option<ThreadId>,
    next_fire: Option<Instant>,
    /// The next fire time fell outside the clock's range. No further
    /// scheduled ticks until the next `start`.
    schedule_exhausted: bool,
    first_tick_pending: bool,
    args: Vec<String>,
    ticks: u64,
    tick_errors: u64,
}

impl TickerState {
    fn new() -> Self {
        Self {
            running: false,
            stop_requested: false,
            stop_dispatched: false,
            stopped_while_idle: false,
            stop_deferred: false,
            callback_thread: None,
            next_fire: None,
            schedule_exhausted: false,
            first_tick_pending: true,
            args: Vec::new(),
            ticks: 0,
            tick_errors: 0,
        }
    }
}

impl Ticker {
    pub fn builder() -> TickerBuilder {
        TickerBuilder::new()
    }

    /// Create a ticker from a handler and configuration.
    pub fn new(handler: Handler, config: TickerConfig) -> Result<Self> {
        Self::with_clock(handler, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        handler: Handler,
        config: TickerConfig,
        clock: Arc<dyn MonotonicClock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                interval: config.interval(),
                fire_immediately: config.fire_immediately,
                mode: config.mode,
                clock,
                state: Mutex::new(TickerState::new()),
                wake: Condvar::new(),
                handler: Mutex::new(handler),
            }),
        })
    }

    /// Run the ticker on the calling thread until [`stop`](Self::stop).
    ///
    /// Fails with [`TempoError::AlreadyRunning`] if a run is already in
    /// progress, and with [`TempoError::Handler`] if `on_start` fails.
    pub fn start(&self, args: &[String]) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            if state.running {
                return Err(TempoError::AlreadyRunning);
            }
            if state.stopped_while_idle {
                state.stopped_while_idle = false;
                debug!("Ticker was stopped before it started, not running");
                return Ok(());
            }
            state.running = true;
            state.stop_requested = false;
            state.stop_dispatched = false;
            state.stop_deferred = false;
            state.next_fire = None;
            state.schedule_exhausted = false;
            state.first_tick_pending = true;
            state.args = args.to_vec();
        }
        let _finish = FinishOnDrop(&self.inner);

        info!(
            mode = %self.inner.mode,
            interval = ?self.inner.interval,
            "Ticker starting"
        );

        if let Err(e) = self.inner.invoke("on_start", |handler| handler.on_start(args)) {
            return Err(TempoError::Handler(e));
        }

        match self.inner.interval {
            Some(interval) => self.inner.run_scheduled(interval),
            None => self.inner.run_continuous(),
        }

        let ticks = self.inner.state.lock().ticks;
        info!(ticks, "Ticker stopped");
        Ok(())
    }

    /// Request the ticker to stop and run `on_stop`.
    ///
    /// `on_stop` has completed by the time this returns (unless called from
    /// inside a handler callback, in which case it runs as soon as that
    /// callback returns). A tick in progress on another thread is allowed
    /// to finish first. Repeated calls are no-ops.
    pub fn stop(&self) {
        let dispatch_now = {
            let mut state = self.inner.state.lock();
            state.stop_requested = true;
            state.next_fire = None;
            self.inner.wake.notify_all();

            if state.stop_dispatched {
                return;
            }
            state.stop_dispatched = true;
            if !state.running {
                state.stopped_while_idle = true;
            }

            if state.callback_thread == Some(thread::current().id()) {
                state.stop_deferred = true;
                false
            } else {
                true
            }
        };

        if dispatch_now {
            self.inner.dispatch_on_stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running
    }

    pub fn status(&self) -> TickerStatus {
        let state = self.inner.state.lock();
        TickerStatus {
            mode: self.inner.mode,
            interval: self.inner.interval,
            running: state.running,
            first_tick_pending: state.first_tick_pending,
            stop_requested: state.stop_requested,
            ticks: state.ticks,
            tick_errors: state.tick_errors,
        }
    }

    pub fn mode(&self) -> TickMode {
        self.inner.mode
    }

    pub fn interval(&self) -> Option<Duration> {
        self.inner.interval
    }

    /// Time until the next scheduled fire, as seen at `now`. Does not
    /// change any state.
    ///
    /// Zero in continuous mode and before the first tick; `Duration::MAX`
    /// once a stop has been requested or no further tick can be scheduled.
    pub fn time_until_next_tick(&self, now: Instant) -> Duration {
        let state = self.inner.state.lock();
        if state.stop_requested || state.schedule_exhausted {
            return Duration::MAX;
        }
        match (self.inner.interval, state.next_fire) {
            (Some(_), Some(next_fire)) => next_fire.saturating_duration_since(now),
            _ => Duration::ZERO,
        }
    }

    /// Fire the handler if a tick is due at `now`, advancing the schedule.
    ///
    /// Returns whether `on_tick` ran. The first call establishes the
    /// schedule with `now` as the first slot; when `fire_immediately` is
    /// off that slot only runs `on_before_first_tick`.
    pub fn try_tick(&self, now: Instant) -> bool {
        let slot = {
            let mut state = self.inner.state.lock();
            if state.stop_requested || state.schedule_exhausted {
                return false;
            }
            if self.inner.interval.is_none() {
                drop(state);
                self.inner.before_first_tick();
                return self.inner.tick();
            }
            let slot = *state.next_fire.get_or_insert(now);
            if now < slot {
                return false;
            }
            slot
        };
        self.inner.fire_slot(slot, now)
    }

    pub fn now(&self) -> Instant {
        self.inner.clock.now()
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("status", &self.status())
            .finish()
    }
}

impl Inner {
    fn run_continuous(&self) {
        if self.state.lock().stop_requested {
            return;
        }
        self.before_first_tick();
        while !self.state.lock().stop_requested {
            self.tick();
        }
    }

    fn run_scheduled(&self, interval: Duration) {
        let mut state = self.state.lock();
        if state.next_fire.is_none() && !state.stop_requested {
            state.next_fire = Some(self.clock.now());
        }

        loop {
            if state.stop_requested {
                break;
            }
            if state.schedule_exhausted {
                self.wake.wait(&mut state);
                continue;
            }
            let Some(slot) = state.next_fire else {
                break;
            };

            let now = self.clock.now();
            if now < slot {
                self.wake.wait_for(&mut state, slot - now);
                continue;
            }

            MutexGuard::unlocked(&mut state, || {
                self.fire_slot_with(slot, now, interval);
            });
        }
    }

    fn fire_slot(&self, slot: Instant, now: Instant) -> bool {
        match self.interval {
            Some(interval) => self.fire_slot_with(slot, now, interval),
            None => self.tick(),
        }
    }

    /// Process the due `slot`. Returns whether `on_tick` ran.
    fn fire_slot_with(&self, slot: Instant, now: Instant, interval: Duration) -> bool {
        if self.before_first_tick() && !self.fire_immediately {
            debug!("Skipping first slot (fire_immediately = false)");
            self.reschedule(slot.checked_add(interval));
            return false;
        }

        if now.saturating_duration_since(slot) >= interval {
            observe::record_tick_overrun();
        }

        let ran = self.tick();

        let completed = self.clock.now().max(now);
        self.reschedule(self.mode.next_fire(slot, completed, interval));
        ran
    }

    /// Store the next fire time. `None` means it overflowed the clock.
    fn reschedule(&self, next_fire: Option<Instant>) {
        let mut state = self.state.lock();
        if state.stop_requested {
            return;
        }
        if next_fire.is_none() {
            error!(
                interval = ?self.interval,
                "Next fire time is out of the clock's range, no further ticks scheduled"
            );
            state.schedule_exhausted = true;
        }
        state.next_fire = next_fire;
    }

    /// Run `on_before_first_tick` if the first tick is still pending.
    /// Returns whether this call was the first tick.
    fn before_first_tick(&self) -> bool {
        let args = {
            let mut state = self.state.lock();
            if !state.first_tick_pending {
                return false;
            }
            state.first_tick_pending = false;
            state.args.clone()
        };

        if let Err(e) = self.invoke("on_before_first_tick", |handler| {
            if self.state.lock().stop_requested {
                return Ok(());
            }
            handler.on_before_first_tick(&args)
        }) {
            warn!(error = %format_args!("{e:#}"), "on_before_first_tick failed");
        }
        true
    }

    /// Run `on_tick` unless a stop has been requested. Returns whether it
    /// ran.
    fn tick(&self) -> bool {
        let started = Instant::now();
        let mut skipped = false;
        // Checked under the handler lock so no tick starts after `on_stop`.
        let result = self.invoke("on_tick", |handler| {
            if self.state.lock().stop_requested {
                skipped = true;
                return Ok(());
            }
            handler.on_tick()
        });
        if skipped {
            return false;
        }
        let ok = result.is_ok();
        observe::record_tick(started.elapsed(), ok);

        let mut state = self.state.lock();
        state.ticks += 1;
        if let Err(e) = result {
            state.tick_errors += 1;
            error!(
                mode = %self.mode,
                tick = state.ticks,
                error = %format_args!("{e:#}"),
                "Tick failed"
            );
        }
        true
    }

    fn dispatch_on_stop(&self) {
        let result = {
            let mut handler = self.handler.lock();
            catch_panic("on_stop", || handler.on_stop())
        };
        if let Err(e) = result {
            warn!(error = %format_args!("{e:#}"), "on_stop failed");
        }
    }

    /// Invoke a handler callback, converting panics into errors and running
    /// a deferred `on_stop` afterwards.
    fn invoke<F>(&self, name: &'static str, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Handler) -> anyhow::Result<()>,
    {
        self.state.lock().callback_thread = Some(thread::current().id());

        let result = {
            let mut handler = self.handler.lock();
            catch_panic(name, || f(&mut handler))
        };

        let deferred = {
            let mut state = self.state.lock();
            state.callback_thread = None;
            std::mem::take(&mut state.stop_deferred)
        };
        if deferred {
            self.dispatch_on_stop();
        }
        result
    }

    fn finish(&self) {
        let mut state = self.state.lock();
        state.running = false;
        state.next_fire = None;
    }
}

/// Marks the run finished however `start` exits.
struct FinishOnDrop<'a>(&'a Inner);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

fn catch_panic<F>(name: &str, f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| {
            Err(anyhow::anyhow!(
                "{name} panicked: {}",
                panic_message(payload.as_ref())
            ))
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Builder for a [`Ticker`]. A handler is required.
pub struct TickerBuilder {
    handler: Option<Handler>,
    config: TickerConfig,
    clock: Option<Arc<dyn MonotonicClock>>,
}

impl TickerBuilder {
    pub fn new() -> Self {
        Self {
            handler: None,
            config: TickerConfig::default(),
            clock: None,
        }
    }

    /// Use a full lifecycle handler.
    pub fn handler(mut self, handler: impl TickerHandler + 'static) -> Self {
        self.handler = Some(Handler::new(handler));
        self
    }

    /// Use a bare tick callback.
    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.handler = Some(Handler::from_fn(f));
        self
    }

    /// Set the handler directly; `None` clears it.
    pub fn with_handler(mut self, handler: Option<Handler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_interval(Some(interval));
        self
    }

    /// Run the handler in a tight loop instead of on an interval.
    pub fn continuous(mut self) -> Self {
        self.config = self.config.with_interval(None);
        self
    }

    pub fn mode(mut self, mode: TickMode) -> Self {
        self.config = self.config.with_mode(mode);
        self
    }

    pub fn fire_immediately(mut self, fire_immediately: bool) -> Self {
        self.config = self.config.with_fire_immediately(fire_immediately);
        self
    }

    pub fn config(mut self, config: TickerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn MonotonicClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Ticker> {
        let handler = self
            .handler
            .ok_or_else(|| TempoError::Config("handler is required".into()))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ticker::with_clock(handler, self.config, clock)
    }
}

impl Default for TickerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
