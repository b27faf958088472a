//! Clock sources.
//!
//! Interval and elapsed-time arithmetic always goes through a
//! [`MonotonicClock`]; calendar alignment goes through a [`WallClock`].
//! [`ManualClock`] implements both and only moves when told to.

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic instants.
pub trait MonotonicClock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Source of calendar-decomposable local time.
pub trait WallClock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The operating-system clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl MonotonicClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that advances only through [`advance`](Self::advance) and
/// [`set_wall`](Self::set_wall).
///
/// Both views move together: advancing by ten seconds moves the monotonic
/// instant and the wall time by ten seconds.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    elapsed: Duration,
    wall: NaiveDateTime,
}

impl ManualClock {
    pub fn new(wall: NaiveDateTime) -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                wall,
            }),
        }
    }

    /// A manual clock whose wall time starts at the current local time.
    pub fn starting_now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock();
        state.elapsed += by;
        if let Some(wall) = chrono::Duration::from_std(by)
            .ok()
            .and_then(|delta| state.wall.checked_add_signed(delta))
        {
            state.wall = wall;
        }
    }

    /// Jump the wall clock without touching the monotonic view.
    pub fn set_wall(&self, wall: NaiveDateTime) {
        self.state.lock().wall = wall;
    }

    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.state.lock().elapsed
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.state.lock().wall
    }
}
