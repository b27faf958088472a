//! Tempo Sched
//!
//! Fires at calendar-aligned times in local wall-clock time: daily or
//! monthly at `HH:MM`, weekly on a given weekday, hourly at a minute offset,
//! or minutely at a second offset.
//!
//! ```no_run
//! use std::time::Duration;
//! use tempo_sched::{Period, Sched};
//!
//! let mut sched = Sched::new(Period::Daily, "14:30", None)?;
//! for fired_at in sched.run(Duration::from_secs(3600), false) {
//!     println!("fired at {fired_at}");
//! }
//! # Ok::<(), tempo_core::TempoError>(())
//! ```
//!
//! Wall time is naive local time; DST transitions are not special-cased.

pub mod cadence;
pub mod config;
pub mod period;
pub mod sched;

pub mod prelude;

pub use cadence::Cadence;
pub use config::SchedConfig;
pub use period::Period;
pub use sched::{Sched, SchedRun, SchedStopHandle, SyncOutcome, DEFAULT_POLL_INTERVAL};
