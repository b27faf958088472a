//! Tempo: periodic execution for long-running services
//!
//! - **Ticker**: runs a handler on a fixed interval or continuously, with
//!   `strict`, `flex` and `spaced` catch-up policies and a non-blocking
//!   `try_tick` API for event loops
//! - **Sched**: fires at calendar-aligned local times (daily, weekly,
//!   monthly, hourly, minutely)
//! - **Estimators**: an exponentially weighted moving average and a
//!   progress ETA built on it
//! - **Durations**: a human-readable codec (`"1h01m02s"`) used by configs
//!   and logs
//!
//! # Quick Start
//!
//! ```no_run
//! use tempo::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let ticker = Ticker::builder()
//!     .callback(|| {
//!         tracing::info!("tick");
//!         Ok(())
//!     })
//!     .interval(Duration::from_secs(5))
//!     .mode(TickMode::Flex)
//!     .build()?;
//!
//! let stopper = ticker.clone();
//! std::thread::spawn(move || {
//!     std::thread::sleep(Duration::from_secs(60));
//!     stopper.stop();
//! });
//! ticker.start(&[])?;
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub use tempo_core::{
    clock::{ManualClock, MonotonicClock, SystemClock, WallClock},
    duration::{format_duration, format_secs, parse_duration, parse_secs, HumanDuration},
    error::{Result, TempoError},
    eta::Eta,
    ewma::Ewma,
    signal::ShutdownSignal,
};

pub use tempo_ticker::{
    Handler, TickMode, Ticker, TickerBuilder, TickerConfig, TickerHandler, TickerStatus,
};

pub use tempo_sched::{
    Cadence, Period, Sched, SchedConfig, SchedRun, SchedStopHandle, SyncOutcome,
};

pub use tempo_core::observe;
