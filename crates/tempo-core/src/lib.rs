//! Tempo Core: shared types for the tempo periodic-execution toolkit
//!
//! This crate holds the leaf components that the ticker and scheduler
//! crates build on:
//! - Duration codec: seconds <-> compact human strings (`"1h30m"`, `"500ms"`)
//! - EWMA: exponentially weighted moving average of a scalar stream
//! - ETA: completion-time estimate for a bounded task
//! - Clocks: monotonic and wall-clock sources, plus a manual clock for tests
//! - Shutdown signal: cooperative, wakeable stop flag
//! - Error taxonomy shared by every tempo crate

pub mod clock;
pub mod duration;
pub mod error;
pub mod eta;
pub mod ewma;
pub mod observe;
pub mod signal;

pub use clock::{ManualClock, MonotonicClock, SystemClock, WallClock};
pub use duration::{format_duration, format_secs, parse_duration, parse_secs, HumanDuration};
pub use error::{Result, TempoError};
pub use eta::Eta;
pub use ewma::Ewma;
pub use signal::ShutdownSignal;
