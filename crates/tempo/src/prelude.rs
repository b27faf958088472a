//! Tempo Prelude
//!
//! ```
//! use tempo::prelude::*;
//! ```

// Core types
pub use crate::{Result, TempoError};

// Durations
pub use crate::{format_duration, parse_duration, HumanDuration};

// Ticker
pub use crate::{Handler, TickMode, Ticker, TickerConfig, TickerHandler, TickerStatus};

// Scheduler
pub use crate::{Period, Sched, SchedConfig, SchedStopHandle, SyncOutcome};

// Estimators
pub use crate::{Eta, Ewma};

// Clocks
pub use crate::{ManualClock, SystemClock};

// Re-export common external deps
pub use anyhow;
pub use chrono;
pub use serde::{Deserialize, Serialize};
pub use std::sync::Arc;
pub use tracing;
