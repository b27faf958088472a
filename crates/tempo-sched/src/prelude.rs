//! Convenience re-exports for common types.

pub use crate::config::SchedConfig;
pub use crate::period::Period;
pub use crate::sched::{Sched, SchedRun, SchedStopHandle, SyncOutcome};
pub use tempo_core::{Result, SystemClock, TempoError, WallClock};
