//! Convenience re-exports for common types.

pub use crate::config::TickerConfig;
pub use crate::handler::{Handler, TickerHandler};
pub use crate::mode::TickMode;
pub use crate::ticker::{Ticker, TickerBuilder, TickerStatus};
pub use tempo_core::{MonotonicClock, Result, SystemClock, TempoError};
