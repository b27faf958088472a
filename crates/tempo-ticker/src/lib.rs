//! Tempo Ticker
//!
//! Periodic execution of a handler, either on a fixed interval or
//! continuously.
//!
//! # Overview
//!
//! - [`Ticker`]: blocking run loop (`start` / `stop`) plus a non-blocking
//!   `time_until_next_tick` / `try_tick` pair for multiplexed event loops
//! - [`TickerHandler`]: lifecycle callbacks with no-op defaults
//! - [`Handler`]: a full handler or a bare closure adapted into one
//! - [`TickMode`]: catch-up policy when a tick overruns its interval
//!   (`strict`, `flex`, `spaced`)
//!
//! Handler failures never kill the ticker: errors and panics from
//! `on_tick` are logged through `tracing` and counted in the status.

pub mod config;
pub mod handler;
pub mod mode;
pub mod ticker;

pub mod prelude;

pub use config::TickerConfig;
pub use handler::{Handler, TickerHandler};
pub use mode::TickMode;
pub use ticker::{Ticker, TickerBuilder, TickerStatus};
