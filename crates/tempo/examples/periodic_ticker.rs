//! Periodic Ticker Example
//!
//! Demonstrates:
//! - A full `TickerHandler` with lifecycle callbacks
//! - Flex catch-up after a slow tick
//! - Stopping the ticker from another thread
//!
//! Run with: cargo run --example periodic_ticker

use std::thread;
use std::time::Duration;
use tempo::prelude::*;

struct Heartbeat {
    beats: u64,
}

impl TickerHandler for Heartbeat {
    fn on_start(&mut self, args: &[String]) -> anyhow::Result<()> {
        println!("▶️  Starting heartbeat (args: {args:?})");
        Ok(())
    }

    fn on_before_first_tick(&mut self, _args: &[String]) -> anyhow::Result<()> {
        println!("   Warming up before the first beat");
        Ok(())
    }

    fn on_tick(&mut self) -> anyhow::Result<()> {
        self.beats += 1;
        println!("   💓 beat {}", self.beats);
        if self.beats == 3 {
            // Overrun two intervals; flex mode fires once right after.
            thread::sleep(Duration::from_millis(1200));
        }
        if self.beats == 5 {
            anyhow::bail!("simulated failure on beat 5");
        }
        Ok(())
    }

    fn on_stop(&mut self) -> anyhow::Result<()> {
        println!("⏹️  Heartbeat stopped after {} beats", self.beats);
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("tempo_ticker=debug,periodic_ticker=debug")
        .init();

    println!("=== Tempo Ticker Example ===\n");

    let ticker = Ticker::builder()
        .handler(Heartbeat { beats: 0 })
        .interval(Duration::from_millis(500))
        .mode(TickMode::Flex)
        .build()?;

    let stopper = ticker.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(5));
        stopper.stop();
    });

    ticker.start(&["demo".to_string()])?;

    let status = ticker.status();
    println!(
        "\nTicks: {}, failures: {}, mode: {}",
        status.ticks, status.tick_errors, status.mode
    );
    Ok(())
}
