//! Calendar Scheduler Example
//!
//! Demonstrates:
//! - Loading a schedule from JSON configuration
//! - Firing immediately on start with `instant`
//! - Stopping the run loop with a stop handle
//!
//! Run with: cargo run --example calendar_sched

use std::thread;
use std::time::Duration;
use tempo::prelude::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("tempo_sched=debug,calendar_sched=debug")
        .init();

    println!("=== Tempo Sched Example ===\n");

    let config: SchedConfig = serde_json::from_str(
        r#"{
            "period": "minutely",
            "at": "0",
            "poll_interval": "500ms",
            "status_interval": "10s",
            "instant": true
        }"#,
    )?;

    let mut sched = Sched::from_config(&config)?;
    let handle = sched.stop_handle();

    thread::spawn(move || {
        thread::sleep(Duration::from_secs(75));
        println!("\nDemo timeout reached, stopping scheduler...");
        handle.stop();
    });

    for fired_at in sched.run(config.status_interval.as_duration(), config.instant) {
        println!("⏰ Fired at {fired_at}");
    }

    if let Some(next) = sched.next_fire_time() {
        println!("Next fire would have been {next}");
    }
    Ok(())
}
