//! Progress ETA Example
//!
//! Demonstrates:
//! - Estimating time to completion with `Eta`
//! - Rendering remaining time with `format_duration`
//!
//! Run with: cargo run --example progress_eta

use std::thread;
use std::time::Duration;
use tempo::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("progress_eta=info")
        .init();

    println!("=== Tempo ETA Example ===\n");

    let total = 40.0;
    let mut eta = Eta::new(total)?;
    eta.update(0.0);

    for done in 1..=40 {
        // Work slows down halfway through.
        let pause = if done < 20 { 20 } else { 60 };
        thread::sleep(Duration::from_millis(pause));
        eta.update(done as f64);

        if done % 5 == 0 {
            let remaining = eta
                .remaining_secs()
                .map(|secs| format_duration(Duration::from_secs_f64(secs)))
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "   {:>5.1}% done, {:.1} items/s, {} left",
                eta.percent(),
                eta.rate(),
                remaining
            );
        }
    }

    println!("\nDone: {} of {}", eta.completed(), eta.total());
    Ok(())
}
