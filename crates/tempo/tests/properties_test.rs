//! Property tests for the estimators and catch-up policies

use proptest::prelude::*;
use std::time::{Duration, Instant};
use tempo::prelude::*;

proptest! {
    #[test]
    fn ewma_stays_within_sample_range(
        age in 1.0f64..100.0,
        samples in prop::collection::vec(-1e6f64..1e6, 1..50),
    ) {
        let mut ewma = Ewma::new(age).unwrap();
        for sample in &samples {
            ewma.add(*sample);
        }
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(ewma.value() >= min - 1e-6);
        prop_assert!(ewma.value() <= max + 1e-6);
    }

    #[test]
    fn next_fire_never_precedes_policy_floor(
        interval_ms in 1u64..10_000,
        work_ms in 0u64..50_000,
    ) {
        let slot = Instant::now();
        let interval = Duration::from_millis(interval_ms);
        let completed = slot + Duration::from_millis(work_ms);

        let strict = TickMode::Strict.next_fire(slot, completed, interval).unwrap();
        let flex = TickMode::Flex.next_fire(slot, completed, interval).unwrap();
        let spaced = TickMode::Spaced.next_fire(slot, completed, interval).unwrap();

        prop_assert_eq!(strict, slot + interval);
        prop_assert!(flex >= slot + interval && flex >= completed);
        prop_assert_eq!(spaced, completed + interval);
        prop_assert!(strict <= flex && flex <= spaced);
    }

    #[test]
    fn human_duration_parses_its_own_display(secs in 0u64..10_000_000) {
        let duration = HumanDuration::from_secs(secs);
        let parsed: HumanDuration = duration.to_string().parse().unwrap();
        prop_assert_eq!(parsed, duration);
    }
}
