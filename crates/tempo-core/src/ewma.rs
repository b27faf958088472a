//! Exponentially weighted moving average.

use crate::error::{Result, TempoError};

/// Default age (in samples) used by [`Ewma::default`].
pub const DEFAULT_AGE: f64 = 30.0;

/// Exponentially weighted moving average of a scalar stream.
///
/// The decay constant is derived from an "age" expressed in samples:
/// `decay = 2 / (age + 1)`. The first sample is taken verbatim; every later
/// sample is blended as `sample * decay + previous * (1 - decay)`.
#[derive(Debug, Clone)]
pub struct Ewma {
    decay: f64,
    value: f64,
    initialized: bool,
}

impl Ewma {
    /// Create an average with the given age. Fails for negative or
    /// non-finite ages.
    pub fn new(age: f64) -> Result<Self> {
        if !age.is_finite() || age < 0.0 {
            return Err(TempoError::Config(format!(
                "EWMA age must be finite and non-negative, got {age}"
            )));
        }
        Ok(Self {
            decay: 2.0 / (age + 1.0),
            value: 0.0,
            initialized: false,
        })
    }

    pub fn add(&mut self, sample: f64) {
        if self.initialized {
            self.value = sample * self.decay + self.value * (1.0 - self.decay);
        } else {
            self.value = sample;
            self.initialized = true;
        }
    }

    /// Current smoothed value, `0.0` before the first sample.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Overwrite the smoothed value.
    ///
    /// Resetting to exactly `0.0` leaves the average uninitialized, so the
    /// next [`add`](Self::add) takes its sample verbatim instead of blending.
    pub fn reset(&mut self, to: f64) {
        self.value = to;
        self.initialized = to != 0.0;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }
}

impl Default for Ewma {
    fn default() -> Self {
        Self {
            decay: 2.0 / (DEFAULT_AGE + 1.0),
            value: 0.0,
            initialized: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_exact() {
        let mut ewma = Ewma::default();
        assert_eq!(ewma.value(), 0.0);
        ewma.add(100.0);
        assert_eq!(ewma.value(), 100.0);
    }

    #[test]
    fn test_second_sample_blends() {
        let mut ewma = Ewma::new(10.0).unwrap();
        ewma.add(100.0);
        ewma.add(0.0);
        let value = ewma.value();
        assert!(value > 81.0 && value < 82.0, "got {value}");
    }

    #[test]
    fn test_converges_to_constant() {
        let mut ewma = Ewma::new(5.0).unwrap();
        ewma.add(0.0);
        for _ in 0..50 {
            ewma.add(42.0);
        }
        assert!((ewma.value() - 42.0).abs() < 0.01);
    }

    #[test]
    fn test_decay_range() {
        assert_eq!(Ewma::new(0.0).unwrap().decay(), 2.0);
        assert_eq!(Ewma::new(1.0).unwrap().decay(), 1.0);
        assert!(Ewma::new(1e6).unwrap().decay() > 0.0);
    }

    #[test]
    fn test_rejects_bad_age() {
        assert!(matches!(Ewma::new(-1.0), Err(TempoError::Config(_))));
        assert!(Ewma::new(f64::NAN).is_err());
        assert!(Ewma::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_reset_to_zero_uninitializes() {
        let mut ewma = Ewma::new(10.0).unwrap();
        ewma.add(50.0);
        ewma.reset(0.0);
        assert!(!ewma.is_initialized());

        // Next sample is taken verbatim, not blended with zero.
        ewma.add(80.0);
        assert_eq!(ewma.value(), 80.0);
    }

    #[test]
    fn test_reset_to_non_zero_blends() {
        let mut ewma = Ewma::new(1.0).unwrap();
        ewma.reset(10.0);
        assert!(ewma.is_initialized());
        assert_eq!(ewma.value(), 10.0);

        // age 1 => decay 1, the new sample fully replaces the old value
        ewma.add(20.0);
        assert_eq!(ewma.value(), 20.0);
    }
}
