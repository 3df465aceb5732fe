//! Exponential smoothing of per-sample cent offsets.

/// Smoothing factor used by the tuner when no configuration overrides it.
pub const DEFAULT_ALPHA: f64 = 0.25;

/// A single-pole exponential moving average.
///
/// Higher `alpha` follows the input faster; lower `alpha` suppresses more
/// jitter from the pitch estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct Smoother {
    alpha: f64,
    last_value: Option<f64>,
}

impl Smoother {
    /// Creates a smoother with the given factor.
    ///
    /// # Panics
    /// * If `alpha` is not in `(0, 1]`
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "alpha must be in (0, 1]");
        Self {
            alpha,
            last_value: None,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The most recent smoothed value, if any sample has been seen since the
    /// last reset.
    pub fn value(&self) -> Option<f64> {
        self.last_value
    }

    /// Feeds one sample and returns the smoothed value.
    ///
    /// The first sample after construction or [`Smoother::reset`] is returned
    /// unchanged.
    pub fn update(&mut self, new_value: f64) -> f64 {
        let value = match self.last_value {
            Some(previous) => self.alpha * new_value + (1.0 - self.alpha) * previous,
            None => new_value,
        };
        self.last_value = Some(value);
        value
    }

    pub fn reset(&mut self) {
        self.last_value = None;
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}
