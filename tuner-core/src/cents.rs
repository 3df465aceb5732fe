//! # Cents Module
//!
//! Converts measured frequencies into pitch offsets expressed in cents,
//! the logarithmic unit the tuner reports to the player.
//!
//! - 100 cents = 1 semitone
//! - 1200 cents = 1 octave
//! - Positive values are sharp, negative values are flat

/// Half-width of the range shown on a tuning indicator, in cents.
pub const DISPLAY_RANGE_CENTS: f64 = 50.0;

/// Calculates the offset of `frequency_hz` from `target_hz` in cents.
///
/// # Arguments
/// * `frequency_hz` - Measured frequency in Hz
/// * `target_hz` - Reference frequency in Hz
///
/// # Returns
/// * `1200 * log2(frequency_hz / target_hz)` when both inputs are strictly positive
/// * `0.0` otherwise, meaning "no reliable offset"
pub fn offset_cents(frequency_hz: f64, target_hz: f64) -> f64 {
    if frequency_hz > 0.0 && target_hz > 0.0 {
        1200.0 * (frequency_hz / target_hz).log2()
    } else {
        0.0
    }
}

/// Clamps a cent offset to `[-DISPLAY_RANGE_CENTS, DISPLAY_RANGE_CENTS]`.
pub fn clamp_for_display(cents: f64) -> f64 {
    cents.clamp(-DISPLAY_RANGE_CENTS, DISPLAY_RANGE_CENTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn same_frequency_is_zero_cents() {
        for f in [27.5, 82.41, 110.0, 440.0, 4186.0] {
            assert_eq!(offset_cents(f, f), 0.0);
        }
    }

    #[test]
    fn octave_is_twelve_hundred_cents() {
        assert_relative_eq!(offset_cents(220.0, 110.0), 1200.0, epsilon = 1e-9);
        assert_relative_eq!(offset_cents(55.0, 110.0), -1200.0, epsilon = 1e-9);
    }

    #[test]
    fn semitone_is_one_hundred_cents() {
        let a_sharp = 440.0 * 2f64.powf(1.0 / 12.0);
        assert_relative_eq!(offset_cents(a_sharp, 440.0), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn increases_with_frequency_and_decreases_with_target() {
        let freqs = [100.0, 100.5, 101.0, 150.0, 200.0];
        for pair in freqs.windows(2) {
            assert!(offset_cents(pair[1], 110.0) > offset_cents(pair[0], 110.0));
            assert!(offset_cents(110.0, pair[1]) < offset_cents(110.0, pair[0]));
        }
    }

    #[test]
    fn non_positive_inputs_yield_zero() {
        assert_eq!(offset_cents(0.0, 110.0), 0.0);
        assert_eq!(offset_cents(110.0, 0.0), 0.0);
        assert_eq!(offset_cents(-5.0, 110.0), 0.0);
        assert_eq!(offset_cents(110.0, -1.0), 0.0);
        assert_eq!(offset_cents(0.0, 0.0), 0.0);
    }

    #[test]
    fn display_clamp_limits_range() {
        assert_eq!(clamp_for_display(-35.0), -35.0);
        assert_eq!(clamp_for_display(-80.0), -50.0);
        assert_eq!(clamp_for_display(40.0), 40.0);
        assert_eq!(clamp_for_display(1200.0), 50.0);
    }

    #[test]
    fn display_clamp_is_idempotent() {
        for cents in [-500.0, -50.0, -12.5, 0.0, 3.0, 50.0, 75.0] {
            let once = clamp_for_display(cents);
            assert_eq!(clamp_for_display(once), once);
            assert!((-DISPLAY_RANGE_CENTS..=DISPLAY_RANGE_CENTS).contains(&once));
        }
    }
}
