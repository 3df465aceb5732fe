//! # Target Selection Module
//!
//! Decides which target of the active tuning the player is sounding.
//!
//! Selection uses two tiers of hysteresis:
//! 1. The lock is sticky: a different nearest target only matters once the
//!    detected pitch is more than `drift_threshold_cents` away from the locked
//!    target.
//! 2. Drift must then be sustained for `drift_duration` before the lock moves.
//!
//! This keeps the target from flickering when the player sits between two
//! strings, or when a single noisy sample resembles another string.

use std::time::{Duration, Instant};

use crate::cents::offset_cents;
use crate::config::SelectorConfig;
use crate::tuning::{Target, TargetSet};

/// Sticky nearest-target tracker.
#[derive(Debug, Clone)]
pub struct TargetSelector {
    drift_threshold_cents: f64,
    drift_duration: Duration,
    locked_target: Option<Target>,
    drift_started_at: Option<Instant>,
}

impl TargetSelector {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            drift_threshold_cents: config.drift_threshold_cents,
            drift_duration: config.drift_duration(),
            locked_target: None,
            drift_started_at: None,
        }
    }

    /// The target currently committed to in auto mode.
    pub fn locked_target(&self) -> Option<&Target> {
        self.locked_target.as_ref()
    }

    /// When the current drift away from the lock began, if drifting.
    pub fn drift_started_at(&self) -> Option<Instant> {
        self.drift_started_at
    }

    /// Clears the lock and the drift timer.
    pub fn reset(&mut self) {
        self.locked_target = None;
        self.drift_started_at = None;
    }

    /// Resolves the current target for one detected pitch.
    ///
    /// # Arguments
    /// * `detected_frequency_hz` - Detected pitch; `<= 0` means no signal
    /// * `target_set` - The active tuning
    /// * `user_chosen` - The target picked manually, used outside auto mode
    /// * `auto_mode` - Whether the selector may pick targets on its own
    /// * `now` - Caller-supplied timestamp of this sample
    ///
    /// # Returns
    /// * The target feedback should be computed against
    pub fn select(
        &mut self,
        detected_frequency_hz: f64,
        target_set: &TargetSet,
        user_chosen: &Target,
        auto_mode: bool,
        now: Instant,
    ) -> Target {
        if !auto_mode || target_set.is_empty() {
            return user_chosen.clone();
        }

        if detected_frequency_hz <= 0.0 {
            return self
                .locked_target
                .clone()
                .unwrap_or_else(|| user_chosen.clone());
        }

        let Some(candidate) = nearest_target(detected_frequency_hz, target_set) else {
            return user_chosen.clone();
        };

        let Some(locked) = self.locked_target.clone() else {
            log::debug!("Locked onto {} at {:.2} Hz", candidate.name, detected_frequency_hz);
            self.locked_target = Some(candidate.clone());
            self.drift_started_at = None;
            return candidate.clone();
        };

        if *candidate == locked {
            self.drift_started_at = None;
            return locked;
        }

        let locked_cents = offset_cents(detected_frequency_hz, locked.frequency_hz);
        if locked_cents.abs() <= self.drift_threshold_cents {
            self.drift_started_at = None;
            return locked;
        }

        match self.drift_started_at {
            None => {
                log::debug!(
                    "Drifting from {} toward {} ({:+.1} cents)",
                    locked.name,
                    candidate.name,
                    locked_cents
                );
                self.drift_started_at = Some(now);
                locked
            }
            Some(started) if now.saturating_duration_since(started) >= self.drift_duration => {
                log::debug!("Relocked from {} to {}", locked.name, candidate.name);
                self.locked_target = Some(candidate.clone());
                self.drift_started_at = None;
                candidate.clone()
            }
            Some(_) => locked,
        }
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(&SelectorConfig::default())
    }
}

/// Finds the target closest to `frequency_hz` in cents.
///
/// Ties go to the earliest target in the set. Returns `None` for an empty set.
pub fn nearest_target(frequency_hz: f64, target_set: &TargetSet) -> Option<&Target> {
    let mut targets = target_set.targets.iter();
    let mut best = targets.next()?;
    let mut best_distance = offset_cents(frequency_hz, best.frequency_hz).abs();

    for target in targets {
        let distance = offset_cents(frequency_hz, target.frequency_hz).abs();
        if distance < best_distance {
            best = target;
            best_distance = distance;
        }
    }
    Some(best)
}
