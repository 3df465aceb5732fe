//! # In-Tune Gate Module
//!
//! Debounces the smoothed cent offset into a stable "in tune" signal.
//!
//! The offset must stay within `threshold_cents` for `required_duration`
//! before the gate reports in tune. Leaving the range drops the gate
//! immediately. Each entry into the in-tune state produces exactly one
//! `did_trigger` edge, meant to drive a single success notification.
//!
//! ```text
//! OutOfRange ──in range──▶ Entering(t0) ──held ≥ required──▶ InTune
//!     ▲                        │                               │
//!     └──────out of range──────┴───────────out of range────────┘
//! ```

use std::time::{Duration, Instant};

use crate::config::GateConfig;

/// Debounce state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    OutOfRange,
    /// In range since `entered_at`, not yet for long enough.
    Entering { entered_at: Instant },
    InTune,
}

/// Result of feeding one offset to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateUpdate {
    /// Level signal: currently in tune.
    pub is_in_tune: bool,
    /// Edge signal: this sample completed the dwell.
    pub did_trigger: bool,
}

#[derive(Debug, Clone)]
pub struct InTuneGate {
    threshold_cents: f64,
    required_duration: Duration,
    state: GateState,
}

impl InTuneGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            threshold_cents: config.threshold_cents,
            required_duration: config.required_duration(),
            state: GateState::OutOfRange,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_in_tune(&self) -> bool {
        self.state == GateState::InTune
    }

    pub fn reset(&mut self) {
        self.state = GateState::OutOfRange;
    }

    /// Advances the gate with one smoothed offset taken at `now`.
    pub fn update(&mut self, smoothed_cents: f64, now: Instant) -> GateUpdate {
        if smoothed_cents.abs() > self.threshold_cents || smoothed_cents.is_nan() {
            self.state = GateState::OutOfRange;
            return GateUpdate::default();
        }

        match self.state {
            GateState::InTune => GateUpdate {
                is_in_tune: true,
                did_trigger: false,
            },
            GateState::OutOfRange => {
                self.state = GateState::Entering { entered_at: now };
                GateUpdate::default()
            }
            GateState::Entering { entered_at } => {
                if now.saturating_duration_since(entered_at) >= self.required_duration {
                    log::debug!("In tune at {:+.2} cents", smoothed_cents);
                    self.state = GateState::InTune;
                    GateUpdate {
                        is_in_tune: true,
                        did_trigger: true,
                    }
                } else {
                    GateUpdate::default()
                }
            }
        }
    }
}

impl Default for InTuneGate {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}
