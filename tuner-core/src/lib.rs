// tuner-core/src/lib.rs

//! The core logic for the instrument tuner.
//! This crate turns noisy pitch estimates into stable tuning feedback:
//! cent offsets, smoothing, automatic target selection and a debounced
//! "in tune" signal. It performs no pitch detection, no audio I/O and
//! contains no GUI code. Every timestamp is supplied by the caller.

pub mod cents;
pub mod config;
pub mod error;
pub mod gate;
pub mod selector;
pub mod session;
pub mod smoothing;
pub mod tuning;

pub use config::TunerConfig;
pub use error::TunerError;
pub use gate::{GateState, GateUpdate, InTuneGate};
pub use selector::TargetSelector;
pub use session::{Feedback, TunerSession};
pub use smoothing::Smoother;
pub use tuning::{Target, TargetSet};

/// One pitch estimate delivered by the external pitch detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Detected frequency in Hz. Zero or negative means no signal.
    pub frequency_hz: f64,
    /// Detector confidence (0.0 to 1.0).
    pub confidence: f64,
}

impl Sample {
    pub fn has_signal(&self) -> bool {
        self.frequency_hz > 0.0
    }
}
