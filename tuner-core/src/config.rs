//! Tuner settings, defaults and TOML persistence.
//!
//! Every section implements `Default`, so a settings file only needs to name
//! the values it changes:
//!
//! ```toml
//! [gate]
//! threshold_cents = 3.0
//!
//! [[tunings]]
//! display_name = "Bass Standard"
//! targets = [
//!     { name = "E1", frequency_hz = 41.20 },
//!     { name = "A1", frequency_hz = 55.00 },
//!     { name = "D2", frequency_hz = 73.42 },
//!     { name = "G2", frequency_hz = 98.00 },
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TunerError};
use crate::smoothing::DEFAULT_ALPHA;
use crate::tuning::{self, TargetSet};

/// Converts a validated duration setting. `validate` rejects negative and
/// non-finite values before any component is built from them.
fn secs(value: f64) -> Duration {
    debug_assert!(
        value.is_finite() && value >= 0.0,
        "duration setting {value} was not validated"
    );
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TunerError::invalid(field, format!("expected a finite value >= 0, got {value}")))
    }
}

/// Settings for the cent smoother.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Exponential smoothing factor in `(0, 1]`.
    pub alpha: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Settings for automatic target selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Distance from the locked target, in cents, below which a different
    /// nearest target is treated as noise.
    pub drift_threshold_cents: f64,
    /// How long drift must be sustained before the lock moves.
    pub drift_duration_secs: f64,
}

impl SelectorConfig {
    pub fn drift_duration(&self) -> Duration {
        secs(self.drift_duration_secs)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            drift_threshold_cents: 120.0,
            drift_duration_secs: 0.5,
        }
    }
}

/// Settings for the in-tune debounce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Maximum absolute smoothed offset, in cents, that counts as in tune.
    pub threshold_cents: f64,
    /// How long the offset must stay in range before reporting in tune.
    pub required_duration_secs: f64,
}

impl GateConfig {
    pub fn required_duration(&self) -> Duration {
        secs(self.required_duration_secs)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold_cents: 5.0,
            required_duration_secs: 0.3,
        }
    }
}

/// Top-level tuner configuration, serialised as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    pub smoothing: SmoothingConfig,
    pub selector: SelectorConfig,
    pub gate: GateConfig,
    /// User-defined tunings, searched before the built-in presets.
    pub tunings: Vec<TargetSet>,
}

impl TunerConfig {
    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| TunerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded tuner settings from {}", path.display());
        Ok(config)
    }

    /// Writes settings to a file as pretty-printed TOML.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| TunerError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks every value against its documented domain.
    pub fn validate(&self) -> Result<()> {
        let alpha = self.smoothing.alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(TunerError::invalid(
                "smoothing.alpha",
                format!("expected a value in (0, 1], got {alpha}"),
            ));
        }
        check_non_negative("selector.drift_threshold_cents", self.selector.drift_threshold_cents)?;
        check_non_negative("selector.drift_duration_secs", self.selector.drift_duration_secs)?;
        check_non_negative("gate.threshold_cents", self.gate.threshold_cents)?;
        check_non_negative("gate.required_duration_secs", self.gate.required_duration_secs)?;

        for set in &self.tunings {
            if set.display_name.trim().is_empty() {
                return Err(TunerError::invalid("tunings.display_name", "must not be empty"));
            }
            if set.is_empty() {
                return Err(TunerError::EmptyTargetSet(set.display_name.clone()));
            }
            let mut seen = HashSet::new();
            for target in &set.targets {
                if !(target.frequency_hz.is_finite() && target.frequency_hz > 0.0) {
                    return Err(TunerError::invalid(
                        format!("tunings.{}.{}", set.display_name, target.name),
                        format!("frequency must be > 0 Hz, got {}", target.frequency_hz),
                    ));
                }
                if !seen.insert(target.name.as_str()) {
                    return Err(TunerError::invalid(
                        format!("tunings.{}", set.display_name),
                        format!("duplicate target name `{}`", target.name),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Resolves a tuning by display name, ignoring case. User-defined
    /// tunings shadow built-in presets with the same name.
    pub fn find_tuning(&self, display_name: &str) -> Option<&TargetSet> {
        self.tunings
            .iter()
            .find(|set| set.display_name.eq_ignore_ascii_case(display_name))
            .or_else(|| tuning::find_preset(display_name))
    }

    /// All tunings available under this configuration: user-defined first.
    pub fn available_tunings(&self) -> impl Iterator<Item = &TargetSet> {
        self.tunings.iter().chain(tuning::presets())
    }
}
