//! # Tuner Session Module
//!
//! Orchestrates the conditioning pipeline for one tuning session.
//!
//! Each sample flows `offset_cents → Smoother → InTuneGate`, while the
//! `TargetSelector` runs on the raw detected frequency to decide which target
//! the offset is measured against.
//!
//! The session is the single owner of every component state. External
//! changes (a new tuning, toggling auto mode, picking a target by hand) go
//! through explicit methods that issue the matching `reset()` calls; nothing
//! resets implicitly. Callers on other threads must marshal samples onto the
//! thread that owns the session, in arrival order.

use std::time::Instant;

use serde::Serialize;

use crate::Sample;
use crate::cents::{clamp_for_display, offset_cents};
use crate::config::TunerConfig;
use crate::error::{Result, TunerError};
use crate::gate::InTuneGate;
use crate::selector::TargetSelector;
use crate::smoothing::Smoother;
use crate::tuning::{Target, TargetSet};

/// Everything a presentation layer needs after one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    /// Detected frequency, `None` when the sample carried no signal.
    pub detected_frequency_hz: Option<f64>,
    pub confidence: f64,
    /// The target the offset is measured against.
    pub target: Target,
    /// Unsmoothed offset of this sample in cents.
    pub raw_cents: f64,
    /// Smoothed offset clamped to the indicator range.
    pub display_cents: f64,
    pub is_in_tune: bool,
    /// Set on the single sample that completed an in-tune dwell.
    pub did_trigger: bool,
    /// Number of in-tune events so far in this session.
    pub success_count: u64,
}

#[derive(Debug)]
pub struct TunerSession {
    smoother: Smoother,
    selector: TargetSelector,
    gate: InTuneGate,
    target_set: TargetSet,
    chosen_target: Target,
    auto_mode: bool,
    success_count: u64,
}

impl TunerSession {
    /// Starts a session in auto mode with the first target of `target_set`
    /// chosen.
    ///
    /// # Returns
    /// * `Err(TunerError::InvalidValue)` if a setting is out of its domain
    /// * `Err(TunerError::EmptyTargetSet)` if the tuning has no targets
    pub fn new(config: &TunerConfig, target_set: TargetSet) -> Result<Self> {
        config.validate()?;
        let chosen_target = target_set
            .first()
            .cloned()
            .ok_or_else(|| TunerError::EmptyTargetSet(target_set.display_name.clone()))?;

        log::info!(
            "Tuner session started with {} ({} targets)",
            target_set.display_name,
            target_set.targets.len()
        );

        Ok(Self {
            smoother: Smoother::new(config.smoothing.alpha),
            selector: TargetSelector::new(&config.selector),
            gate: InTuneGate::new(&config.gate),
            target_set,
            chosen_target,
            auto_mode: true,
            success_count: 0,
        })
    }

    pub fn target_set(&self) -> &TargetSet {
        &self.target_set
    }

    pub fn chosen_target(&self) -> &Target {
        &self.chosen_target
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    /// Runs one sample through the pipeline.
    pub fn handle_sample(&mut self, sample: Sample, now: Instant) -> Feedback {
        if !sample.has_signal() {
            self.reset_feedback();
            return Feedback {
                detected_frequency_hz: None,
                confidence: 0.0,
                target: self.chosen_target.clone(),
                raw_cents: 0.0,
                display_cents: 0.0,
                is_in_tune: false,
                did_trigger: false,
                success_count: self.success_count,
            };
        }

        let resolved = self.selector.select(
            sample.frequency_hz,
            &self.target_set,
            &self.chosen_target,
            self.auto_mode,
            now,
        );
        if resolved != self.chosen_target {
            log::debug!("Target changed from {} to {}", self.chosen_target.name, resolved.name);
            self.chosen_target = resolved;
            self.reset_feedback();
        }

        let raw_cents = offset_cents(sample.frequency_hz, self.chosen_target.frequency_hz);
        let smoothed_cents = self.smoother.update(raw_cents);
        let update = self.gate.update(smoothed_cents, now);
        if update.did_trigger {
            self.success_count += 1;
            log::debug!(
                "{} in tune (event #{})",
                self.chosen_target.name,
                self.success_count
            );
        }

        Feedback {
            detected_frequency_hz: Some(sample.frequency_hz),
            confidence: sample.confidence,
            target: self.chosen_target.clone(),
            raw_cents,
            display_cents: clamp_for_display(smoothed_cents),
            is_in_tune: update.is_in_tune,
            did_trigger: update.did_trigger,
            success_count: self.success_count,
        }
    }

    /// Switches to another tuning.
    ///
    /// The chosen target carries over by name when the new tuning has a
    /// target with the same name, otherwise the first target is chosen.
    pub fn set_target_set(&mut self, target_set: TargetSet) -> Result<()> {
        let chosen_target = target_set
            .find(&self.chosen_target.name)
            .or_else(|| target_set.first())
            .cloned()
            .ok_or_else(|| TunerError::EmptyTargetSet(target_set.display_name.clone()))?;

        log::info!(
            "Tuning changed from {} to {}",
            self.target_set.display_name,
            target_set.display_name
        );
        self.target_set = target_set;
        self.chosen_target = chosen_target;
        self.selector.reset();
        self.reset_feedback();
        Ok(())
    }

    /// Turns automatic target selection on or off.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        if self.auto_mode == enabled {
            return;
        }
        log::info!("Auto target selection {}", if enabled { "enabled" } else { "disabled" });
        self.auto_mode = enabled;
        self.selector.reset();
        self.reset_feedback();
    }

    /// Picks a target by hand.
    pub fn choose_target(&mut self, target: Target) {
        if self.chosen_target == target {
            return;
        }
        if self.target_set.find(&target.name).is_none() {
            log::warn!(
                "Target {} is not part of {}",
                target.name,
                self.target_set.display_name
            );
        }
        self.chosen_target = target;
        self.reset_feedback();
    }

    /// Picks a target of the active tuning by name.
    ///
    /// # Returns
    /// * `false` if the tuning has no target with that name
    pub fn choose_target_by_name(&mut self, name: &str) -> bool {
        match self.target_set.find(name).cloned() {
            Some(target) => {
                self.choose_target(target);
                true
            }
            None => {
                log::warn!("No target named {} in {}", name, self.target_set.display_name);
                false
            }
        }
    }

    /// Stops listening: forgets smoothed and debounced values.
    pub fn stop(&mut self) {
        self.reset_feedback();
    }

    fn reset_feedback(&mut self) {
        self.gate.reset();
        self.smoother.reset();
    }
}
