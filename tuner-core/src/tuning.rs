//! # Tuning Module
//!
//! Target pitches and the instrument tunings built from them.
//!
//! ## Features
//! - `Target`: a named reference pitch such as a single guitar string
//! - `TargetSet`: an ordered tuning, e.g. "Standard" or "Drop D"
//! - A read-only catalog of common guitar tunings
//!
//! The pipeline never owns a tuning. Callers pass the active `TargetSet` by
//! reference on every call, so presets are simply a convenient source of values.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named reference pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Identifier unique within its set (e.g. "A2", "F#3")
    pub name: String,
    /// Frequency in Hz
    pub frequency_hz: f64,
}

impl Target {
    pub fn new(name: impl Into<String>, frequency_hz: f64) -> Self {
        Self {
            name: name.into(),
            frequency_hz,
        }
    }
}

/// An ordered collection of targets defining one instrument tuning.
///
/// Order matters: when two targets are equally close to a detected pitch,
/// the earlier one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSet {
    pub display_name: String,
    pub targets: Vec<Target>,
}

impl TargetSet {
    pub fn new(display_name: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            display_name: display_name.into(),
            targets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn first(&self) -> Option<&Target> {
        self.targets.first()
    }

    /// Finds a target by name.
    pub fn find(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|target| target.name == name)
    }
}

fn target_set(display_name: &str, strings: [(&str, f64); 6]) -> TargetSet {
    TargetSet::new(
        display_name,
        strings
            .into_iter()
            .map(|(name, frequency_hz)| Target::new(name, frequency_hz))
            .collect(),
    )
}

/// Statically built catalog of six-string guitar tunings, low string first.
static PRESETS: Lazy<Vec<TargetSet>> = Lazy::new(|| {
    vec![
        target_set(
            "Standard",
            [("E2", 82.41), ("A2", 110.00), ("D3", 146.83), ("G3", 196.00), ("B3", 246.94), ("E4", 329.63)],
        ),
        target_set(
            "Drop D",
            [("D2", 73.42), ("A2", 110.00), ("D3", 146.83), ("G3", 196.00), ("B3", 246.94), ("E4", 329.63)],
        ),
        target_set(
            "Half-step down",
            [("Eb2", 77.78), ("Ab2", 103.83), ("Db3", 138.59), ("Gb3", 185.00), ("Bb3", 233.08), ("Eb4", 311.13)],
        ),
        target_set(
            "Full-step down",
            [("D2", 73.42), ("G2", 98.00), ("C3", 130.81), ("F3", 174.61), ("A3", 220.00), ("D4", 293.66)],
        ),
        target_set(
            "Drop C",
            [("C2", 65.41), ("G2", 98.00), ("C3", 130.81), ("F3", 174.61), ("A3", 220.00), ("D4", 293.66)],
        ),
        target_set(
            "Open G",
            [("D2", 73.42), ("G2", 98.00), ("D3", 146.83), ("G3", 196.00), ("B3", 246.94), ("D4", 293.66)],
        ),
        target_set(
            "Open D",
            [("D2", 73.42), ("A2", 110.00), ("D3", 146.83), ("F#3", 185.00), ("A3", 220.00), ("D4", 293.66)],
        ),
        target_set(
            "DADGAD",
            [("D2", 73.42), ("A2", 110.00), ("D3", 146.83), ("G3", 196.00), ("A3", 220.00), ("D4", 293.66)],
        ),
    ]
});

/// Case-insensitive display name to catalog index.
static PRESET_INDEX: Lazy<BTreeMap<String, usize>> = Lazy::new(|| {
    PRESETS
        .iter()
        .enumerate()
        .map(|(i, set)| (set.display_name.to_lowercase(), i))
        .collect()
});

/// All built-in tunings, in display order.
pub fn presets() -> &'static [TargetSet] {
    &PRESETS
}

/// The standard E-A-D-G-B-E guitar tuning.
pub fn standard() -> &'static TargetSet {
    &PRESETS[0]
}

/// Looks up a built-in tuning by display name, ignoring case.
pub fn find_preset(display_name: &str) -> Option<&'static TargetSet> {
    PRESET_INDEX
        .get(&display_name.to_lowercase())
        .map(|&i| &PRESETS[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tuning_matches_guitar_strings() {
        let standard = standard();
        assert_eq!(standard.display_name, "Standard");
        let freqs: Vec<f64> = standard.targets.iter().map(|t| t.frequency_hz).collect();
        assert_eq!(freqs, vec![82.41, 110.00, 146.83, 196.00, 246.94, 329.63]);
        assert_eq!(standard.first().map(|t| t.name.as_str()), Some("E2"));
    }

    #[test]
    fn catalog_is_ordered_and_non_empty() {
        let names: Vec<&str> = presets().iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Standard",
                "Drop D",
                "Half-step down",
                "Full-step down",
                "Drop C",
                "Open G",
                "Open D",
                "DADGAD",
            ]
        );
        assert!(presets().iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn preset_lookup_ignores_case() {
        assert_eq!(find_preset("drop d").map(|s| s.display_name.as_str()), Some("Drop D"));
        assert_eq!(find_preset("dadgad").map(|s| s.targets.len()), Some(6));
        assert!(find_preset("Nashville").is_none());
    }

    #[test]
    fn find_target_by_name() {
        let open_d = find_preset("Open D").unwrap();
        assert_eq!(open_d.find("F#3"), Some(&Target::new("F#3", 185.00)));
        assert!(open_d.find("G3").is_none());
    }

    #[test]
    fn target_equality_compares_name_and_frequency() {
        assert_eq!(Target::new("A2", 110.0), Target::new("A2", 110.0));
        assert_ne!(Target::new("A2", 110.0), Target::new("A2", 111.0));
        assert_ne!(Target::new("A2", 110.0), Target::new("Ab2", 110.0));
    }
}
