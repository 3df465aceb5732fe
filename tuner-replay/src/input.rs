//! # Sample Input Module
//!
//! Reads recorded pitch samples, one JSON object per line:
//!
//! ```text
//! {"t": 0.00, "frequency_hz": 110.4, "confidence": 0.92}
//! {"t": 0.05, "frequency_hz": 0.0, "confidence": 0.0}
//! ```
//!
//! `t` is seconds since the start of the recording and must never go
//! backwards. `confidence` defaults to 1.0. Blank lines and lines starting
//! with `#` are skipped.

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::Sender;
use serde::Deserialize;
use tuner_core::Sample;

/// Capacity of the reader → session channel.
pub const CHANNEL_CAPACITY: usize = 64;

/// Latest accepted timestamp, about 31 years into a recording. Keeps every
/// `t` representable as an offset from the replay's base instant.
pub const MAX_TIMESTAMP_SECS: f64 = 1e9;

fn full_confidence() -> f64 {
    1.0
}

/// A recorded sample and the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TimedSample {
    /// Seconds since the start of the recording.
    pub t: f64,
    pub frequency_hz: f64,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

impl TimedSample {
    pub fn sample(&self) -> Sample {
        Sample {
            frequency_hz: self.frequency_hz,
            confidence: self.confidence,
        }
    }
}

/// Parses one input line.
///
/// # Returns
/// * `Ok(None)` for blank and comment lines
/// * `Err(e)` naming the 1-based line number for malformed input
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<TimedSample>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let sample: TimedSample = serde_json::from_str(trimmed)
        .with_context(|| format!("line {line_number}: malformed sample"))?;
    if !(sample.t.is_finite() && sample.t >= 0.0) {
        bail!("line {line_number}: timestamp must be a finite number >= 0, got {}", sample.t);
    }
    if sample.t > MAX_TIMESTAMP_SECS {
        bail!(
            "line {line_number}: timestamp {} exceeds {MAX_TIMESTAMP_SECS} s",
            sample.t
        );
    }
    Ok(Some(sample))
}

/// Reads every sample from `reader`, checking timestamps never decrease.
pub fn read_samples<R: BufRead>(reader: R) -> impl Iterator<Item = Result<TimedSample>> {
    let mut last_t = 0.0_f64;
    reader
        .lines()
        .enumerate()
        .filter_map(move |(index, line)| {
            let line_number = index + 1;
            let parsed = line
                .with_context(|| format!("line {line_number}: read failed"))
                .and_then(|line| parse_line(line_number, &line));
            match parsed {
                Ok(Some(sample)) if sample.t < last_t => Some(Err(anyhow!(
                    "line {line_number}: timestamp {} is earlier than {}",
                    sample.t,
                    last_t
                ))),
                Ok(Some(sample)) => {
                    last_t = sample.t;
                    Some(Ok(sample))
                }
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            }
        })
}

/// Spawns a thread that parses `reader` and forwards samples in order.
///
/// The thread stops at the first error, after sending it, or when the
/// receiving side hangs up. The channel closes when the thread exits.
pub fn spawn_reader<R>(reader: R, sender: Sender<Result<TimedSample>>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        log::debug!("Sample reader started");
        for item in read_samples(reader) {
            let failed = item.is_err();
            if sender.send(item).is_err() {
                log::debug!("Sample receiver closed");
                return;
            }
            if failed {
                return;
            }
        }
        log::debug!("Sample reader reached end of input");
    })
}
