//! Drives a `TunerSession` with recorded samples.
//!
//! Samples are parsed on a reader thread and marshaled over a channel onto
//! the calling thread, which owns the session and handles them strictly in
//! arrival order.

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tuner_core::{Feedback, TunerSession};

use crate::input::{self, CHANNEL_CAPACITY};

/// One output line: the sample time plus the session feedback.
#[derive(Debug, Serialize)]
struct FeedbackLine<'a> {
    t: f64,
    #[serde(flatten)]
    feedback: &'a Feedback,
}

/// Totals for a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub samples: usize,
    pub silent_samples: usize,
    pub success_events: u64,
}

/// Replays every sample from `reader` through `session`, writing one JSON
/// feedback line per sample to `out`.
///
/// Recorded times are mapped onto a monotonic base instant, so dwell and
/// drift timing behave exactly as they did live.
pub fn replay<R, W>(session: &mut TunerSession, reader: R, out: &mut W) -> Result<ReplaySummary>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (sample_tx, sample_rx) = crossbeam_channel::bounded(CHANNEL_CAPACITY);
    let reader_handle = input::spawn_reader(reader, sample_tx);

    let base = Instant::now();
    let mut summary = ReplaySummary::default();
    let mut outcome = Ok(());

    for item in sample_rx.iter() {
        let timed = match item {
            Ok(timed) => timed,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        };
        let Some(now) = Duration::try_from_secs_f64(timed.t)
            .ok()
            .and_then(|offset| base.checked_add(offset))
        else {
            outcome = Err(anyhow!("timestamp {} is out of range", timed.t));
            break;
        };
        let sample = timed.sample();
        let feedback = session.handle_sample(sample, now);

        summary.samples += 1;
        if !sample.has_signal() {
            summary.silent_samples += 1;
        }
        let line = FeedbackLine {
            t: timed.t,
            feedback: &feedback,
        };
        if let Err(e) = serde_json::to_writer(&mut *out, &line)
            .context("failed to encode feedback")
            .and_then(|()| writeln!(out).context("failed to write feedback"))
        {
            outcome = Err(e);
            break;
        }
    }
    // Unblocks the reader if we stopped early.
    drop(sample_rx);

    reader_handle
        .join()
        .map_err(|_| anyhow!("sample reader thread panicked"))?;
    outcome?;
    out.flush().context("failed to flush output")?;

    session.stop();
    summary.success_events = session.success_count();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Cursor;
    use tuner_core::{TunerConfig, tuning};

    fn session() -> TunerSession {
        TunerSession::new(&TunerConfig::default(), tuning::standard().clone()).unwrap()
    }

    fn lines(t_and_freq: &[(f64, f64)]) -> Cursor<String> {
        let text: String = t_and_freq
            .iter()
            .map(|(t, f)| format!("{{\"t\": {t}, \"frequency_hz\": {f}, \"confidence\": 0.9}}\n"))
            .collect();
        Cursor::new(text)
    }

    fn parse_output(out: &[u8]) -> Vec<Value> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn emits_one_line_per_sample() {
        let mut session = session();
        let mut out = Vec::new();
        let input = lines(&[(0.0, 110.2), (0.1, 110.2), (0.2, 0.0)]);

        let summary = replay(&mut session, input, &mut out).unwrap();
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.silent_samples, 1);

        let output = parse_output(&out);
        assert_eq!(output.len(), 3);
        assert_eq!(output[0]["t"], 0.0);
        assert_eq!(output[0]["target"]["name"], "A2");
        assert_eq!(output[0]["detected_frequency_hz"], 110.2);
        assert_eq!(output[2]["detected_frequency_hz"], Value::Null);
        assert_eq!(output[2]["display_cents"], 0.0);
    }

    #[test]
    fn replays_dwell_timing() {
        let mut session = session();
        let mut out = Vec::new();
        let input = lines(&[(0.0, 110.0), (0.1, 110.0), (0.31, 110.0), (0.4, 110.0)]);

        let summary = replay(&mut session, input, &mut out).unwrap();
        assert_eq!(summary.success_events, 1);

        let output = parse_output(&out);
        let triggers: Vec<bool> = output.iter().map(|v| v["did_trigger"].as_bool().unwrap()).collect();
        assert_eq!(triggers, vec![false, false, true, false]);
        assert_eq!(output[3]["is_in_tune"], true);
        assert_eq!(output[3]["success_count"], 1);
    }

    #[test]
    fn replays_drift_relock() {
        let mut session = session();
        let mut out = Vec::new();
        let mut samples = vec![(0.0, 110.0)];
        samples.extend((1..=7).map(|i| (i as f64 * 0.1, 196.0)));
        let input = lines(&samples);

        replay(&mut session, input, &mut out).unwrap();
        let names: Vec<String> = parse_output(&out)
            .iter()
            .map(|v| v["target"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["A2", "A2", "A2", "A2", "A2", "A2", "G3", "G3"]);
    }

    #[test]
    fn replays_recorded_fixture() {
        let mut session = session();
        let mut out = Vec::new();
        let input = Cursor::new(include_str!("../fixtures/a2_then_g3.jsonl").to_string());

        let summary = replay(&mut session, input, &mut out).unwrap();
        assert_eq!(summary.samples, 40);
        assert_eq!(summary.silent_samples, 1);
        assert!(summary.success_events >= 1);

        let output = parse_output(&out);
        assert_eq!(output[0]["target"]["name"], "A2");
        assert_eq!(output.last().unwrap()["target"]["name"], "G3");
    }

    #[test]
    fn malformed_input_stops_replay() {
        let mut session = session();
        let mut out = Vec::new();
        let input = Cursor::new("{\"t\": 0.0, \"frequency_hz\": 110}\n{oops}\n".to_string());

        let err = replay(&mut session, input, &mut out).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{err}");
        assert_eq!(parse_output(&out).len(), 1);
    }

    #[test]
    fn huge_timestamp_is_a_line_error() {
        let mut session = session();
        let mut out = Vec::new();
        let input = Cursor::new("{\"t\": 1e20, \"frequency_hz\": 110}\n".to_string());

        let err = replay(&mut session, input, &mut out).unwrap_err();
        assert!(err.to_string().starts_with("line 1:"), "{err}");
        assert!(out.is_empty());
    }
}
