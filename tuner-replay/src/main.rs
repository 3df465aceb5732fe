//! # Tuner Replay
//!
//! Headless driver for the tuning pipeline. Feeds recorded pitch samples
//! (JSON lines) through a `TunerSession` and prints one JSON feedback line
//! per sample on stdout. Logs go to stderr; set `RUST_LOG=debug` to see lock
//! changes and in-tune events.

mod input;
mod replay;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tuner_core::{TunerConfig, TunerSession};

#[derive(Parser, Debug)]
#[command(
    name = "tuner-replay",
    about = "Replay recorded pitch samples through the tuning pipeline"
)]
struct Cli {
    /// JSON-lines file of samples (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,
    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tuning to use, by display name
    #[arg(long, default_value = "Standard")]
    tuning: String,
    /// Initially chosen target, by name
    #[arg(long)]
    target: Option<String>,
    /// Disable automatic target selection
    #[arg(long)]
    manual: bool,
    /// Print the available tunings and exit
    #[arg(long)]
    list_tunings: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => TunerConfig::load(path)?,
        None => TunerConfig::default(),
    };

    if cli.list_tunings {
        for set in config.available_tunings() {
            let names: Vec<&str> = set.targets.iter().map(|t| t.name.as_str()).collect();
            println!("{}: {}", set.display_name, names.join(" "));
        }
        return Ok(());
    }

    let Some(target_set) = config.find_tuning(&cli.tuning).cloned() else {
        bail!("unknown tuning `{}` (try --list-tunings)", cli.tuning);
    };
    let mut session = TunerSession::new(&config, target_set)?;
    session.set_auto_mode(!cli.manual);
    if let Some(name) = &cli.target {
        if !session.choose_target_by_name(name) {
            bail!("tuning `{}` has no target `{}`", session.target_set().display_name, name);
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            replay::replay(&mut session, BufReader::new(file), &mut out)?
        }
        None => replay::replay(&mut session, BufReader::new(io::stdin()), &mut out)?,
    };

    log::info!(
        "Replayed {} samples ({} without signal), {} in-tune events",
        summary.samples,
        summary.silent_samples,
        summary.success_events
    );
    Ok(())
}
