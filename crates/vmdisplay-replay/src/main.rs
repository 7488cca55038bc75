//! Replay harness entry point.
//!
//! Reads a TOML scenario, replays it through the bridge, and prints the
//! resulting VM event stream as JSON lines on stdout. Display signals and
//! counters go to the log so the stdout stream stays machine-readable:
//!
//! ```bash
//! vmdisplay-replay scenario.toml | jq .
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vmdisplay_replay::{ReplayRunner, Scenario};

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: vmdisplay-replay <scenario.toml>")?;

    let scenario = Scenario::load(&path)
        .with_context(|| format!("loading scenario {}", path.display()))?;
    info!(steps = scenario.steps.len(), "replaying {}", path.display());

    let report = ReplayRunner::new().run(&scenario);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in &report.events {
        serde_json::to_writer(&mut out, event)?;
        out.write_all(b"\n")?;
    }

    info!(
        events = report.events.len(),
        redraws = report.redraws,
        relayouts = report.relayouts.len(),
        focus_requested = report.focus_requested,
        "replay complete"
    );
    Ok(())
}
