//! Headless runner: builds the starter factory, runs it, prints the ledger.
//!
//! ```text
//! ironworks-headless [--config FILE] [--frames N] [--force N]
//! ```

use anyhow::{Context, Result};
use ironworks_core::config::SimConfig;
use ironworks_core::engine::Engine;
use ironworks_core::event::{Event, EventKind};
use ironworks_core::layout::example_factory;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    frames: u64,
    force: u64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        frames: 3600,
        ..Args::default()
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--frames" => {
                let n = it.next().context("--frames needs a value")?;
                args.frames = n.parse().with_context(|| format!("bad --frames {n:?}"))?;
            }
            "--force" => {
                let n = it.next().context("--force needs a value")?;
                args.force = n.parse().with_context(|| format!("bad --force {n:?}"))?;
            }
            other => anyhow::bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    info!(?args, rows = config.rows, cols = config.cols, "starting headless run");

    let mut engine = Engine::from_config(&config)?;
    engine.suppress_event(EventKind::ItemMoved);
    engine.on_passive(
        EventKind::DayEnded,
        Box::new(|e| {
            if let Event::DayEnded { day, daily_profit, .. } = e {
                info!(day, daily_profit, "day closed");
            }
        }),
    );
    example_factory(&mut engine).context("placing the example factory")?;

    for _ in 0..args.frames {
        engine.step_frame();
    }
    for _ in 0..args.force {
        engine.force_step();
    }

    if let Err(msg) = engine.check_invariants() {
        anyhow::bail!("invariant violated: {msg}");
    }
    let view = engine.economy_snapshot();
    info!(
        tick = engine.tick(),
        day = engine.day(),
        balance = view.balance,
        state_hash = %format!("{:016x}", engine.state_hash()),
        "run complete"
    );
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
