//! Replay command - paced playback of a share code
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_back()
//! - Level 3: (delegated to buffalo_core::Playback)

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use buffalo_core::Playback;

use crate::render::{describe_event, describe_outcome, render_board};
use crate::settings::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ReplayArgs {
    /// Share code printed at the end of a match
    #[arg(allow_hyphen_values = true)]
    pub code: String,

    #[command(flatten)]
    pub board: BoardArgs,

    /// Milliseconds between events (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run replay command
pub fn run(args: ReplayArgs) -> Result<()> {
    let mut config = args.board.resolve(None)?;
    if let Some(interval) = args.interval_ms {
        config.replay_interval_ms = interval;
    }

    let playback = match Playback::load(config, &args.code) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Rejected share code {:?}: {}", args.code, e);
            println!("No replay available.");
            return Ok(());
        }
    };

    // Decodes, but does not fit the starting board
    if let Err(e) = playback.verify() {
        tracing::warn!("Unplayable share code {:?}: {}", args.code, e);
        println!("No replay available.");
        return Ok(());
    }

    tracing::info!("Replaying {} events", playback.total());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(play_back(playback))
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Apply one event per tick, strictly in log order
async fn play_back(mut playback: Playback) -> Result<()> {
    print!("{}", render_board(playback.game()));

    let period = playback.interval().max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let index = playback.position() + 1;
        match playback.step() {
            Ok(Some(event)) => {
                println!("[{}/{}] {}", index, playback.total(), describe_event(&event));
                print!("{}", render_board(playback.game()));
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Replay stopped: {}", e);
                println!("Replay stopped at event {}.", index);
                return Ok(());
            }
        }
    }

    match playback.game().outcome() {
        Some(result) => println!("{}", describe_outcome(result)),
        None => println!("Match still in progress."),
    }
    Ok(())
}
