//! Simulate command - batch matches with an automated herder
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_matches(), report_results()
//! - Level 3: play_single_match(), compute_statistics()
//! - Level 4: herder policy, formatting utilities

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use buffalo_core::{Coord, GameConfig, Match, Outcome, Role};

use crate::settings::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Number of matches to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Give up on a match after this many turns
    #[arg(long, default_value = "200")]
    pub max_turns: u32,

    /// Play matches one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single match
#[derive(Clone, Debug, Serialize)]
struct MatchRecord {
    game_number: usize,
    seed: u64,
    result: Option<Outcome>,
    turns: u32,
    captures: usize,
    code: String,
}

/// Aggregated results
#[derive(Clone, Debug, Serialize)]
struct SimulationResults {
    started_at: DateTime<Utc>,
    total_games: usize,
    wins: usize,
    losses: usize,
    unfinished: usize,
    win_rate: f32,
    avg_turns: f32,
    avg_captures: f32,
    games: Vec<MatchRecord>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Resolve the match config
/// 2. Play all matches
/// 3. Report results
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let config = args.board.resolve(seed)?;

    tracing::info!(
        "Simulating {} matches on {}x{} ({})",
        args.games,
        config.rows,
        config.cols,
        if args.sequential { "sequential" } else { "parallel" }
    );

    let started_at = Utc::now();
    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        create_progress_bar(args.games as u64)?
    };

    let records = play_matches(&config, &args, &progress);
    progress.finish_and_clear();

    let results = compute_statistics(records, started_at);
    report_results(&results, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play every match with its own seed derived from the base seed
fn play_matches(config: &GameConfig, args: &SimulateArgs, progress: &ProgressBar) -> Vec<MatchRecord> {
    let base_seed = config.seed.unwrap_or(42);
    let play = |game_number: usize| {
        let seed = base_seed.wrapping_add(game_number as u64);
        let record = play_single_match(config, game_number + 1, seed, args.max_turns);
        tracing::debug!(
            "Match {}: {:?} in {} turns",
            record.game_number,
            record.result,
            record.turns
        );
        progress.inc(1);
        record
    };

    if args.sequential {
        (0..args.games).map(play).collect()
    } else {
        (0..args.games).into_par_iter().map(play).collect()
    }
}

/// Report simulation results
fn report_results(results: &SimulationResults, json: bool) {
    if json {
        if let Ok(text) = serde_json::to_string_pretty(results) {
            println!("{}", text);
        }
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one match to the end with the automated herder
fn play_single_match(config: &GameConfig, game_number: usize, seed: u64, max_turns: u32) -> MatchRecord {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut game = Match::new(GameConfig {
        seed: Some(seed),
        ..config.clone()
    });

    while !game.is_over() && game.turn < max_turns {
        let (from, to) = match pick_herder_move(&mut game, &mut rng) {
            Some(mv) => mv,
            None => {
                tracing::debug!("Match {}: herder has no legal move", game_number);
                break;
            }
        };
        game.select_piece(from);
        if let Err(e) = game.commit_move(from, to) {
            tracing::warn!("Match {}: {}", game_number, e);
            break;
        }
    }

    MatchRecord {
        game_number,
        seed,
        result: game.outcome(),
        turns: game.turn,
        captures: game.graveyard().len(),
        code: game.current_log(),
    }
}

/// Compute aggregate statistics from match records
fn compute_statistics(games: Vec<MatchRecord>, started_at: DateTime<Utc>) -> SimulationResults {
    let total = games.len();
    let wins = games.iter().filter(|g| g.result == Some(Outcome::Win)).count();
    let losses = games.iter().filter(|g| g.result == Some(Outcome::Lose)).count();
    let unfinished = total - wins - losses;

    let (win_rate, avg_turns, avg_captures) = if total == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let turns: u32 = games.iter().map(|g| g.turns).sum();
        let captures: usize = games.iter().map(|g| g.captures).sum();
        (
            wins as f32 / total as f32,
            turns as f32 / total as f32,
            captures as f32 / total as f32,
        )
    };

    SimulationResults {
        started_at,
        total_games: total,
        wins,
        losses,
        unfinished,
        win_rate,
        avg_turns,
        avg_captures,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Herder policy: capture whenever possible, else block a buffalo about to
/// break through, else a random legal move
fn pick_herder_move(game: &mut Match, rng: &mut ChaCha8Rng) -> Option<(Coord, Coord)> {
    let mut movers: Vec<Coord> = game
        .board()
        .pieces()
        .filter(|p| p.role.is_selectable())
        .map(|p| p.pos)
        .collect();
    movers.sort();

    let rows = game.board().rows();
    let threats: Vec<Coord> = game
        .eligible_buffalo()
        .iter()
        .filter(|b| b.pos.row + 2 >= rows)
        .map(|b| b.pos.forward())
        .collect();

    let mut options = Vec::new();
    let mut blocks = Vec::new();
    for from in movers {
        for to in game.select_piece(from) {
            if game.board().get(to).map_or(false, |p| p.role == Role::Buffalo) {
                game.clear_selection();
                return Some((from, to));
            }
            if threats.contains(&to) {
                blocks.push((from, to));
            }
            options.push((from, to));
        }
    }
    game.clear_selection();

    blocks.choose(rng).or_else(|| options.choose(rng)).copied()
}

fn create_progress_bar(len: u64) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} matches")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

/// Print results as text
fn print_text_results(results: &SimulationResults) {
    let pct = |n: usize| {
        if results.total_games > 0 {
            n as f32 / results.total_games as f32 * 100.0
        } else {
            0.0
        }
    };

    println!("\n=== Simulation Results ({}) ===", results.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Total games: {}", results.total_games);
    println!("Wins:        {} ({:.1}%)", results.wins, pct(results.wins));
    println!("Losses:      {} ({:.1}%)", results.losses, pct(results.losses));
    println!("Unfinished:  {} ({:.1}%)", results.unfinished, pct(results.unfinished));
    println!("Avg turns:    {:.1}", results.avg_turns);
    println!("Avg captures: {:.1}", results.avg_captures);

    if let Some(first) = results.games.first() {
        println!("\nSample share code (game {}): {}", first.game_number, first.code);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(result: Option<Outcome>, turns: u32, captures: usize) -> MatchRecord {
        MatchRecord {
            game_number: 1,
            seed: 0,
            result,
            turns,
            captures,
            code: String::new(),
        }
    }

    #[test]
    fn test_compute_statistics_empty() {
        let results = compute_statistics(vec![], Utc::now());
        assert_eq!(results.wins, 0);
        assert_eq!(results.losses, 0);
        assert_eq!(results.avg_turns, 0.0);
    }

    #[test]
    fn test_compute_statistics() {
        let results = compute_statistics(vec![
            record(Some(Outcome::Win), 10, 3),
            record(Some(Outcome::Lose), 20, 1),
            record(None, 30, 2),
            record(Some(Outcome::Win), 20, 2),
        ], Utc::now());
        assert_eq!(results.wins, 2);
        assert_eq!(results.losses, 1);
        assert_eq!(results.unfinished, 1);
        assert_eq!(results.win_rate, 0.5);
        assert_eq!(results.avg_turns, 20.0);
        assert_eq!(results.avg_captures, 2.0);
    }

    #[test]
    fn test_single_match_finishes() {
        let config = GameConfig::default();
        let record = play_single_match(&config, 1, 7, 200);
        assert!(record.result.is_some());
        assert!(buffalo_core::decode(&record.code).is_ok());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = GameConfig::default().with_seed(3);
        let mut args = SimulateArgs {
            board: BoardArgs::default(),
            games: 6,
            max_turns: 200,
            sequential: true,
            json: false,
        };
        let sequential = play_matches(&config, &args, &ProgressBar::hidden());
        args.sequential = false;
        let parallel = play_matches(&config, &args, &ProgressBar::hidden());

        let codes = |records: &[MatchRecord]| records.iter().map(|r| r.code.clone()).collect::<Vec<_>>();
        assert_eq!(codes(&sequential), codes(&parallel));
    }

    #[test]
    fn test_herder_prefers_capture() {
        // Player on (3,4) with a buffalo just advanced to (2,4)
        let mut game = Match::new(GameConfig::default().with_seed(0));
        let log = buffalo_core::decode("m-4-4-3-4-0,m-1-4-2-4-0").unwrap();
        for (index, event) in log.events().iter().enumerate() {
            game.apply_logged(index, event).unwrap();
        }
        assert_eq!(game.phase(), buffalo_core::Phase::PlayerTurn);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (from, to) = pick_herder_move(&mut game, &mut rng).unwrap();
        assert_eq!(from, Coord::new(3, 4));
        assert_eq!(to, Coord::new(2, 4));
        assert!(game.selected().is_none());
    }

    #[test]
    fn test_herder_blocks_breakthrough() {
        // Buffalo on (3,1) is one step from the last row; (4,1) is the block
        let mut game = Match::new(GameConfig::default().with_seed(0));
        let log = buffalo_core::decode("m-4-4-3-4-0,m-1-1-2-1-0,m-3-4-3-5-0,m-2-1-3-1-0").unwrap();
        for (index, event) in log.events().iter().enumerate() {
            game.apply_logged(index, event).unwrap();
        }

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (_, to) = pick_herder_move(&mut game, &mut rng).unwrap();
        assert_eq!(to, Coord::new(4, 1));
    }
}
