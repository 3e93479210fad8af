//! Play command - interactive terminal match
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_loop()
//! - Level 3: handle_square(), finish_turn()
//! - Level 4: command parsing

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep, Instant};

use buffalo_core::{Coord, GameConfig, Match, TurnOutcome, TurnTicket};

use crate::render::{describe_outcome, render_board};
use crate::settings::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Delay before the buffalo answer, in milliseconds (overrides config)
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

/// One line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Square(Coord),
    Cancel,
    New,
    Code,
    Help,
    Quit,
    Unknown,
}

const HELP: &str = "Commands: `<row> <col>` select / move, `c` cancel selection, \
`new` restart, `code` share code, `help`, `quit`";

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let mut config = args.board.resolve(seed)?;
    if let Some(delay) = args.delay_ms {
        config.ai_delay_ms = delay;
    }

    tracing::info!(
        "Starting match on {}x{} (seed={:?})",
        config.rows,
        config.cols,
        config.seed
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(play_loop(config))
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Read input and pace buffalo turns until the player quits or stdin closes
async fn play_loop(config: GameConfig) -> Result<()> {
    let mut game = Match::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Single timer, re-armed for every buffalo turn
    let timer = sleep(std::time::Duration::ZERO);
    tokio::pin!(timer);
    let mut pending: Option<TurnTicket> = None;

    println!("{}", HELP);
    print!("{}", render_board(&game));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(l) => l,
                    None => break,
                };

                match parse_command(&line) {
                    Command::Quit => break,
                    Command::Help | Command::Unknown => println!("{}", HELP),
                    Command::Code => println!("Share code: {}", game.current_log()),
                    Command::Cancel => {
                        game.clear_selection();
                        print!("{}", render_board(&game));
                    }
                    Command::New => {
                        // Drops any buffalo turn still waiting on the timer
                        game.restart();
                        pending = None;
                        print!("{}", render_board(&game));
                    }
                    Command::Square(pos) => {
                        if pending.is_some() {
                            println!("The buffalo are moving...");
                        } else if let Some(ticket) = handle_square(&mut game, pos) {
                            timer.as_mut().reset(Instant::now() + ticket.delay());
                            pending = Some(ticket);
                        }
                    }
                }
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(ticket) = pending.take() {
                    match game.advance_buffalo(ticket) {
                        Ok(outcome) => finish_turn(&game, outcome),
                        Err(e) => tracing::warn!("Dropped buffalo turn: {}", e),
                    }
                }
            }
        }
    }

    if !game.log().is_empty() {
        println!("Share code: {}", game.current_log());
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Select a piece, or move the selected piece onto a highlighted square
fn handle_square(game: &mut Match, pos: Coord) -> Option<TurnTicket> {
    if game.is_over() {
        println!("Match is over. Type `new` to play again.");
        return None;
    }

    if let Some(from) = game.selected() {
        if game.guides().iter().any(|g| g.pos == pos) {
            return match game.commit_player_move(from, pos) {
                Ok(player_move) => {
                    if player_move.record.captured {
                        println!("Captured a buffalo at {}", pos);
                    }
                    print!("{}", render_board(game));
                    Some(player_move.ticket)
                }
                Err(e) => {
                    tracing::warn!("Move rejected: {}", e);
                    None
                }
            };
        }
    }

    let dests = game.select_piece(pos);
    if dests.is_empty() {
        game.clear_selection();
        println!("Nothing to move from {}", pos);
    }
    print!("{}", render_board(game));
    None
}

/// Show the buffalo answer and the result if the match ended
fn finish_turn(game: &Match, outcome: TurnOutcome) {
    if let Some(record) = outcome.buffalo_move {
        println!("Buffalo {} -> {}", record.from, record.to);
    }
    print!("{}", render_board(game));

    if let Some(result) = game.outcome() {
        println!("{}", describe_outcome(result));
        println!("Share code: {}", game.current_log());
        println!("Type `new` to play again.");
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_command(line: &str) -> Command {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "q" | "quit" | "exit" => return Command::Quit,
        "n" | "new" | "restart" => return Command::New,
        "code" | "share" => return Command::Code,
        "c" | "cancel" => return Command::Cancel,
        "h" | "help" | "?" => return Command::Help,
        _ => {}
    }

    let parts: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    match parts.as_slice() {
        [row, col] => match (row.parse::<i8>(), col.parse::<i8>()) {
            (Ok(row), Ok(col)) => Command::Square(Coord::new(row, col)),
            _ => Command::Unknown,
        },
        _ => Command::Unknown,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_squares() {
        assert_eq!(parse_command("4 4"), Command::Square(Coord::new(4, 4)));
        assert_eq!(parse_command(" 3,5 "), Command::Square(Coord::new(3, 5)));
        assert_eq!(parse_command("3, 5"), Command::Square(Coord::new(3, 5)));
        assert_eq!(parse_command("3"), Command::Unknown);
        assert_eq!(parse_command("a b"), Command::Unknown);
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("new"), Command::New);
        assert_eq!(parse_command("code"), Command::Code);
        assert_eq!(parse_command("c"), Command::Cancel);
        assert_eq!(parse_command("?"), Command::Help);
    }

    #[test]
    fn test_handle_square_select_then_move() {
        let mut game = Match::new(GameConfig::default().with_seed(4));
        assert!(handle_square(&mut game, Coord::new(4, 4)).is_none());
        assert_eq!(game.selected(), Some(Coord::new(4, 4)));

        let ticket = handle_square(&mut game, Coord::new(3, 4)).expect("move should be scheduled");
        assert!(game.advance_buffalo(ticket).is_ok());
        assert_eq!(game.log().move_count(), 2);
    }

    #[test]
    fn test_handle_square_reselects() {
        let mut game = Match::new(GameConfig::default().with_seed(4));
        handle_square(&mut game, Coord::new(4, 4));
        // Dog square is not a destination: it becomes the new selection
        assert!(handle_square(&mut game, Coord::new(4, 3)).is_none());
        assert_eq!(game.selected(), Some(Coord::new(4, 3)));
        // Buffalo cannot be picked up: selection is cleared
        handle_square(&mut game, Coord::new(1, 1));
        assert!(game.selected().is_none());
    }
}
