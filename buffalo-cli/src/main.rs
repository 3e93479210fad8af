//! BUFFALO CLI - Command-line interface
//!
//! Commands:
//! - play: Herd the buffalo in an interactive terminal match
//! - replay: Play back a share code at a steady pace
//! - decode: Print the events behind a share code
//! - simulate: Run batches of automated matches

mod decode_cmd;
mod play;
mod render;
mod replay_cmd;
mod settings;
mod simulate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buffalo")]
#[command(about = "Herd the buffalo before they break through")]
struct Cli {
    /// RNG seed for reproducible buffalo behavior
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a match in the terminal
    Play(play::PlayArgs),
    /// Replay a share code
    Replay(replay_cmd::ReplayArgs),
    /// Decode a share code without playing it
    Decode(decode_cmd::DecodeArgs),
    /// Run automated matches
    Simulate(simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Replay(args) => replay_cmd::run(args),
        Commands::Decode(args) => decode_cmd::run(args),
        Commands::Simulate(args) => simulate::run(args, cli.seed),
    }
}

/// Logs go to stderr so board output stays clean. RUST_LOG wins over -v.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["buffalo", "simulate", "--games", "5", "--seed", "9", "-vv"]).unwrap();
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Simulate(args) => assert_eq!(args.games, 5),
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_parse_replay_code() {
        let cli = Cli::try_parse_from(["buffalo", "replay", "nt-1-l", "--interval-ms", "10"]).unwrap();
        match cli.command {
            Commands::Replay(args) => {
                assert_eq!(args.code, "nt-1-l");
                assert_eq!(args.interval_ms, Some(10));
            }
            _ => panic!("expected replay"),
        }
    }

    #[test]
    fn test_parse_code_with_leading_dash() {
        // Empty logs encode to "--i"
        let cli = Cli::try_parse_from(["buffalo", "decode", "--", "--i"]).unwrap();
        match cli.command {
            Commands::Decode(args) => assert_eq!(args.code, "--i"),
            _ => panic!("expected decode"),
        }
    }
}
