//! BUFFALO Core - Game engine and AI
//!
//! This crate provides the core game logic for BUFFALO:
//! - Board geometry (rectangular grid, 1-indexed coordinates)
//! - Piece roles and legal destination generation
//! - Buffalo selection heuristic with seedable randomness
//! - Match controller with cancelable turn pacing
//! - Share-code replay codec and deterministic playback

pub mod board;
pub mod pieces;
pub mod movegen;
pub mod ai;
pub mod config;
pub mod replay;
pub mod timer;
pub mod game;
pub mod playback;

// Re-exports for convenient access
pub use board::{Board, Coord, DIRECTIONS, DEFAULT_ROWS, DEFAULT_COLS};
pub use pieces::{Piece, PieceId, Role, UNBOUNDED};
pub use movegen::{legal_destinations, guide_markers};
pub use ai::BuffaloSelector;
pub use config::{AiConfig, GameConfig, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
pub use replay::{decode, encode, encode_legacy, Event, MatchLog, MoveRecord, Outcome, ReplayError};
pub use timer::{TurnTicket, TurnTimer};
pub use game::{GameError, Match, Phase, PlaybackError, PlayerMove, TurnOutcome};
pub use playback::Playback;
