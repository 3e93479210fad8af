//! Match controller: turn sequencing over the board, selector and log

use crate::ai::BuffaloSelector;
use crate::board::{Board, Coord};
use crate::config::GameConfig;
use crate::movegen::guide_markers;
use crate::pieces::{Piece, PieceId, Role};
use crate::replay::{decode, encode, encode_legacy, Event, MatchLog, MoveRecord, Outcome, ReplayError, CODEC_COLS, CODEC_ROWS};
use crate::timer::{TurnTicket, TurnTimer};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Whose move it is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the human to select and commit
    PlayerTurn,
    /// Human has moved; a buffalo answers once the ticket is redeemed
    BuffaloTurn,
    /// Match finished
    Over(Outcome),
}

/// Result of a full turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The human's move captured a buffalo
    pub captured: bool,
    pub game_over: bool,
    pub won: bool,
    /// The buffalo advance, if one happened
    pub buffalo_move: Option<MoveRecord>,
}

/// Result of the human half of a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerMove {
    pub record: MoveRecord,
    /// Redeem with [`Match::advance_buffalo`] after `ticket.delay()`
    pub ticket: TurnTicket,
}

/// Rejected controller calls. None of these mutate the match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no piece selected at {0}")]
    NoSelection(Coord),

    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Coord, to: Coord },

    #[error("match is over")]
    GameOver,

    #[error("not the player's turn")]
    NotPlayerTurn,

    #[error("no buffalo move is pending")]
    NotBuffaloTurn,

    #[error("turn ticket is stale")]
    StaleTurn,

    #[error("player piece missing from board")]
    MissingPlayer,
}

/// Replay moves that do not fit the board they are played on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("event {index}: no piece at {from}")]
    Desync { index: usize, from: Coord },

    #[error("event {index}: capture flag does not match the board at {to}")]
    CaptureMismatch { index: usize, to: Coord },

    #[error("event {index}: move to {to} leaves the board")]
    OffBoard { index: usize, to: Coord },
}

/// Current selection and its guide markers
#[derive(Clone, Debug)]
struct Selection {
    piece: Piece,
    guides: Vec<Piece>,
}

// ============================================================================
// MATCH
// ============================================================================

/// One match (clone to branch)
#[derive(Clone, Debug)]
pub struct Match {
    config: GameConfig,
    board: Board,
    selector: BuffaloSelector,
    log: MatchLog,
    timer: TurnTimer,
    selection: Option<Selection>,
    graveyard: Vec<Piece>,
    phase: Phase,
    player_id: PieceId,
    pending_capture: bool,
    /// Completed turns (one buffalo advance each)
    pub turn: u32,
}

impl Match {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a match in its starting layout.
    ///
    /// Board sizes outside `MIN_BOARD_SIZE..=MAX_BOARD_SIZE` are clamped so
    /// the starting layout always fits.
    pub fn new(mut config: GameConfig) -> Self {
        let (rows, cols) = (config.rows, config.cols);
        if config.clamp_size() {
            tracing::warn!(
                "Board {}x{} out of range, using {}x{}",
                rows,
                cols,
                config.rows,
                config.cols
            );
        }

        let selector = match config.seed {
            Some(seed) => BuffaloSelector::with_seed(config.ai.clone(), seed),
            None => BuffaloSelector::new(config.ai.clone()),
        };
        let (board, player_id) = starting_board(config.rows, config.cols);

        Self {
            config,
            board,
            selector,
            log: MatchLog::new(),
            timer: TurnTimer::new(),
            selection: None,
            graveyard: Vec::new(),
            phase: Phase::PlayerTurn,
            player_id,
            pending_capture: false,
            turn: 0,
        }
    }

    /// Fresh match on a `rows x cols` board with default tuning
    pub fn setup(rows: i8, cols: i8, seed: Option<u64>) -> Self {
        let mut config = GameConfig::with_size(rows, cols);
        config.seed = seed;
        Self::new(config)
    }

    /// Reset to the starting layout. Cancels any pending buffalo turn.
    pub fn restart(&mut self) {
        self.timer.cancel();
        let (board, player_id) = starting_board(self.config.rows, self.config.cols);
        self.board = board;
        self.player_id = player_id;
        self.log.clear();
        self.selection = None;
        self.graveyard.clear();
        self.phase = Phase::PlayerTurn;
        self.pending_capture = false;
        self.turn = 0;
        tracing::debug!("Match restarted on {}x{}", self.config.rows, self.config.cols);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn log(&self) -> &MatchLog {
        &self.log
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Over(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Over(result) => Some(result),
            _ => None,
        }
    }

    /// Captured buffalo, in capture order
    pub fn graveyard(&self) -> &[Piece] {
        &self.graveyard
    }

    /// Guide markers of the current selection
    pub fn guides(&self) -> &[Piece] {
        self.selection.as_ref().map_or(&[], |s| s.guides.as_slice())
    }

    /// Square of the selected piece
    pub fn selected(&self) -> Option<Coord> {
        self.selection.as_ref().map(|s| s.piece.pos)
    }

    pub fn player_pos(&self) -> Option<Coord> {
        self.board.find(self.player_id).map(|p| p.pos)
    }

    /// Buffalo whose forward square is on the board and free, in id order
    pub fn eligible_buffalo(&self) -> Vec<Piece> {
        self.board
            .pieces_with_role(Role::Buffalo)
            .into_iter()
            .filter(|b| {
                let ahead = b.pos.forward();
                self.board.is_in_range(ahead) && !self.board.is_occupied(ahead)
            })
            .collect()
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// Select the piece at `pos`, returning its legal destinations.
    ///
    /// Any earlier selection is dropped. Squares without a selectable piece,
    /// or any square outside the player's turn, give an empty set.
    pub fn select_piece(&mut self, pos: Coord) -> Vec<Coord> {
        self.selection = None;
        if self.phase != Phase::PlayerTurn {
            return Vec::new();
        }

        let piece = match self.board.get(pos) {
            Some(p) if p.role.is_selectable() => *p,
            _ => return Vec::new(),
        };

        let guides = guide_markers(&self.board, &piece, piece.role.max_distance());
        let dests = guides.iter().map(|g| g.pos).collect();
        self.selection = Some(Selection { piece, guides });
        dests
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Commit the human half of a turn and schedule the buffalo answer
    pub fn commit_player_move(&mut self, from: Coord, to: Coord) -> Result<PlayerMove, GameError> {
        match self.phase {
            Phase::PlayerTurn => {}
            Phase::BuffaloTurn => return Err(GameError::NotPlayerTurn),
            Phase::Over(_) => return Err(GameError::GameOver),
        }

        let selection = match &self.selection {
            Some(s) if s.piece.pos == from => s,
            _ => return Err(GameError::NoSelection(from)),
        };
        if !selection.guides.iter().any(|g| g.pos == to) {
            return Err(GameError::IllegalMove { from, to });
        }
        let mover = selection.piece.role;
        self.selection = None;

        let captured = self
            .board
            .move_piece(from, to)
            .ok_or(GameError::IllegalMove { from, to })?;
        let was_capture = captured.is_some();
        if let Some(victim) = captured {
            tracing::debug!("Captured buffalo {} at {}", victim.id, to);
            self.graveyard.push(victim);
        }

        let record = MoveRecord::new(from, to, was_capture);
        self.log.push_move(record);
        self.pending_capture = was_capture;
        self.phase = Phase::BuffaloTurn;
        tracing::debug!("{:?} moved {} -> {}", mover, from, to);

        let ticket = self
            .timer
            .schedule(Duration::from_millis(self.config.ai_delay_ms));
        Ok(PlayerMove { record, ticket })
    }

    /// Run the scheduled buffalo half-turn and check for the end of the match
    pub fn advance_buffalo(&mut self, ticket: TurnTicket) -> Result<TurnOutcome, GameError> {
        match self.phase {
            Phase::BuffaloTurn => {}
            Phase::PlayerTurn => return Err(GameError::NotBuffaloTurn),
            Phase::Over(_) => return Err(GameError::GameOver),
        }
        if !self.timer.redeem(ticket) {
            return Err(GameError::StaleTurn);
        }

        let captured = std::mem::take(&mut self.pending_capture);
        let player = self.player_pos().ok_or(GameError::MissingPlayer)?;
        let dogs: Vec<Coord> = self
            .board
            .pieces_with_role(Role::Dog)
            .iter()
            .map(|d| d.pos)
            .collect();
        let eligible = self.eligible_buffalo();

        let goal_row = self.board.rows();
        let buffalo = match self
            .selector
            .select_advancing(&eligible, player, &dogs, goal_row)
        {
            Some(b) => b,
            None => {
                self.finish(Outcome::Win);
                return Ok(TurnOutcome {
                    captured,
                    game_over: true,
                    won: true,
                    buffalo_move: None,
                });
            }
        };

        let from = buffalo.pos;
        let to = from.forward();
        // Eligibility guarantees the square is free
        self.board.move_piece(from, to);
        let record = MoveRecord::new(from, to, false);
        self.log.push_move(record);
        self.turn += 1;
        tracing::debug!("Buffalo {} advanced {} -> {}", buffalo.id, from, to);

        let lost = to.row == goal_row;
        if lost {
            self.finish(Outcome::Lose);
        } else {
            self.phase = Phase::PlayerTurn;
        }

        Ok(TurnOutcome {
            captured,
            game_over: lost,
            won: false,
            buffalo_move: Some(record),
        })
    }

    /// Play a whole turn without pacing
    pub fn commit_move(&mut self, from: Coord, to: Coord) -> Result<TurnOutcome, GameError> {
        let player_move = self.commit_player_move(from, to)?;
        self.advance_buffalo(player_move.ticket)
    }

    // ========================================================================
    // REPLAY
    // ========================================================================

    /// Share code for the log so far. 5x7 boards use the compact form.
    pub fn current_log(&self) -> String {
        if self.board.rows() == CODEC_ROWS && self.board.cols() == CODEC_COLS {
            if let Ok(code) = encode(&self.log) {
                return code;
            }
        }
        encode_legacy(&self.log)
    }

    /// Reset the board and decode a share code for playback.
    ///
    /// Any pending buffalo turn is cancelled even when the code is invalid.
    pub fn load_replay(&mut self, code: &str) -> Result<MatchLog, ReplayError> {
        self.restart();
        decode(code)
    }

    /// Apply one logged event with no rule checks beyond board consistency
    pub fn apply_logged(&mut self, index: usize, event: &Event) -> Result<(), PlaybackError> {
        match *event {
            Event::Move(record) => {
                let mover = self
                    .board
                    .get(record.from)
                    .map(|p| p.role)
                    .ok_or(PlaybackError::Desync { index, from: record.from })?;

                let occupant_is_buffalo = self
                    .board
                    .get(record.to)
                    .map_or(false, |p| p.role == Role::Buffalo);
                if occupant_is_buffalo != record.captured
                    || (record.captured && mover != Role::Player)
                {
                    return Err(PlaybackError::CaptureMismatch { index, to: record.to });
                }

                let captured = self
                    .board
                    .move_piece(record.from, record.to)
                    .ok_or(PlaybackError::OffBoard { index, to: record.to })?;
                if let Some(victim) = captured {
                    self.graveyard.push(victim);
                }

                self.log.push_move(record);
                if mover == Role::Buffalo {
                    self.turn += 1;
                    self.phase = Phase::PlayerTurn;
                } else {
                    self.phase = Phase::BuffaloTurn;
                }
            }
            Event::End { result } => self.finish(result),
        }
        Ok(())
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn finish(&mut self, result: Outcome) {
        self.timer.cancel();
        self.selection = None;
        self.log.finish(result);
        self.phase = Phase::Over(result);
        tracing::info!(
            "Match over after {} turns: {:?} ({} captured)",
            self.turn,
            result,
            self.graveyard.len()
        );
    }
}

/// Buffalo across row 1, player and two dogs on the second-to-last row.
///
/// Expects a size already clamped to the supported range, where every
/// placement lands on a free square.
fn starting_board(rows: i8, cols: i8) -> (Board, PieceId) {
    let mut board = Board::new(rows, cols);
    let middle = (cols + 1) / 2;

    for col in 1..=cols {
        board.place(Role::Buffalo, Coord::new(1, col));
    }
    for col in [middle - 1, middle + 1] {
        board.place(Role::Dog, Coord::new(rows - 1, col));
    }
    let player_id = board
        .place(Role::Player, Coord::new(rows - 1, middle))
        .unwrap_or(PieceId::MAX);

    (board, player_id)
}

// ============================================================================
// TESTS
// ============================================================================
