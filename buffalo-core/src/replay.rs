//! Match log and share-code codec
//!
//! Compact form: `<moves>-<flags>-<end>`
//! - moves: 2 base-36 chars per move, `(r1-1)*245 + (r2-1)*49 + (c1-1)*7 + (c2-1)`
//! - flags: one base-3 digit per move (1 = plain, 2 = capture), the whole digit
//!   string read as a base-3 number and written in base 36
//! - end: `w`, `l` or `i` (in progress)
//!
//! Codes are lowercase; uppercase digits are rejected.
//!
//! Legacy form: comma-joined `m-r1-c1-r2-c2-k` tokens and an optional `e-w` / `e-l`.
//! The compact form only covers 5x7 boards.

use crate::board::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Board height covered by the compact form
pub const CODEC_ROWS: i8 = 5;

/// Board width covered by the compact form
pub const CODEC_COLS: i8 = 7;

const RADIX: u32 = 36;
const FLAG_RADIX: u32 = 3;
const MOVE_WIDTH: usize = 2;
const FLAG_PLAIN: u8 = 1;
const FLAG_CAPTURE: u8 = 2;

/// Largest packed move value
const MAX_MOVE_CODE: u32 = (CODEC_ROWS as u32) * (CODEC_ROWS as u32) * (CODEC_COLS as u32) * (CODEC_COLS as u32) - 1;

// ============================================================================
// LOG TYPES
// ============================================================================

/// Match result from the player's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

/// One half-move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Coord,
    pub to: Coord,
    pub captured: bool,
}

impl MoveRecord {
    pub fn new(from: Coord, to: Coord, captured: bool) -> Self {
        Self { from, to, captured }
    }
}

/// Log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Move(MoveRecord),
    End { result: Outcome },
}

/// Ordered match history. At most one `End`, always last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLog {
    events: Vec<Event>,
}

impl MatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a half-move. Ignored once the log has an `End`.
    pub fn push_move(&mut self, record: MoveRecord) -> bool {
        if self.outcome().is_some() {
            return false;
        }
        self.events.push(Event::Move(record));
        true
    }

    /// Record the result, replacing a trailing `End` if present
    pub fn finish(&mut self, result: Outcome) {
        if self.outcome().is_some() {
            self.events.pop();
        }
        self.events.push(Event::End { result });
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn moves(&self) -> impl Iterator<Item = &MoveRecord> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::Move(record) => Some(record),
            Event::End { .. } => None,
        })
    }

    pub fn move_count(&self) -> usize {
        self.moves().count()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.events.last() {
            Some(Event::End { result }) => Some(*result),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether every move fits the compact 5x7 form
    pub fn fits_compact(&self) -> bool {
        self.moves().all(|m| in_codec_range(m.from) && in_codec_range(m.to))
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// A share code that cannot be turned back into a log
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("empty replay code")]
    Empty,

    #[error("malformed replay code: {0}")]
    Malformed(String),

    #[error("invalid move code: {0}")]
    BadMoveCode(String),

    #[error("capture flags cover {flags} moves, expected {moves}")]
    FlagMismatch { moves: usize, flags: usize },

    #[error("unknown result marker: {0}")]
    UnknownResult(String),

    #[error("unrecognized token: {0}")]
    BadToken(String),

    #[error("square {0} does not fit a 5x7 replay code")]
    OutOfRange(Coord),
}

// ============================================================================
// COMPACT FORM
// ============================================================================

/// Encode a log in the compact form
pub fn encode(log: &MatchLog) -> Result<String, ReplayError> {
    let mut packed = String::with_capacity(log.move_count() * MOVE_WIDTH);
    let mut flags = Vec::with_capacity(log.move_count());

    for record in log.moves() {
        packed.push_str(&encode_move(record)?);
        flags.push(if record.captured { FLAG_CAPTURE } else { FLAG_PLAIN });
    }

    let flags = convert_base(&flags, FLAG_RADIX, RADIX)
        .into_iter()
        .map(digit_char)
        .collect::<String>();

    let end = match log.outcome() {
        Some(Outcome::Win) => 'w',
        Some(Outcome::Lose) => 'l',
        None => 'i',
    };

    Ok(format!("{}-{}-{}", packed, flags, end))
}

/// Decode either form. Any malformed input is an error value, never a panic.
pub fn decode(code: &str) -> Result<MatchLog, ReplayError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ReplayError::Empty);
    }

    if code.split('-').count() == 3 {
        decode_compact(code)
    } else {
        decode_legacy(code)
    }
}

fn decode_compact(code: &str) -> Result<MatchLog, ReplayError> {
    let mut parts = code.split('-');
    let (packed, flags, end) = match (parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(f), Some(e)) => (p, f, e),
        _ => return Err(ReplayError::Malformed(code.to_string())),
    };

    if packed.len() % MOVE_WIDTH != 0 || !packed.is_ascii() {
        return Err(ReplayError::Malformed(code.to_string()));
    }

    let mut moves = Vec::with_capacity(packed.len() / MOVE_WIDTH);
    for chunk in packed.as_bytes().chunks(MOVE_WIDTH) {
        moves.push(decode_move(chunk)?);
    }

    let flag_digits = flags
        .chars()
        .map(|c| parse_digit(c).map(|d| d as u8))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| ReplayError::Malformed(flags.to_string()))?;
    let flag_digits = convert_base(&flag_digits, RADIX, FLAG_RADIX);

    if flag_digits.len() != moves.len() {
        return Err(ReplayError::FlagMismatch {
            moves: moves.len(),
            flags: flag_digits.len(),
        });
    }

    let result = match end {
        "w" => Some(Outcome::Win),
        "l" => Some(Outcome::Lose),
        "i" => None,
        other => return Err(ReplayError::UnknownResult(other.to_string())),
    };

    let mut log = MatchLog::new();
    // Most significant digit belongs to the first move
    for ((from, to), flag) in moves.into_iter().zip(flag_digits) {
        let captured = match flag {
            FLAG_PLAIN => false,
            FLAG_CAPTURE => true,
            _ => return Err(ReplayError::Malformed(flags.to_string())),
        };
        log.push_move(MoveRecord::new(from, to, captured));
    }
    if let Some(result) = result {
        log.finish(result);
    }

    Ok(log)
}

fn encode_move(record: &MoveRecord) -> Result<String, ReplayError> {
    for pos in [record.from, record.to] {
        if !in_codec_range(pos) {
            return Err(ReplayError::OutOfRange(pos));
        }
    }

    let rows = CODEC_ROWS as u32;
    let cols = CODEC_COLS as u32;
    let r1 = (record.from.row - 1) as u32;
    let r2 = (record.to.row - 1) as u32;
    let c1 = (record.from.col - 1) as u32;
    let c2 = (record.to.col - 1) as u32;
    let v = r1 * rows * cols * cols + r2 * cols * cols + c1 * cols + c2;

    let mut code = String::with_capacity(MOVE_WIDTH);
    code.push(digit_char((v / RADIX) as u8));
    code.push(digit_char((v % RADIX) as u8));
    Ok(code)
}

fn decode_move(chunk: &[u8]) -> Result<(Coord, Coord), ReplayError> {
    let bad = || ReplayError::BadMoveCode(String::from_utf8_lossy(chunk).into_owned());

    let mut v = 0u32;
    for &byte in chunk {
        v = v * RADIX + parse_digit(byte as char).ok_or_else(bad)?;
    }
    if v > MAX_MOVE_CODE {
        return Err(bad());
    }

    let rows = CODEC_ROWS as u32;
    let cols = CODEC_COLS as u32;
    let r1 = v / (rows * cols * cols);
    let rem = v % (rows * cols * cols);
    let r2 = rem / (cols * cols);
    let rem = rem % (cols * cols);
    let c1 = rem / cols;
    let c2 = rem % cols;

    Ok((
        Coord::new(r1 as i8 + 1, c1 as i8 + 1),
        Coord::new(r2 as i8 + 1, c2 as i8 + 1),
    ))
}

// ============================================================================
// LEGACY FORM
// ============================================================================

/// Encode a log in the human-readable legacy form (any board size)
pub fn encode_legacy(log: &MatchLog) -> String {
    log.events()
        .iter()
        .map(|event| match event {
            Event::Move(m) => format!(
                "m-{}-{}-{}-{}-{}",
                m.from.row,
                m.from.col,
                m.to.row,
                m.to.col,
                u8::from(m.captured)
            ),
            Event::End { result: Outcome::Win } => "e-w".to_string(),
            Event::End { result: Outcome::Lose } => "e-l".to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_legacy(code: &str) -> Result<MatchLog, ReplayError> {
    let mut log = MatchLog::new();

    for token in code.split(',') {
        if log.outcome().is_some() {
            // Nothing may follow the end marker
            return Err(ReplayError::BadToken(token.to_string()));
        }

        let fields: Vec<&str> = token.trim().split('-').collect();
        match fields.as_slice() {
            ["m", r1, c1, r2, c2, kill] => {
                let from = Coord::new(parse_index(r1, token)?, parse_index(c1, token)?);
                let to = Coord::new(parse_index(r2, token)?, parse_index(c2, token)?);
                let captured = match *kill {
                    "0" => false,
                    "1" => true,
                    _ => return Err(ReplayError::BadToken(token.to_string())),
                };
                log.push_move(MoveRecord::new(from, to, captured));
            }
            ["e", "w"] => log.finish(Outcome::Win),
            ["e", "l"] => log.finish(Outcome::Lose),
            _ => return Err(ReplayError::BadToken(token.to_string())),
        }
    }

    Ok(log)
}

fn parse_index(field: &str, token: &str) -> Result<i8, ReplayError> {
    match field.parse::<i8>() {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(ReplayError::BadToken(token.to_string())),
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn in_codec_range(pos: Coord) -> bool {
    (1..=CODEC_ROWS).contains(&pos.row) && (1..=CODEC_COLS).contains(&pos.col)
}

/// Lowercase base-36 digit
fn parse_digit(c: char) -> Option<u32> {
    if c.is_ascii_uppercase() {
        return None;
    }
    c.to_digit(RADIX)
}

fn digit_char(d: u8) -> char {
    std::char::from_digit(d as u32, RADIX).unwrap_or('0')
}

/// Convert a most-significant-first digit string between radixes.
///
/// Works on arbitrarily long inputs by repeated long division. Leading zeros
/// are dropped; an all-zero or empty input gives an empty output.
fn convert_base(digits: &[u8], from: u32, to: u32) -> Vec<u8> {
    let mut number: Vec<u32> = digits
        .iter()
        .map(|&d| d as u32)
        .skip_while(|&d| d == 0)
        .collect();
    let mut out = Vec::new();

    while !number.is_empty() {
        let mut quotient = Vec::with_capacity(number.len());
        let mut remainder = 0u32;
        for &d in &number {
            let acc = remainder * from + d;
            let q = acc / to;
            remainder = acc % to;
            if !quotient.is_empty() || q != 0 {
                quotient.push(q);
            }
        }
        out.push(remainder as u8);
        number = quotient;
    }

    out.reverse();
    out
}

// ============================================================================
// TESTS
// ============================================================================
