//! Piece definitions

use crate::board::Coord;
use serde::{Deserialize, Serialize};

/// Piece identifier, unique within one match
pub type PieceId = u16;

/// Ray length used for pieces with no distance limit
pub const UNBOUNDED: u8 = 30;

/// Piece role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Player,      // Human-controlled herder, steps 1, captures buffalo
    Dog,         // Blocker, slides any distance, never captures
    Buffalo,     // AI-controlled, advances one row per turn
    GuideMarker, // Transient legal-destination highlight
}

impl Role {
    /// Whether the human may pick this piece up
    pub fn is_selectable(self) -> bool {
        matches!(self, Role::Player | Role::Dog)
    }

    /// Ray length when this role is selected
    pub fn max_distance(self) -> u8 {
        match self {
            Role::Player => 1,
            _ => UNBOUNDED,
        }
    }

    /// Single-character board symbol
    pub fn symbol(self) -> char {
        match self {
            Role::Player => 'P',
            Role::Dog => 'D',
            Role::Buffalo => 'B',
            Role::GuideMarker => '*',
        }
    }
}

/// A piece on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub role: Role,
    pub pos: Coord,
    pub alive: bool,
}

impl Piece {
    pub fn new(id: PieceId, role: Role, pos: Coord) -> Self {
        Self {
            id,
            role,
            pos,
            alive: true,
        }
    }

    /// Guide markers have no identity across selections
    pub fn guide(pos: Coord) -> Self {
        Self::new(PieceId::MAX, Role::GuideMarker, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectable_roles() {
        assert!(Role::Player.is_selectable());
        assert!(Role::Dog.is_selectable());
        assert!(!Role::Buffalo.is_selectable());
        assert!(!Role::GuideMarker.is_selectable());
    }

    #[test]
    fn test_max_distance() {
        assert_eq!(Role::Player.max_distance(), 1);
        assert_eq!(Role::Dog.max_distance(), UNBOUNDED);
    }
}
