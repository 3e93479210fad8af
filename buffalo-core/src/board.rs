//! Rectangular board geometry and occupancy

use crate::pieces::{Piece, PieceId, Role};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Default board height (rows)
pub const DEFAULT_ROWS: i8 = 5;

/// Default board width (columns)
pub const DEFAULT_COLS: i8 = 7;

/// 1-indexed grid coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Step once along a direction vector
    pub fn offset(&self, (dr, dc): (i8, i8)) -> Coord {
        Coord::new(self.row + dr, self.col + dc)
    }

    /// Square directly ahead of a buffalo
    pub fn forward(&self) -> Coord {
        Coord::new(self.row + 1, self.col)
    }

    /// Chebyshev distance between two squares
    pub fn chebyshev(&self, other: Coord) -> i8 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction vectors (drow, dcol)
/// Index: 0=NW, 1=N, 2=NE, 3=W, 4=E, 5=SW, 6=S, 7=SE
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1), // NW
    (-1, 0),  // N
    (-1, 1),  // NE
    (0, -1),  // W
    (0, 1),   // E
    (1, -1),  // SW
    (1, 0),   // S
    (1, 1),   // SE
];

/// Bounded grid with a sparse coordinate -> piece map.
///
/// Guide markers never live here; only player, dog and buffalo pieces do.
#[derive(Clone, Debug)]
pub struct Board {
    rows: i8,
    cols: i8,
    cells: FxHashMap<Coord, Piece>,
    next_id: PieceId,
}

impl Board {
    pub fn new(rows: i8, cols: i8) -> Self {
        Self {
            rows,
            cols,
            cells: FxHashMap::default(),
            next_id: 0,
        }
    }

    pub fn rows(&self) -> i8 {
        self.rows
    }

    pub fn cols(&self) -> i8 {
        self.cols
    }

    /// Check if a coordinate is on the board
    pub fn is_in_range(&self, pos: Coord) -> bool {
        1 <= pos.row && pos.row <= self.rows && 1 <= pos.col && pos.col <= self.cols
    }

    /// Check if a coordinate is inside the movable interior (first and last rows excluded)
    pub fn is_in_movable(&self, pos: Coord) -> bool {
        2 <= pos.row && pos.row <= self.rows - 1 && 1 <= pos.col && pos.col <= self.cols
    }

    /// Piece at a coordinate. Off-board coordinates have no occupant.
    pub fn get(&self, pos: Coord) -> Option<&Piece> {
        if !self.is_in_range(pos) {
            return None;
        }
        self.cells.get(&pos)
    }

    pub fn is_occupied(&self, pos: Coord) -> bool {
        self.get(pos).is_some()
    }

    /// Place a new piece, returning its id.
    ///
    /// Returns `None` when the square is off-board or taken, or the role is a guide marker.
    pub fn place(&mut self, role: Role, pos: Coord) -> Option<PieceId> {
        if role == Role::GuideMarker || !self.is_in_range(pos) || self.cells.contains_key(&pos) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.cells.insert(pos, Piece::new(id, role, pos));
        Some(id)
    }

    /// Move the piece at `from` onto `to`, removing and returning whatever stood on `to`.
    ///
    /// Returns `None` without touching the board if `from` is empty or `to` is off-board.
    pub fn move_piece(&mut self, from: Coord, to: Coord) -> Option<Option<Piece>> {
        if !self.is_in_range(to) || from == to {
            return None;
        }
        let mut piece = self.cells.remove(&from)?;
        let captured = self.cells.remove(&to).map(|mut victim| {
            victim.alive = false;
            victim
        });
        piece.pos = to;
        self.cells.insert(to, piece);
        Some(captured)
    }

    /// Iterate pieces on board
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.cells.values()
    }

    /// Live pieces of one role, sorted by id for a stable scan order
    pub fn pieces_with_role(&self, role: Role) -> Vec<Piece> {
        let mut found: Vec<Piece> = self
            .cells
            .values()
            .filter(|p| p.role == role)
            .copied()
            .collect();
        found.sort_by_key(|p| p.id);
        found
    }

    /// Locate a piece by id
    pub fn find(&self, id: PieceId) -> Option<&Piece> {
        self.cells.values().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let board = Board::new(5, 7);
        assert!(board.is_in_range(Coord::new(1, 1)));
        assert!(board.is_in_range(Coord::new(5, 7)));
        assert!(!board.is_in_range(Coord::new(0, 3)));
        assert!(!board.is_in_range(Coord::new(6, 3)));
        assert!(!board.is_in_range(Coord::new(3, 8)));

        assert!(!board.is_in_movable(Coord::new(1, 3)));
        assert!(board.is_in_movable(Coord::new(2, 3)));
        assert!(board.is_in_movable(Coord::new(4, 7)));
        assert!(!board.is_in_movable(Coord::new(5, 3)));
    }

    #[test]
    fn test_out_of_bounds_lookup_is_empty() {
        let board = Board::new(5, 7);
        assert!(board.get(Coord::new(-3, 40)).is_none());
        assert!(!board.is_occupied(Coord::new(9, 9)));
    }

    #[test]
    fn test_place_rejects_taken_and_off_board() {
        let mut board = Board::new(5, 7);
        assert!(board.place(Role::Buffalo, Coord::new(1, 1)).is_some());
        assert!(board.place(Role::Dog, Coord::new(1, 1)).is_none());
        assert!(board.place(Role::Dog, Coord::new(0, 1)).is_none());
        assert!(board.place(Role::GuideMarker, Coord::new(3, 3)).is_none());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_move_keeps_map_consistent() {
        let mut board = Board::new(5, 7);
        let player = board.place(Role::Player, Coord::new(3, 3)).unwrap();
        board.place(Role::Buffalo, Coord::new(2, 3)).unwrap();

        let captured = board.move_piece(Coord::new(3, 3), Coord::new(2, 3)).unwrap();
        let victim = captured.expect("buffalo should be captured");
        assert_eq!(victim.role, Role::Buffalo);
        assert!(!victim.alive);

        assert_eq!(board.len(), 1);
        let moved = board.get(Coord::new(2, 3)).unwrap();
        assert_eq!(moved.id, player);
        assert_eq!(moved.pos, Coord::new(2, 3));
        assert!(board.get(Coord::new(3, 3)).is_none());

        for piece in board.pieces() {
            assert_eq!(board.get(piece.pos).map(|p| p.id), Some(piece.id));
        }
    }

    #[test]
    fn test_move_from_empty_is_noop() {
        let mut board = Board::new(5, 7);
        assert!(board.move_piece(Coord::new(3, 3), Coord::new(3, 4)).is_none());
        assert!(board.is_empty());
    }

    #[test]
    fn test_chebyshev() {
        assert_eq!(Coord::new(3, 3).chebyshev(Coord::new(4, 4)), 1);
        assert_eq!(Coord::new(3, 3).chebyshev(Coord::new(3, 3)), 0);
        assert_eq!(Coord::new(1, 1).chebyshev(Coord::new(3, 2)), 2);
    }
}
