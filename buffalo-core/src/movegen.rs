//! Legal destination generation
//!
//! Walks the eight compass rays from a selected piece. Every square a ray
//! visits must lie in the movable interior; the first and last rows are
//! never generated as destinations.

use crate::board::{Board, Coord, DIRECTIONS};
use crate::pieces::{Piece, Role};

/// Legal destinations for `selection`, in ray order (NW, N, NE, W, E, SW, S, SE).
///
/// A distance of 0 is treated as 1.
pub fn legal_destinations(board: &Board, selection: &Piece, max_distance: u8) -> Vec<Coord> {
    let mut dests = Vec::new();
    if !selection.alive {
        return dests;
    }

    let is_player = selection.role == Role::Player;
    let max_distance = max_distance.max(1);

    for &dir in &DIRECTIONS {
        let mut current = selection.pos;

        for _ in 0..max_distance {
            current = current.offset(dir);
            if !board.is_in_movable(current) {
                break;
            }

            if let Some(occupant) = board.get(current) {
                if is_player && occupant.role == Role::Buffalo {
                    dests.push(current);
                }
                break; // Blocked
            }

            dests.push(current);
        }
    }

    dests
}

/// Same as [`legal_destinations`], materialized as guide-marker pieces
pub fn guide_markers(board: &Board, selection: &Piece, max_distance: u8) -> Vec<Piece> {
    legal_destinations(board, selection, max_distance)
        .into_iter()
        .map(Piece::guide)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::UNBOUNDED;

    fn board_with(pieces: &[(Role, Coord)]) -> Board {
        let mut board = Board::new(5, 7);
        for &(role, pos) in pieces {
            board.place(role, pos).unwrap();
        }
        board
    }

    fn piece_at(board: &Board, pos: Coord) -> Piece {
        *board.get(pos).unwrap()
    }

    #[test]
    fn test_player_near_last_row() {
        let board = board_with(&[(Role::Player, Coord::new(4, 4))]);
        let player = piece_at(&board, Coord::new(4, 4));
        let mut dests = legal_destinations(&board, &player, 1);
        dests.sort();

        assert_eq!(
            dests,
            vec![
                Coord::new(3, 3),
                Coord::new(3, 4),
                Coord::new(3, 5),
                Coord::new(4, 3),
                Coord::new(4, 5),
            ]
        );
        assert!(dests.iter().all(|d| d.row != 1 && d.row != 5));
    }

    #[test]
    fn test_player_in_middle_gets_all_neighbours() {
        let board = board_with(&[(Role::Player, Coord::new(3, 4))]);
        let player = piece_at(&board, Coord::new(3, 4));
        let dests = legal_destinations(&board, &player, 1);
        assert_eq!(dests.len(), 8);
        assert!(dests.iter().all(|d| d.chebyshev(Coord::new(3, 4)) == 1));
    }

    #[test]
    fn test_dog_ray_stops_before_occupant() {
        let board = board_with(&[
            (Role::Dog, Coord::new(3, 1)),
            (Role::Buffalo, Coord::new(3, 5)),
        ]);
        let dog = piece_at(&board, Coord::new(3, 1));
        let dests = legal_destinations(&board, &dog, UNBOUNDED);

        // East ray: 3,2 3,3 3,4 then blocked by the buffalo
        assert!(dests.contains(&Coord::new(3, 4)));
        assert!(!dests.contains(&Coord::new(3, 5)));
        assert!(!dests.contains(&Coord::new(3, 6)));
        // Vertical rays stay inside rows 2..4
        assert!(dests.contains(&Coord::new(2, 1)));
        assert!(dests.contains(&Coord::new(4, 1)));
        assert!(!dests.contains(&Coord::new(1, 1)));
        assert!(!dests.contains(&Coord::new(5, 1)));
    }

    #[test]
    fn test_player_captures_only_buffalo() {
        let board = board_with(&[
            (Role::Player, Coord::new(3, 4)),
            (Role::Buffalo, Coord::new(2, 4)),
            (Role::Dog, Coord::new(3, 5)),
        ]);
        let player = piece_at(&board, Coord::new(3, 4));
        let dests = legal_destinations(&board, &player, 1);

        assert!(dests.contains(&Coord::new(2, 4)));
        assert!(!dests.contains(&Coord::new(3, 5)));
        assert_eq!(dests.len(), 7);
    }

    #[test]
    fn test_player_ray_stops_on_capture() {
        let board = board_with(&[
            (Role::Player, Coord::new(4, 1)),
            (Role::Buffalo, Coord::new(3, 1)),
        ]);
        let player = piece_at(&board, Coord::new(4, 1));
        let dests = legal_destinations(&board, &player, UNBOUNDED);

        assert!(dests.contains(&Coord::new(3, 1)));
        assert!(!dests.contains(&Coord::new(2, 1)));
    }

    #[test]
    fn test_boxed_in_returns_empty() {
        let board = board_with(&[
            (Role::Dog, Coord::new(2, 1)),
            (Role::Dog, Coord::new(3, 1)),
            (Role::Dog, Coord::new(2, 2)),
            (Role::Dog, Coord::new(3, 2)),
        ]);
        let dog = piece_at(&board, Coord::new(2, 1));
        assert!(legal_destinations(&board, &dog, UNBOUNDED).is_empty());
    }

    #[test]
    fn test_zero_distance_is_one_step() {
        let board = board_with(&[(Role::Dog, Coord::new(3, 4))]);
        let dog = piece_at(&board, Coord::new(3, 4));
        assert_eq!(legal_destinations(&board, &dog, 0).len(), 8);
    }

    #[test]
    fn test_guide_markers_are_transient() {
        let board = board_with(&[(Role::Player, Coord::new(3, 4))]);
        let player = piece_at(&board, Coord::new(3, 4));
        let guides = guide_markers(&board, &player, 1);
        assert_eq!(guides.len(), 8);
        assert!(guides.iter().all(|g| g.role == Role::GuideMarker));
        // Computing guides never touches the board
        assert_eq!(board.len(), 1);
    }
}
