//! Terminal board rendering
//!
//! Level 4 - Formatting utilities

use buffalo_core::{Coord, Event, Match, Outcome, Role};

/// Draw the board with the current guide markers.
///
/// `P` player, `D` dog, `B` buffalo, `*` destination, `x` capturable buffalo,
/// brackets around the selected piece.
pub fn render_board(game: &Match) -> String {
    let board = game.board();
    let selected = game.selected();
    let guides: Vec<Coord> = game.guides().iter().map(|g| g.pos).collect();
    let mut out = String::new();

    out.push_str("    ");
    for col in 1..=board.cols() {
        out.push_str(&format!(" {:>2} ", col));
    }
    out.push('\n');

    for row in 1..=board.rows() {
        out.push_str(&format!(" {:>2} ", row));
        for col in 1..=board.cols() {
            let pos = Coord::new(row, col);
            let symbol = match board.get(pos) {
                Some(p) if guides.contains(&pos) && p.role == Role::Buffalo => 'x',
                Some(p) => p.role.symbol(),
                None if guides.contains(&pos) => Role::GuideMarker.symbol(),
                None => '.',
            };
            if selected == Some(pos) {
                out.push_str(&format!(" [{}]", symbol));
            } else {
                out.push_str(&format!("  {} ", symbol));
            }
        }
        out.push('\n');
    }

    if !game.graveyard().is_empty() {
        out.push_str(&format!("Captured: {}\n", game.graveyard().len()));
    }
    out
}

/// One-line description of a log event
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::Move(m) if m.captured => format!("{} -> {} (capture)", m.from, m.to),
        Event::Move(m) => format!("{} -> {}", m.from, m.to),
        Event::End { result } => format!("end: {}", describe_outcome(*result)),
    }
}

pub fn describe_outcome(result: Outcome) -> &'static str {
    match result {
        Outcome::Win => "You win!",
        Outcome::Lose => "You lose...",
    }
}
