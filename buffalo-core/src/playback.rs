//! Deterministic replay of a decoded log
//!
//! Events are applied strictly in log order onto a fresh starting board.
//! Pacing is left to the caller: wait `interval()` between `step()` calls.

use crate::config::GameConfig;
use crate::game::{Match, PlaybackError};
use crate::replay::{Event, MatchLog, ReplayError};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Playback {
    game: Match,
    events: Vec<Event>,
    cursor: usize,
    interval: Duration,
}

impl Playback {
    /// Decode a share code and set up playback on a fresh board
    pub fn load(config: GameConfig, code: &str) -> Result<Self, ReplayError> {
        let interval = Duration::from_millis(config.replay_interval_ms);
        let mut game = Match::new(config);
        let log = game.load_replay(code)?;
        Ok(Self {
            game,
            events: log.events().to_vec(),
            cursor: 0,
            interval,
        })
    }

    /// Set up playback of an already decoded log
    pub fn from_log(config: GameConfig, log: &MatchLog) -> Self {
        let interval = Duration::from_millis(config.replay_interval_ms);
        Self {
            game: Match::new(config),
            events: log.events().to_vec(),
            cursor: 0,
            interval,
        }
    }

    /// Apply the next event. `Ok(None)` once every event has been applied.
    pub fn step(&mut self) -> Result<Option<Event>, PlaybackError> {
        let event = match self.events.get(self.cursor) {
            Some(e) => *e,
            None => return Ok(None),
        };
        self.game.apply_logged(self.cursor, &event)?;
        self.cursor += 1;
        Ok(Some(event))
    }

    /// Check that every remaining event applies, without advancing
    pub fn verify(&self) -> Result<(), PlaybackError> {
        let mut dry_run = self.clone();
        dry_run.run_to_end().map(|_| ())
    }

    /// Apply all remaining events
    pub fn run_to_end(&mut self) -> Result<&Match, PlaybackError> {
        while self.step()?.is_some() {}
        Ok(&self.game)
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Events applied so far
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.events.len()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::config::AiConfig;
    use crate::pieces::Role;
    use crate::replay::Outcome;

    #[test]
    fn test_replay_matches_live_board() {
        let config = GameConfig::default()
            .with_ai(AiConfig::deterministic())
            .with_seed(9);
        let mut live = Match::new(config.clone());
        live.select_piece(Coord::new(4, 4));
        live.commit_move(Coord::new(4, 4), Coord::new(3, 4)).unwrap();
        live.select_piece(Coord::new(4, 3));
        live.commit_move(Coord::new(4, 3), Coord::new(2, 3)).unwrap();

        let mut playback = Playback::load(config, &live.current_log()).unwrap();
        assert_eq!(playback.total(), 4);
        let replayed = playback.run_to_end().unwrap();

        let mut expected: Vec<_> = live.board().pieces().map(|p| (p.pos, p.role)).collect();
        let mut actual: Vec<_> = replayed.board().pieces().map(|p| (p.pos, p.role)).collect();
        expected.sort_by_key(|(pos, _)| *pos);
        actual.sort_by_key(|(pos, _)| *pos);
        assert_eq!(expected, actual);
        assert_eq!(replayed.log(), live.log());
    }

    #[test]
    fn test_step_is_ordered() {
        let mut playback = Playback::load(GameConfig::default(), "nt-1-l").unwrap();
        assert_eq!(playback.position(), 0);
        assert!(matches!(playback.step(), Ok(Some(Event::Move(_)))));
        assert_eq!(playback.game().player_pos(), Some(Coord::new(3, 4)));
        assert!(matches!(
            playback.step(),
            Ok(Some(Event::End { result: Outcome::Lose }))
        ));
        assert!(playback.is_finished());
        assert_eq!(playback.step(), Ok(None));
        assert_eq!(playback.game().outcome(), Some(Outcome::Lose));
    }

    #[test]
    fn test_invalid_code() {
        assert!(Playback::load(GameConfig::default(), "garbage").is_err());
    }

    #[test]
    fn test_verify_rejects_unplayable_codes() {
        // Decodes fine, but (1,1) -> (1,1) lands on its own buffalo
        let playback = Playback::load(GameConfig::default(), "00-1-i").unwrap();
        assert_eq!(
            playback.verify(),
            Err(PlaybackError::CaptureMismatch {
                index: 0,
                to: Coord::new(1, 1)
            })
        );
        assert_eq!(playback.position(), 0);

        let playback = Playback::load(GameConfig::default(), "m-3-3-2-3-0").unwrap();
        assert!(matches!(playback.verify(), Err(PlaybackError::Desync { .. })));

        let playback = Playback::load(GameConfig::default(), "nt-1-l").unwrap();
        assert_eq!(playback.verify(), Ok(()));
        assert!(!playback.is_finished());
    }

    #[test]
    fn test_desync_detected() {
        // 3,3 -> 2,3 with nothing on 3,3 in the starting layout
        let mut log = MatchLog::new();
        log.push_move(crate::replay::MoveRecord::new(
            Coord::new(3, 3),
            Coord::new(2, 3),
            false,
        ));
        let mut playback = Playback::from_log(GameConfig::default(), &log);
        assert_eq!(
            playback.step(),
            Err(PlaybackError::Desync {
                index: 0,
                from: Coord::new(3, 3)
            })
        );
        assert_eq!(playback.position(), 0);
        assert_eq!(playback.game().board().pieces_with_role(Role::Buffalo).len(), 7);
    }
}
