//! Match configuration

use crate::board::{DEFAULT_COLS, DEFAULT_ROWS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest board with a movable interior and room for the starting layout
pub const MIN_BOARD_SIZE: i8 = 3;

/// Largest supported board side
pub const MAX_BOARD_SIZE: i8 = 26;

/// Buffalo selector tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chance per call of picking a uniformly random eligible buffalo
    pub upset_chance: f64,
    /// Chance that a buffalo adjacent to the player sits the turn out
    pub suppress_chance: f64,
    /// Upper bound of the uniform tie-break added to baseline weights
    pub tie_break: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            upset_chance: 0.01,
            suppress_chance: 0.9,
            tie_break: 1.0,
        }
    }
}

impl AiConfig {
    /// No randomness at all: the selector becomes a pure function
    pub fn deterministic() -> Self {
        Self {
            upset_chance: 0.0,
            suppress_chance: 0.0,
            tie_break: 0.0,
        }
    }
}

/// Match configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board height
    pub rows: i8,
    /// Board width
    pub cols: i8,
    /// Selector tuning
    pub ai: AiConfig,
    /// Pause between the player's move and the buffalo's answer
    pub ai_delay_ms: u64,
    /// Replay cadence, one event per interval
    pub replay_interval_ms: u64,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            ai: AiConfig::default(),
            ai_delay_ms: 200,
            replay_interval_ms: 400,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create config for a board size
    pub fn with_size(rows: i8, cols: i8) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Set selector tuning
    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = ai;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load from a JSON file; missing fields fall back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Force the board size into the supported range, returning whether it changed
    pub fn clamp_size(&mut self) -> bool {
        let rows = self.rows.clamp(MIN_BOARD_SIZE, MAX_BOARD_SIZE);
        let cols = self.cols.clamp(MIN_BOARD_SIZE, MAX_BOARD_SIZE);
        let changed = (rows, cols) != (self.rows, self.cols);
        self.rows = rows;
        self.cols = cols;
        changed
    }

    /// Reject boards with no movable interior or too many columns to lay out
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rows < MIN_BOARD_SIZE || self.cols < MIN_BOARD_SIZE {
            anyhow::bail!(
                "Board must be at least {0}x{0}, got {1}x{2}",
                MIN_BOARD_SIZE,
                self.rows,
                self.cols
            );
        }
        if self.rows > MAX_BOARD_SIZE || self.cols > MAX_BOARD_SIZE {
            anyhow::bail!(
                "Board must be at most {0}x{0}, got {1}x{2}",
                MAX_BOARD_SIZE,
                self.rows,
                self.cols
            );
        }
        for (name, p) in [
            ("upset_chance", self.ai.upset_chance),
            ("suppress_chance", self.ai.suppress_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, p);
            }
        }
        Ok(())
    }
}
