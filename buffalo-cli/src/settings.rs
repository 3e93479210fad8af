//! Shared board/config arguments
//!
//! Level 4 - Configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use buffalo_core::GameConfig;

#[derive(Args, Clone, Debug, Default)]
pub struct BoardArgs {
    /// Match configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board rows (overrides the config file)
    #[arg(long)]
    pub rows: Option<i8>,

    /// Board columns (overrides the config file)
    #[arg(long)]
    pub cols: Option<i8>,
}

impl BoardArgs {
    /// Build the match config: file (or defaults), then flags, then seed
    pub fn resolve(&self, seed: Option<u64>) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if seed.is_some() {
            config.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }
}
