//! Game settings and preferences
//!
//! Persisted as a small JSON file next to the binary (or wherever the host
//! points it).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{GRID_HEIGHT, GRID_WIDTH};
use crate::sim::{Difficulty, Grid};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid {width}x{height} is too small")]
    GridTooSmall { width: i32, height: i32 },
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty for the next live run
    pub difficulty: Difficulty,

    // === Board ===
    pub grid_width: i32,
    pub grid_height: i32,

    /// Fixed seed for live food placement (None = derive from the clock)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,
            seed: None,
        }
    }
}

impl Settings {
    /// Board built from the configured dimensions
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height)
    }

    /// Cycle the difficulty button (Easy -> Normal -> Hard -> Easy)
    pub fn cycle_difficulty(&mut self) -> Difficulty {
        self.difficulty = self.difficulty.next();
        self.difficulty
    }

    /// Seed for the next live run
    pub fn run_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// The initial snake needs a row of INITIAL_LENGTH + 1 cells and a spare
    /// row for food
    fn validate(&self) -> Result<(), SettingsError> {
        let min_width = crate::consts::INITIAL_LENGTH as i32 + 1;
        let min_height = crate::consts::INITIAL_ROW + 1;
        if self.grid_width < min_width || self.grid_height < min_height {
            return Err(SettingsError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        Ok(())
    }

    /// Load settings from `path`; a missing file gives defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
