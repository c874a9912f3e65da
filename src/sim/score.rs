//! Difficulty levels and scoring arithmetic

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::SUPERFOOD_FACTOR;

/// Difficulty selector. Serialized as `1 | 2 | 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1" | "easy" => Some(Difficulty::Easy),
            "2" | "normal" => Some(Difficulty::Normal),
            "3" | "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Points for one regular food pickup
    pub fn base_multiplier(&self) -> u64 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => 6,
            Difficulty::Hard => 9,
        }
    }

    /// Delay between simulation ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(match self {
            Difficulty::Easy => 208,
            Difficulty::Normal => 104,
            Difficulty::Hard => 72,
        })
    }

    /// Cycle Easy -> Normal -> Hard -> Easy (the difficulty button)
    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Normal),
            3 => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty level {other}")),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> u8 {
        difficulty.level()
    }
}

/// What the head swallowed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pickup {
    Food,
    SuperFood,
}

/// Score gained for a pickup at the given difficulty
pub fn points_for(pickup: Pickup, difficulty: Difficulty) -> u64 {
    match pickup {
        Pickup::Food => difficulty.base_multiplier(),
        Pickup::SuperFood => SUPERFOOD_FACTOR * difficulty.base_multiplier(),
    }
}
