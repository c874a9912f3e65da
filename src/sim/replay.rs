//! Replay log: the non-deterministic decisions of a live run
//!
//! A live run records every direction change, food placement and superfood
//! placement, tagged with the tick at which it takes effect. Feeding the log
//! back through the same step function reproduces the run exactly.
//!
//! JSON layout (leaderboard payload):
//! `{"difficulty":2,"score":42,"events":[{"index":3,"type":"direction","direction":"UP"},
//! {"index":7,"type":"food","x":4,"y":1},{"index":7,"type":"frog","x":9,"y":6}]}`

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::direction::Direction;
use super::grid::{Grid, Position};
use super::score::Difficulty;
use super::state::SuperFoodKind;

/// One recorded decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireEvent", try_from = "WireEvent")]
pub enum ReplayEvent {
    DirectionChange { tick: u64, direction: Direction },
    FoodSpawn { tick: u64, position: Position },
    SuperFoodSpawn { tick: u64, position: Position, kind: SuperFoodKind },
}

impl ReplayEvent {
    /// Tick at which the event takes effect
    pub fn tick(&self) -> u64 {
        match *self {
            ReplayEvent::DirectionChange { tick, .. }
            | ReplayEvent::FoodSpawn { tick, .. }
            | ReplayEvent::SuperFoodSpawn { tick, .. } => tick,
        }
    }
}

/// Flat on-the-wire event record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEvent {
    index: u64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<i32>,
}

impl From<ReplayEvent> for WireEvent {
    fn from(event: ReplayEvent) -> Self {
        match event {
            ReplayEvent::DirectionChange { tick, direction } => WireEvent {
                index: tick,
                kind: "direction".to_string(),
                direction: Some(direction),
                x: None,
                y: None,
            },
            ReplayEvent::FoodSpawn { tick, position } => WireEvent {
                index: tick,
                kind: "food".to_string(),
                direction: None,
                x: Some(position.x),
                y: Some(position.y),
            },
            ReplayEvent::SuperFoodSpawn { tick, position, kind } => WireEvent {
                index: tick,
                kind: kind.as_str().to_string(),
                direction: None,
                x: Some(position.x),
                y: Some(position.y),
            },
        }
    }
}

impl TryFrom<WireEvent> for ReplayEvent {
    type Error = String;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        let tick = wire.index;
        if wire.kind == "direction" {
            let direction = wire
                .direction
                .ok_or_else(|| format!("direction event at {tick} has no direction"))?;
            return Ok(ReplayEvent::DirectionChange { tick, direction });
        }

        let (Some(x), Some(y)) = (wire.x, wire.y) else {
            return Err(format!("{} event at {tick} has no position", wire.kind));
        };
        let position = IVec2::new(x, y);
        if wire.kind == "food" {
            return Ok(ReplayEvent::FoodSpawn { tick, position });
        }
        match SuperFoodKind::from_str(&wire.kind) {
            Some(kind) => Ok(ReplayEvent::SuperFoodSpawn { tick, position, kind }),
            None => Err(format!("unknown event type {:?}", wire.kind)),
        }
    }
}

/// Rejected replay payload
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("malformed replay payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event {index} at tick {tick} follows tick {previous}")]
    OutOfOrder { index: usize, tick: u64, previous: u64 },
    #[error("more than one {what} spawn at tick {tick}")]
    DuplicateSpawn { tick: u64, what: &'static str },
    #[error("spawn at tick {tick} lands off the grid at ({x}, {y})")]
    OffGrid { tick: u64, x: i32, y: i32 },
}

/// Sealed record of a finished live run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    difficulty: Difficulty,
    #[serde(rename = "score")]
    final_score: u64,
    events: Vec<ReplayEvent>,
}

impl ReplayLog {
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn final_score(&self) -> u64 {
        self.final_score
    }

    pub fn events(&self) -> &[ReplayEvent] {
        &self.events
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode and validate a payload against the grid it will play on
    pub fn from_json(payload: &str, grid: &Grid) -> Result<Self, ReplayError> {
        let log: ReplayLog = serde_json::from_str(payload)?;
        log.validate(grid)?;
        Ok(log)
    }

    /// Check ordering, spawn uniqueness and spawn positions
    pub fn validate(&self, grid: &Grid) -> Result<(), ReplayError> {
        let mut previous = 0;
        let mut food_tick = None;
        let mut superfood_tick = None;

        for (index, event) in self.events.iter().enumerate() {
            let tick = event.tick();
            if tick < previous {
                return Err(ReplayError::OutOfOrder { index, tick, previous });
            }
            previous = tick;

            match *event {
                ReplayEvent::DirectionChange { .. } => {}
                ReplayEvent::FoodSpawn { position, .. } => {
                    if food_tick.replace(tick) == Some(tick) {
                        return Err(ReplayError::DuplicateSpawn { tick, what: "food" });
                    }
                    if !grid.contains(position) {
                        return Err(ReplayError::OffGrid { tick, x: position.x, y: position.y });
                    }
                }
                ReplayEvent::SuperFoodSpawn { position, .. } => {
                    if superfood_tick.replace(tick) == Some(tick) {
                        return Err(ReplayError::DuplicateSpawn { tick, what: "superfood" });
                    }
                    if !grid.contains(position) || !grid.contains(position + IVec2::X) {
                        return Err(ReplayError::OffGrid { tick, x: position.x, y: position.y });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Append-only log being built by a live run
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    difficulty: Difficulty,
    events: Vec<ReplayEvent>,
}

impl ReplayRecorder {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, event: ReplayEvent) {
        debug_assert!(
            self.events.last().is_none_or(|last| last.tick() <= event.tick()),
            "replay events must be recorded in tick order"
        );
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Freeze the log with the run's final score
    pub fn seal(self, final_score: u64) -> ReplayLog {
        ReplayLog {
            difficulty: self.difficulty,
            final_score,
            events: self.events,
        }
    }
}
