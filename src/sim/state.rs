//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`]. The state is
//! owned by exactly one run at a time; outside code only sees [`Snapshot`]s.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::direction::DirectionQueue;
use super::grid::{Grid, Position};
use crate::consts::*;

/// Run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// No active run
    Idle,
    /// Live run driven by player input
    Running,
    /// Run driven by a recorded replay log
    Replaying,
    /// Run finished, blink sequence playing
    Ending(EndReason),
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Head ran into the body with no reprieve available
    Collision,
    /// No room left to place food
    BoardFull,
}

/// The five superfood creatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuperFoodKind {
    Bug,
    Frog,
    Lizard,
    Fish,
    Mouse,
}

impl SuperFoodKind {
    pub const ALL: [SuperFoodKind; 5] = [
        SuperFoodKind::Bug,
        SuperFoodKind::Frog,
        SuperFoodKind::Lizard,
        SuperFoodKind::Fish,
        SuperFoodKind::Mouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuperFoodKind::Bug => "bug",
            SuperFoodKind::Frog => "frog",
            SuperFoodKind::Lizard => "lizard",
            SuperFoodKind::Fish => "fish",
            SuperFoodKind::Mouse => "mouse",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

/// Time-limited two-cell bonus pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperFood {
    /// Left cell first; the right cell is always `cells[0] + (1, 0)`
    pub cells: [Position; 2],
    pub kind: SuperFoodKind,
    pub remaining_ticks: u32,
}

impl SuperFood {
    /// Place a fresh superfood whose left cell is `left`
    pub fn new(left: Position, kind: SuperFoodKind) -> Self {
        Self {
            cells: [left, left + IVec2::X],
            kind,
            remaining_ticks: SUPERFOOD_LIFETIME,
        }
    }

    #[inline]
    pub fn covers(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub grid: Grid,
    /// Head first, tail last
    pub snake: VecDeque<Position>,
    pub food: Position,
    pub superfood: Option<SuperFood>,
    pub queue: DirectionQueue,
    pub score: u64,
    /// Simulation tick counter
    pub tick: u64,
    /// Regular pickups since the last superfood appeared or was eaten
    pub eaten_food_count: u32,
    /// Set after a reprieve; blocks a second reprieve on the very next tick
    pub grace: bool,
    pub mode: Mode,
    /// Cells where food was swallowed, until the tail passes them (render only)
    #[serde(default)]
    pub digesting: Vec<Position>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

impl GameState {
    /// Fresh idle state: horizontal snake heading right, fixed food
    pub fn new(grid: Grid) -> Self {
        let snake: VecDeque<Position> = (0..INITIAL_LENGTH)
            .map(|i| grid.wrap(IVec2::new((INITIAL_LENGTH - i) as i32, INITIAL_ROW)))
            .collect();
        // Narrow custom boards can wrap the fixed food onto the snake
        let mut food = grid.wrap(IVec2::new(INITIAL_FOOD.0, INITIAL_FOOD.1));
        if snake.contains(&food) {
            food = grid.cells().find(|cell| !snake.contains(cell)).unwrap_or(food);
        }

        Self {
            grid,
            snake,
            food,
            superfood: None,
            queue: DirectionQueue::default(),
            score: 0,
            tick: 0,
            eaten_food_count: 0,
            grace: false,
            mode: Mode::Idle,
            digesting: Vec::new(),
        }
    }

    #[inline]
    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.snake.contains(&pos)
    }

    /// Grid cells not covered by the snake, in row-major order
    pub fn free_cells(&self) -> Vec<Position> {
        self.grid.cells().filter(|cell| !self.occupies(*cell)).collect()
    }

    /// Whether a run (live or replay) is stepping
    pub fn is_active(&self) -> bool {
        matches!(self.mode, Mode::Running | Mode::Replaying)
    }

    /// Renderable view of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            snake: self.snake.iter().copied().collect(),
            food: self.food,
            superfood: self.superfood,
            score: self.score,
            digesting: self.digesting.clone(),
            ending: match self.mode {
                Mode::Ending(reason) => Some(reason),
                _ => None,
            },
        }
    }

    /// List every broken structural invariant (empty when healthy)
    pub fn check_invariants(&self) -> Vec<&'static str> {
        let mut broken = Vec::new();

        if self.snake.is_empty() {
            broken.push("snake is empty");
            return broken;
        }
        if !self.snake.iter().all(|seg| self.grid.contains(*seg)) {
            broken.push("snake segment outside grid");
        }
        let mut seen = std::collections::HashSet::new();
        if !self.snake.iter().all(|seg| seen.insert((seg.x, seg.y))) {
            broken.push("snake segments overlap");
        }
        if self.queue.is_empty() || self.queue.len() > QUEUE_CAPACITY {
            broken.push("direction queue length out of range");
        }
        if !self.grid.contains(self.food) {
            broken.push("food outside grid");
        }
        // On a full board the last food stays under the head
        if self.mode != Mode::Ending(EndReason::BoardFull) && self.occupies(self.food) {
            broken.push("food under snake");
        }
        if let Some(superfood) = &self.superfood {
            let [left, right] = superfood.cells;
            if right != left + IVec2::X {
                broken.push("superfood cells not horizontally adjacent");
            }
            if !self.grid.contains(left) || !self.grid.contains(right) {
                broken.push("superfood outside grid");
            }
            if superfood.covers(self.food) {
                broken.push("superfood overlaps food");
            }
            if superfood.cells.iter().any(|cell| self.occupies(*cell)) {
                broken.push("superfood under snake");
            }
        }

        broken
    }
}

/// Per-tick view handed to a renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub snake: Vec<Position>,
    pub food: Position,
    /// Includes kind and the remaining-ticks countdown
    pub superfood: Option<SuperFood>,
    pub score: u64,
    pub digesting: Vec<Position>,
    pub ending: Option<EndReason>,
}
