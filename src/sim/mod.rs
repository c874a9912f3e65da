//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One cell per tick, no wall-clock time
//! - Randomness only through an [`InputSource`]
//! - Stable iteration order (row-major cell scans)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod direction;
pub mod grid;
pub mod input;
pub mod replay;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::steer;
pub use direction::{Direction, DirectionQueue};
pub use grid::{Grid, Position};
pub use input::{InputSource, LiveInput, ReplayInput};
pub use replay::{ReplayError, ReplayEvent, ReplayLog, ReplayRecorder};
pub use score::{Difficulty, Pickup, points_for};
pub use spawn::{FoodSpawn, maybe_spawn_superfood, spawn_food, superfood_pairs};
pub use state::{EndReason, GameState, Mode, Snapshot, SuperFood, SuperFoodKind};
pub use tick::{StepReport, tick};
