//! Snake 3310 - deterministic snake simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, input buffering, spawning, replay, step function)
//! - `machine`: Run orchestration (Idle / Running / Replaying / Ending) and tick scheduling
//! - `settings`: Player configuration
//! - `submission`: Hand-off of sealed replays to an external collaborator

pub mod machine;
pub mod settings;
pub mod sim;
pub mod submission;

pub use machine::{Effect, GameStateMachine, ManualScheduler, Scheduler, TimerHandle};
pub use settings::{Settings, SettingsError};
pub use submission::{MemorySink, ReplaySink, Submission, forward_sealed};

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions (cells)
    pub const GRID_WIDTH: i32 = 19;
    pub const GRID_HEIGHT: i32 = 10;

    /// Snake spawns horizontally on this row, head at x = INITIAL_LENGTH
    pub const INITIAL_LENGTH: usize = 5;
    pub const INITIAL_ROW: i32 = 2;

    /// Fixed food position for a fresh game
    pub const INITIAL_FOOD: (i32, i32) = (16, 2);

    /// Maximum number of buffered directions
    pub const QUEUE_CAPACITY: usize = 3;

    /// Regular food pickups needed before a superfood appears
    pub const SUPERFOOD_THRESHOLD: u32 = 5;
    /// Ticks a superfood stays on the board if not eaten
    pub const SUPERFOOD_LIFETIME: u32 = 20;
    /// Superfood is worth this many base multipliers
    pub const SUPERFOOD_FACTOR: u64 = 5;

    /// Ending sequence: alternating visibility frames
    pub const BLINK_FRAMES: u32 = 10;
    pub const BLINK_INTERVAL_MS: u64 = 200;
}
