//! Input sources: where a tick's non-deterministic decisions come from
//!
//! The step function never asks which mode it is in. It asks its
//! [`InputSource`] for food and superfood placements and reports direction
//! changes to it. A live source rolls dice and records; a replay source
//! reads the answers back from a sealed log.

use log::{debug, warn};
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::direction::Direction;
use super::grid::Position;
use super::replay::{ReplayEvent, ReplayLog, ReplayRecorder};
use super::score::Difficulty;
use super::state::{GameState, SuperFood, SuperFoodKind};

/// Supplier of per-tick decisions
pub trait InputSource {
    /// Called once before the step for `state.tick`
    fn prepare(&mut self, state: &mut GameState);

    /// Pick the next food cell from `free` (row-major, never empty).
    /// `upcoming_tick` is the tick at which the placement takes effect.
    fn choose_food(&mut self, upcoming_tick: u64, free: &[Position]) -> Option<Position>;

    /// Pick a superfood left cell from `pairs` and a kind
    fn choose_superfood(
        &mut self,
        upcoming_tick: u64,
        pairs: &[Position],
    ) -> Option<(Position, SuperFoodKind)>;

    /// The active heading changed; it applies from `upcoming_tick`
    fn direction_changed(&mut self, upcoming_tick: u64, direction: Direction);
}

/// Live play: seeded randomness, every decision recorded
#[derive(Debug, Clone)]
pub struct LiveInput {
    rng: Pcg32,
    recorder: ReplayRecorder,
}

impl LiveInput {
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            recorder: ReplayRecorder::new(difficulty),
        }
    }

    pub fn recorded_events(&self) -> usize {
        self.recorder.len()
    }

    /// Consume the source, sealing its recording
    pub fn seal(self, final_score: u64) -> ReplayLog {
        self.recorder.seal(final_score)
    }
}

impl InputSource for LiveInput {
    fn prepare(&mut self, _state: &mut GameState) {
        // Player input lands in the queue directly, between ticks
    }

    fn choose_food(&mut self, upcoming_tick: u64, free: &[Position]) -> Option<Position> {
        let position = *free.choose(&mut self.rng)?;
        self.recorder.record(ReplayEvent::FoodSpawn {
            tick: upcoming_tick,
            position,
        });
        Some(position)
    }

    fn choose_superfood(
        &mut self,
        upcoming_tick: u64,
        pairs: &[Position],
    ) -> Option<(Position, SuperFoodKind)> {
        let position = *pairs.choose(&mut self.rng)?;
        let kind = *SuperFoodKind::ALL.choose(&mut self.rng)?;
        self.recorder.record(ReplayEvent::SuperFoodSpawn {
            tick: upcoming_tick,
            position,
            kind,
        });
        Some((position, kind))
    }

    fn direction_changed(&mut self, upcoming_tick: u64, direction: Direction) {
        self.recorder.record(ReplayEvent::DirectionChange {
            tick: upcoming_tick,
            direction,
        });
    }
}

/// Playback of a sealed log. Never touches an RNG.
#[derive(Debug, Clone)]
pub struct ReplayInput {
    log: ReplayLog,
    /// First event not yet applied by `prepare`
    cursor: usize,
}

impl ReplayInput {
    pub fn new(log: ReplayLog) -> Self {
        Self { log, cursor: 0 }
    }

    pub fn log(&self) -> &ReplayLog {
        &self.log
    }

    /// Events taking effect at `tick`, searched from the cursor onward
    fn events_at(&self, tick: u64) -> impl Iterator<Item = &ReplayEvent> {
        self.log.events()[self.cursor..]
            .iter()
            .skip_while(move |e| e.tick() < tick)
            .take_while(move |e| e.tick() == tick)
    }
}

impl InputSource for ReplayInput {
    fn prepare(&mut self, state: &mut GameState) {
        let tick = state.tick;
        let events = self.log.events();

        while self.cursor < events.len() && events[self.cursor].tick() < tick {
            warn!("Replay event for past tick {} skipped", events[self.cursor].tick());
            self.cursor += 1;
        }
        while self.cursor < events.len() && events[self.cursor].tick() == tick {
            match events[self.cursor] {
                ReplayEvent::DirectionChange { direction, .. } => state.queue.reset_to(direction),
                ReplayEvent::FoodSpawn { position, .. } => state.food = position,
                ReplayEvent::SuperFoodSpawn { position, kind, .. } => {
                    state.superfood = Some(SuperFood::new(position, kind));
                    state.eaten_food_count = 0;
                }
            }
            self.cursor += 1;
        }

        // A change logged for the next tick was already buffered during the
        // live run at this point; expose it so reprieve sees the same queue.
        let next = self.events_at(tick + 1).find_map(|e| match *e {
            ReplayEvent::DirectionChange { direction, .. } => Some(direction),
            _ => None,
        });
        if let Some(direction) = next {
            if state.queue.len() > 1 {
                state.queue.reset_to(state.queue.active());
            }
            if !state.queue.enqueue(direction) {
                warn!("Replay direction {direction:?} at tick {} rejected by queue", tick + 1);
            }
        }
    }

    fn choose_food(&mut self, upcoming_tick: u64, _free: &[Position]) -> Option<Position> {
        let position = self.events_at(upcoming_tick).find_map(|e| match *e {
            ReplayEvent::FoodSpawn { position, .. } => Some(position),
            _ => None,
        });
        if position.is_none() {
            debug!("No logged food for tick {upcoming_tick}");
        }
        position
    }

    fn choose_superfood(
        &mut self,
        upcoming_tick: u64,
        _pairs: &[Position],
    ) -> Option<(Position, SuperFoodKind)> {
        self.events_at(upcoming_tick).find_map(|e| match *e {
            ReplayEvent::SuperFoodSpawn { position, kind, .. } => Some((position, kind)),
            _ => None,
        })
    }

    fn direction_changed(&mut self, _upcoming_tick: u64, _direction: Direction) {
        // Already in the log
    }
}
