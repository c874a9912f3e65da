//! Fixed-step simulation tick
//!
//! One call moves the snake one cell. The outcome depends only on the state
//! and on what the [`InputSource`] answers, which is what makes live runs and
//! replays agree tick for tick.

use log::debug;

use super::input::InputSource;
use super::score::{Difficulty, Pickup, points_for};
use super::spawn::{FoodSpawn, maybe_spawn_superfood, spawn_food};
use super::state::{EndReason, GameState, Mode};

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Head swallowed something
    pub pickup: Option<Pickup>,
    /// Movement was skipped in favour of a queued alternate heading
    pub reprieve: bool,
    pub superfood_spawned: bool,
    pub superfood_expired: bool,
    /// The run ended on this tick
    pub ended: Option<EndReason>,
}

/// Advance the game by one tick.
///
/// Does nothing unless a run is active. Scoring uses `difficulty`.
pub fn tick(state: &mut GameState, source: &mut dyn InputSource, difficulty: Difficulty) -> StepReport {
    let mut report = StepReport::default();
    if !state.is_active() {
        return report;
    }

    source.prepare(state);

    let next_head = state.grid.wrap(state.head() + state.queue.active().delta());

    // The tail moves out of the way this tick, so it doesn't count
    let body_len = state.snake.len() - 1;
    let collides = state.snake.iter().take(body_len).any(|seg| *seg == next_head);

    let mut moved = false;
    if collides {
        match state.queue.pending() {
            Some(_) if !state.grace => {
                state.queue.advance();
                state.grace = true;
                source.direction_changed(state.tick + 1, state.queue.active());
                report.reprieve = true;
                debug!("Reprieve at tick {}: turning {:?}", state.tick, state.queue.active());
            }
            _ => {
                debug!("Collision at tick {} ({}, {})", state.tick, next_head.x, next_head.y);
                state.mode = Mode::Ending(EndReason::Collision);
                report.ended = Some(EndReason::Collision);
                return report;
            }
        }
    } else {
        state.grace = false;
        moved = true;
    }

    if moved {
        state.snake.push_front(next_head);

        if next_head == state.food {
            state.digesting.push(next_head);
            state.eaten_food_count += 1;
            state.score += points_for(Pickup::Food, difficulty);
            report.pickup = Some(Pickup::Food);
            match spawn_food(state, source) {
                FoodSpawn::Placed(_) => {
                    report.superfood_spawned = maybe_spawn_superfood(state, source);
                }
                FoodSpawn::BoardFull => report.ended = Some(EndReason::BoardFull),
            }
        } else if state.superfood.is_some_and(|sf| sf.covers(next_head)) {
            state.digesting.push(next_head);
            state.eaten_food_count = 0;
            state.superfood = None;
            state.score += points_for(Pickup::SuperFood, difficulty);
            report.pickup = Some(Pickup::SuperFood);
        } else if let Some(tail) = state.snake.pop_back() {
            state.digesting.retain(|cell| *cell != tail);
        }

        if state.queue.advance().is_some() {
            source.direction_changed(state.tick + 1, state.queue.active());
        }
    }

    // A superfood starts counting down on the tick after it appears
    if !report.superfood_spawned {
        if let Some(superfood) = state.superfood.as_mut() {
            superfood.remaining_ticks = superfood.remaining_ticks.saturating_sub(1);
            if superfood.remaining_ticks == 0 {
                state.superfood = None;
                report.superfood_expired = true;
                debug!("Superfood expired at tick {}", state.tick);
            }
        }
    }

    state.tick += 1;
    report
}
