//! Demo mode: a greedy player used by the headless driver and soak tests
//!
//! Picks the safe heading that gets closest to the nearest pickup. It only
//! looks one cell ahead, so it loses eventually, which is fine for a demo.

use super::direction::Direction;
use super::grid::{Grid, Position};
use super::state::GameState;

/// Shortest wrapped Manhattan distance
fn torus_distance(grid: &Grid, a: Position, b: Position) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    dx.min(grid.width - dx) + dy.min(grid.height - dy)
}

/// Heading to enqueue this tick, if a change is wanted
pub fn steer(state: &GameState) -> Option<Direction> {
    // Let buffered turns play out first
    if state.queue.len() > 1 {
        return None;
    }
    let active = state.queue.active();
    let head = state.head();
    let body_len = state.snake.len() - 1;

    let mut targets = vec![state.food];
    if let Some(superfood) = &state.superfood {
        targets.extend(superfood.cells);
    }

    let best = Direction::ALL
        .into_iter()
        .filter(|dir| *dir != active.reverse())
        .filter_map(|dir| {
            let next = state.grid.wrap(head + dir.delta());
            let blocked = state.snake.iter().take(body_len).any(|seg| *seg == next);
            if blocked {
                return None;
            }
            let distance = targets
                .iter()
                .map(|target| torus_distance(&state.grid, next, *target))
                .min()
                .unwrap_or(0);
            Some((distance, dir != active, dir))
        })
        .min_by_key(|(distance, turning, _)| (*distance, *turning))
        .map(|(_, _, dir)| dir)?;

    (best != active).then_some(best)
}
