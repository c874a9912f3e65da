//! Food and superfood placement

use glam::IVec2;
use log::debug;

use super::grid::Position;
use super::input::InputSource;
use super::state::{EndReason, GameState, Mode, SuperFood};
use crate::consts::SUPERFOOD_THRESHOLD;

/// Result of a food respawn attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodSpawn {
    Placed(Position),
    /// No room left; the run switched to `Ending(BoardFull)`
    BoardFull,
}

/// Place new food on a free cell, or end the run when the board is full.
///
/// A single remaining free cell already counts as full. Food never lands on
/// a live superfood.
pub fn spawn_food(state: &mut GameState, source: &mut dyn InputSource) -> FoodSpawn {
    let free = state.free_cells();
    if free.len() <= 1 {
        debug!("Board full at tick {} ({} free)", state.tick, free.len());
        state.mode = Mode::Ending(EndReason::BoardFull);
        return FoodSpawn::BoardFull;
    }

    let mut candidates: Vec<Position> = match &state.superfood {
        Some(superfood) => free.iter().copied().filter(|c| !superfood.covers(*c)).collect(),
        None => free.clone(),
    };
    if candidates.is_empty() {
        // Only the superfood's own cells are left; it gives way to the food
        state.superfood = None;
        candidates = free;
    }

    let position = source.choose_food(state.tick + 1, &candidates).unwrap_or_else(|| {
        // Only a replay with a hole in it gets here; stay deterministic
        debug!("Falling back to first free cell for tick {}", state.tick + 1);
        candidates[0]
    });
    state.food = position;
    debug!("Food at ({}, {}) for tick {}", position.x, position.y, state.tick + 1);
    FoodSpawn::Placed(position)
}

/// Left cells of every horizontally adjacent free pair, excluding the food
pub fn superfood_pairs(state: &GameState) -> Vec<Position> {
    let is_free = |cell: Position| {
        state.grid.contains(cell) && cell != state.food && !state.occupies(cell)
    };
    state
        .free_cells()
        .into_iter()
        .filter(|cell| is_free(*cell) && is_free(*cell + IVec2::X))
        .collect()
}

/// Spawn a superfood once enough regular food has been eaten.
///
/// When no pair fits, the counter is kept so the next pickup tries again.
pub fn maybe_spawn_superfood(state: &mut GameState, source: &mut dyn InputSource) -> bool {
    if state.eaten_food_count < SUPERFOOD_THRESHOLD {
        return false;
    }

    let pairs = superfood_pairs(state);
    if pairs.is_empty() {
        debug!("No room for superfood at tick {}", state.tick);
        return false;
    }

    let Some((left, kind)) = source.choose_superfood(state.tick + 1, &pairs) else {
        return false;
    };
    state.superfood = Some(SuperFood::new(left, kind));
    state.eaten_food_count = 0;
    debug!("Superfood {} at ({}, {}) for tick {}", kind.as_str(), left.x, left.y, state.tick + 1);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Grid;
    use crate::sim::input::LiveInput;
    use crate::sim::score::Difficulty;

    fn live() -> LiveInput {
        LiveInput::new(42, Difficulty::Normal)
    }

    /// Snake covering every cell except `keep`, on a small grid
    fn packed_state(grid: Grid, keep: &[Position]) -> GameState {
        let mut state = GameState::new(grid);
        state.snake = grid.cells().filter(|c| !keep.contains(c)).collect();
        state
    }

    #[test]
    fn test_food_lands_on_free_cell() {
        let mut state = GameState::default();
        let mut source = live();
        for _ in 0..50 {
            match spawn_food(&mut state, &mut source) {
                FoodSpawn::Placed(pos) => {
                    assert!(!state.occupies(pos));
                    assert!(state.grid.contains(pos));
                }
                FoodSpawn::BoardFull => panic!("board is not full"),
            }
        }
    }

    #[test]
    fn test_food_avoids_superfood() {
        let grid = Grid::new(4, 2);
        let keep = [IVec2::new(0, 1), IVec2::new(1, 1), IVec2::new(3, 1)];
        let mut state = packed_state(grid, &keep);
        state.superfood = Some(SuperFood::new(IVec2::new(0, 1), crate::sim::SuperFoodKind::Fish));
        for _ in 0..10 {
            assert_eq!(spawn_food(&mut state, &mut live()), FoodSpawn::Placed(IVec2::new(3, 1)));
        }
    }

    #[test]
    fn test_single_free_cell_is_board_full() {
        let grid = Grid::new(4, 2);
        let mut state = packed_state(grid, &[IVec2::new(3, 1)]);
        state.mode = Mode::Running;
        assert_eq!(spawn_food(&mut state, &mut live()), FoodSpawn::BoardFull);
        assert_eq!(state.mode, Mode::Ending(EndReason::BoardFull));
    }

    #[test]
    fn test_two_free_cells_still_spawn() {
        let grid = Grid::new(4, 2);
        let keep = [IVec2::new(0, 1), IVec2::new(3, 1)];
        let mut state = packed_state(grid, &keep);
        match spawn_food(&mut state, &mut live()) {
            FoodSpawn::Placed(pos) => assert!(keep.contains(&pos)),
            FoodSpawn::BoardFull => panic!("two cells are free"),
        }
    }

    #[test]
    fn test_pairs_are_horizontal_and_skip_food() {
        let grid = Grid::new(4, 2);
        let keep = [IVec2::new(0, 1), IVec2::new(1, 1), IVec2::new(2, 1), IVec2::new(3, 0)];
        let mut state = packed_state(grid, &keep);
        state.food = IVec2::new(2, 1);
        // (3,0) has no right neighbour on the grid; (1,1)-(2,1) touches food
        assert_eq!(superfood_pairs(&state), vec![IVec2::new(0, 1)]);
    }

    #[test]
    fn test_superfood_needs_threshold() {
        let mut state = GameState::default();
        state.eaten_food_count = 4;
        assert!(!maybe_spawn_superfood(&mut state, &mut live()));
        assert!(state.superfood.is_none());

        state.eaten_food_count = 5;
        assert!(maybe_spawn_superfood(&mut state, &mut live()));
        let superfood = state.superfood.unwrap();
        assert_eq!(superfood.remaining_ticks, 20);
        assert_eq!(superfood.cells[1], superfood.cells[0] + IVec2::X);
        assert_eq!(state.eaten_food_count, 0);
        assert!(state.check_invariants().is_empty());
    }

    #[test]
    fn test_superfood_without_room_keeps_counter_for_retry() {
        let grid = Grid::new(4, 2);
        // Free cells exist but none are horizontally adjacent
        let mut state = packed_state(grid, &[IVec2::new(0, 0), IVec2::new(2, 0), IVec2::new(1, 1)]);
        state.food = IVec2::new(1, 1);
        state.eaten_food_count = 5;
        assert!(!maybe_spawn_superfood(&mut state, &mut live()));
        assert!(state.superfood.is_none());
        assert_eq!(state.eaten_food_count, 5);

        // Room opens up and the next pickup retries
        state.snake.retain(|c| *c != IVec2::new(1, 0));
        state.eaten_food_count += 1;
        assert!(maybe_spawn_superfood(&mut state, &mut live()));
        assert_eq!(state.eaten_food_count, 0);
        let left = state.superfood.unwrap().cells[0];
        assert!(left == IVec2::new(0, 0) || left == IVec2::new(1, 0));
    }
}
