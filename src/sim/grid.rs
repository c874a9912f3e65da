//! Toroidal playfield
//!
//! The board has no walls: a head leaving one edge re-enters on the opposite
//! edge. Every head position goes through [`Grid::wrap`].

use glam::IVec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::consts::{GRID_HEIGHT, GRID_WIDTH};

/// A cell coordinate. Always wrapped into `[0, width) x [0, height)` once it
/// lives in game state.
pub type Position = IVec2;

/// Fixed-size torus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GridSize")]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

/// Unchecked dimensions as they appear on the wire
#[derive(Deserialize)]
struct GridSize {
    width: i32,
    height: i32,
}

impl From<GridSize> for Grid {
    fn from(size: GridSize) -> Self {
        Grid::new(size.width, size.height)
    }
}

impl Grid {
    /// Board of `width` x `height` cells. Dimensions are clamped to at least
    /// 2x1 so `wrap` always has a positive modulus; `Settings` rejects
    /// boards too small to hold the initial snake before they get here.
    pub fn new(width: i32, height: i32) -> Self {
        let clamped = Self {
            width: width.max(2),
            height: height.max(1),
        };
        if clamped.width != width || clamped.height != height {
            warn!("Grid {width}x{height} clamped to {}x{}", clamped.width, clamped.height);
        }
        clamped
    }

    /// Wrap an arbitrary coordinate onto the torus
    #[inline]
    pub fn wrap(&self, pos: Position) -> Position {
        IVec2::new(
            ((pos.x % self.width) + self.width) % self.width,
            ((pos.y % self.height) + self.height) % self.height,
        )
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// All cells in row-major order (y outer, x inner).
    ///
    /// The order is part of the live RNG contract: a seeded run picks the same
    /// index from the same list.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| IVec2::new(x, y)))
    }
}
