//! Headings and the buffered direction queue

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::QUEUE_CAPACITY;

/// Snake heading. Screen coordinates: Up decreases y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// One-cell step in this direction
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Map a keyboard code (arrows or WASD) to a heading
    pub fn from_key(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" | "KeyW" => Some(Direction::Up),
            "ArrowDown" | "KeyS" => Some(Direction::Down),
            "ArrowLeft" | "KeyA" => Some(Direction::Left),
            "ArrowRight" | "KeyD" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Bounded FIFO of pending headings.
///
/// Index 0 is the heading used by the next step; it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionQueue {
    entries: VecDeque<Direction>,
}

impl Default for DirectionQueue {
    fn default() -> Self {
        Self::new(Direction::Right)
    }
}

impl DirectionQueue {
    pub fn new(initial: Direction) -> Self {
        let mut entries = VecDeque::with_capacity(QUEUE_CAPACITY);
        entries.push_back(initial);
        Self { entries }
    }

    /// Heading for the next step
    #[inline]
    pub fn active(&self) -> Direction {
        self.entries[0]
    }

    /// The heading that becomes active on the next advance, if any
    #[inline]
    pub fn pending(&self) -> Option<Direction> {
        self.entries.get(1).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.entries.iter().copied()
    }

    /// Buffer a heading. Dropped when full or when it reverses the last
    /// buffered heading. Returns whether it was accepted.
    pub fn enqueue(&mut self, direction: Direction) -> bool {
        if self.entries.len() >= QUEUE_CAPACITY {
            return false;
        }
        if self.entries.back().is_some_and(|last| last.reverse() == direction) {
            return false;
        }
        self.entries.push_back(direction);
        true
    }

    /// Drop the active heading, exposing the next one. No-op on a single entry.
    pub fn advance(&mut self) -> Option<Direction> {
        if self.entries.len() > 1 {
            self.entries.pop_front();
            Some(self.active())
        } else {
            None
        }
    }

    /// Replace the whole queue with a single heading
    pub fn reset_to(&mut self, direction: Direction) {
        self.entries.clear();
        self.entries.push_back(direction);
    }
}
