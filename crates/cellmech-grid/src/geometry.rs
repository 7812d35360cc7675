//! Grid coordinates, facing directions and bounds.
//!
//! The y axis grows upward: moving [`Direction::Up`] increments `y` and
//! moving [`Direction::Down`] decrements it. Directions are numbered so that
//! `(d + 2) % 4` is the opposite facing and `(d + 1) % 4` is one clockwise
//! quarter turn.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::GridError;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer grid coordinate.
///
/// Equality and hashing are structural, so a `Position` is used directly as
/// the key of the grid's occupancy map.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring position one step in `dir`.
    #[inline]
    pub fn moved(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        self.offset(dx, dy)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// The four orthogonal neighbours, in [`Direction::ALL`] order.
    pub fn neighbours(self) -> [Position; 4] {
        Direction::ALL.map(|dir| self.moved(dir))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// A cell facing, also used as the direction of a push force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Direction {
    /// All directions in numeric order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Build a direction from any integer, wrapping modulo 4.
    #[inline]
    pub fn wrapping(value: i32) -> Self {
        Self::ALL[value.rem_euclid(4) as usize]
    }

    #[inline]
    pub fn opposite(self) -> Self {
        self.rotated(2)
    }

    /// Rotate by `quarter_turns` clockwise steps. Negative values rotate
    /// counter-clockwise.
    #[inline]
    pub fn rotated(self, quarter_turns: i32) -> Self {
        Self::wrapping(self as i32 + quarter_turns)
    }

    /// Number of clockwise quarter turns (0..=3) that take `self` to `other`.
    #[inline]
    pub fn delta_to(self, other: Direction) -> i32 {
        (other as i32 - self as i32).rem_euclid(4)
    }

    /// Shortest signed quarter-turn count from `self` to `other`, in `-1..=2`.
    #[inline]
    pub fn signed_delta_to(self, other: Direction) -> i32 {
        match self.delta_to(other) {
            3 => -1,
            d => d,
        }
    }

    /// Whether `self` and `other` lie on the same axis.
    #[inline]
    pub fn is_parallel(self, other: Direction) -> bool {
        (self as u8) % 2 == (other as u8) % 2
    }

    /// Unit step `(dx, dy)` for this direction.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, 1),
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = GridError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(GridError::InvalidDirection { value })
    }
}

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// Mirror axis for flip transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Mirror left/right.
    Horizontal,
    /// Mirror up/down.
    Vertical,
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A rectangular region anchored at its bottom-left corner.
///
/// A size with zero width or zero height is treated as unbounded and
/// contains every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
    pub bottom: i32,
    pub left: i32,
}

impl Size {
    /// A `width x height` region with its origin at `(0, 0)`.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bottom: 0,
            left: 0,
        }
    }

    pub const fn with_origin(width: u32, height: u32, bottom: i32, left: i32) -> Self {
        Self {
            width,
            height,
            bottom,
            left,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        if self.width == 0 || self.height == 0 {
            return true;
        }
        let dx = pos.x as i64 - self.left as i64;
        let dy = pos.y as i64 - self.bottom as i64;
        dx >= 0 && dx < self.width as i64 && dy >= 0 && dy < self.height as i64
    }

    /// Every position in the region, row by row from the bottom.
    ///
    /// Yields nothing for a degenerate (unbounded) size.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let (w, h) = if self.width == 0 || self.height == 0 {
            (0, 0)
        } else {
            (self.width as i32, self.height as i32)
        };
        (0..h).flat_map(move |y| {
            (0..w).map(move |x| Position::new(self.left + x, self.bottom + y))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_two_steps() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.opposite(), dir.rotated(2));
        }
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Up.opposite(), Direction::Down);
    }

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Direction::Up.rotated(1), Direction::Right);
        assert_eq!(Direction::Right.rotated(-1), Direction::Up);
        assert_eq!(Direction::Down.rotated(-6), Direction::Up);
        assert_eq!(Direction::Left.delta_to(Direction::Right), 2);
        assert_eq!(Direction::Up.delta_to(Direction::Right), 1);
        assert_eq!(Direction::Right.signed_delta_to(Direction::Up), -1);
        assert_eq!(Direction::Right.signed_delta_to(Direction::Left), 2);
    }

    #[test]
    fn moved_follows_upward_y() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.moved(Direction::Right), Position::new(4, 3));
        assert_eq!(origin.moved(Direction::Down), Position::new(3, 2));
        assert_eq!(origin.moved(Direction::Left), Position::new(2, 3));
        assert_eq!(origin.moved(Direction::Up), Position::new(3, 4));
    }

    #[test]
    fn direction_from_numeral() {
        assert_eq!(Direction::try_from(2).unwrap(), Direction::Left);
        assert!(matches!(
            Direction::try_from(4),
            Err(GridError::InvalidDirection { value: 4 })
        ));
    }

    #[test]
    fn size_contains_respects_origin() {
        let size = Size::with_origin(2, 3, -1, 5);
        assert!(size.contains(Position::new(5, -1)));
        assert!(size.contains(Position::new(6, 1)));
        assert!(!size.contains(Position::new(7, 0)));
        assert!(!size.contains(Position::new(5, 2)));
        assert!(!size.contains(Position::new(4, 0)));
    }

    #[test]
    fn zero_size_contains_everything() {
        let size = Size::new(0, 10);
        assert!(size.contains(Position::new(-1000, 1000)));
        assert_eq!(size.positions().count(), 0);
    }

    #[test]
    fn positions_cover_region() {
        let size = Size::with_origin(3, 2, 1, 1);
        let all: Vec<Position> = size.positions().collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], Position::new(1, 1));
        assert_eq!(all[5], Position::new(3, 2));
    }
}
