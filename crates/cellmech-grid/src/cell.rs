//! Grid-resident cells and the values exchanged by the push protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell_type::CellTypeId;
use crate::geometry::{Direction, Position};

// ---------------------------------------------------------------------------
// CellId
// ---------------------------------------------------------------------------

/// Identity of a cell within its grid.
///
/// Allocated in increasing order at construction and never reused, so the
/// ordering of ids is also the construction order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub(crate) u64);

impl CellId {
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellId({})", self.0)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Protocol values
// ---------------------------------------------------------------------------

/// Outcome of a push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushResult {
    /// The pushed cell (and anything in its way) moved.
    Moved,
    /// Nothing moved.
    Blocked,
    /// The pushed cell destroys whatever pushes into it.
    Destroyed,
}

impl PushResult {
    #[inline]
    pub fn is_moved(self) -> bool {
        self == PushResult::Moved
    }
}

/// A resolved landing spot and the direction force arrives there with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movement {
    pub position: Position,
    pub direction: Direction,
}

impl Movement {
    #[inline]
    pub fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }
}

/// A `(type, facing)` placement, the unit flip and merge operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellData {
    pub kind: CellTypeId,
    pub direction: Direction,
}

impl CellData {
    #[inline]
    pub fn new(kind: CellTypeId, direction: Direction) -> Self {
        Self { kind, direction }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A cell owned by a [`Grid`](crate::grid::Grid).
///
/// Fields are mutated only through grid operations, which keep the occupancy
/// map consistent; this type exposes read access.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) id: CellId,
    pub(crate) kind: CellTypeId,
    pub(crate) pos: Position,
    pub(crate) direction: Direction,
    pub(crate) old_position: Position,
    pub(crate) rotation_offset: i32,
    pub(crate) deleted: bool,
    /// Tick in which the cell was disabled. `None` never matches a tick.
    pub(crate) disabled_in: Option<u64>,
    /// Tick in which the cell last ran its update.
    pub(crate) updated_in: Option<u64>,
    pub(crate) generated: bool,
    pub(crate) initial_position: Position,
    pub(crate) initial_direction: Direction,
}

impl Cell {
    pub(crate) fn new(
        id: CellId,
        kind: CellTypeId,
        pos: Position,
        direction: Direction,
        generated: bool,
    ) -> Self {
        Self {
            id,
            kind,
            pos,
            direction,
            old_position: pos,
            rotation_offset: 0,
            deleted: false,
            disabled_in: None,
            updated_in: None,
            generated,
            initial_position: pos,
            initial_direction: direction,
        }
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> CellTypeId {
        self.kind
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn data(&self) -> CellData {
        CellData::new(self.kind, self.direction)
    }

    /// Where the cell stood when the current tick began.
    #[inline]
    pub fn old_position(&self) -> Position {
        self.old_position
    }

    /// Quarter turns applied to the cell during the current tick.
    #[inline]
    pub fn rotation_offset(&self) -> i32 {
        self.rotation_offset
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    #[inline]
    pub fn disabled_in(&self) -> Option<u64> {
        self.disabled_in
    }

    #[inline]
    pub fn updated_in(&self) -> Option<u64> {
        self.updated_in
    }

    #[inline]
    pub fn initial_position(&self) -> Position {
        self.initial_position
    }

    #[inline]
    pub fn initial_direction(&self) -> Direction {
        self.initial_direction
    }

    pub(crate) fn turn(&mut self, quarter_turns: i32) {
        self.direction = self.direction.rotated(quarter_turns);
        self.rotation_offset += quarter_turns;
    }
}
