//! Cellmech grid -- the data model and push physics of a tick-based
//! directional cellular automaton.
//!
//! A [`Grid`](grid::Grid) owns every cell of a level. Cells have a type
//! (a [`CellTypeId`](cell_type::CellTypeId) handle into a shared
//! [`CellTypeRegistry`](cell_type::CellTypeRegistry)), a position and a
//! facing. Types supply their behavior as a strategy table of plain function
//! pointers: what a cell does on its update, how it reacts to being pushed,
//! and where force passing through it ends up.
//!
//! The tick scheduler and the standard cell catalogue live in
//! `cellmech-engine`; this crate is the layer they build on.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use cellmech_grid::prelude::*;
//!
//! let mut types = CellTypeRegistry::new();
//! let block = types
//!     .create(CellTypeDescriptor::new("core.push", Behavior::BASE))
//!     .unwrap();
//!
//! let mut grid = Grid::new(Size::new(4, 1), Arc::new(types));
//! let a = grid.spawn(Position::new(0, 0), block, Direction::Right, false).unwrap();
//! let b = grid.spawn(Position::new(1, 0), block, Direction::Right, false).unwrap();
//!
//! assert_eq!(grid.push(a, Direction::Right, 1), PushResult::Moved);
//! assert_eq!(grid.cell(a).unwrap().position(), Position::new(1, 0));
//! assert_eq!(grid.cell(b).unwrap().position(), Position::new(2, 0));
//! ```

#![deny(unsafe_code)]

pub mod cell;
pub mod cell_type;
pub mod geometry;
pub mod grid;
pub mod push;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by registry and grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A string type id was looked up that no registered type carries.
    #[error("cell type '{id}' is not registered")]
    UnknownCellType { id: String },

    /// A type was registered under an id that is already taken.
    #[error("cell type '{id}' is already registered")]
    DuplicateCellType { id: String },

    /// A type handle with no type behind it in this grid's registry.
    ///
    /// Handles are registry indexes, so a handle minted by another registry
    /// is only caught when its index is out of range here.
    #[error("cell type handle {kind} is not registered in this grid's registry")]
    InvalidCellType { kind: cell_type::CellTypeId },

    /// A direction numeral outside `0..=3`.
    #[error("invalid direction numeral {value}, expected 0..=3")]
    InvalidDirection { value: u8 },

    /// A placement outside the bounds of a finite grid.
    #[error("position {position} is outside the grid")]
    OutOfBounds { position: geometry::Position },

    /// A placement onto a position another cell already holds.
    #[error("position {position} is already occupied by cell {occupant}")]
    Occupied {
        position: geometry::Position,
        occupant: cell::CellId,
    },

    /// The occupancy map disagrees with the cells it indexes.
    #[error("grid integrity violated: {details}")]
    Integrity { details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::cell::{Cell, CellData, CellId, Movement, PushResult};
    pub use crate::cell_type::{
        flip_none, flip_one_way, flip_two_way, Behavior, CellTypeDescriptor, CellTypeId,
        CellTypeRegistry, UpdateCategory,
    };
    pub use crate::geometry::{Axis, Direction, Position, Size};
    pub use crate::grid::{Grid, GridEvent, PlacedCell, PushLimits, DEFAULT_SEED};
    pub use crate::GridError;
}
