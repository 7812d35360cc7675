//! Cellmech Engine -- deterministic tick driver and standard cell catalogue.
//!
//! This crate builds on [`cellmech_grid`] to provide the simulation driver:
//! an [`UpdateSchedule`](schedule::UpdateSchedule) derived once from the
//! type registry, a [`TickLoop`](tick::TickLoop) that runs it against a grid
//! tick after tick, the standard cell types, and hashed snapshots for
//! determinism checks.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use cellmech_engine::prelude::*;
//!
//! let mut types = CellTypeRegistry::new();
//! let std_cells = register_standard(&mut types).unwrap();
//! let types = Arc::new(types);
//!
//! let mut grid = Grid::new(Size::new(8, 1), Arc::clone(&types));
//! let mover = grid
//!     .load_cell(Position::new(0, 0), std_cells.mover, Direction::Right)
//!     .unwrap();
//!
//! let schedule = UpdateSchedule::from_registry(&types);
//! let mut tick_loop = TickLoop::new(grid, schedule, SimulationConfig::default());
//! tick_loop.run_ticks(3);
//!
//! assert_eq!(tick_loop.tick_count(), 3);
//! assert_eq!(tick_loop.grid().cell(mover).unwrap().position(), Position::new(3, 0));
//! ```

#![deny(unsafe_code)]

pub mod cells;
pub mod schedule;
pub mod snapshot;
pub mod tick;

/// Re-export the grid crate for convenience.
pub use cellmech_grid;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by engine setup.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A configuration document could not be parsed.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// A grid or registry operation failed.
    #[error(transparent)]
    Grid(#[from] cellmech_grid::GridError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the grid prelude.
    pub use cellmech_grid::prelude::*;

    // Engine-specific exports.
    pub use crate::cells::{register_standard, StandardCells, NOTE_NAMES};
    pub use crate::schedule::{ScheduleEntry, UpdateSchedule, DIRECTIONAL_ORDER};
    pub use crate::snapshot::{CellSnapshot, GridSnapshot};
    pub use crate::tick::{
        SimulationConfig, TickDiagnostics, TickListener, TickLoop, TickReport,
    };
    pub use crate::EngineError;
}
