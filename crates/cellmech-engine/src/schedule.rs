//! The per-tick update order.
//!
//! An [`UpdateSchedule`] is built once from a [`CellTypeRegistry`]: every
//! type that declares an [`UpdateCategory`] becomes one [`ScheduleEntry`],
//! stably sorted by its `update_order`. The schedule is immutable afterwards
//! and may be shared by any number of grids using the same registry.
//!
//! Running an entry is always snapshot, then sort, then dispatch. Updates
//! may move or delete any cell, including ones later in the same pass, so
//! the candidate set is fixed up front and each candidate is re-checked by
//! [`Grid::update_cell`] right before it runs.

use cellmech_grid::cell::CellId;
use cellmech_grid::cell_type::{CellTypeId, CellTypeRegistry, UpdateCategory};
use cellmech_grid::geometry::{Direction, Position};
use cellmech_grid::grid::Grid;

/// Facing sub-order of a directional pass.
pub const DIRECTIONAL_ORDER: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Up,
    Direction::Down,
];

// ---------------------------------------------------------------------------
// ScheduleEntry
// ---------------------------------------------------------------------------

/// One scheduled cell type.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub kind: CellTypeId,
    /// The type's registry key, used in logs and diagnostics.
    pub id: String,
    pub category: UpdateCategory,
    pub order: f64,
}

// ---------------------------------------------------------------------------
// UpdateSchedule
// ---------------------------------------------------------------------------

/// The fixed sequence of type passes making up one tick.
#[derive(Debug, Clone, Default)]
pub struct UpdateSchedule {
    entries: Vec<ScheduleEntry>,
}

impl UpdateSchedule {
    /// Derive the schedule from every scheduled type in `types`.
    ///
    /// Types with equal `update_order` keep their registration order.
    pub fn from_registry(types: &CellTypeRegistry) -> Self {
        let mut entries: Vec<ScheduleEntry> = types
            .iter()
            .filter_map(|(kind, descriptor)| {
                descriptor.update_category.map(|category| ScheduleEntry {
                    kind,
                    id: descriptor.id.clone(),
                    category,
                    order: descriptor.update_order,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.order.total_cmp(&b.order));

        tracing::debug!(
            entries = entries.len(),
            order = ?entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            "built update schedule"
        );
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every pass of one tick against `grid`. Returns how many updates
    /// ran.
    ///
    /// The tick counter is not advanced: that is the caller's job once the
    /// tick is over. Running twice within one tick therefore updates nothing
    /// the second time.
    pub fn run(&self, grid: &mut Grid) -> usize {
        self.entries
            .iter()
            .map(|entry| self.run_entry(entry, grid))
            .sum()
    }

    /// Run the pass (or, for directional types, the four passes) of one
    /// entry. Returns how many updates ran.
    pub fn run_entry(&self, entry: &ScheduleEntry, grid: &mut Grid) -> usize {
        match entry.category {
            UpdateCategory::Directional => DIRECTIONAL_ORDER
                .iter()
                .map(|&dir| {
                    let mut batch = grid.snapshot_kind(entry.kind, Some(dir));
                    batch.sort_by_key(|&(_, pos)| front_first_key(dir, pos));
                    dispatch(grid, &batch)
                })
                .sum(),
            UpdateCategory::Random => {
                let batch = grid.snapshot_kind(entry.kind, None);
                dispatch(grid, &batch)
            }
        }
    }
}

/// Sort key placing the cell furthest along `dir` first.
fn front_first_key(dir: Direction, pos: Position) -> i64 {
    let (x, y) = (pos.x as i64, pos.y as i64);
    match dir {
        Direction::Right => -x,
        Direction::Left => x,
        Direction::Up => -y,
        Direction::Down => y,
    }
}

fn dispatch(grid: &mut Grid, batch: &[(CellId, Position)]) -> usize {
    batch
        .iter()
        .filter(|&&(id, _)| grid.update_cell(id))
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
