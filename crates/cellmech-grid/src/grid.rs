//! The [`Grid`] owns every cell of a level: the sparse position→cell map, the
//! ordered master list of constructed cells, bounds, the tick counter, and the
//! event buffer collaborators read at tick end.
//!
//! # Invariant
//!
//! A cell is reachable from the position map iff it is not deleted and its
//! `pos` maps to it. All position-map writes for live cells go through
//! [`Grid::set_position`], [`Grid::spawn`] and [`Grid::remove`]; nothing else
//! touches the map.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellData, CellId};
use crate::cell_type::{Behavior, CellTypeId, CellTypeRegistry};
use crate::geometry::{Axis, Direction, Position, Size};
use crate::GridError;

/// Seed used by [`Grid::new`] until [`Grid::reseed`] is called.
pub const DEFAULT_SEED: u64 = 0x6365_6c6c_6d65_6368;

// ---------------------------------------------------------------------------
// PushLimits
// ---------------------------------------------------------------------------

/// Recursion bounds for the push protocol.
///
/// Cyclic redirect layouts would otherwise recurse forever; a chain that hits
/// either limit resolves as blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushLimits {
    /// Maximum nesting of `push` calls in one chain, which is also the
    /// longest chain of cells a single push can move.
    pub max_push_depth: u32,
    /// Maximum redirects followed while resolving one landing spot.
    pub max_redirect_hops: u32,
}

impl Default for PushLimits {
    fn default() -> Self {
        Self {
            max_push_depth: 512,
            max_redirect_hops: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// GridEvent
// ---------------------------------------------------------------------------

/// Something collaborators react to once the current tick has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridEvent {
    /// A note cell was struck.
    Note { position: Position, note: String },
    /// Every cell was discarded.
    Cleared { size: Size },
}

// ---------------------------------------------------------------------------
// PlacedCell
// ---------------------------------------------------------------------------

/// One placement in imported level data, referring to its type by string id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub position: Position,
    pub kind: String,
    pub direction: Direction,
}

impl PlacedCell {
    pub fn new(position: Position, kind: impl Into<String>, direction: Direction) -> Self {
        Self {
            position,
            kind: kind.into(),
            direction,
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A level: cells, bounds and simulation bookkeeping.
pub struct Grid {
    types: Arc<CellTypeRegistry>,
    /// Occupancy map. Absent key = empty cell.
    positions: HashMap<Position, CellId>,
    /// Master list, in construction order. Holds deleted placed cells too so
    /// that `reset` can revive them.
    cells: BTreeMap<CellId, Cell>,
    next_id: u64,
    size: Size,
    infinite: bool,
    tick_count: u64,
    /// Editing mode: removals purge cells from the master list.
    initial: bool,
    name: String,
    description: String,
    rng: Pcg32,
    events: Vec<GridEvent>,
    pub(crate) limits: PushLimits,
    pub(crate) push_depth: u32,
}

impl Grid {
    /// Create an empty, bounded grid in editing mode.
    pub fn new(size: Size, types: Arc<CellTypeRegistry>) -> Self {
        Self {
            types,
            positions: HashMap::new(),
            cells: BTreeMap::new(),
            next_id: 0,
            size,
            infinite: false,
            tick_count: 0,
            initial: true,
            name: String::new(),
            description: String::new(),
            rng: Pcg32::seed_from_u64(DEFAULT_SEED),
            events: Vec::new(),
            limits: PushLimits::default(),
            push_depth: 0,
        }
    }

    /// Create an empty grid without bounds.
    pub fn infinite(types: Arc<CellTypeRegistry>) -> Self {
        let mut grid = Self::new(Size::default(), types);
        grid.infinite = true;
        grid
    }

    // -- configuration ------------------------------------------------------

    pub fn types(&self) -> &Arc<CellTypeRegistry> {
        &self.types
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Change the bounds. Cells already outside the new bounds stay where
    /// they are.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    pub fn set_infinite(&mut self, infinite: bool) {
        self.infinite = infinite;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Number of ticks completed since load, reset or clear.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Whether the grid is still in editing mode (no tick has run since the
    /// last load or reset).
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn set_initial(&mut self, initial: bool) {
        self.initial = initial;
    }

    pub fn push_limits(&self) -> PushLimits {
        self.limits
    }

    pub fn set_push_limits(&mut self, limits: PushLimits) {
        self.limits = limits;
    }

    /// Restart the random stream used by random-direction cells.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    pub fn random_direction(&mut self) -> Direction {
        Direction::wrapping(self.rng.gen_range(0..4))
    }

    /// Whether `pos` may hold a cell.
    pub fn in_bounds(&self, pos: Position) -> bool {
        self.infinite || self.size.contains(pos)
    }

    // -- lookup -------------------------------------------------------------

    /// The live cell at `pos`, if any.
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.positions.get(&pos).and_then(|id| self.cells.get(id))
    }

    pub fn cell_id_at(&self, pos: Position) -> Option<CellId> {
        self.positions.get(&pos).copied()
    }

    /// Any cell still in the master list, deleted or not.
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Whether `id` refers to a cell that is on the grid right now.
    pub fn is_live(&self, id: CellId) -> bool {
        self.cells.get(&id).is_some_and(|c| !c.deleted)
    }

    /// The master list, in construction order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Cells currently on the grid, in construction order.
    pub fn live_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().filter(|c| !c.deleted)
    }

    pub fn live_count(&self) -> usize {
        self.positions.len()
    }

    pub fn behavior_of(&self, kind: CellTypeId) -> Behavior {
        self.types.behavior(kind).unwrap_or(Behavior::BASE)
    }

    /// Whether `id` was disabled during the current tick.
    pub fn is_disabled(&self, id: CellId) -> bool {
        self.cells
            .get(&id)
            .is_some_and(|c| c.disabled_in == Some(self.tick_count))
    }

    /// Whether `id` already ran its update during the current tick.
    pub fn is_updated(&self, id: CellId) -> bool {
        self.cells
            .get(&id)
            .is_some_and(|c| c.updated_in == Some(self.tick_count))
    }

    // -- placement ----------------------------------------------------------

    /// Construct a cell at `pos`.
    ///
    /// `generated` marks cells produced by the simulation; those never
    /// survive [`reset`](Self::reset).
    pub fn spawn(
        &mut self,
        pos: Position,
        kind: CellTypeId,
        direction: Direction,
        generated: bool,
    ) -> Result<CellId, GridError> {
        self.check_placement(pos, kind)?;
        if let Some(&occupant) = self.positions.get(&pos) {
            return Err(GridError::Occupied {
                position: pos,
                occupant,
            });
        }
        let id = CellId(self.next_id);
        self.next_id += 1;
        self.cells
            .insert(id, Cell::new(id, kind, pos, direction, generated));
        self.positions.insert(pos, id);
        tracing::trace!(cell = %id, kind = %kind, position = %pos, ?direction, generated, "spawned cell");
        Ok(id)
    }

    /// Place a level cell at `pos`, replacing any occupant.
    pub fn load_cell(
        &mut self,
        pos: Position,
        kind: CellTypeId,
        direction: Direction,
    ) -> Result<CellId, GridError> {
        self.check_placement(pos, kind)?;
        if let Some(existing) = self.cell_id_at(pos) {
            self.remove(existing);
        }
        self.spawn(pos, kind, direction, false)
    }

    /// Load a batch of level placements.
    ///
    /// Every entry is validated before the first one is placed, so on error
    /// the grid is left untouched.
    pub fn import(&mut self, entries: &[PlacedCell]) -> Result<Vec<CellId>, GridError> {
        let resolved = entries
            .iter()
            .map(|entry| {
                let kind = self.types.lookup(&entry.kind)?;
                if !self.in_bounds(entry.position) {
                    return Err(GridError::OutOfBounds {
                        position: entry.position,
                    });
                }
                Ok((entry.position, kind, entry.direction))
            })
            .collect::<Result<Vec<_>, GridError>>()?;

        tracing::debug!(count = resolved.len(), "importing level cells");
        resolved
            .into_iter()
            .map(|(pos, kind, direction)| self.load_cell(pos, kind, direction))
            .collect()
    }

    /// Place `kind` facing `direction` on every position of `region`,
    /// replacing occupants. Nothing is placed if any position is off-grid.
    pub fn fill(
        &mut self,
        region: Size,
        kind: CellTypeId,
        direction: Direction,
    ) -> Result<Vec<CellId>, GridError> {
        let positions: Vec<Position> = region.positions().collect();
        for &pos in &positions {
            self.check_placement(pos, kind)?;
        }
        positions
            .into_iter()
            .map(|pos| self.load_cell(pos, kind, direction))
            .collect()
    }

    /// Remove the cell at `pos`. Returns whether there was one.
    pub fn delete_cell(&mut self, pos: Position) -> bool {
        match self.cell_id_at(pos) {
            Some(id) => {
                self.remove(id);
                true
            }
            None => false,
        }
    }

    /// Replace the cell at `pos` with its mirrored placement.
    pub fn flip_cell(&mut self, pos: Position, axis: Axis) -> Result<Option<CellId>, GridError> {
        let Some(cell) = self.get(pos) else {
            return Ok(None);
        };
        let flipped = self.types.flip(cell.data(), axis);
        self.load_cell(pos, flipped.kind, flipped.direction).map(Some)
    }

    /// Place `incoming` at `pos`, merging with the current occupant through
    /// its type's merge transform.
    pub fn merge_cell(&mut self, pos: Position, incoming: CellData) -> Result<CellId, GridError> {
        let data = match self.get(pos) {
            Some(existing) => self.types.merge(existing.data(), incoming),
            None => incoming,
        };
        self.load_cell(pos, data.kind, data.direction)
    }

    fn check_placement(&self, pos: Position, kind: CellTypeId) -> Result<(), GridError> {
        if !self.types.contains(kind) {
            return Err(GridError::InvalidCellType { kind });
        }
        if !self.in_bounds(pos) {
            return Err(GridError::OutOfBounds { position: pos });
        }
        Ok(())
    }

    // -- cell lifecycle -----------------------------------------------------

    /// Take a cell off the grid. Idempotent.
    ///
    /// Generated cells, and any cell removed while in editing mode, are also
    /// dropped from the master list.
    pub fn remove(&mut self, id: CellId) {
        let purge = match self.cells.get_mut(&id) {
            Some(cell) if !cell.deleted => {
                if self.positions.get(&cell.pos) == Some(&id) {
                    self.positions.remove(&cell.pos);
                }
                cell.deleted = true;
                cell.generated || self.initial
            }
            _ => return,
        };
        if purge {
            self.cells.remove(&id);
        }
        tracing::trace!(cell = %id, purge, "removed cell");
    }

    /// Move a live cell to `pos`. No-op for deleted or unknown cells.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is held by a different cell: two cells claiming one
    /// position is a defect in the calling behavior.
    pub fn set_position(&mut self, id: CellId, pos: Position) {
        let Some(cell) = self.cells.get_mut(&id) else {
            return;
        };
        if cell.deleted {
            return;
        }
        if let Some(&other) = self.positions.get(&pos) {
            assert!(
                other == id,
                "cell {id} cannot move to {pos}: occupied by cell {other}"
            );
        }
        if self.positions.get(&cell.pos) == Some(&id) {
            self.positions.remove(&cell.pos);
        }
        self.positions.insert(pos, id);
        cell.pos = pos;
    }

    /// Turn a cell by `quarter_turns`, unless its type ignores rotation.
    pub fn rotate(&mut self, id: CellId, quarter_turns: i32) {
        if let Some(cell) = self.rotatable_mut(id) {
            cell.turn(quarter_turns);
        }
    }

    /// Face a cell toward `direction`, unless its type ignores rotation.
    pub fn set_rotation(&mut self, id: CellId, direction: Direction) {
        if let Some(cell) = self.rotatable_mut(id) {
            let delta = cell.direction.signed_delta_to(direction);
            cell.turn(delta);
        }
    }

    pub(crate) fn live_cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(&id).filter(|c| !c.deleted)
    }

    fn rotatable_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        let cell = self.cells.get_mut(&id)?;
        let rotatable = self
            .types
            .behavior(cell.kind)
            .map_or(true, |b| b.rotatable);
        (rotatable && !cell.deleted).then_some(cell)
    }

    /// Skip a cell's update for the rest of the current tick.
    pub fn disable(&mut self, id: CellId) {
        let tick = self.tick_count;
        if let Some(cell) = self.cells.get_mut(&id) {
            let disableable = self
                .types
                .behavior(cell.kind)
                .map_or(true, |b| b.disableable);
            if disableable {
                cell.disabled_in = Some(tick);
            }
        }
    }

    /// Count a cell as already updated this tick.
    pub fn mark_updated(&mut self, id: CellId) {
        let tick = self.tick_count;
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.updated_in = Some(tick);
        }
    }

    // -- whole-grid lifecycle -----------------------------------------------

    /// Return to the state right after the level was loaded.
    ///
    /// Generated cells are purged; placed cells are revived at their initial
    /// position and facing. When several placed cells share an initial
    /// position, the most recently constructed one is revived and the others
    /// are dropped from the master list. Stamps are cleared and the tick
    /// counter restarts.
    pub fn reset(&mut self) {
        self.cells.retain(|_, cell| !cell.generated);

        // Construction order: a later placement overwrites an earlier claim.
        let mut claims: HashMap<Position, CellId> = HashMap::with_capacity(self.cells.len());
        for cell in self.cells.values() {
            claims.insert(cell.initial_position, cell.id);
        }
        let before = self.cells.len();
        self.cells
            .retain(|id, cell| claims.get(&cell.initial_position) == Some(id));
        let superseded = before - self.cells.len();
        if superseded > 0 {
            tracing::debug!(superseded, "dropped placed cells replaced at their initial position");
        }

        for cell in self.cells.values_mut() {
            cell.pos = cell.initial_position;
            cell.direction = cell.initial_direction;
            cell.old_position = cell.initial_position;
            cell.rotation_offset = 0;
            cell.disabled_in = None;
            cell.updated_in = None;
            cell.deleted = false;
        }
        self.positions = claims;
        self.tick_count = 0;
        self.initial = true;
        self.push_depth = 0;
        self.events.clear();
        tracing::debug!(cells = self.positions.len(), "grid reset");
    }

    /// Discard every cell and restart the tick counter.
    pub fn clear(&mut self, size: Size) {
        let discarded = self.cells.len();
        self.positions.clear();
        self.cells.clear();
        self.size = size;
        self.tick_count = 0;
        self.emit(GridEvent::Cleared { size });
        tracing::debug!(discarded, "grid cleared");
    }

    // -- tick plumbing ------------------------------------------------------

    /// Start a tick: record each cell's starting position for interpolation
    /// and leave editing mode.
    pub fn begin_tick(&mut self) {
        for cell in self.cells.values_mut().filter(|c| !c.deleted) {
            cell.old_position = cell.pos;
            cell.rotation_offset = 0;
        }
        self.initial = false;
        self.push_depth = 0;
    }

    /// Ids of live cells of `kind`, optionally only those facing `facing`,
    /// in construction order. The result is a snapshot: later mutations do
    /// not change it.
    pub fn snapshot_kind(
        &self,
        kind: CellTypeId,
        facing: Option<Direction>,
    ) -> Vec<(CellId, Position)> {
        self.cells
            .values()
            .filter(|c| !c.deleted && c.kind == kind)
            .filter(|c| facing.map_or(true, |f| c.direction == f))
            .map(|c| (c.id, c.pos))
            .collect()
    }

    /// Run a cell's update if it is live and neither disabled nor already
    /// updated this tick, then stamp it. Returns whether it ran.
    pub fn update_cell(&mut self, id: CellId) -> bool {
        let Some(cell) = self.cells.get(&id) else {
            return false;
        };
        let tick = Some(self.tick_count);
        if cell.deleted || cell.disabled_in == tick || cell.updated_in == tick {
            return false;
        }
        let behavior = self.behavior_of(cell.kind);
        (behavior.update)(self, id);
        self.mark_updated(id);
        true
    }

    /// Finish a tick: advance the counter and hand back the events raised
    /// during it.
    pub fn finish_tick(&mut self) -> Vec<GridEvent> {
        self.tick_count += 1;
        std::mem::take(&mut self.events)
    }

    /// Queue an event for delivery at the end of the current tick.
    pub fn emit(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn pending_events(&self) -> &[GridEvent] {
        &self.events
    }

    // -- integrity ----------------------------------------------------------

    /// Verify the occupancy invariant: every map entry points at a live cell
    /// standing on that position, and every live cell is mapped.
    pub fn check_integrity(&self) -> Result<(), GridError> {
        for (pos, id) in &self.positions {
            match self.cells.get(id) {
                Some(cell) if !cell.deleted && cell.pos == *pos => {}
                Some(cell) => {
                    return Err(GridError::Integrity {
                        details: format!(
                            "{pos} maps to cell {id} which is at {} (deleted: {})",
                            cell.pos, cell.deleted
                        ),
                    })
                }
                None => {
                    return Err(GridError::Integrity {
                        details: format!("{pos} maps to unknown cell {id}"),
                    })
                }
            }
        }
        for cell in self.live_cells() {
            if self.positions.get(&cell.pos) != Some(&cell.id) {
                return Err(GridError::Integrity {
                    details: format!("live cell {} at {} is not mapped", cell.id, cell.pos),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size)
            .field("infinite", &self.infinite)
            .field("tick_count", &self.tick_count)
            .field("live", &self.positions.len())
            .field("cells", &self.cells.len())
            .field("initial", &self.initial)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
