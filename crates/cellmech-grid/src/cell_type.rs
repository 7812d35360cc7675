//! Cell type descriptors and the behavior strategy table.
//!
//! A cell type is registered once in a [`CellTypeRegistry`] and referred to by
//! its [`CellTypeId`] handle from then on. Per-type physics lives in a
//! [`Behavior`]: a table of plain function pointers that the grid dispatches
//! through whenever a cell of that type is updated, pushed, or passed through.
//! New cell types plug in by supplying a new table; [`Behavior::BASE`] is the
//! default "move one step when pushed with positive bias" physics.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellData, CellId, Movement, PushResult};
use crate::geometry::{Axis, Direction};
use crate::grid::Grid;
use crate::GridError;

// ---------------------------------------------------------------------------
// CellTypeId
// ---------------------------------------------------------------------------

/// Handle to a registered cell type.
///
/// Two handles are equal only if they came from the same
/// [`CellTypeRegistry::create`] call; descriptors are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellTypeId(pub(crate) u32);

impl CellTypeId {
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CellTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// UpdateCategory
// ---------------------------------------------------------------------------

/// How the scheduler walks the cells of a type each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateCategory {
    /// One pass per facing, front-most cell of each line first.
    Directional,
    /// A single pass in no guaranteed order.
    Random,
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// What a cell attempts on its own turn.
pub type UpdateFn = fn(&mut Grid, CellId);

/// How a cell reacts to being pushed in a direction with the given bias.
pub type PushFn = fn(&mut Grid, CellId, Direction, i32) -> PushResult;

/// Where force travelling in a direction lands when it reaches this cell.
///
/// The last argument is the number of redirect hops already taken while
/// resolving the current landing spot.
pub type GetPosFn = fn(&Grid, &Cell, Direction, u32) -> Option<Movement>;

/// Direction transform applied when a placement is mirrored.
pub type FlipFn = fn(Direction, Axis) -> Direction;

/// Combines an existing placement with an incoming one.
pub type MergeFn = fn(CellData, CellData) -> CellData;

/// Per-type physics, dispatched by the grid.
#[derive(Clone, Copy)]
pub struct Behavior {
    /// Label used in logs and diagnostics.
    pub name: &'static str,
    pub update: UpdateFn,
    pub push: PushFn,
    pub get_pos: GetPosFn,
    /// Whether [`Grid::rotate`] and [`Grid::set_rotation`] affect this cell.
    pub rotatable: bool,
    /// Whether [`Grid::disable`] affects this cell.
    pub disableable: bool,
}

impl Behavior {
    /// Does nothing on update, moves when pushed, never redirects.
    pub const BASE: Behavior = Behavior {
        name: "base",
        update: idle,
        push: Grid::push_base,
        get_pos: stay,
        rotatable: true,
        disableable: true,
    };

    /// `BASE` under a different name, as a starting point for overrides.
    pub const fn named(name: &'static str) -> Behavior {
        Behavior { name, ..Self::BASE }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self::BASE
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field("rotatable", &self.rotatable)
            .field("disableable", &self.disableable)
            .finish_non_exhaustive()
    }
}

fn idle(_grid: &mut Grid, _cell: CellId) {}

fn stay(_grid: &Grid, cell: &Cell, dir: Direction, _hops: u32) -> Option<Movement> {
    Some(Movement::new(cell.position(), dir))
}

// ---------------------------------------------------------------------------
// Flip tables
// ---------------------------------------------------------------------------

/// Mirror Right/Left on the horizontal axis and Up/Down on the vertical
/// axis, leaving the orthogonal facings alone. The default flip.
pub fn flip_one_way(dir: Direction, axis: Axis) -> Direction {
    match (axis, dir) {
        (Axis::Horizontal, Direction::Right) => Direction::Left,
        (Axis::Horizontal, Direction::Left) => Direction::Right,
        (Axis::Vertical, Direction::Up) => Direction::Down,
        (Axis::Vertical, Direction::Down) => Direction::Up,
        (_, other) => other,
    }
}

/// Diagonal mirror for types with two-way symmetry: every facing maps to a
/// quarter-turned neighbour, the pairing depending on the axis.
pub fn flip_two_way(dir: Direction, axis: Axis) -> Direction {
    match axis {
        Axis::Horizontal => match dir {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Left,
        },
        Axis::Vertical => match dir {
            Direction::Right => Direction::Up,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Up => Direction::Right,
        },
    }
}

/// Flip that keeps the facing unchanged.
pub fn flip_none(dir: Direction, _axis: Axis) -> Direction {
    dir
}

// ---------------------------------------------------------------------------
// CellTypeDescriptor
// ---------------------------------------------------------------------------

/// Immutable description of a cell type.
#[derive(Debug, Clone)]
pub struct CellTypeDescriptor {
    /// Registry key, e.g. `"core.mover"`. Unique within a registry.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Opaque reference for the renderer.
    pub texture_name: String,
    pub behavior: Behavior,
    pub flip: Option<FlipFn>,
    pub merge: Option<MergeFn>,
    /// `None` means the scheduler never updates cells of this type.
    pub update_category: Option<UpdateCategory>,
    /// Scheduling priority; lower runs earlier.
    pub update_order: f64,
}

impl CellTypeDescriptor {
    /// A descriptor with the given key and behavior. The texture defaults to
    /// the last segment of the key.
    pub fn new(id: impl Into<String>, behavior: Behavior) -> Self {
        let id = id.into();
        let texture_name = id.rsplit('.').next().unwrap_or_default().to_owned();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            texture_name,
            behavior,
            flip: None,
            merge: None,
            update_category: None,
            update_order: 0.0,
        }
    }

    pub fn named(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.name = name.into();
        self.description = description.into();
        self
    }

    pub fn texture(mut self, texture_name: impl Into<String>) -> Self {
        self.texture_name = texture_name.into();
        self
    }

    pub fn scheduled(mut self, category: UpdateCategory, order: f64) -> Self {
        self.update_category = Some(category);
        self.update_order = order;
        self
    }

    pub fn with_flip(mut self, flip: FlipFn) -> Self {
        self.flip = Some(flip);
        self
    }

    pub fn with_merge(mut self, merge: MergeFn) -> Self {
        self.merge = Some(merge);
        self
    }
}

// ---------------------------------------------------------------------------
// CellTypeRegistry
// ---------------------------------------------------------------------------

/// Append-only catalogue of cell types.
///
/// Built once during startup, then shared read-only (usually behind an
/// `Arc`) by every grid and schedule that uses it.
#[derive(Debug, Default)]
pub struct CellTypeRegistry {
    types: Vec<CellTypeDescriptor>,
    by_id: HashMap<String, CellTypeId>,
}

impl CellTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new type and return its handle.
    ///
    /// Fails if another type already uses the same string id.
    pub fn create(&mut self, descriptor: CellTypeDescriptor) -> Result<CellTypeId, GridError> {
        if self.by_id.contains_key(&descriptor.id) {
            return Err(GridError::DuplicateCellType { id: descriptor.id });
        }
        let handle = CellTypeId(self.types.len() as u32);
        tracing::debug!(
            id = %descriptor.id,
            behavior = descriptor.behavior.name,
            handle = handle.0,
            "registered cell type"
        );
        self.by_id.insert(descriptor.id.clone(), handle);
        self.types.push(descriptor);
        Ok(handle)
    }

    pub fn get(&self, kind: CellTypeId) -> Option<&CellTypeDescriptor> {
        self.types.get(kind.0 as usize)
    }

    /// Whether `kind` indexes a registered type. Handles carry no registry
    /// tag, so this cannot tell a foreign handle from a local one with the
    /// same index.
    pub fn contains(&self, kind: CellTypeId) -> bool {
        (kind.0 as usize) < self.types.len()
    }

    /// Resolve a string id, as found in level data.
    pub fn lookup(&self, id: &str) -> Result<CellTypeId, GridError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| GridError::UnknownCellType { id: id.to_owned() })
    }

    pub fn behavior(&self, kind: CellTypeId) -> Option<Behavior> {
        self.get(kind).map(|t| t.behavior)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (CellTypeId, &CellTypeDescriptor)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (CellTypeId(i as u32), t))
    }

    /// Mirror a placement using its type's flip, or [`flip_one_way`].
    pub fn flip(&self, data: CellData, axis: Axis) -> CellData {
        let flip = self
            .get(data.kind)
            .and_then(|t| t.flip)
            .unwrap_or(flip_one_way);
        CellData::new(data.kind, flip(data.direction, axis))
    }

    /// Combine two overlapping placements. Uses the existing placement's
    /// merge; without one the incoming placement wins.
    pub fn merge(&self, existing: CellData, incoming: CellData) -> CellData {
        match self.get(existing.kind).and_then(|t| t.merge) {
            Some(merge) => merge(existing, incoming),
            None => incoming,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn keep_existing(existing: CellData, _incoming: CellData) -> CellData {
        existing
    }

    #[test]
    fn identical_descriptors_get_distinct_handles() {
        let mut registry = CellTypeRegistry::new();
        let a = registry
            .create(CellTypeDescriptor::new("test.a", Behavior::BASE))
            .unwrap();
        let b = registry
            .create(CellTypeDescriptor::new("test.b", Behavior::BASE))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("test.b").unwrap(), b);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = CellTypeRegistry::new();
        registry
            .create(CellTypeDescriptor::new("test.a", Behavior::BASE))
            .unwrap();
        let err = registry
            .create(CellTypeDescriptor::new("test.a", Behavior::BASE))
            .unwrap_err();
        assert!(matches!(err, GridError::DuplicateCellType { .. }));
    }

    #[test]
    fn unknown_lookup_fails() {
        let registry = CellTypeRegistry::new();
        let err = registry.lookup("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn texture_defaults_to_last_segment() {
        let desc = CellTypeDescriptor::new("jm.core.mover", Behavior::BASE);
        assert_eq!(desc.texture_name, "mover");
        assert_eq!(desc.texture("movergreen").texture_name, "movergreen");
    }

    #[test]
    fn one_way_flip_mirrors_only_its_axis() {
        assert_eq!(flip_one_way(Direction::Right, Axis::Horizontal), Direction::Left);
        assert_eq!(flip_one_way(Direction::Up, Axis::Horizontal), Direction::Up);
        assert_eq!(flip_one_way(Direction::Up, Axis::Vertical), Direction::Down);
        assert_eq!(flip_one_way(Direction::Left, Axis::Vertical), Direction::Left);
    }

    #[test]
    fn two_way_flip_is_an_involution() {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            for dir in Direction::ALL {
                assert_eq!(flip_two_way(flip_two_way(dir, axis), axis), dir);
                assert!(!flip_two_way(dir, axis).is_parallel(dir));
            }
        }
    }

    #[test]
    fn registry_flip_uses_custom_table() {
        let mut registry = CellTypeRegistry::new();
        let plain = registry
            .create(CellTypeDescriptor::new("test.plain", Behavior::BASE))
            .unwrap();
        let fixed = registry
            .create(CellTypeDescriptor::new("test.fixed", Behavior::BASE).with_flip(flip_none))
            .unwrap();

        let flipped = registry.flip(CellData::new(plain, Direction::Right), Axis::Horizontal);
        assert_eq!(flipped.direction, Direction::Left);
        let flipped = registry.flip(CellData::new(fixed, Direction::Right), Axis::Horizontal);
        assert_eq!(flipped.direction, Direction::Right);
    }

    #[test]
    fn merge_defaults_to_incoming() {
        let mut registry = CellTypeRegistry::new();
        let a = registry
            .create(CellTypeDescriptor::new("test.a", Behavior::BASE))
            .unwrap();
        let sticky = registry
            .create(CellTypeDescriptor::new("test.sticky", Behavior::BASE).with_merge(keep_existing))
            .unwrap();

        let incoming = CellData::new(a, Direction::Up);
        assert_eq!(registry.merge(CellData::new(a, Direction::Down), incoming), incoming);
        let existing = CellData::new(sticky, Direction::Left);
        assert_eq!(registry.merge(existing, incoming), existing);
    }
}
