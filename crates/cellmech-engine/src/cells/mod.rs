//! The standard cell catalogue.
//!
//! [`register_standard`] adds every built-in type to a registry and hands
//! back their handles. Levels refer to these types by their string ids:
//!
//! | id | update | order |
//! |---|---|---|
//! | `core.push` | - | |
//! | `core.wall` | - | |
//! | `core.slide` | - | |
//! | `core.mover` | directional | 3 |
//! | `core.generator` | directional | 1 |
//! | `core.rotator_cw`, `core.rotator_ccw` | random | 2 |
//! | `core.redirector` | - | |
//! | `core.trash`, `core.enemy` | - | |
//! | `destroying.drill`, `destroying.cat` | directional | 3 |
//! | `destroying.nuke` | - | |
//! | `utils.orientator` | directional | 2.5 |
//! | `utils.disabler` | random | 0 |
//! | `utils.note` | - | |
//! | `e.mover2`, `e.copy.mover` | directional | 3 |
//!
//! The last two are re-skinned movers kept for level data that names them.

pub mod destroying;
pub mod movement;
pub mod utility;

use cellmech_grid::cell_type::{
    flip_none, CellTypeDescriptor, CellTypeId, CellTypeRegistry, UpdateCategory,
};
use cellmech_grid::GridError;

pub use utility::{note_for_row, NOTE_NAMES};

/// Handles of the standard types within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardCells {
    pub push: CellTypeId,
    pub wall: CellTypeId,
    pub slide: CellTypeId,
    pub mover: CellTypeId,
    pub generator: CellTypeId,
    pub rotator_cw: CellTypeId,
    pub rotator_ccw: CellTypeId,
    pub redirector: CellTypeId,
    pub trash: CellTypeId,
    pub enemy: CellTypeId,
    pub drill: CellTypeId,
    pub nuke: CellTypeId,
    pub cat: CellTypeId,
    pub orientator: CellTypeId,
    pub disabler: CellTypeId,
    pub note: CellTypeId,
    pub mover2: CellTypeId,
    pub mover_copy: CellTypeId,
}

/// Register the standard catalogue in `types`.
///
/// # Errors
///
/// Returns [`GridError::DuplicateCellType`] if any standard id is already
/// taken, e.g. when called twice on the same registry.
pub fn register_standard(types: &mut CellTypeRegistry) -> Result<StandardCells, GridError> {
    use UpdateCategory::{Directional, Random};

    let cells = StandardCells {
        push: types.create(
            CellTypeDescriptor::new("core.push", movement::PUSH)
                .named("Push", "Moves in any direction when pushed.")
                .with_flip(flip_none),
        )?,
        wall: types.create(
            CellTypeDescriptor::new("core.wall", movement::WALL)
                .named("Wall", "Cannot be moved.")
                .with_flip(flip_none),
        )?,
        slide: types.create(
            CellTypeDescriptor::new("core.slide", movement::SLIDE)
                .named("Slide", "Moves only along the axis it faces."),
        )?,
        mover: types.create(
            CellTypeDescriptor::new("core.mover", movement::MOVER)
                .named("Mover", "Moves forward one cell every tick, pushing what is in the way.")
                .scheduled(Directional, 3.0),
        )?,
        generator: types.create(
            CellTypeDescriptor::new("core.generator", movement::GENERATOR)
                .named("Generator", "Copies the cell behind it to the cell in front of it.")
                .scheduled(Directional, 1.0),
        )?,
        rotator_cw: types.create(
            CellTypeDescriptor::new("core.rotator_cw", movement::ROTATOR_CW)
                .named("Rotator CW", "Turns its neighbours clockwise.")
                .scheduled(Random, 2.0)
                .with_flip(flip_none),
        )?,
        rotator_ccw: types.create(
            CellTypeDescriptor::new("core.rotator_ccw", movement::ROTATOR_CCW)
                .named("Rotator CCW", "Turns its neighbours counter-clockwise.")
                .scheduled(Random, 2.0)
                .with_flip(flip_none),
        )?,
        redirector: types.create(
            CellTypeDescriptor::new("core.redirector", movement::REDIRECTOR)
                .named("Redirector", "Bends force passing through it toward its facing."),
        )?,
        trash: types.create(
            CellTypeDescriptor::new("core.trash", destroying::TRASH)
                .named("Trash", "Deletes any cell pushed into it.")
                .with_flip(flip_none),
        )?,
        enemy: types.create(
            CellTypeDescriptor::new("core.enemy", destroying::ENEMY)
                .named("Enemy", "Deletes itself and any cell pushed into it.")
                .with_flip(flip_none),
        )?,
        drill: types.create(
            CellTypeDescriptor::new("destroying.drill", destroying::DRILL)
                .named("Drill", "Moves forward one cell and deletes all cells in the way.")
                .scheduled(Directional, 3.0),
        )?,
        nuke: types.create(
            CellTypeDescriptor::new("destroying.nuke", destroying::NUKE)
                .named("Nuke", "Clears the grid when pushed.")
                .texture("supernuke")
                .with_flip(flip_none),
        )?,
        cat: types.create(
            CellTypeDescriptor::new("destroying.cat", destroying::CAT)
                .named("Cat", "Drills one cell in a random direction every tick.")
                .scheduled(Directional, 3.0),
        )?,
        orientator: types.create(
            CellTypeDescriptor::new("utils.orientator", utility::ORIENTATOR)
                .named("Orientator", "Turns its neighbours to its own facing.")
                .scheduled(Directional, 2.5),
        )?,
        disabler: types.create(
            CellTypeDescriptor::new("utils.disabler", utility::DISABLER)
                .named("Disabler", "Stops its neighbours from acting this tick.")
                .scheduled(Random, 0.0)
                .with_flip(flip_none),
        )?,
        note: types.create(
            CellTypeDescriptor::new("utils.note", utility::NOTE)
                .named("Note", "Plays the note of its row when pushed.")
                .with_flip(flip_none),
        )?,
        mover2: types.create(
            CellTypeDescriptor::new("e.mover2", movement::MOVER)
                .named("Mover 2", "Moves forward and pushes all cells in the way.")
                .texture("mover2")
                .scheduled(Directional, 3.0),
        )?,
        mover_copy: types.create(
            CellTypeDescriptor::new("e.copy.mover", movement::MOVER)
                .named("Mover Copy", "Same as mover but with a green texture.")
                .texture("movergreen")
                .scheduled(Directional, 3.0),
        )?,
    };

    tracing::debug!(types = types.len(), "registered standard cells");
    Ok(cells)
}
