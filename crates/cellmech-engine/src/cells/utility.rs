//! Cells that act on their neighbours' state rather than their position.

use cellmech_grid::cell::{Cell, CellId, PushResult};
use cellmech_grid::cell_type::Behavior;
use cellmech_grid::geometry::Direction;
use cellmech_grid::grid::{Grid, GridEvent};

/// Note names struck by note cells, selected by row.
pub const NOTE_NAMES: [&str; 22] = [
    "c0", "d0", "e0", "f0", "g0", "a0", "b0", //
    "c1", "d1", "e1", "f1", "g1", "a1", "b1", //
    "c2", "d2", "e2", "f2", "g2", "a2", "b2", //
    "c3",
];

/// Turns its four neighbours to its own facing. Cannot itself be turned.
pub const ORIENTATOR: Behavior = Behavior {
    update: orientator_update,
    rotatable: false,
    ..Behavior::named("orientator")
};

/// Disables its four neighbours for the rest of the tick. Cannot itself be
/// disabled.
pub const DISABLER: Behavior = Behavior {
    update: disabler_update,
    disableable: false,
    ..Behavior::named("disabler")
};

/// Strikes a note when pushed, swallowing the pusher.
pub const NOTE: Behavior = Behavior {
    push: note_push,
    ..Behavior::named("note")
};

/// The note struck by a note cell on row `y`.
pub fn note_for_row(y: i32) -> &'static str {
    NOTE_NAMES[y.rem_euclid(NOTE_NAMES.len() as i32) as usize]
}

fn neighbour_ids(grid: &Grid, id: CellId) -> Vec<CellId> {
    grid.cell(id)
        .map(|cell| {
            cell.position()
                .neighbours()
                .into_iter()
                .filter_map(|pos| grid.cell_id_at(pos))
                .collect()
        })
        .unwrap_or_default()
}

fn orientator_update(grid: &mut Grid, id: CellId) {
    let Some(facing) = grid.cell(id).map(Cell::direction) else {
        return;
    };
    for other in neighbour_ids(grid, id) {
        grid.set_rotation(other, facing);
    }
}

fn disabler_update(grid: &mut Grid, id: CellId) {
    for other in neighbour_ids(grid, id) {
        grid.disable(other);
    }
}

fn note_push(grid: &mut Grid, id: CellId, _dir: Direction, _bias: i32) -> PushResult {
    let Some(position) = grid.cell(id).map(Cell::position) else {
        return PushResult::Blocked;
    };
    let note = note_for_row(position.y);
    // A note sounds at most once per tick.
    let already_struck = grid
        .pending_events()
        .iter()
        .any(|event| matches!(event, GridEvent::Note { note: n, .. } if n == note));
    if !already_struck {
        grid.emit(GridEvent::Note {
            position,
            note: note.to_owned(),
        });
    }
    PushResult::Destroyed
}
