//! Cells that delete other cells.

use cellmech_grid::cell::{Cell, CellId, PushResult};
use cellmech_grid::cell_type::Behavior;
use cellmech_grid::geometry::Direction;
use cellmech_grid::grid::Grid;

/// Swallows anything pushed into it.
pub const TRASH: Behavior = Behavior {
    push: swallow,
    ..Behavior::named("trash")
};

/// Dies together with whatever pushes into it.
pub const ENEMY: Behavior = Behavior {
    push: enemy_push,
    ..Behavior::named("enemy")
};

/// Deletes the cell in front of it, then steps forward. Unless disabled it
/// also swallows anything pushed into it.
pub const DRILL: Behavior = Behavior {
    update: drill_update,
    push: drill_push,
    ..Behavior::named("drill")
};

/// Clears the whole grid when pushed.
pub const NUKE: Behavior = Behavior {
    push: nuke_push,
    ..Behavior::named("nuke")
};

/// A drill that picks a new random facing every tick.
pub const CAT: Behavior = Behavior {
    update: cat_update,
    push: drill_push,
    ..Behavior::named("cat")
};

fn swallow(_grid: &mut Grid, _id: CellId, _dir: Direction, _bias: i32) -> PushResult {
    PushResult::Destroyed
}

fn enemy_push(grid: &mut Grid, id: CellId, _dir: Direction, _bias: i32) -> PushResult {
    grid.remove(id);
    PushResult::Destroyed
}

fn drill_forward(grid: &mut Grid, id: CellId, facing: Direction) {
    let Some(pos) = grid.cell(id).map(Cell::position) else {
        return;
    };
    if let Some(victim) = grid.cell_id_at(pos.moved(facing)) {
        grid.remove(victim);
    }
    grid.push_base(id, facing, 1);
}

fn drill_update(grid: &mut Grid, id: CellId) {
    if let Some(facing) = grid.cell(id).map(Cell::direction) {
        drill_forward(grid, id, facing);
    }
}

fn drill_push(grid: &mut Grid, id: CellId, dir: Direction, bias: i32) -> PushResult {
    if grid.is_disabled(id) {
        return grid.push_base(id, dir, bias);
    }
    PushResult::Destroyed
}

fn nuke_push(grid: &mut Grid, id: CellId, dir: Direction, bias: i32) -> PushResult {
    if grid.is_disabled(id) {
        return grid.push_base(id, dir, bias);
    }
    let size = grid.size();
    tracing::debug!(nuke = %id, "nuke triggered");
    grid.clear(size);
    PushResult::Destroyed
}

fn cat_update(grid: &mut Grid, id: CellId) {
    let facing = grid.random_direction();
    grid.set_rotation(id, facing);
    drill_forward(grid, id, facing);
}
