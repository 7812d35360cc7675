//! Cells that move, make, turn or bend other cells.

use cellmech_grid::cell::{Cell, CellId, Movement, PushResult};
use cellmech_grid::cell_type::Behavior;
use cellmech_grid::geometry::Direction;
use cellmech_grid::grid::Grid;

/// Plain block: moves when pushed.
pub const PUSH: Behavior = Behavior::named("push");

/// Never moves.
pub const WALL: Behavior = Behavior {
    push: refuse,
    ..Behavior::named("wall")
};

/// Moves only along the axis it faces.
pub const SLIDE: Behavior = Behavior {
    push: slide_push,
    ..Behavior::named("slide")
};

/// Pushes forward every tick. Adds one to pushes along its facing and takes
/// one from pushes against it.
pub const MOVER: Behavior = Behavior {
    update: mover_update,
    push: mover_push,
    ..Behavior::named("mover")
};

/// Copies the cell behind it into the cell in front of it.
pub const GENERATOR: Behavior = Behavior {
    update: generator_update,
    ..Behavior::named("generator")
};

pub const ROTATOR_CW: Behavior = Behavior {
    update: rotate_neighbours_cw,
    ..Behavior::named("rotator_cw")
};

pub const ROTATOR_CCW: Behavior = Behavior {
    update: rotate_neighbours_ccw,
    ..Behavior::named("rotator_ccw")
};

/// Bends force passing through it toward its facing. Never moves.
pub const REDIRECTOR: Behavior = Behavior {
    push: refuse,
    get_pos: redirector_get_pos,
    ..Behavior::named("redirector")
};

pub(crate) fn refuse(_grid: &mut Grid, _id: CellId, _dir: Direction, _bias: i32) -> PushResult {
    PushResult::Blocked
}

fn slide_push(grid: &mut Grid, id: CellId, dir: Direction, bias: i32) -> PushResult {
    match grid.cell(id) {
        Some(cell) if cell.direction().is_parallel(dir) => grid.push_base(id, dir, bias),
        _ => PushResult::Blocked,
    }
}

fn mover_update(grid: &mut Grid, id: CellId) {
    if let Some(facing) = grid.cell(id).map(Cell::direction) {
        grid.push_base(id, facing, 1);
    }
}

fn mover_push(grid: &mut Grid, id: CellId, dir: Direction, bias: i32) -> PushResult {
    let Some(facing) = grid.cell(id).map(Cell::direction) else {
        return PushResult::Blocked;
    };
    if grid.is_disabled(id) {
        return grid.push_base(id, dir, bias);
    }
    let bias = if dir == facing {
        bias + 1
    } else if dir == facing.opposite() {
        bias - 1
    } else {
        bias
    };
    grid.push_base(id, dir, bias)
}

fn generator_update(grid: &mut Grid, id: CellId) {
    let Some(cell) = grid.cell(id) else {
        return;
    };
    let (pos, facing) = (cell.position(), cell.direction());
    let Some(source) = grid.get(pos.moved(facing.opposite())).map(Cell::data) else {
        return;
    };
    let front = pos.moved(facing);
    if !grid.in_bounds(front) {
        return;
    }

    if let Some(occupant) = grid.cell_id_at(front) {
        // A destroyed occupant takes the copy with it.
        if grid.push(occupant, facing, 1) != PushResult::Moved {
            return;
        }
        if grid.cell_id_at(front).is_some() {
            return;
        }
    }

    match grid.spawn(front, source.kind, source.direction, true) {
        // Copies act from the next tick on.
        Ok(copy) => grid.mark_updated(copy),
        Err(err) => tracing::warn!(generator = %id, %err, "generator could not place copy"),
    }
}

fn rotate_neighbours(grid: &mut Grid, id: CellId, quarter_turns: i32) {
    let Some(pos) = grid.cell(id).map(Cell::position) else {
        return;
    };
    for neighbour in pos.neighbours() {
        if let Some(other) = grid.cell_id_at(neighbour) {
            grid.rotate(other, quarter_turns);
        }
    }
}

fn rotate_neighbours_cw(grid: &mut Grid, id: CellId) {
    rotate_neighbours(grid, id, 1);
}

fn rotate_neighbours_ccw(grid: &mut Grid, id: CellId) {
    rotate_neighbours(grid, id, -1);
}

fn redirector_get_pos(grid: &Grid, cell: &Cell, dir: Direction, hops: u32) -> Option<Movement> {
    let facing = cell.direction();
    // Force driven into its front face has nowhere to go.
    if dir == facing.opposite() {
        return None;
    }
    grid.redirect_through(cell.position(), facing, hops)
}
