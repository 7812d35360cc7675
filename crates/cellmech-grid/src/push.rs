//! The push protocol: moving a cell one step and, transitively, everything
//! standing in its way.
//!
//! [`Grid::push`] dispatches to the pushed cell's [`Behavior`] so types can
//! adjust bias, refuse, or destroy. [`Grid::push_base`] is the default
//! physics every override eventually defers to:
//!
//! 1. A bias below 1 is blocked outright.
//! 2. The landing spot is resolved by [`Grid::cell_to`]; redirecting cells
//!    may bend it. Off-grid is blocked.
//! 3. An empty landing spot is taken. An occupied one is pushed first with
//!    the same bias: `Moved` lets the pusher follow, `Destroyed` removes the
//!    pusher (and still reports `Moved` to its caller), `Blocked` blocks the
//!    whole chain.
//!
//! A cell whose force was bent on the way turns by the same amount.
//!
//! [`Behavior`]: crate::cell_type::Behavior

use crate::cell::{CellId, Movement, PushResult};
use crate::geometry::{Direction, Position};
use crate::grid::Grid;

impl Grid {
    /// Push `id` toward `dir` with force `bias`, through its type's behavior.
    ///
    /// # Limits
    ///
    /// Each cell in a chain nests one more `push` call. A chain longer than
    /// [`PushLimits::max_push_depth`] (512 cells by default) resolves as
    /// [`PushResult::Blocked`] and leaves every cell where it was. Levels
    /// with longer straight chains need a higher limit via
    /// [`Grid::set_push_limits`], and a thread stack to match.
    ///
    /// [`PushLimits::max_push_depth`]: crate::grid::PushLimits::max_push_depth
    pub fn push(&mut self, id: CellId, dir: Direction, bias: i32) -> PushResult {
        let Some(cell) = self.cell(id) else {
            return PushResult::Blocked;
        };
        if cell.is_deleted() {
            return PushResult::Blocked;
        }
        let behavior = self.behavior_of(cell.kind());
        if self.push_depth >= self.limits.max_push_depth {
            tracing::warn!(
                cell = %id,
                depth = self.push_depth,
                "push chain exceeded the depth limit; treating as blocked"
            );
            return PushResult::Blocked;
        }

        self.push_depth += 1;
        let result = (behavior.push)(self, id, dir, bias);
        self.push_depth -= 1;

        tracing::trace!(cell = %id, ?dir, bias, ?result, behavior = behavior.name, "push");
        result
    }

    /// The default push physics, ignoring the cell's own behavior.
    pub fn push_base(&mut self, id: CellId, dir: Direction, bias: i32) -> PushResult {
        if bias < 1 {
            return PushResult::Blocked;
        }
        let Some(target) = self.cell_to(id, dir) else {
            return PushResult::Blocked;
        };

        match self.cell_id_at(target.position) {
            None => {}
            // Force looped back onto the pusher.
            Some(occupant) if occupant == id => return PushResult::Blocked,
            Some(occupant) => match self.push(occupant, target.direction, bias) {
                PushResult::Moved => {}
                PushResult::Destroyed => {
                    self.remove(id);
                    return PushResult::Moved;
                }
                PushResult::Blocked => return PushResult::Blocked,
            },
        }

        if !self.is_live(id) {
            return PushResult::Moved;
        }
        if let Some(holder) = self.cell_id_at(target.position) {
            if holder != id {
                tracing::warn!(
                    cell = %id,
                    holder = %holder,
                    position = %target.position,
                    "landing spot still occupied after the chain moved; blocking"
                );
                return PushResult::Blocked;
            }
        }

        self.set_position(id, target.position);
        if target.direction != dir {
            let delta = dir.signed_delta_to(target.direction);
            if let Some(cell) = self.live_cell_mut(id) {
                cell.turn(delta);
            }
        }
        PushResult::Moved
    }

    /// Where cell `id` would land moving one step toward `dir`, and the
    /// direction it would arrive with. `None` if the way is off-grid or
    /// otherwise unresolvable.
    pub fn cell_to(&self, id: CellId, dir: Direction) -> Option<Movement> {
        let cell = self.cell(id)?;
        self.resolve_from(cell.position(), dir, 0)
    }

    /// Resolve the landing spot for force leaving `origin` toward `dir`,
    /// asking the neighbouring occupant (if any) where the force goes.
    pub fn resolve_from(&self, origin: Position, dir: Direction, hops: u32) -> Option<Movement> {
        let pos = origin.moved(dir);
        if !self.in_bounds(pos) {
            return None;
        }
        match self.get(pos) {
            None => Some(Movement::new(pos, dir)),
            Some(cell) => {
                let behavior = self.behavior_of(cell.kind());
                (behavior.get_pos)(self, cell, dir, hops)
            }
        }
    }

    /// Continue resolving from a redirecting cell at `from`, now travelling
    /// toward `dir`. Counts one hop against the redirect limit.
    pub fn redirect_through(&self, from: Position, dir: Direction, hops: u32) -> Option<Movement> {
        if hops >= self.limits.max_redirect_hops {
            tracing::warn!(
                position = %from,
                hops,
                "redirect chain exceeded the hop limit; treating as blocked"
            );
            return None;
        }
        self.resolve_from(from, dir, hops + 1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
