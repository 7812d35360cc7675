//! Property tests for grid operations.
//!
//! Random sequences of spawns, pushes, removals and resets must never leave
//! the occupancy map pointing at the wrong cell, and a reset must always
//! restore the placed layout.

use std::collections::HashSet;
use std::sync::Arc;

use cellmech_grid::prelude::*;
use proptest::prelude::*;

const W: i32 = 6;
const H: i32 = 6;

fn refuse(_grid: &mut Grid, _id: CellId, _dir: Direction, _bias: i32) -> PushResult {
    PushResult::Blocked
}

fn swallow(_grid: &mut Grid, _id: CellId, _dir: Direction, _bias: i32) -> PushResult {
    PushResult::Destroyed
}

struct Kinds {
    block: CellTypeId,
    wall: CellTypeId,
    trash: CellTypeId,
}

fn setup() -> (Grid, Kinds) {
    let mut types = CellTypeRegistry::new();
    let kinds = Kinds {
        block: types
            .create(CellTypeDescriptor::new("test.block", Behavior::BASE))
            .unwrap(),
        wall: types
            .create(CellTypeDescriptor::new(
                "test.wall",
                Behavior {
                    push: refuse,
                    ..Behavior::named("wall")
                },
            ))
            .unwrap(),
        trash: types
            .create(CellTypeDescriptor::new(
                "test.trash",
                Behavior {
                    push: swallow,
                    ..Behavior::named("trash")
                },
            ))
            .unwrap(),
    };
    (Grid::new(Size::new(W as u32, H as u32), Arc::new(types)), kinds)
}

/// Operations we can perform on the grid.
#[derive(Debug, Clone)]
enum GridOp {
    Spawn(i32, i32, u8, u8),
    Push(usize, u8, i32),
    Remove(usize),
    Rotate(usize, i32),
    BeginTick,
    FinishTick,
    Reset,
}

fn direction() -> impl Strategy<Value = u8> {
    0u8..4
}

fn grid_op_strategy() -> impl Strategy<Value = GridOp> {
    prop_oneof![
        (0..W, 0..H, direction(), 0u8..3).prop_map(|(x, y, d, k)| GridOp::Spawn(x, y, d, k)),
        (0..64usize, direction(), -1..4i32).prop_map(|(i, d, b)| GridOp::Push(i, d, b)),
        (0..64usize).prop_map(GridOp::Remove),
        (0..64usize, -3..4i32).prop_map(|(i, n)| GridOp::Rotate(i, n)),
        Just(GridOp::BeginTick),
        Just(GridOp::FinishTick),
        Just(GridOp::Reset),
    ]
}

fn assert_unique_positions(grid: &Grid) {
    let mut seen = HashSet::new();
    for cell in grid.live_cells() {
        assert!(
            seen.insert(cell.position()),
            "two live cells at {}",
            cell.position()
        );
    }
    assert_eq!(seen.len(), grid.live_count());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_keep_map_consistent(ops in prop::collection::vec(grid_op_strategy(), 1..60)) {
        let (mut grid, kinds) = setup();
        let mut ids: Vec<CellId> = Vec::new();

        for op in ops {
            match op {
                GridOp::Spawn(x, y, d, k) => {
                    let kind = [kinds.block, kinds.wall, kinds.trash][k as usize];
                    let dir = Direction::try_from(d).unwrap();
                    let generated = !grid.is_initial();
                    if let Ok(id) = grid.spawn(Position::new(x, y), kind, dir, generated) {
                        ids.push(id);
                    }
                }
                GridOp::Push(i, d, bias) => {
                    if let Some(&id) = ids.get(i % ids.len().max(1)) {
                        let before = grid.live_count();
                        let result = grid.push(id, Direction::try_from(d).unwrap(), bias);
                        if bias < 1 {
                            prop_assert_ne!(result, PushResult::Moved);
                            prop_assert_eq!(grid.live_count(), before);
                        }
                        prop_assert!(grid.live_count() <= before);
                    }
                }
                GridOp::Remove(i) => {
                    if let Some(&id) = ids.get(i % ids.len().max(1)) {
                        grid.remove(id);
                        grid.remove(id);
                        prop_assert!(!grid.is_live(id));
                    }
                }
                GridOp::Rotate(i, n) => {
                    if let Some(&id) = ids.get(i % ids.len().max(1)) {
                        grid.rotate(id, n);
                    }
                }
                GridOp::BeginTick => grid.begin_tick(),
                GridOp::FinishTick => {
                    grid.finish_tick();
                }
                GridOp::Reset => {
                    grid.reset();
                    prop_assert_eq!(grid.tick_count(), 0);
                    prop_assert!(grid.live_cells().all(|c| !c.is_generated()));
                }
            }
            prop_assert!(grid.check_integrity().is_ok());
            assert_unique_positions(&grid);
        }
    }

    #[test]
    fn reset_restores_placed_layout(
        layout in prop::collection::btree_map((0..W, 0..H), direction(), 1..12),
        pushes in prop::collection::vec((0..12usize, direction(), 1..3i32), 0..40),
        spawns in prop::collection::vec((0..W, 0..H), 0..10),
    ) {
        let (mut grid, kinds) = setup();
        let mut placed = Vec::new();
        for (&(x, y), &d) in &layout {
            let pos = Position::new(x, y);
            let dir = Direction::try_from(d).unwrap();
            let id = grid.load_cell(pos, kinds.block, dir).unwrap();
            placed.push((id, pos, dir));
        }

        grid.begin_tick();
        for (x, y) in spawns {
            let _ = grid.spawn(Position::new(x, y), kinds.trash, Direction::Up, true);
        }
        for (i, d, bias) in pushes {
            let (id, _, _) = placed[i % placed.len()];
            grid.push(id, Direction::try_from(d).unwrap(), bias);
        }
        grid.finish_tick();

        grid.reset();
        prop_assert!(grid.is_initial());
        prop_assert_eq!(grid.live_count(), placed.len());
        for (id, pos, dir) in placed {
            let cell = grid.cell(id).unwrap();
            prop_assert!(!cell.is_deleted());
            prop_assert_eq!(cell.position(), pos);
            prop_assert_eq!(cell.direction(), dir);
            prop_assert_eq!(cell.updated_in(), None);
            prop_assert_eq!(cell.disabled_in(), None);
        }
        prop_assert!(grid.check_integrity().is_ok());
    }
}
