//! Standard cells interacting over full ticks.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cellmech_engine::prelude::*;

// -- helpers ----------------------------------------------------------------

fn level(size: Size) -> (Grid, StandardCells) {
    let mut types = CellTypeRegistry::new();
    let cells = register_standard(&mut types).unwrap();
    (Grid::new(size, Arc::new(types)), cells)
}

fn run(grid: Grid) -> TickLoop {
    let schedule = UpdateSchedule::from_registry(grid.types());
    TickLoop::new(grid, schedule, SimulationConfig::default())
}

fn cell(tick_loop: &TickLoop, id: CellId) -> &Cell {
    tick_loop.grid().cell(id).unwrap()
}

// -- generator ----------------------------------------------------------------

#[test]
fn generated_copies_wait_a_tick_before_acting() {
    let (mut grid, k) = level(Size::new(4, 2));
    let mover = grid
        .load_cell(Position::new(0, 0), k.mover, Direction::Up)
        .unwrap();
    grid.load_cell(Position::new(1, 0), k.generator, Direction::Right)
        .unwrap();

    let mut tick_loop = run(grid);
    tick_loop.tick();
    let copy = tick_loop.grid().get(Position::new(2, 0)).unwrap();
    assert!(copy.is_generated());
    assert_eq!(copy.kind(), k.mover);
    let copy = copy.id();
    assert_eq!(cell(&tick_loop, mover).position(), Position::new(0, 1));

    tick_loop.tick();
    assert_eq!(cell(&tick_loop, copy).position(), Position::new(2, 1));
    // Nothing behind the generator any more.
    assert_eq!(tick_loop.grid().live_count(), 3);
}

// -- redirect -----------------------------------------------------------------

#[test]
fn redirected_mover_turns_and_pushes_along_new_heading() {
    let (mut grid, k) = level(Size::new(3, 4));
    let mover = grid
        .load_cell(Position::new(0, 1), k.mover, Direction::Right)
        .unwrap();
    let redirector = grid
        .load_cell(Position::new(1, 1), k.redirector, Direction::Up)
        .unwrap();
    let block = grid
        .load_cell(Position::new(1, 2), k.push, Direction::Right)
        .unwrap();

    let mut tick_loop = run(grid);
    let report = tick_loop.tick();
    assert_eq!(report.updates, 1);

    let m = cell(&tick_loop, mover);
    assert_eq!(m.position(), Position::new(1, 2));
    assert_eq!(m.direction(), Direction::Up);
    assert_eq!(m.rotation_offset(), -1);
    assert_eq!(m.old_position(), Position::new(0, 1));

    let b = cell(&tick_loop, block);
    assert_eq!(b.position(), Position::new(1, 3));
    assert_eq!(b.direction(), Direction::Right);
    assert_eq!(b.rotation_offset(), 0);

    assert_eq!(cell(&tick_loop, redirector).position(), Position::new(1, 1));
}

#[test]
fn reskinned_movers_push_like_the_mover() {
    let (mut grid, k) = level(Size::new(6, 2));
    let green = grid
        .load_cell(Position::new(0, 0), k.mover_copy, Direction::Right)
        .unwrap();
    let block = grid
        .load_cell(Position::new(1, 0), k.push, Direction::Right)
        .unwrap();
    let second = grid
        .load_cell(Position::new(5, 1), k.mover2, Direction::Left)
        .unwrap();

    let mut tick_loop = run(grid);
    let report = tick_loop.tick();
    assert_eq!(report.updates, 2);
    assert_eq!(cell(&tick_loop, green).position(), Position::new(1, 0));
    assert_eq!(cell(&tick_loop, block).position(), Position::new(2, 0));
    assert_eq!(cell(&tick_loop, second).position(), Position::new(4, 1));
}

// -- ordering between types ---------------------------------------------------

#[test]
fn disabler_holds_a_mover_in_place() {
    let (mut grid, k) = level(Size::new(3, 3));
    let disabler = grid
        .load_cell(Position::new(1, 1), k.disabler, Direction::Right)
        .unwrap();
    let mover = grid
        .load_cell(Position::new(0, 1), k.mover, Direction::Up)
        .unwrap();

    let mut tick_loop = run(grid);
    tick_loop.run_ticks(3);
    assert_eq!(cell(&tick_loop, mover).position(), Position::new(0, 1));

    let pos = cell(&tick_loop, disabler).position();
    assert!(tick_loop.grid_mut().delete_cell(pos));
    tick_loop.tick();
    assert_eq!(cell(&tick_loop, mover).position(), Position::new(0, 2));
}

#[test]
fn rotator_turns_a_mover_before_it_moves() {
    let (mut grid, k) = level(Size::new(4, 3));
    grid.load_cell(Position::new(1, 1), k.rotator_cw, Direction::Right)
        .unwrap();
    let mover = grid
        .load_cell(Position::new(2, 1), k.mover, Direction::Up)
        .unwrap();

    let mut tick_loop = run(grid);
    tick_loop.tick();
    let m = cell(&tick_loop, mover);
    assert_eq!(m.direction(), Direction::Right);
    assert_eq!(m.rotation_offset(), 1);
    assert_eq!(m.old_position(), Position::new(2, 1));
    assert_eq!(m.position(), Position::new(3, 1));
}

#[test]
fn orientator_turns_a_mover_into_itself() {
    let (mut grid, k) = level(Size::new(3, 3));
    let orientator = grid
        .load_cell(Position::new(1, 1), k.orientator, Direction::Down)
        .unwrap();
    let mover = grid
        .load_cell(Position::new(1, 2), k.mover, Direction::Up)
        .unwrap();

    let mut tick_loop = run(grid);
    tick_loop.tick();
    let m = cell(&tick_loop, mover);
    assert_eq!(m.direction(), Direction::Down);
    assert_eq!(m.position(), Position::new(1, 1));
    let o = cell(&tick_loop, orientator);
    assert_eq!(o.position(), Position::new(1, 0));
    assert_eq!(o.direction(), Direction::Down);
}

// -- tick-end events ------------------------------------------------------------

#[test]
fn struck_note_reaches_listeners_at_tick_end() {
    let (mut grid, k) = level(Size::new(4, 1));
    let mover = grid
        .load_cell(Position::new(0, 0), k.mover, Direction::Right)
        .unwrap();
    grid.load_cell(Position::new(2, 0), k.note, Direction::Right)
        .unwrap();

    let mut tick_loop = run(grid);
    let heard = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&heard);
    tick_loop.on_tick_end("audio", move |report, _grid| {
        for event in &report.events {
            if let GridEvent::Note { note, .. } = event {
                sink.borrow_mut().push((report.tick, note.clone()));
            }
        }
    });

    assert!(tick_loop.tick().events.is_empty());
    let report = tick_loop.tick();
    assert_eq!(
        report.events,
        vec![GridEvent::Note {
            position: Position::new(2, 0),
            note: "c0".to_owned()
        }]
    );
    assert!(!tick_loop.grid().is_live(mover));
    assert_eq!(*heard.borrow(), vec![(1, "c0".to_owned())]);
}

#[test]
fn pushed_nuke_clears_the_grid() {
    let (mut grid, k) = level(Size::new(4, 1));
    grid.load_cell(Position::new(0, 0), k.mover, Direction::Right)
        .unwrap();
    grid.load_cell(Position::new(1, 0), k.nuke, Direction::Right)
        .unwrap();
    grid.load_cell(Position::new(3, 0), k.wall, Direction::Right)
        .unwrap();

    let mut tick_loop = run(grid);
    let report = tick_loop.tick();
    assert_eq!(report.live_cells, 0);
    assert_eq!(
        report.events,
        vec![GridEvent::Cleared {
            size: Size::new(4, 1)
        }]
    );
    tick_loop.grid().check_integrity().unwrap();
}

// -- level import -------------------------------------------------------------

fn load_level(grid: &mut Grid, entries: &[PlacedCell]) -> Result<usize, EngineError> {
    let ids = grid.import(entries)?;
    Ok(ids.len())
}

#[test]
fn unknown_type_in_level_data_is_rejected() {
    let (mut grid, _) = level(Size::new(3, 3));
    let err = load_level(
        &mut grid,
        &[
            PlacedCell::new(Position::new(0, 0), "core.mover", Direction::Right),
            PlacedCell::new(Position::new(1, 0), "core.teleporter", Direction::Right),
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Grid(GridError::UnknownCellType { ref id }) if id == "core.teleporter"
    ));
    assert_eq!(grid.live_count(), 0);

    let loaded = load_level(
        &mut grid,
        &[PlacedCell::new(Position::new(0, 0), "core.mover", Direction::Right)],
    )
    .unwrap();
    assert_eq!(loaded, 1);
}
