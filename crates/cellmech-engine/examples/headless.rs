//! Headless run of a small level, printing tick-end events and state hashes.
//!
//! Run with:
//!   cargo run --example headless -p cellmech-engine -- [ticks] [config.json]
//!
//! Set `RUST_LOG=cellmech_engine=debug` to see per-tick logging.

use std::sync::Arc;

use anyhow::Context;
use cellmech_engine::prelude::*;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

fn level() -> Vec<PlacedCell> {
    vec![
        // A generator feeding pushes toward a note column.
        PlacedCell::new(Position::new(0, 3), "core.push", Direction::Right),
        PlacedCell::new(Position::new(1, 3), "core.generator", Direction::Right),
        PlacedCell::new(Position::new(9, 3), "utils.note", Direction::Right),
        // A mover bent upward by a redirector into a trash.
        PlacedCell::new(Position::new(2, 6), "core.mover", Direction::Right),
        PlacedCell::new(Position::new(5, 6), "core.redirector", Direction::Up),
        PlacedCell::new(Position::new(5, 9), "core.trash", Direction::Right),
        // A cat wandering the bottom rows, fenced in by walls.
        PlacedCell::new(Position::new(4, 0), "destroying.cat", Direction::Up),
        PlacedCell::new(Position::new(0, 1), "core.wall", Direction::Right),
        PlacedCell::new(Position::new(9, 1), "core.wall", Direction::Right),
        // A rotator spinning a mover in place.
        PlacedCell::new(Position::new(7, 8), "core.rotator_cw", Direction::Right),
        PlacedCell::new(Position::new(8, 8), "core.mover", Direction::Up),
    ]
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let ticks: u64 = match args.next() {
        Some(arg) => arg.parse().context("tick count must be a number")?,
        None => 20,
    };
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            SimulationConfig::from_json(&json)?
        }
        None => SimulationConfig::default(),
    };

    let mut types = CellTypeRegistry::new();
    register_standard(&mut types)?;
    let types = Arc::new(types);

    let mut grid = Grid::new(Size::new(10, 10), Arc::clone(&types));
    grid.set_name("headless demo");
    grid.import(&level())?;

    let schedule = UpdateSchedule::from_registry(&types);
    let mut tick_loop = TickLoop::new(grid, schedule, config);
    tick_loop.on_tick_end("events", |report, _grid| {
        for event in &report.events {
            match event {
                GridEvent::Note { position, note } => {
                    println!("tick {:>3}: note {note} at {position}", report.tick);
                }
                GridEvent::Cleared { size } => {
                    println!("tick {:>3}: grid cleared ({}x{})", report.tick, size.width, size.height);
                }
            }
        }
    });

    let loaded = tick_loop.state_hash();
    println!("loaded   {loaded}");

    for _ in 0..ticks {
        let report = tick_loop.tick();
        println!(
            "tick {:>3}: {:>2} updates, {:>3} cells, {:?}",
            report.tick,
            report.updates,
            report.live_cells,
            tick_loop.last_diagnostics().total_time
        );
    }
    println!(
        "after {} ticks ({} ms simulated): {}",
        tick_loop.tick_count(),
        tick_loop.sim_time_ms(),
        tick_loop.state_hash()
    );

    tick_loop.reset();
    anyhow::ensure!(
        tick_loop.state_hash() == loaded,
        "reset did not restore the loaded level"
    );
    println!("reset    {loaded}");
    Ok(())
}
