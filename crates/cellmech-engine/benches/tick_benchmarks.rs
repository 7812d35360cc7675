//! Tick throughput benchmarks.
//!
//! Measures a full tick (schedule walk, push chains, event drain) over
//! levels of increasing density, plus the cost of hashing a snapshot of the
//! same levels.
//!
//! Run with: `cargo bench --bench tick_benchmarks`

use std::sync::Arc;

use cellmech_engine::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A `side` x `side` level with a column of rotators every eighth column,
/// movers facing every direction between them and walls around the edge.
fn busy_level(side: i32) -> TickLoop {
    let mut types = CellTypeRegistry::new();
    let k = register_standard(&mut types).unwrap();
    let types = Arc::new(types);
    let mut grid = Grid::new(Size::new(side as u32, side as u32), Arc::clone(&types));

    for x in 0..side {
        for y in 0..side {
            let edge = x == 0 || y == 0 || x == side - 1 || y == side - 1;
            let (kind, dir) = if edge {
                (k.wall, Direction::Right)
            } else if x % 8 == 4 && y % 2 == 0 {
                (k.rotator_cw, Direction::Right)
            } else if (x + y) % 3 == 0 {
                let dir = Direction::try_from(((x * 7 + y) % 4) as u8).unwrap();
                (k.mover, dir)
            } else {
                continue;
            };
            grid.load_cell(Position::new(x, y), kind, dir).unwrap();
        }
    }

    TickLoop::new(
        grid,
        UpdateSchedule::from_registry(&types),
        SimulationConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for side in [16, 64, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            let mut tick_loop = busy_level(side);
            b.iter(|| black_box(tick_loop.tick()));
        });
    }
    group.finish();
}

fn bench_state_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_hash");
    for side in [16, 64] {
        let tick_loop = busy_level(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &tick_loop, |b, tl| {
            b.iter(|| black_box(tl.state_hash()));
        });
    }
    group.finish();
}

fn bench_reset(c: &mut Criterion) {
    let mut tick_loop = busy_level(64);
    tick_loop.run_ticks(20);
    c.bench_function("reset_64", |b| {
        b.iter(|| {
            tick_loop.reset();
            tick_loop.tick();
        });
    });
}

criterion_group!(benches, bench_tick, bench_state_hash, bench_reset);
criterion_main!(benches);
