//! The tick loop driving a grid.
//!
//! The [`TickLoop`] owns one [`Grid`] and the [`UpdateSchedule`] built for
//! its registry. Each tick:
//!
//! 1. The grid records every cell's starting position and leaves editing
//!    mode.
//! 2. Every schedule entry runs in order, timed individually.
//! 3. The grid's tick counter advances and the events raised during the
//!    tick are collected into a [`TickReport`].
//! 4. Tick-end listeners receive the report and a read-only view of the
//!    grid.
//!
//! Schedule order is fixed, snapshots make dispatch independent of mutation
//! order within a pass, and the only randomness comes from the grid's seeded
//! generator, so the same level, registry and config always produce the same
//! sequence of states.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cellmech_engine::prelude::*;
//!
//! let mut types = CellTypeRegistry::new();
//! let std_cells = register_standard(&mut types).unwrap();
//! let types = Arc::new(types);
//!
//! let mut grid = Grid::new(Size::new(4, 4), Arc::clone(&types));
//! grid.load_cell(Position::new(0, 0), std_cells.mover, Direction::Up).unwrap();
//!
//! let config = SimulationConfig { tick_interval_ms: 100, ..Default::default() };
//! let mut tick_loop = TickLoop::new(grid, UpdateSchedule::from_registry(&types), config);
//! tick_loop.on_tick_end("log", |report, _grid| {
//!     assert!(report.live_cells > 0);
//! });
//!
//! tick_loop.run_ticks(2);
//! assert_eq!(tick_loop.tick_count(), 2);
//! assert_eq!(tick_loop.sim_time_ms(), 200);
//! ```

use std::time::{Duration, Instant};

use cellmech_grid::grid::{Grid, GridEvent, PushLimits, DEFAULT_SEED};
use serde::{Deserialize, Serialize};

use crate::schedule::UpdateSchedule;
use crate::EngineError;

// ---------------------------------------------------------------------------
// SimulationConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`TickLoop`].
///
/// Missing fields take their default when parsed from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock length of one tick for a front end pacing the loop. The
    /// loop itself never sleeps. Must be positive.
    pub tick_interval_ms: u64,
    /// Seed for the grid's random stream, reapplied on every reset.
    pub seed: u64,
    /// Maximum nesting of pushes in one chain. Must be positive.
    pub max_push_depth: u32,
    /// Maximum redirects followed while resolving one landing spot. Must be
    /// positive.
    pub max_redirect_hops: u32,
}

impl Default for SimulationConfig {
    /// Defaults to 200 ms ticks and the grid's default seed and push limits.
    fn default() -> Self {
        let limits = PushLimits::default();
        Self {
            tick_interval_ms: 200,
            seed: DEFAULT_SEED,
            max_push_depth: limits.max_push_depth,
            max_redirect_hops: limits.max_redirect_hops,
        }
    }
}

impl SimulationConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the document is malformed or
    /// a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn push_limits(&self) -> PushLimits {
        PushLimits {
            max_push_depth: self.max_push_depth,
            max_redirect_hops: self.max_redirect_hops,
        }
    }
}

// ---------------------------------------------------------------------------
// TickReport / TickDiagnostics
// ---------------------------------------------------------------------------

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number that just ran (the counter value before it advanced).
    pub tick: u64,
    /// Events raised during the tick, in the order they were raised.
    pub events: Vec<GridEvent>,
    /// Number of cell updates that ran.
    pub updates: usize,
    /// Cells on the grid once the tick ended.
    pub live_cells: usize,
}

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per schedule entry, in execution order.
    pub entry_times: Vec<(String, Duration)>,
    /// Time spent in tick-end listeners.
    pub listener_time: Duration,
    /// Total time for the tick.
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A tick-end callback. It sees the grid but cannot change it.
pub type TickListener = Box<dyn FnMut(&TickReport, &Grid)>;

struct RegisteredListener {
    name: String,
    func: TickListener,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// Runs an [`UpdateSchedule`] against a [`Grid`], one tick at a time.
pub struct TickLoop {
    grid: Grid,
    schedule: UpdateSchedule,
    config: SimulationConfig,
    listeners: Vec<RegisteredListener>,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Create a tick loop over `grid`. The config's seed and push limits are
    /// applied to the grid immediately.
    ///
    /// # Panics
    ///
    /// Panics if `tick_interval_ms`, `max_push_depth` or `max_redirect_hops`
    /// is zero.
    pub fn new(mut grid: Grid, schedule: UpdateSchedule, config: SimulationConfig) -> Self {
        assert!(
            config.tick_interval_ms > 0,
            "tick_interval_ms must be positive, got {}",
            config.tick_interval_ms
        );
        assert!(
            config.max_push_depth > 0,
            "max_push_depth must be positive, got {}",
            config.max_push_depth
        );
        assert!(
            config.max_redirect_hops > 0,
            "max_redirect_hops must be positive, got {}",
            config.max_redirect_hops
        );

        grid.reseed(config.seed);
        grid.set_push_limits(config.push_limits());
        tracing::debug!(
            entries = schedule.len(),
            cells = grid.live_count(),
            seed = config.seed,
            "created tick loop"
        );
        Self {
            grid,
            schedule,
            config,
            listeners: Vec::new(),
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Register a listener called at the end of every tick, after the tick
    /// counter advanced. Listeners run in registration order.
    ///
    /// # Panics
    ///
    /// Panics if a listener with the same name is already registered.
    pub fn on_tick_end<F>(&mut self, name: &str, listener: F)
    where
        F: FnMut(&TickReport, &Grid) + 'static,
    {
        assert!(
            !self.listeners.iter().any(|l| l.name == name),
            "duplicate listener name: {name:?}"
        );
        self.listeners.push(RegisteredListener {
            name: name.to_owned(),
            func: Box::new(listener),
        });
    }

    /// Unregister a listener. Returns whether one was registered under `name`.
    pub fn remove_listener(&mut self, name: &str) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.name != name);
        self.listeners.len() != before
    }

    /// Execute one tick.
    pub fn tick(&mut self) -> TickReport {
        let tick_start = Instant::now();
        let tick = self.grid.tick_count();
        let _span = tracing::debug_span!("tick", tick).entered();

        self.grid.begin_tick();

        let mut entry_times = Vec::with_capacity(self.schedule.len());
        let mut updates = 0;
        for entry in self.schedule.entries() {
            let entry_start = Instant::now();
            let ran = self.schedule.run_entry(entry, &mut self.grid);
            let elapsed = entry_start.elapsed();
            tracing::trace!(entry = %entry.id, ran, ?elapsed, "schedule entry");
            updates += ran;
            entry_times.push((entry.id.clone(), elapsed));
        }

        let events = self.grid.finish_tick();
        let report = TickReport {
            tick,
            events,
            updates,
            live_cells: self.grid.live_count(),
        };

        let listener_start = Instant::now();
        for listener in &mut self.listeners {
            (listener.func)(&report, &self.grid);
        }
        let listener_time = listener_start.elapsed();

        self.last_diagnostics = TickDiagnostics {
            entry_times,
            listener_time,
            total_time: tick_start.elapsed(),
        };
        tracing::debug!(
            updates,
            events = report.events.len(),
            live = report.live_cells,
            "tick finished"
        );
        report
    }

    /// Run `count` ticks. Returns the total number of cell updates.
    pub fn run_ticks(&mut self, count: u64) -> u64 {
        let mut total = 0u64;
        for _ in 0..count {
            total += self.tick().updates as u64;
        }
        total
    }

    /// Put the grid back to its loaded state and restart the random stream.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.grid.reseed(self.config.seed);
        self.last_diagnostics = TickDiagnostics::default();
    }

    // -- accessors ----------------------------------------------------------

    /// Ticks completed since load, reset or a grid clear.
    pub fn tick_count(&self) -> u64 {
        self.grid.tick_count()
    }

    /// Simulated time in milliseconds, `tick_count * tick_interval_ms`,
    /// saturating at `u64::MAX`.
    pub fn sim_time_ms(&self) -> u64 {
        self.grid
            .tick_count()
            .saturating_mul(self.config.tick_interval_ms)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the grid, for editing between ticks.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn schedule(&self) -> &UpdateSchedule {
        &self.schedule
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Names of registered listeners, in call order.
    pub fn listener_names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

impl std::fmt::Debug for TickLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickLoop")
            .field("grid", &self.grid)
            .field("schedule", &self.schedule.len())
            .field("config", &self.config)
            .field("listeners", &self.listener_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
