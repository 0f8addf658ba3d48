//! The simulation driver: owns the grid, the ledger and the clock, and
//! advances every building once per step.
//!
//! # Step order
//!
//! Each [`Engine::step`] runs:
//! 1. **Buildings** -- every occupied cell in row-major order (row 0 first)
//!    is detached from the grid, ticked with the whole rest of the grid
//!    available for neighbor access, and put back.
//! 2. **Calendar** -- the day timer advances; crossing a day boundary
//!    recomputes daily profit.
//! 3. **Delivery** -- buffered events go to listeners.
//! 4. **Bookkeeping** -- the tick counter increments.
//!
//! [`Engine::force_step`] primes every building first and runs the same
//! pipeline with `dt = 0`, skipping the calendar.

use crate::building::{Building, BuildingKind, TickContext};
use crate::config::{ConfigError, SimConfig};
use crate::economy::Economy;
use crate::event::{Event, EventBus, EventKind, PassiveListener};
use crate::fixed::{Fixed64, Money, Ticks};
use crate::grid::{Direction, Grid, GridPosition};
use crate::query::{BuildingView, EconomyView};
use crate::rng::SimRng;
use crate::sim::{SimState, StateHash, TickReport};
use tracing::debug;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a placement was rejected. State is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(GridPosition),
    #[error("cell {0} is already occupied")]
    OccupiedCell(GridPosition),
    #[error("insufficient funds: need {cost}, have {balance}")]
    InsufficientFunds { cost: Money, balance: Money },
}

/// Why a removal was rejected. State is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoveError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(GridPosition),
    #[error("cell {0} is empty")]
    EmptyCell(GridPosition),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine.
#[derive(Debug)]
pub struct Engine {
    grid: Grid,
    economy: Economy,
    sim_state: SimState,
    event_bus: EventBus,
    rng: SimRng,
    paused: bool,
    day_length: Fixed64,
    frame_dt: Fixed64,
}

impl Engine {
    /// Build an engine around an injected ledger. `config` supplies the grid
    /// size and clock rates; its `starting_balance` is ignored.
    pub fn new(config: &SimConfig, economy: Economy) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, economy))
    }

    /// Validate `config` and build an engine with a fresh ledger.
    pub fn from_config(config: &SimConfig) -> Result<Self, ConfigError> {
        Self::new(config, Economy::new(config.starting_balance))
    }

    /// A `rows` x `cols` engine with default clocks and the given balance.
    /// The size is taken as given; use [`Engine::from_config`] for sizes
    /// that come from outside the program.
    pub fn with_grid(rows: usize, cols: usize, starting_balance: Money) -> Self {
        let config = SimConfig {
            rows,
            cols,
            ..SimConfig::default()
        };
        Self::assemble(&config, Economy::new(starting_balance))
    }

    fn assemble(config: &SimConfig, economy: Economy) -> Self {
        Self {
            grid: Grid::new(config.rows, config.cols),
            economy,
            sim_state: SimState::new(),
            event_bus: EventBus::new(config.event_buffer_capacity),
            rng: SimRng::new(config.seed),
            paused: false,
            day_length: config.day_length(),
            frame_dt: config.frame_dt(),
        }
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place a building facing East. See [`Engine::place_facing`].
    pub fn place(&mut self, row: usize, col: usize, kind: BuildingKind) -> Result<(), PlaceError> {
        self.place_facing(row, col, kind, Direction::default())
    }

    /// Check bounds, then emptiness, then pay the build cost and occupy the
    /// cell.
    pub fn place_facing(
        &mut self,
        row: usize,
        col: usize,
        kind: BuildingKind,
        facing: Direction,
    ) -> Result<(), PlaceError> {
        let position = GridPosition::new(row, col);
        if !self.grid.in_bounds(position) {
            debug!(%position, %kind, "placement rejected: out of bounds");
            return Err(PlaceError::OutOfBounds(position));
        }
        if self.grid.is_occupied(position) {
            debug!(%position, %kind, "placement rejected: occupied");
            return Err(PlaceError::OccupiedCell(position));
        }
        let cost = kind.build_cost();
        if !self.economy.spend(cost) {
            let balance = self.economy.balance();
            debug!(%position, %kind, cost, balance, "placement rejected: insufficient funds");
            return Err(PlaceError::InsufficientFunds { cost, balance });
        }

        let building = Building::new(kind, position, facing, self.rng.next_u64());
        let inserted = self.grid.insert(building);
        debug_assert!(inserted.is_ok(), "cell {position} was checked free");

        debug!(%position, %kind, cost, balance = self.economy.balance(), "placed");
        self.event_bus.emit(Event::BuildingPlaced {
            position,
            building: kind,
            cost,
            tick: self.sim_state.tick,
        });
        Ok(())
    }

    /// Demolish the building at `(row, col)`, refunding half its build cost.
    /// Anything it held is discarded. Returns the refund.
    pub fn remove(&mut self, row: usize, col: usize) -> Result<Money, RemoveError> {
        let position = GridPosition::new(row, col);
        if !self.grid.in_bounds(position) {
            return Err(RemoveError::OutOfBounds(position));
        }
        let Ok(building) = self.grid.remove(position) else {
            debug!(%position, "removal rejected: empty cell");
            return Err(RemoveError::EmptyCell(position));
        };

        let kind = building.kind();
        let refund = kind.refund();
        self.economy.refund(refund);
        let discarded = building.held_items();
        debug!(%position, %kind, refund, discarded = discarded.len(), "removed");
        self.event_bus.emit(Event::BuildingRemoved {
            position,
            building: kind,
            refund,
            discarded,
            tick: self.sim_state.tick,
        });
        Ok(refund)
    }

    /// Demolish every building without refund. Held items are discarded.
    /// The ledger, the clock and the cosmetic RNG carry on unchanged.
    /// Returns the number of buildings removed.
    pub fn clear_grid(&mut self) -> usize {
        let evicted = self.grid.clear();
        for building in &evicted {
            self.event_bus.emit(Event::BuildingRemoved {
                position: building.position(),
                building: building.kind(),
                refund: 0,
                discarded: building.held_items(),
                tick: self.sim_state.tick,
            });
        }
        debug!(removed = evicted.len(), "grid cleared");
        evicted.len()
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance every building by `dt` seconds of game time. No-op while
    /// paused.
    pub fn step(&mut self, dt: Fixed64) -> TickReport {
        if self.paused {
            return TickReport::default();
        }
        let mut report = self.tick_buildings(dt);

        if self.sim_state.advance_day(dt, self.day_length) {
            let daily_profit = self.economy.recompute_daily_profit();
            debug!(day = self.sim_state.day, daily_profit, "day ended");
            self.event_bus.emit(Event::DayEnded {
                day: self.sim_state.day,
                daily_profit,
                tick: self.sim_state.tick,
            });
            report.day_ended = true;
        }

        self.finish_step();
        report
    }

    /// One display frame's worth of game time.
    pub fn step_frame(&mut self) -> TickReport {
        self.step(self.frame_dt)
    }

    /// Fire every ready building exactly once, regardless of elapsed time.
    ///
    /// All timers are primed before any building runs, so an item delivered
    /// to an idle smelter during this step starts converting but does not
    /// finish. Works while paused; does not move the day clock.
    pub fn force_step(&mut self) -> TickReport {
        for building in self.grid.buildings_mut() {
            building.prime();
        }
        let report = self.tick_buildings(Fixed64::ZERO);
        self.finish_step();
        report
    }

    fn tick_buildings(&mut self, dt: Fixed64) -> TickReport {
        let mut ctx = TickContext::new(&mut self.economy, &mut self.event_bus, self.sim_state.tick);
        let mut buildings_ticked = 0;

        for index in 0..self.grid.len() {
            let Some(mut building) = self.grid.detach(index) else {
                continue;
            };
            building.tick(&mut self.grid, &mut ctx, dt);
            self.grid.restore(index, building);
            buildings_ticked += 1;
        }

        TickReport {
            buildings_ticked,
            spent: ctx.spent,
            earned: ctx.earned,
            day_ended: false,
        }
    }

    fn finish_step(&mut self) {
        self.event_bus.deliver();
        self.sim_state.tick += 1;
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// While paused, `step()` and `step_frame()` are no-ops. Placement,
    /// removal and `force_step()` still work.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // -----------------------------------------------------------------------
    // Event system
    // -----------------------------------------------------------------------

    /// Suppress an event kind. Suppressed events are never buffered.
    pub fn suppress_event(&mut self, kind: EventKind) {
        self.event_bus.suppress(kind);
    }

    /// Register a listener, called at the end of every step.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.event_bus.on_passive(kind, listener);
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Read-only view of one cell.
    pub fn snapshot(&self, row: usize, col: usize) -> Option<BuildingView> {
        self.grid
            .get(GridPosition::new(row, col))
            .map(BuildingView::from)
    }

    /// Views of every occupied cell, row-major.
    pub fn snapshot_all(&self) -> Vec<BuildingView> {
        self.grid.buildings().map(BuildingView::from).collect()
    }

    pub fn economy_snapshot(&self) -> EconomyView {
        EconomyView::from(&self.economy)
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn day(&self) -> u64 {
        self.sim_state.day
    }

    pub fn day_timer(&self) -> Fixed64 {
        self.sim_state.day_timer
    }

    /// Hash of the clock, the RNG, the ledger and every cell. Equal for two
    /// engines fed the same config and the same commands.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.sim_state.tick);
        h.write_u64(self.sim_state.day);
        h.write_fixed64(self.sim_state.day_timer);
        h.write_u64(self.rng.state());

        let eco = &self.economy;
        h.write_i64(eco.balance());
        h.write_i64(eco.total_production_cost());
        h.write_i64(eco.total_sales());
        h.write_i64(eco.total_upkeep());
        h.write_i64(eco.daily_profit());

        for building in self.grid.buildings() {
            building.hash_into(&mut h);
        }
        h.finish()
    }

    /// Ledger and per-building bookkeeping checks.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.economy.check_invariants()?;
        for building in self.grid.buildings() {
            building.check_invariants()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    #[test]
    fn place_checks_bounds_before_occupancy_before_funds() {
        let mut engine = Engine::with_grid(2, 2, 300);
        assert_eq!(
            engine.place(5, 5, BuildingKind::Market),
            Err(PlaceError::OutOfBounds(GridPosition::new(5, 5)))
        );
        engine.place(0, 0, BuildingKind::Mine).unwrap();
        assert_eq!(engine.economy().balance(), 0);
        assert_eq!(
            engine.place(0, 0, BuildingKind::Mine),
            Err(PlaceError::OccupiedCell(GridPosition::new(0, 0)))
        );
        assert_eq!(
            engine.place(0, 1, BuildingKind::Conveyor),
            Err(PlaceError::InsufficientFunds {
                cost: 100,
                balance: 0
            })
        );
        assert!(engine.snapshot(0, 1).is_none());
    }

    #[test]
    fn out_of_range_config_is_an_error_not_a_panic() {
        for config in [
            SimConfig {
                frame_secs: 1e10,
                ..SimConfig::default()
            },
            SimConfig {
                day_length_secs: 1e-12,
                ..SimConfig::default()
            },
            SimConfig {
                rows: usize::MAX,
                cols: usize::MAX,
                ..SimConfig::default()
            },
        ] {
            assert!(matches!(Engine::from_config(&config), Err(ConfigError::Invalid(_))));
            assert!(Engine::new(&config, Economy::default()).is_err());
        }
    }

    #[test]
    fn clear_grid_keeps_ledger_and_clock() {
        let mut engine = Engine::with_grid(1, 3, 1000);
        engine.place(0, 0, BuildingKind::Mine).unwrap();
        engine.place(0, 1, BuildingKind::Conveyor).unwrap();
        engine.force_step();
        let balance = engine.economy().balance();

        assert_eq!(engine.clear_grid(), 2);
        assert_eq!(engine.grid().building_count(), 0);
        assert_eq!(engine.economy().balance(), balance);
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.event_bus().buffered_count(EventKind::BuildingRemoved), 2);
        assert_eq!(engine.clear_grid(), 0);
        engine.check_invariants().unwrap();
    }

    #[test]
    fn state_hash_tracks_cosmetic_rng() {
        // Both end with an empty grid and 150 spent, but `a` drew one
        // cosmetic seed and `b` drew three.
        let mut a = Engine::with_grid(1, 1, 1000);
        a.place(0, 0, BuildingKind::Mine).unwrap();
        a.remove(0, 0).unwrap();
        let mut b = Engine::with_grid(1, 1, 1000);
        for _ in 0..3 {
            b.place(0, 0, BuildingKind::Conveyor).unwrap();
            b.remove(0, 0).unwrap();
        }
        assert_eq!(a.economy(), b.economy());
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn remove_refunds_half_and_clears() {
        let mut engine = Engine::with_grid(1, 1, 1000);
        engine.place(0, 0, BuildingKind::CoalMine).unwrap();
        assert_eq!(engine.remove(0, 0), Ok(175));
        assert_eq!(engine.economy().balance(), 1000 - 350 + 175);
        assert!(engine.snapshot(0, 0).is_none());
        assert_eq!(engine.remove(0, 0), Err(RemoveError::EmptyCell(GridPosition::new(0, 0))));
        assert_eq!(engine.remove(1, 0), Err(RemoveError::OutOfBounds(GridPosition::new(1, 0))));
    }

    #[test]
    fn force_step_counts_ticks_not_days() {
        let mut engine = Engine::with_grid(1, 1, 1000);
        engine.place(0, 0, BuildingKind::Mine).unwrap();
        let report = engine.force_step();
        assert_eq!(report.buildings_ticked, 1);
        assert_eq!(report.spent, 25);
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.day_timer(), Fixed64::ZERO);
        assert_eq!(
            engine.snapshot(0, 0).unwrap().item,
            Some(ResourceKind::Ore)
        );
    }

    #[test]
    fn paused_engine_ignores_step() {
        let mut engine = Engine::with_grid(1, 1, 1000);
        engine.place(0, 0, BuildingKind::Mine).unwrap();
        engine.pause();
        assert_eq!(engine.step(Fixed64::from_num(10)), TickReport::default());
        assert_eq!(engine.tick(), 0);
        engine.resume();
        engine.step(Fixed64::from_num(10));
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn state_hash_changes_with_state() {
        let mut engine = Engine::with_grid(2, 2, 1000);
        let empty = engine.state_hash();
        engine.place(1, 1, BuildingKind::Warehouse).unwrap();
        assert_ne!(engine.state_hash(), empty);
    }
}
