//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::building::BuildingKind;
use crate::engine::Engine;
use crate::fixed::{Fixed64, Money, f64_to_fixed64};
use crate::grid::Direction;
use crate::resource::ResourceKind;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}

// ===========================================================================
// Engine builders
// ===========================================================================

/// A single-row engine.
pub fn row_engine(cols: usize, balance: Money) -> Engine {
    Engine::with_grid(1, cols, balance)
}

/// Place `kinds` left to right on `row`, conveyors facing `facing`.
/// Panics if any placement fails.
pub fn place_row(engine: &mut Engine, row: usize, kinds: &[BuildingKind], facing: Direction) {
    for (col, kind) in kinds.iter().enumerate() {
        engine
            .place_facing(row, col, *kind, facing)
            .unwrap_or_else(|e| panic!("placing {kind} at ({row}, {col}): {e}"));
    }
}

/// Mine, then `belts` East-facing conveyors, then a market.
pub fn mine_to_market(belts: usize, balance: Money) -> Engine {
    let mut kinds = vec![BuildingKind::Mine];
    kinds.extend(std::iter::repeat_n(BuildingKind::Conveyor, belts));
    kinds.push(BuildingKind::Market);
    let mut engine = row_engine(kinds.len(), balance);
    place_row(&mut engine, 0, &kinds, Direction::East);
    engine
}

// ===========================================================================
// Inspection
// ===========================================================================

/// Every unit currently on the grid, in any slot of any building.
pub fn items_on_grid(engine: &Engine) -> Vec<ResourceKind> {
    engine
        .grid()
        .buildings()
        .flat_map(|b| b.held_items())
        .collect()
}

/// The carried item of each cell on `row`, `None` for empty cells too.
pub fn row_items(engine: &Engine, row: usize) -> Vec<Option<ResourceKind>> {
    (0..engine.grid().cols())
        .map(|col| engine.snapshot(row, col).and_then(|v| v.item))
        .collect()
}
