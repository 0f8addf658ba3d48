//! A ready-made starter factory for demos and benchmarks.

use crate::building::BuildingKind;
use crate::engine::{Engine, PlaceError};
use crate::fixed::Money;
use crate::grid::GridPosition;

/// Mine to market, left to right. Every conveyor faces East.
pub const EXAMPLE_CHAIN: [BuildingKind; 9] = [
    BuildingKind::Mine,
    BuildingKind::Conveyor,
    BuildingKind::Smelter,
    BuildingKind::Conveyor,
    BuildingKind::SteelMill,
    BuildingKind::Conveyor,
    BuildingKind::AssemblyLine,
    BuildingKind::Conveyor,
    BuildingKind::Market,
];

/// Total build cost of [`EXAMPLE_CHAIN`].
pub fn example_cost() -> Money {
    EXAMPLE_CHAIN.iter().map(|k| k.build_cost()).sum()
}

/// Place [`EXAMPLE_CHAIN`] on the middle row, starting three cells left of
/// the middle column. All or nothing: every cell and the total cost are
/// checked before the first building goes down.
pub fn example_factory(engine: &mut Engine) -> Result<(), PlaceError> {
    let row = engine.grid().rows() / 2;
    let start = (engine.grid().cols() / 2).saturating_sub(3);

    for offset in 0..EXAMPLE_CHAIN.len() {
        let position = GridPosition::new(row, start + offset);
        if !engine.grid().in_bounds(position) {
            return Err(PlaceError::OutOfBounds(position));
        }
        if engine.grid().is_occupied(position) {
            return Err(PlaceError::OccupiedCell(position));
        }
    }
    let cost = example_cost();
    let balance = engine.economy().balance();
    if balance < cost {
        return Err(PlaceError::InsufficientFunds { cost, balance });
    }

    for (offset, kind) in EXAMPLE_CHAIN.iter().enumerate() {
        engine.place(row, start + offset, *kind)?;
    }
    tracing::debug!(row, start, cost, "example factory placed");
    Ok(())
}

/// Clear the grid without refund and lay the starter chain down again.
pub fn reset_example(engine: &mut Engine) -> Result<(), PlaceError> {
    engine.clear_grid();
    example_factory(engine)
}
