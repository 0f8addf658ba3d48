//! Reference scenarios with exact expected balances.

use ironworks_core::building::BuildingKind;
use ironworks_core::engine::Engine;
use ironworks_core::grid::Direction;
use ironworks_core::resource::ResourceKind;
use ironworks_core::test_utils::*;

// ===========================================================================
// Scenario 1: a lone mine
// ===========================================================================

#[test]
fn mine_force_step_produces_one_ore() {
    let mut engine = Engine::with_grid(3, 3, 1000);
    engine.place(0, 0, BuildingKind::Mine).unwrap();
    assert_eq!(engine.economy().balance(), 700);

    engine.force_step();

    let mine = engine.snapshot(0, 0).unwrap();
    assert_eq!(mine.item, Some(ResourceKind::Ore));
    assert_eq!(engine.economy().balance(), 700 - 5 - 20);
    assert_eq!(engine.economy().production_of(ResourceKind::Ore), 20);
    assert_eq!(engine.economy().total_production_cost(), 20);
}

// ===========================================================================
// Scenario 2: a market holding one ore
// ===========================================================================
//
// Market <- Conveyor(West) <- Mine. After two forced steps the ore sits in
// the market unsold (the market ticks before the conveyor hands it over).
// Removing the feeders leaves the market alone for the sale.

#[test]
fn market_force_step_sells_held_ore() {
    let mut engine = row_engine(3, 10_000);
    place_row(
        &mut engine,
        0,
        &[BuildingKind::Market, BuildingKind::Conveyor, BuildingKind::Mine],
        Direction::West,
    );
    engine.force_step();
    engine.force_step();
    assert_eq!(engine.snapshot(0, 0).unwrap().item, Some(ResourceKind::Ore));
    assert_eq!(engine.economy().total_sales(), 0);

    engine.remove(0, 1).unwrap();
    engine.remove(0, 2).unwrap();
    let before = engine.economy().balance();

    let report = engine.force_step();

    assert_eq!(engine.economy().balance(), before - 8 + 80);
    assert_eq!(report.earned, 80);
    assert_eq!(engine.economy().sales_of(ResourceKind::Ore), 80);
    assert_eq!(engine.snapshot(0, 0).unwrap().item, None);
}

// ===========================================================================
// Scenario 3: mine to market in one forced step
// ===========================================================================

#[test]
fn east_chain_sells_within_one_forced_step() {
    let mut engine = mine_to_market(3, 10_000);
    let before = engine.economy().balance();
    assert_eq!(before, 10_000 - 300 - 3 * 100 - 400);

    let report = engine.force_step();

    // Upkeep: mine 5, belts 3 x 1, market 8. Extraction 20. Sale 80.
    assert_eq!(report.spent, 5 + 3 + 8 + 20);
    assert_eq!(report.earned, 80);
    assert_eq!(engine.economy().balance(), before - 36 + 80);
    assert_eq!(engine.economy().sales_of(ResourceKind::Ore), 80);
    assert!(items_on_grid(&engine).is_empty());
}

// ===========================================================================
// Scenario 4: a day of a mine that never sells
// ===========================================================================

#[test]
fn unsold_production_makes_daily_profit_negative() {
    let mut engine = Engine::with_grid(1, 1, 1000);
    engine.place(0, 0, BuildingKind::Mine).unwrap();
    // Day length defaults to 60 s; one 60 s step fires the mine once and
    // closes the day.
    let report = engine.step(fixed(60.0));
    assert!(report.day_ended);
    assert_eq!(engine.day(), 1);
    // 0 - floor(20 * 0.7)
    assert_eq!(engine.economy().daily_profit(), -14);
}
