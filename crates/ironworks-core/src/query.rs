//! Read-only views handed to display collaborators.
//!
//! Views are owned copies. Holding one never borrows the engine, and
//! nothing in a view can be written back.

use crate::building::{Building, BuildingKind, Cosmetics};
use crate::economy::Economy;
use crate::fixed::{Fixed64, Money};
use crate::grid::{Direction, GridPosition};
use crate::resource::ResourceKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a renderer needs to draw one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingView {
    pub kind: BuildingKind,
    pub position: GridPosition,
    /// The item in the hand-off slot.
    pub item: Option<ResourceKind>,
    /// Filled input slots.
    pub inputs: Vec<ResourceKind>,
    /// Warehouse queue, oldest first.
    pub queued: Vec<ResourceKind>,
    /// Cycle progress in `[0, 1]`.
    pub progress: Fixed64,
    pub facing: Option<Direction>,
    pub cosmetics: Cosmetics,
}

impl From<&Building> for BuildingView {
    fn from(b: &Building) -> Self {
        Self {
            kind: b.kind(),
            position: b.position(),
            item: b.carried(),
            inputs: b.inputs(),
            queued: b.queued(),
            progress: b.progress(),
            facing: b.facing(),
            cosmetics: b.cosmetics(),
        }
    }
}

/// Ledger totals for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EconomyView {
    pub balance: Money,
    pub daily_profit: Money,
    pub total_production_cost: Money,
    pub total_sales: Money,
    pub total_upkeep: Money,
    pub production_by_kind: BTreeMap<ResourceKind, Money>,
    pub sales_by_kind: BTreeMap<ResourceKind, Money>,
}

impl From<&Economy> for EconomyView {
    fn from(eco: &Economy) -> Self {
        Self {
            balance: eco.balance(),
            daily_profit: eco.daily_profit(),
            total_production_cost: eco.total_production_cost(),
            total_sales: eco.total_sales(),
            total_upkeep: eco.total_upkeep(),
            production_by_kind: ResourceKind::ALL
                .iter()
                .map(|&k| (k, eco.production_of(k)))
                .collect(),
            sales_by_kind: ResourceKind::ALL
                .iter()
                .map(|&k| (k, eco.sales_of(k)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn economy_view_lists_every_kind() {
        let mut eco = Economy::new(100);
        eco.earn(80, ResourceKind::Ore);
        let view = EconomyView::from(&eco);
        assert_eq!(view.balance, 180);
        assert_eq!(view.sales_by_kind.len(), ResourceKind::ALL.len());
        assert_eq!(view.sales_by_kind[&ResourceKind::Ore], 80);
        assert_eq!(view.production_by_kind[&ResourceKind::Car], 0);
    }

    #[test]
    fn building_view_copies_state() {
        let mut b = Building::new(
            BuildingKind::Warehouse,
            GridPosition::new(1, 2),
            Direction::East,
            0,
        );
        b.accept(ResourceKind::Iron);
        let view = BuildingView::from(&b);
        assert_eq!(view.kind, BuildingKind::Warehouse);
        assert_eq!(view.position, GridPosition::new(1, 2));
        assert_eq!(view.item, None);
        assert_eq!(view.queued, vec![ResourceKind::Iron]);
        assert_eq!(view.progress, Fixed64::ZERO);
        assert_eq!(view.cosmetics, Cosmetics::None);
    }

    #[test]
    fn economy_view_serializes_kind_keys() {
        let view = EconomyView::from(&Economy::new(5));
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"balance\":5"));
        assert!(json.contains("\"Ore\":0"));
    }
}
