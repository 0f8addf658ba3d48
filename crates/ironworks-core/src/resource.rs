//! Resource catalog: the fixed set of item kinds that move through the
//! factory, with their display and economic metadata.

use crate::fixed::Money;
use serde::Serialize;

/// Number of resource kinds. Ledger counters are arrays of this length.
pub const RESOURCE_KIND_COUNT: usize = 11;

/// A kind of resource unit. Cheap to copy and compare; used as a map key
/// and as the occupant type of every item slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ResourceKind {
    Ore,
    Coal,
    Iron,
    Steel,
    Copper,
    Circuit,
    Engine,
    Robot,
    Electronics,
    Car,
    Computer,
}

/// Static metadata for a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    pub name: &'static str,
    /// Intrinsic value, independent of where the item is sold.
    pub value: Money,
    /// Price a market pays for one unit. `None` means unsellable.
    pub sale_price: Option<Money>,
    /// RGB display color for the rendering collaborator.
    pub color: [u8; 3],
}

const CATALOG: [ResourceInfo; RESOURCE_KIND_COUNT] = [
    ResourceInfo { name: "Ore", value: 50, sale_price: Some(80), color: [139, 69, 19] },
    ResourceInfo { name: "Coal", value: 30, sale_price: Some(50), color: [34, 34, 34] },
    ResourceInfo { name: "Iron", value: 100, sale_price: Some(150), color: [169, 169, 169] },
    ResourceInfo { name: "Steel", value: 250, sale_price: Some(350), color: [192, 192, 192] },
    ResourceInfo { name: "Copper", value: 150, sale_price: Some(200), color: [184, 115, 51] },
    ResourceInfo { name: "Circuit", value: 500, sale_price: Some(600), color: [0, 255, 127] },
    ResourceInfo { name: "Engine", value: 800, sale_price: Some(1000), color: [255, 69, 0] },
    ResourceInfo { name: "Robot", value: 1500, sale_price: Some(2000), color: [0, 191, 255] },
    ResourceInfo { name: "Electronics", value: 1200, sale_price: Some(1500), color: [147, 112, 219] },
    ResourceInfo { name: "Car", value: 5000, sale_price: Some(6000), color: [220, 20, 60] },
    ResourceInfo { name: "Computer", value: 3000, sale_price: Some(4000), color: [30, 144, 255] },
];

impl ResourceKind {
    /// Every kind, in declaration order.
    pub const ALL: [ResourceKind; RESOURCE_KIND_COUNT] = [
        ResourceKind::Ore,
        ResourceKind::Coal,
        ResourceKind::Iron,
        ResourceKind::Steel,
        ResourceKind::Copper,
        ResourceKind::Circuit,
        ResourceKind::Engine,
        ResourceKind::Robot,
        ResourceKind::Electronics,
        ResourceKind::Car,
        ResourceKind::Computer,
    ];

    /// Dense index for array-backed counters.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn info(self) -> &'static ResourceInfo {
        &CATALOG[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn value(self) -> Money {
        self.info().value
    }

    pub fn sale_price(self) -> Option<Money> {
        self.info().sale_price
    }

    pub fn is_sellable(self) -> bool {
        self.sale_price().is_some()
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
