//! The shared economy ledger.
//!
//! One [`Economy`] exists per simulation. The engine owns it and lends it to
//! each building for the duration of that building's tick, so every debit is
//! checked and applied before the next building runs.

use crate::fixed::Money;
use crate::resource::{RESOURCE_KIND_COUNT, ResourceKind};
use serde::Serialize;

/// Balance, cumulative costs and sales, and per-kind counters.
///
/// Only [`Economy::new`] builds a ledger; it cannot be deserialized into an
/// arbitrary state.
///
/// ```compile_fail
/// let eco: ironworks_core::economy::Economy = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Economy {
    balance: Money,
    total_production_cost: Money,
    total_sales: Money,
    total_upkeep: Money,
    daily_profit: Money,
    production_by_kind: [Money; RESOURCE_KIND_COUNT],
    sales_by_kind: [Money; RESOURCE_KIND_COUNT],
}

impl Economy {
    pub fn new(starting_balance: Money) -> Self {
        Self {
            balance: starting_balance,
            total_production_cost: 0,
            total_sales: 0,
            total_upkeep: 0,
            daily_profit: 0,
            production_by_kind: [0; RESOURCE_KIND_COUNT],
            sales_by_kind: [0; RESOURCE_KIND_COUNT],
        }
    }

    /// Debit `amount` if the balance covers it. Leaves the balance untouched
    /// and returns false otherwise.
    #[must_use = "a failed spend means the purchase must not happen"]
    pub fn spend(&mut self, amount: Money) -> bool {
        debug_assert!(amount >= 0, "negative spend {amount}");
        if self.balance < amount {
            return false;
        }
        self.balance -= amount;
        true
    }

    /// Credit a sale of `kind`.
    pub fn earn(&mut self, amount: Money, kind: ResourceKind) {
        debug_assert!(amount >= 0, "negative sale {amount}");
        self.balance += amount;
        self.total_sales += amount;
        self.sales_by_kind[kind.index()] += amount;
    }

    /// Book the cost actually spent producing one unit of `kind`.
    pub fn record_production(&mut self, kind: ResourceKind, cost: Money) {
        debug_assert!(cost >= 0, "negative production cost {cost}");
        self.total_production_cost += cost;
        self.production_by_kind[kind.index()] += cost;
    }

    /// Spend `amount` as running cost. Upkeep that cannot be paid is skipped.
    pub fn charge_upkeep(&mut self, amount: Money) -> bool {
        if self.spend(amount) {
            self.total_upkeep += amount;
            true
        } else {
            false
        }
    }

    /// Credit a demolition refund. Not a sale.
    pub fn refund(&mut self, amount: Money) {
        debug_assert!(amount >= 0, "negative refund {amount}");
        self.balance += amount;
    }

    /// `total_sales - floor(total_production_cost * 0.7)`.
    pub fn recompute_daily_profit(&mut self) -> Money {
        self.daily_profit = self.total_sales - (self.total_production_cost * 7).div_euclid(10);
        self.daily_profit
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn total_production_cost(&self) -> Money {
        self.total_production_cost
    }

    pub fn total_sales(&self) -> Money {
        self.total_sales
    }

    pub fn total_upkeep(&self) -> Money {
        self.total_upkeep
    }

    pub fn daily_profit(&self) -> Money {
        self.daily_profit
    }

    pub fn production_of(&self, kind: ResourceKind) -> Money {
        self.production_by_kind[kind.index()]
    }

    pub fn sales_of(&self, kind: ResourceKind) -> Money {
        self.sales_by_kind[kind.index()]
    }

    /// Verify the ledger's summary fields agree with its per-kind counters.
    pub fn check_invariants(&self) -> Result<(), String> {
        let produced: Money = self.production_by_kind.iter().sum();
        if produced != self.total_production_cost {
            return Err(format!(
                "production total {} != per-kind sum {produced}",
                self.total_production_cost
            ));
        }
        let sold: Money = self.sales_by_kind.iter().sum();
        if sold != self.total_sales {
            return Err(format!("sales total {} != per-kind sum {sold}", self.total_sales));
        }
        if self.production_by_kind.iter().chain(&self.sales_by_kind).any(|v| *v < 0) {
            return Err("negative per-kind counter".to_string());
        }
        Ok(())
    }
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(15_000)
    }
}
