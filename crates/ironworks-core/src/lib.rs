//! Ironworks Core -- a grid-based factory simulation.
//!
//! Buildings sit on a fixed 2-D grid. Extractors pull raw resources out of
//! the ground for money, converters turn them into finished goods, conveyors
//! and warehouses move and buffer items between neighboring cells, and
//! markets sell whatever reaches them. One shared [`economy::Economy`]
//! ledger pays for everything.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] advances the simulation by `dt`
//! seconds:
//!
//! 1. **Buildings** -- every occupied cell ticks once, in row-major order.
//!    Conveyors reach into adjacent cells through the grid.
//! 2. **Calendar** -- the day clock advances; day boundaries recompute
//!    daily profit.
//! 3. **Delivery** -- buffered events go to listeners.
//! 4. **Bookkeeping** -- the tick counter increments.
//!
//! [`engine::Engine::force_step`] fires every ready building exactly once
//! regardless of elapsed time.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- owns the grid, ledger, clock and event bus.
//! - [`building::Building`] -- one state machine per cell, dispatched on
//!   [`building::BuildingKind`].
//! - [`grid::Grid`] -- flat row-major cell storage with neighbor lookup.
//! - [`economy::Economy`] -- balance plus production and sales bookkeeping.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic time.
//! - [`query::BuildingView`], [`query::EconomyView`] -- read-only display
//!   snapshots.

pub mod building;
pub mod config;
pub mod economy;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod grid;
pub mod layout;
pub mod query;
pub mod resource;
pub mod rng;
pub mod sim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
