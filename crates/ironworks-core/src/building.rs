//! Buildings: one production/transfer state machine per grid cell.
//!
//! Every building shares the same contract ([`Building::can_accept`],
//! [`Building::accept`], [`Building::can_give`], [`Building::take`],
//! [`Building::tick`]) and dispatches on its [`BuildingKind`] through an
//! enum match, never through trait objects.
//!
//! # Cycle timing
//!
//! A building's timer accumulates `dt`. When it reaches the kind's cycle
//! duration the timer is reset to exactly zero (overshoot is discarded) and
//! the building fires: it pays upkeep, then performs its kind's effect.
//! The smelter is the exception: its timer only runs while both input slots
//! are filled.

use crate::economy::Economy;
use crate::event::{Event, EventBus};
use crate::fixed::{Fixed64, Money, Ticks, clamp_add, millis, wrap_add};
use crate::grid::{Direction, Grid, GridPosition};
use crate::resource::{RESOURCE_KIND_COUNT, ResourceKind};
use crate::sim::StateHash;
use serde::Serialize;
use std::collections::VecDeque;

/// Number of units a warehouse queue can hold.
pub const WAREHOUSE_CAPACITY: usize = 10;

// ---------------------------------------------------------------------------
// Building kinds
// ---------------------------------------------------------------------------

/// Every placeable module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BuildingKind {
    Mine,
    CoalMine,
    Smelter,
    SteelMill,
    AssemblyLine,
    ElectronicsFactory,
    RobotFactory,
    ComputerFactory,
    Conveyor,
    Warehouse,
    Market,
}

/// The behavioural family a kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    /// Produces from nothing but money.
    Extractor,
    /// Converts two filled input slots into one output.
    TwoInputConverter,
    /// Produces on a timer; its input slot is advisory and never consumed.
    SingleInputConverter,
    /// Pulls from upstream and pushes downstream.
    Transport,
    /// Bounded FIFO storage.
    Buffer,
    /// Sells whatever it is handed.
    Seller,
}

/// Fixed per-kind costs, timing, and recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingSpec {
    pub name: &'static str,
    pub role: Role,
    /// Charged once at placement; half is refunded on removal.
    pub build_cost: Money,
    /// Charged on every firing.
    pub upkeep: Money,
    pub cycle_ms: u32,
    /// Charged per unit produced. Zero for kinds that produce nothing.
    pub production_cost: Money,
    pub inputs: &'static [ResourceKind],
    pub output: Option<ResourceKind>,
}

impl BuildingSpec {
    pub fn cycle_time(&self) -> Fixed64 {
        millis(self.cycle_ms)
    }
}

use ResourceKind as R;

const SPECS: [BuildingSpec; 11] = [
    BuildingSpec {
        name: "Mine",
        role: Role::Extractor,
        build_cost: 300,
        upkeep: 5,
        cycle_ms: 3000,
        production_cost: 20,
        inputs: &[],
        output: Some(R::Ore),
    },
    BuildingSpec {
        name: "Coal Mine",
        role: Role::Extractor,
        build_cost: 350,
        upkeep: 7,
        cycle_ms: 2500,
        production_cost: 15,
        inputs: &[],
        output: Some(R::Coal),
    },
    BuildingSpec {
        name: "Smelter",
        role: Role::TwoInputConverter,
        build_cost: 800,
        upkeep: 15,
        cycle_ms: 4000,
        production_cost: 50,
        inputs: &[R::Ore, R::Coal],
        output: Some(R::Iron),
    },
    BuildingSpec {
        name: "Steel Mill",
        role: Role::SingleInputConverter,
        build_cost: 1200,
        upkeep: 25,
        cycle_ms: 5000,
        production_cost: 100,
        inputs: &[R::Iron, R::Coal],
        output: Some(R::Steel),
    },
    BuildingSpec {
        name: "Assembly Line",
        role: Role::SingleInputConverter,
        build_cost: 2000,
        upkeep: 40,
        cycle_ms: 6000,
        production_cost: 500,
        inputs: &[R::Steel, R::Electronics],
        output: Some(R::Car),
    },
    BuildingSpec {
        name: "Electronics Factory",
        role: Role::SingleInputConverter,
        build_cost: 1500,
        upkeep: 30,
        cycle_ms: 4000,
        production_cost: 300,
        inputs: &[R::Copper, R::Circuit],
        output: Some(R::Electronics),
    },
    BuildingSpec {
        name: "Robot Factory",
        role: Role::SingleInputConverter,
        build_cost: 3000,
        upkeep: 50,
        cycle_ms: 8000,
        production_cost: 800,
        inputs: &[R::Steel, R::Electronics, R::Circuit],
        output: Some(R::Robot),
    },
    BuildingSpec {
        name: "Computer Factory",
        role: Role::SingleInputConverter,
        build_cost: 2500,
        upkeep: 45,
        cycle_ms: 7000,
        production_cost: 600,
        inputs: &[R::Electronics, R::Circuit],
        output: Some(R::Computer),
    },
    BuildingSpec {
        name: "Conveyor",
        role: Role::Transport,
        build_cost: 100,
        upkeep: 1,
        cycle_ms: 500,
        production_cost: 0,
        inputs: &[],
        output: None,
    },
    BuildingSpec {
        name: "Warehouse",
        role: Role::Buffer,
        build_cost: 500,
        upkeep: 10,
        cycle_ms: 1000,
        production_cost: 0,
        inputs: &[],
        output: None,
    },
    BuildingSpec {
        name: "Market",
        role: Role::Seller,
        build_cost: 400,
        upkeep: 8,
        cycle_ms: 2000,
        production_cost: 0,
        inputs: &[],
        output: None,
    },
];

impl BuildingKind {
    pub const ALL: [BuildingKind; 11] = [
        BuildingKind::Mine,
        BuildingKind::CoalMine,
        BuildingKind::Smelter,
        BuildingKind::SteelMill,
        BuildingKind::AssemblyLine,
        BuildingKind::ElectronicsFactory,
        BuildingKind::RobotFactory,
        BuildingKind::ComputerFactory,
        BuildingKind::Conveyor,
        BuildingKind::Warehouse,
        BuildingKind::Market,
    ];

    pub fn spec(self) -> &'static BuildingSpec {
        &SPECS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn role(self) -> Role {
        self.spec().role
    }

    pub fn build_cost(self) -> Money {
        self.spec().build_cost
    }

    /// Refund paid on demolition: half the build cost, rounded down.
    pub fn refund(self) -> Money {
        self.spec().build_cost / 2
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Cosmetics
// ---------------------------------------------------------------------------

/// Animation attributes exposed to the rendering collaborator. None of these
/// gate production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cosmetics {
    None,
    Mine {
        phase: Fixed64,
    },
    CoalMine {
        smoke_offset: Fixed64,
    },
    Smelter {
        heat: Fixed64,
    },
    SteelMill {
        temperature: Fixed64,
        flame_intensity: Fixed64,
    },
    AssemblyLine {
        belt_offset: Fixed64,
    },
    ElectronicsFactory {
        light_pulse: Fixed64,
    },
    RobotFactory {
        arm_rotation: Fixed64,
        assembling: bool,
        assembly_progress: Fixed64,
    },
    ComputerFactory {
        screen_flash: Fixed64,
    },
    Conveyor {
        belt_position: Fixed64,
    },
}

impl Cosmetics {
    fn initial(kind: BuildingKind, seed: u64) -> Self {
        let zero = Fixed64::ZERO;
        // Seeded start offset in [0, 100).
        let offset = Fixed64::from_num(seed % 10_000) / Fixed64::from_num(100);
        match kind {
            BuildingKind::Mine => Cosmetics::Mine { phase: zero },
            BuildingKind::CoalMine => Cosmetics::CoalMine {
                smoke_offset: offset,
            },
            BuildingKind::Smelter => Cosmetics::Smelter { heat: zero },
            BuildingKind::SteelMill => Cosmetics::SteelMill {
                temperature: zero,
                flame_intensity: zero,
            },
            BuildingKind::AssemblyLine => Cosmetics::AssemblyLine { belt_offset: zero },
            BuildingKind::ElectronicsFactory => Cosmetics::ElectronicsFactory { light_pulse: zero },
            BuildingKind::RobotFactory => Cosmetics::RobotFactory {
                arm_rotation: zero,
                assembling: false,
                assembly_progress: zero,
            },
            BuildingKind::ComputerFactory => Cosmetics::ComputerFactory { screen_flash: zero },
            BuildingKind::Conveyor => Cosmetics::Conveyor {
                belt_position: offset,
            },
            BuildingKind::Warehouse | BuildingKind::Market => Cosmetics::None,
        }
    }

    fn animate(&mut self, outcome: &Outcome, dt: Fixed64) {
        let f = Fixed64::from_num::<f64>;
        let hundred = Fixed64::from_num(100);
        match self {
            Cosmetics::None | Cosmetics::CoalMine { .. } => {}
            Cosmetics::Mine { phase } => *phase = wrap_add(*phase, f(0.1), hundred),
            Cosmetics::Smelter { heat } => {
                let delta = if outcome.active { f(2.0) } else { f(-0.5) };
                *heat = clamp_add(*heat, delta, hundred);
            }
            Cosmetics::SteelMill {
                temperature,
                flame_intensity,
            } => {
                if outcome.fired && outcome.output_was_empty {
                    *temperature = hundred;
                    *flame_intensity = f(50.0);
                } else {
                    *temperature = clamp_add(*temperature, f(-0.5), hundred);
                    *flame_intensity = clamp_add(*flame_intensity, f(-1.0), hundred);
                }
            }
            Cosmetics::AssemblyLine { belt_offset } => {
                *belt_offset = wrap_add(*belt_offset, f(0.5), hundred)
            }
            Cosmetics::ElectronicsFactory { light_pulse } => {
                *light_pulse = wrap_add(*light_pulse, f(5.0), hundred)
            }
            Cosmetics::RobotFactory {
                arm_rotation,
                assembling,
                assembly_progress,
            } => {
                *arm_rotation = wrap_add(*arm_rotation, f(2.0), Fixed64::from_num(360));
                if outcome.produced {
                    *assembling = true;
                    *assembly_progress = Fixed64::ZERO;
                }
                if *assembling {
                    *assembly_progress += dt;
                    if *assembly_progress >= Fixed64::ONE {
                        *assembling = false;
                    }
                }
            }
            Cosmetics::ComputerFactory { screen_flash } => {
                *screen_flash = wrap_add(*screen_flash, f(3.0), hundred)
            }
            Cosmetics::Conveyor { belt_position } => {
                *belt_position = wrap_add(*belt_position, f(0.5), hundred)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tick context
// ---------------------------------------------------------------------------

/// Everything a building may touch besides the grid while it ticks: the
/// ledger, the event bus, and running totals for the current tick.
pub struct TickContext<'a> {
    pub economy: &'a mut Economy,
    pub events: &'a mut EventBus,
    pub tick: Ticks,
    /// Money debited during this tick (upkeep and production).
    pub spent: Money,
    /// Money credited by sales during this tick.
    pub earned: Money,
}

impl<'a> TickContext<'a> {
    pub fn new(economy: &'a mut Economy, events: &'a mut EventBus, tick: Ticks) -> Self {
        Self {
            economy,
            events,
            tick,
            spent: 0,
            earned: 0,
        }
    }

    fn charge_upkeep(&mut self, amount: Money) {
        if self.economy.charge_upkeep(amount) {
            self.spent += amount;
        }
    }

    /// Gate one unit of production on funds. Books it on success.
    fn produce(&mut self, position: GridPosition, item: ResourceKind, cost: Money) -> bool {
        if !self.economy.spend(cost) {
            self.events.emit(Event::ProductionSkipped {
                position,
                item,
                needed: cost,
                tick: self.tick,
            });
            return false;
        }
        self.spent += cost;
        self.economy.record_production(item, cost);
        tracing::trace!(%position, %item, cost, "produced");
        self.events.emit(Event::ItemProduced {
            position,
            item,
            cost,
            tick: self.tick,
        });
        true
    }

    fn sell(&mut self, position: GridPosition, item: ResourceKind, price: Money) {
        self.economy.earn(price, item);
        self.earned += price;
        tracing::trace!(%position, %item, price, "sold");
        self.events.emit(Event::ItemSold {
            position,
            item,
            price,
            tick: self.tick,
        });
    }

    fn moved(&mut self, from: GridPosition, to: GridPosition, item: ResourceKind) {
        self.events.emit(Event::ItemMoved {
            from,
            to,
            item,
            tick: self.tick,
        });
    }
}

// ---------------------------------------------------------------------------
// Per-role state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct SmelterState {
    inputs: [Option<ResourceKind>; 2],
    output: Option<ResourceKind>,
    active: bool,
}

impl SmelterState {
    /// Both inputs filled and the previous output collected.
    fn ready(&self) -> bool {
        self.inputs.iter().all(Option::is_some) && self.output.is_none()
    }
}

#[derive(Debug, Clone, Default)]
struct WarehouseState {
    queue: VecDeque<ResourceKind>,
    carried: Option<ResourceKind>,
    stored: [u32; RESOURCE_KIND_COUNT],
}

impl WarehouseState {
    fn pop_oldest(&mut self) -> Option<ResourceKind> {
        let item = self.queue.pop_front()?;
        self.stored[item.index()] -= 1;
        Some(item)
    }
}

#[derive(Debug, Clone)]
enum Machine {
    Extractor {
        carried: Option<ResourceKind>,
    },
    Smelter(SmelterState),
    Converter {
        /// Advisory input slot, filled by deliveries and never consumed.
        input: Option<ResourceKind>,
        carried: Option<ResourceKind>,
    },
    Conveyor {
        carried: Option<ResourceKind>,
        facing: Direction,
    },
    Warehouse(WarehouseState),
    Market {
        carried: Option<ResourceKind>,
    },
}

/// What happened during one tick, for the cosmetic update.
#[derive(Debug, Default)]
struct Outcome {
    fired: bool,
    output_was_empty: bool,
    produced: bool,
    active: bool,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// A building on the grid. Its position is fixed at creation.
#[derive(Debug, Clone)]
pub struct Building {
    kind: BuildingKind,
    position: GridPosition,
    /// Seconds accumulated since the last firing.
    timer: Fixed64,
    machine: Machine,
    cosmetics: Cosmetics,
}

impl Building {
    /// Create a building. `facing` only matters for conveyors; `cosmetic_seed`
    /// only picks animation start offsets.
    pub fn new(
        kind: BuildingKind,
        position: GridPosition,
        facing: Direction,
        cosmetic_seed: u64,
    ) -> Self {
        let machine = match kind.role() {
            Role::Extractor => Machine::Extractor { carried: None },
            Role::TwoInputConverter => Machine::Smelter(SmelterState::default()),
            Role::SingleInputConverter => Machine::Converter {
                input: None,
                carried: None,
            },
            Role::Transport => Machine::Conveyor {
                carried: None,
                facing,
            },
            Role::Buffer => Machine::Warehouse(WarehouseState::default()),
            Role::Seller => Machine::Market { carried: None },
        };
        Self {
            kind,
            position,
            timer: Fixed64::ZERO,
            machine,
            cosmetics: Cosmetics::initial(kind, cosmetic_seed),
        }
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn spec(&self) -> &'static BuildingSpec {
        self.kind.spec()
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn timer(&self) -> Fixed64 {
        self.timer
    }

    pub fn cosmetics(&self) -> Cosmetics {
        self.cosmetics
    }

    /// Conveyor direction of travel; `None` for every other kind.
    pub fn facing(&self) -> Option<Direction> {
        match &self.machine {
            Machine::Conveyor { facing, .. } => Some(*facing),
            _ => None,
        }
    }

    /// The item in the hand-off slot (for the smelter, its output slot).
    pub fn carried(&self) -> Option<ResourceKind> {
        match &self.machine {
            Machine::Extractor { carried }
            | Machine::Converter { carried, .. }
            | Machine::Conveyor { carried, .. }
            | Machine::Market { carried } => *carried,
            Machine::Smelter(s) => s.output,
            Machine::Warehouse(w) => w.carried,
        }
    }

    /// Contents of the input slots, in slot order. Empty for kinds without
    /// input slots.
    pub fn inputs(&self) -> Vec<ResourceKind> {
        match &self.machine {
            Machine::Smelter(s) => s.inputs.iter().flatten().copied().collect(),
            Machine::Converter { input, .. } => input.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Warehouse queue, oldest first. Empty for other kinds.
    pub fn queued(&self) -> Vec<ResourceKind> {
        match &self.machine {
            Machine::Warehouse(w) => w.queue.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Per-kind warehouse counter.
    pub fn stored_count(&self, item: ResourceKind) -> u32 {
        match &self.machine {
            Machine::Warehouse(w) => w.stored[item.index()],
            _ => 0,
        }
    }

    /// Whether a smelter is mid-conversion.
    pub fn is_active(&self) -> bool {
        matches!(&self.machine, Machine::Smelter(s) if s.active)
    }

    /// Every unit this building currently holds, in any slot.
    pub fn held_items(&self) -> Vec<ResourceKind> {
        let mut items = self.inputs();
        items.extend(self.queued());
        items.extend(self.carried());
        items
    }

    /// Cycle progress as a 0..1 fraction.
    pub fn progress(&self) -> Fixed64 {
        let cycle = self.spec().cycle_time();
        if cycle <= Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        (self.timer / cycle).min(Fixed64::ONE)
    }

    // -- Transfer contract --

    /// Whether [`Building::accept`] would succeed for `item`.
    pub fn can_accept(&self, item: ResourceKind) -> bool {
        let declared = self.spec().inputs.contains(&item);
        match &self.machine {
            Machine::Extractor { .. } => false,
            Machine::Smelter(s) => declared && s.inputs.iter().any(Option::is_none),
            Machine::Converter { input, .. } => declared && input.is_none(),
            Machine::Conveyor { carried, .. } => carried.is_none(),
            Machine::Warehouse(w) => w.queue.len() < WAREHOUSE_CAPACITY,
            Machine::Market { carried } => carried.is_none() && item.is_sellable(),
        }
    }

    /// Place `item` in the matching free slot. Returns false, without
    /// touching any state, when there is none.
    pub fn accept(&mut self, item: ResourceKind) -> bool {
        if !self.can_accept(item) {
            return false;
        }
        match &mut self.machine {
            Machine::Extractor { .. } => return false,
            Machine::Smelter(s) => {
                if let Some(slot) = s.inputs.iter_mut().find(|slot| slot.is_none()) {
                    *slot = Some(item);
                }
            }
            Machine::Converter { input, .. } => *input = Some(item),
            Machine::Conveyor { carried, .. } | Machine::Market { carried } => {
                *carried = Some(item)
            }
            Machine::Warehouse(w) => {
                w.queue.push_back(item);
                w.stored[item.index()] += 1;
            }
        }
        true
    }

    /// Whether a finished item is ready for pickup.
    pub fn can_give(&self) -> bool {
        let output = self.spec().output;
        match &self.machine {
            Machine::Extractor { carried } | Machine::Converter { carried, .. } => {
                carried.is_some() && *carried == output
            }
            Machine::Smelter(s) => s.output.is_some(),
            Machine::Conveyor { carried, .. } => carried.is_some(),
            Machine::Warehouse(w) => w.carried.is_some() || !w.queue.is_empty(),
            Machine::Market { .. } => false,
        }
    }

    /// Remove and return the ready item. `None`, with no mutation, when
    /// [`Building::can_give`] is false.
    pub fn take(&mut self) -> Option<ResourceKind> {
        if !self.can_give() {
            return None;
        }
        match &mut self.machine {
            Machine::Extractor { carried }
            | Machine::Converter { carried, .. }
            | Machine::Conveyor { carried, .. } => carried.take(),
            Machine::Smelter(s) => s.output.take(),
            Machine::Warehouse(w) => w.carried.take().or_else(|| w.pop_oldest()),
            Machine::Market { .. } => None,
        }
    }

    // -- Simulation --

    /// Pre-set the timer so the next tick fires regardless of `dt`. A
    /// smelter is only primed when it is converting or ready to start.
    pub fn prime(&mut self) {
        let cycle = self.spec().cycle_time();
        match &mut self.machine {
            Machine::Smelter(s) => {
                if s.active || s.ready() {
                    s.active = true;
                    self.timer = cycle;
                }
            }
            _ => self.timer = cycle,
        }
    }

    /// Advance by `dt` seconds and fire if the cycle completes. The building
    /// must already be detached from `grid`.
    pub fn tick(&mut self, grid: &mut Grid, ctx: &mut TickContext<'_>, dt: Fixed64) {
        let spec = self.kind.spec();
        let position = self.position;
        let cycle = spec.cycle_time();
        let mut outcome = Outcome::default();

        match &mut self.machine {
            Machine::Smelter(s) => {
                if !s.active && s.ready() {
                    s.active = true;
                    self.timer = Fixed64::ZERO;
                }
                outcome.active = s.active;
                if s.active {
                    self.timer += dt;
                    if self.timer >= cycle {
                        self.timer = Fixed64::ZERO;
                        s.active = false;
                        outcome.fired = true;
                        ctx.charge_upkeep(spec.upkeep);
                        if let Some(output) = spec.output
                            && ctx.produce(position, output, spec.production_cost)
                        {
                            s.inputs = [None, None];
                            s.output = Some(output);
                            outcome.produced = true;
                        }
                    }
                }
            }
            machine => {
                self.timer += dt;
                if self.timer >= cycle {
                    self.timer = Fixed64::ZERO;
                    outcome.fired = true;
                    ctx.charge_upkeep(spec.upkeep);
                    match machine {
                        Machine::Extractor { carried } | Machine::Converter { carried, .. } => {
                            outcome.output_was_empty = carried.is_none();
                            if carried.is_none()
                                && let Some(output) = spec.output
                                && ctx.produce(position, output, spec.production_cost)
                            {
                                *carried = Some(output);
                                outcome.produced = true;
                            }
                        }
                        Machine::Conveyor { carried, facing } => {
                            convey(carried, *facing, position, grid, ctx);
                        }
                        Machine::Warehouse(w) => {
                            if w.carried.is_none() {
                                w.carried = w.pop_oldest();
                            }
                        }
                        Machine::Market { carried } => {
                            if let Some(item) = *carried
                                && let Some(price) = item.sale_price()
                            {
                                *carried = None;
                                ctx.sell(position, item, price);
                            }
                        }
                        Machine::Smelter(_) => {}
                    }
                }
            }
        }

        self.cosmetics.animate(&outcome, dt);
    }

    /// Check slot bookkeeping that must always hold.
    pub fn check_invariants(&self) -> Result<(), String> {
        match &self.machine {
            Machine::Warehouse(w) => {
                if w.queue.len() > WAREHOUSE_CAPACITY {
                    return Err(format!("warehouse at {} over capacity", self.position));
                }
                let mut counted = [0u32; RESOURCE_KIND_COUNT];
                for item in &w.queue {
                    counted[item.index()] += 1;
                }
                if counted != w.stored {
                    return Err(format!("warehouse at {} counters drifted", self.position));
                }
                Ok(())
            }
            Machine::Smelter(s) if s.active && !s.inputs.iter().all(Option::is_some) => {
                Err(format!("smelter at {} active without inputs", self.position))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn hash_into(&self, h: &mut StateHash) {
        h.write_u32(self.kind as u32);
        h.write_u64(self.position.row as u64);
        h.write_u64(self.position.col as u64);
        h.write_fixed64(self.timer);
        h.write_u32(self.is_active() as u32);
        for item in self.held_items() {
            h.write_u32(item.index() as u32 + 1);
        }
        h.write_u32(0);
    }
}

/// Pull from upstream into an empty slot, then push downstream. Each leg is
/// a single move guarded by the other side's check.
fn convey(
    carried: &mut Option<ResourceKind>,
    facing: Direction,
    position: GridPosition,
    grid: &mut Grid,
    ctx: &mut TickContext<'_>,
) {
    if carried.is_none()
        && let Some(from) = grid.neighbor(position, facing.opposite())
        && let Some(upstream) = grid.get_mut(from)
        && let Some(item) = upstream.take()
    {
        *carried = Some(item);
        ctx.moved(from, position, item);
    }

    if let Some(item) = *carried
        && let Some(to) = grid.neighbor(position, facing)
        && let Some(downstream) = grid.get_mut(to)
        && downstream.accept(item)
    {
        *carried = None;
        ctx.moved(position, to, item);
    }
}
