use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. All simulated
/// time (timers, progress, cosmetic phases) is measured in this type.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation bookkeeping.
pub type Ticks = u64;

/// Money is whole currency units. Balances may be read as negative only
/// if a caller constructs a ledger that way; the ledger itself never
/// debits below zero.
pub type Money = i64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Whole seconds expressed in milliseconds, converted exactly.
#[inline]
pub fn millis(ms: u32) -> Fixed64 {
    Fixed64::from_num(ms) / Fixed64::from_num(1000)
}

/// Add `step` to `value`, wrapping back into `[0, limit)`.
#[inline]
pub(crate) fn wrap_add(value: Fixed64, step: Fixed64, limit: Fixed64) -> Fixed64 {
    let mut next = value + step;
    while next >= limit {
        next -= limit;
    }
    next
}

/// Move `value` by `delta`, clamped into `[0, max]`.
#[inline]
pub(crate) fn clamp_add(value: Fixed64, delta: Fixed64, max: Fixed64) -> Fixed64 {
    (value + delta).clamp(Fixed64::ZERO, max)
}
