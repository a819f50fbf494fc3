//! Money rounding
//!
//! Every monetary value on the wire has 2 decimal places, rounded half-up
//! (midpoint away from zero). Line totals round the unit price first, then
//! the product, so results are reproducible to the cent.

use rust_decimal::prelude::*;

/// Decimal places for monetary values
pub const DECIMAL_PLACES: u32 = 2;

/// Round to 2 decimal places, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `round(round(unit) * quantity)`
#[inline]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_money(round_money(unit_price) * Decimal::from(quantity))
}

/// Add to a running total, rounding after the step
#[inline]
pub fn accumulate(total: Decimal, amount: Decimal) -> Decimal {
    round_money(total + amount)
}
