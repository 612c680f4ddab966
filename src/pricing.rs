//! Prices

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{carts::CartLine, products::PriceIndex};

/// Errors raised while presenting amounts as money.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The amount does not fit the money representation.
    #[error("amount {0} is too large to represent")]
    AmountOutOfRange(u64),
}

/// Price of one line: unit price times quantity.
///
/// Products missing from the index are priced at zero.
pub fn line_extension(line: &CartLine, prices: &impl PriceIndex) -> u64 {
    prices
        .price_of(&line.product_id)
        .unwrap_or(0)
        .saturating_mul(u64::from(line.quantity))
}

/// Calculates the total of the given lines.
///
/// Saturating addition of non-negative terms yields the same result in any
/// order, so the total does not depend on line order.
pub fn total_price<'a>(
    lines: impl IntoIterator<Item = &'a CartLine>,
    prices: &impl PriceIndex,
) -> u64 {
    lines
        .into_iter()
        .map(|line| line_extension(line, prices))
        .fold(0, u64::saturating_add)
}

/// Present a minor-unit amount as money in the given currency.
///
/// # Errors
///
/// Returns [`PricingError::AmountOutOfRange`] if the amount exceeds `i64::MAX`.
pub fn to_money(
    amount: u64,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let Ok(minor) = i64::try_from(amount) else {
        return Err(PricingError::AmountOutOfRange(amount));
    };

    Ok(Money::from_minor(minor, currency))
}
