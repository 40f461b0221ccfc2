//! Pricing

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::items::CartLineItem;

/// Errors that can occur while calculating a cart total.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotalPriceError {
    /// The total does not fit in minor units.
    #[error("cart total overflows")]
    Overflow,

    /// An item is priced in another currency (item currency, cart currency).
    #[error("item priced in {0}, but cart uses {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// Price of a single line: unit price times quantity, in minor units.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the product does not fit in an `i64`.
pub fn line_total(item: &CartLineItem) -> Result<i64, TotalPriceError> {
    item.price()
        .to_minor_units()
        .checked_mul(i64::from(item.quantity().get()))
        .ok_or(TotalPriceError::Overflow)
}

/// Sum of price × quantity over all items, in the cart currency.
///
/// An empty slice totals zero.
///
/// # Errors
///
/// - [`TotalPriceError::CurrencyMismatch`]: an item is not priced in `currency`.
/// - [`TotalPriceError::Overflow`]: the sum does not fit in minor units.
pub fn total_price(
    items: &[CartLineItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let minor = items.iter().try_fold(0_i64, |acc, item| {
        let item_currency = item.price().currency();

        if item_currency != currency {
            return Err(TotalPriceError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        acc.checked_add(line_total(item)?)
            .ok_or(TotalPriceError::Overflow)
    })?;

    Ok(Money::from_minor(minor, currency))
}
