//! Cart

use jiff::{SignedDuration, Timestamp};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    actions::CartAction,
    items::CartLineItem,
    pricing::{TotalPriceError, total_price},
    products::{Product, Sku, SkuId},
    quantity::Quantity,
};

/// Reasons an add-to-cart payload is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// No product was supplied.
    #[error("product is missing")]
    MissingProduct,

    /// No SKU was supplied.
    #[error("sku is missing")]
    MissingSku,

    /// Product id is empty.
    #[error("product id is blank")]
    BlankProductId,

    /// SKU id is empty.
    #[error("sku id is blank")]
    BlankSkuId,

    /// SKU price is below zero (minor units).
    #[error("sku price is negative: {0}")]
    NegativePrice(i64),
}

/// Errors returned by cart mutations. A failed mutation never changes the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The add-to-cart payload was missing or malformed.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    /// A SKU is priced in a currency other than the cart's (sku, sku currency, cart currency).
    #[error("sku {0} is priced in {1}, but cart uses {2}")]
    CurrencyMismatch(SkuId, &'static str, &'static str),

    /// The total could not be derived.
    #[error(transparent)]
    Total(#[from] TotalPriceError),
}

/// The shopper's cart: line items unique by SKU plus their derived total.
///
/// A `CartState` is an immutable value. Mutations go through [`CartState::apply`],
/// which returns a new state and leaves `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    items: Vec<CartLineItem>,
    total: Money<'static, Currency>,
    last_updated: Timestamp,
    currency: &'static Currency,
}

impl CartState {
    /// An empty cart.
    pub fn empty(currency: &'static Currency, now: Timestamp) -> Self {
        Self {
            items: Vec::new(),
            total: Money::from_minor(0, currency),
            last_updated: now,
            currency,
        }
    }

    /// Reassemble a state from previously valid parts without re-deriving anything.
    pub(crate) fn from_parts(
        items: Vec<CartLineItem>,
        total: Money<'static, Currency>,
        last_updated: Timestamp,
        currency: &'static Currency,
    ) -> Self {
        Self {
            items,
            total,
            last_updated,
            currency,
        }
    }

    /// Line items, in the order they were first added.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Sum of price × quantity over all items.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Time of the last mutation that changed the cart.
    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    /// Currency the cart prices in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Find the line for a SKU.
    pub fn get(&self, sku_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.sku_id() == sku_id)
    }

    /// Whether the cart has a line for a SKU.
    pub fn contains(&self, sku_id: &str) -> bool {
        self.get(sku_id).is_some()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Number of units across all lines, as shown on the header badge.
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity().get()))
            .sum()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply an action, returning the next state.
    ///
    /// Returns `Ok(None)` when the action leaves the items as they are (an
    /// unknown SKU, a repeated quantity, clearing an empty cart). Such no-ops do
    /// not move `last_updated`; every other action moves it strictly forward,
    /// even when `now` has not advanced.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidPayload`]: product or SKU missing or malformed.
    /// - [`CartError::CurrencyMismatch`]: SKU priced in another currency.
    /// - [`CartError::Total`]: the new total overflows.
    pub fn apply(&self, action: &CartAction, now: Timestamp) -> Result<Option<Self>, CartError> {
        match action {
            CartAction::AddToCart {
                product,
                sku,
                quantity,
            } => self.add_item(product.as_ref(), sku.as_ref(), *quantity, now),
            CartAction::RemoveFromCart { sku_id } => self.remove_item(sku_id, now),
            CartAction::UpdateQuantity { sku_id, quantity } => {
                self.update_quantity(sku_id, *quantity, now)
            }
            CartAction::ClearCart => self.clear(now),
        }
    }

    fn add_item(
        &self,
        product: Option<&Product>,
        sku: Option<&Sku>,
        quantity: Quantity,
        now: Timestamp,
    ) -> Result<Option<Self>, CartError> {
        let (product, sku) = self.validate_payload(product, sku)?;

        let line = CartLineItem::new(product, sku, quantity);
        let mut items = self.items.clone();

        match items.iter_mut().find(|item| item.sku_id() == &sku.id) {
            Some(existing) => *existing = line,
            None => items.push(line),
        }

        self.with_items(items, now)
    }

    fn remove_item(&self, sku_id: &SkuId, now: Timestamp) -> Result<Option<Self>, CartError> {
        let items = self
            .items
            .iter()
            .filter(|item| item.sku_id() != sku_id)
            .cloned()
            .collect();

        self.with_items(items, now)
    }

    fn update_quantity(
        &self,
        sku_id: &SkuId,
        quantity: Quantity,
        now: Timestamp,
    ) -> Result<Option<Self>, CartError> {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.sku_id() == sku_id {
                    item.with_quantity(quantity)
                } else {
                    item.clone()
                }
            })
            .collect();

        self.with_items(items, now)
    }

    fn clear(&self, now: Timestamp) -> Result<Option<Self>, CartError> {
        self.with_items(Vec::new(), now)
    }

    fn validate_payload<'p>(
        &self,
        product: Option<&'p Product>,
        sku: Option<&'p Sku>,
    ) -> Result<(&'p Product, &'p Sku), CartError> {
        let product = product.ok_or(PayloadError::MissingProduct)?;
        let sku = sku.ok_or(PayloadError::MissingSku)?;

        if product.id.is_blank() {
            return Err(PayloadError::BlankProductId.into());
        }

        if sku.id.is_blank() {
            return Err(PayloadError::BlankSkuId.into());
        }

        let sku_currency = sku.price.currency();

        if sku_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                sku.id.clone(),
                sku_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let minor = sku.price.to_minor_units();

        if minor < 0 {
            return Err(PayloadError::NegativePrice(minor).into());
        }

        Ok((product, sku))
    }

    fn with_items(
        &self,
        items: Vec<CartLineItem>,
        now: Timestamp,
    ) -> Result<Option<Self>, CartError> {
        if items == self.items {
            return Ok(None);
        }

        let total = total_price(&items, self.currency)?;
        let last_updated = self
            .last_updated
            .checked_add(SignedDuration::from_nanos(1))
            .map_or(now, |next| now.max(next));

        Ok(Some(Self {
            items,
            total,
            last_updated,
            currency: self.currency,
        }))
    }
}
