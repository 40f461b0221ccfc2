//! Checkout
//!
//! Reads the cart to build an order and clears it once the order is placed.
//! Authentication itself lives elsewhere; checkout only consults [`AuthStatus`].

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{CartError, CartState},
    clock::Clock,
    items::CartLineItem,
    store::CartStore,
};

/// Checkout Errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The shopper is not signed in.
    #[error("sign in to check out")]
    NotAuthenticated,

    /// Nothing to buy.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart changed after checkout began (started at, now at).
    #[error("cart changed since checkout began ({0} -> {1})")]
    CartChanged(Timestamp, Timestamp),

    /// Clearing the cart failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Whether the current shopper is signed in.
pub trait AuthStatus {
    /// `true` if signed in.
    fn is_authenticated(&self) -> bool;
}

impl AuthStatus for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

/// Checkout in progress: a frozen copy of the cart's lines and total.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    items: Vec<CartLineItem>,
    total: Money<'static, Currency>,
    cart_version: Timestamp,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Purchased lines
    pub items: Vec<CartLineItem>,

    /// Amount charged
    pub total: Money<'static, Currency>,

    /// When the order was placed
    pub placed_at: Timestamp,
}

impl Checkout {
    /// Start checking out `cart`.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotAuthenticated`]: the shopper is signed out.
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    pub fn begin(cart: &CartState, auth: &impl AuthStatus) -> Result<Self, CheckoutError> {
        if !auth.is_authenticated() {
            return Err(CheckoutError::NotAuthenticated);
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            items: cart.items().to_vec(),
            total: cart.total(),
            cart_version: cart.last_updated(),
        })
    }

    /// Lines being bought.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Amount to charge.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Finish checkout after payment succeeded: clears the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::CartChanged`] if the cart was modified since
    /// [`Checkout::begin`]; the cart is left untouched in that case.
    pub fn complete<C: Clock>(self, store: &mut CartStore<C>) -> Result<Order, CheckoutError> {
        let current = store.state().last_updated();

        if current != self.cart_version {
            return Err(CheckoutError::CartChanged(self.cart_version, current));
        }

        let cleared = store.clear()?;

        info!(
            lines = self.items.len(),
            total = self.total.to_minor_units(),
            "checkout completed"
        );

        Ok(Order {
            items: self.items,
            total: self.total,
            placed_at: cleared.last_updated(),
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        clock::FixedClock,
        products::{Product, Sku},
    };

    use super::*;

    fn filled_store() -> Result<(CartStore<FixedClock>, FixedClock), CartError> {
        let clock = FixedClock::default();
        let mut store = CartStore::with_clock(iso::VND, clock.clone());

        clock.advance(SignedDuration::from_secs(1));
        store.add_item(
            Some(Product::new("p1", "Netflix")),
            Some(Sku::new("sku1", "1 month", 369_000, iso::VND)),
            2,
        )?;

        Ok((store, clock))
    }

    #[test]
    fn requires_authentication() -> TestResult {
        let (store, _) = filled_store()?;

        assert_eq!(
            Checkout::begin(store.state(), &false),
            Err(CheckoutError::NotAuthenticated)
        );

        Ok(())
    }

    #[test]
    fn requires_items() {
        let store = CartStore::with_clock(iso::VND, FixedClock::default());

        assert_eq!(
            Checkout::begin(store.state(), &true),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn complete_clears_cart_and_returns_order() -> TestResult {
        let (mut store, clock) = filled_store()?;

        let checkout = Checkout::begin(store.state(), &true)?;
        assert_eq!(checkout.total(), Money::from_minor(738_000, iso::VND));

        clock.advance(SignedDuration::from_secs(10));
        let order = checkout.complete(&mut store)?;

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total, Money::from_minor(738_000, iso::VND));
        assert_eq!(order.placed_at, store.state().last_updated());
        assert!(store.state().is_empty());

        Ok(())
    }

    #[test]
    fn complete_rejects_changed_cart() -> TestResult {
        let (mut store, clock) = filled_store()?;
        let checkout = Checkout::begin(store.state(), &true)?;

        clock.advance(SignedDuration::from_secs(5));
        store.update_quantity("sku1", 5)?;

        assert!(matches!(
            checkout.complete(&mut store),
            Err(CheckoutError::CartChanged(_, _))
        ));
        assert_eq!(store.state().item_count(), 5);

        Ok(())
    }

    #[test]
    fn complete_rejects_cart_changed_in_the_same_instant() -> TestResult {
        let (mut store, _clock) = filled_store()?;
        let checkout = Checkout::begin(store.state(), &true)?;

        store.update_quantity("sku1", 5)?;
        store.add_item(
            Some(Product::new("p2", "Spotify")),
            Some(Sku::new("sku2", "1 year", 999_000, iso::VND)),
            1,
        )?;

        assert!(matches!(
            checkout.complete(&mut store),
            Err(CheckoutError::CartChanged(_, _))
        ));
        assert_eq!(store.state().line_count(), 2);
        assert_eq!(
            store.state().total(),
            Money::from_minor(2_844_000, iso::VND)
        );

        Ok(())
    }
}
