//! Cart Store
//!
//! The single writer for a shopper's [`CartState`]. UI components dispatch
//! [`CartAction`]s to the store and re-render from the snapshot it publishes.

use std::{fmt, sync::Arc};

use rusty_money::iso::Currency;
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::{
    actions::CartAction,
    cart::{CartError, CartState},
    clock::{Clock, SystemClock},
    products::{Product, Sku, SkuId},
    quantity::Quantity,
};

new_key_type! {
    /// Subscription Key
    pub struct SubscriptionKey;
}

type Listener = Box<dyn FnMut(&Arc<CartState>) + Send>;

/// Owns the cart state and applies mutations one at a time.
///
/// Every published state is an immutable `Arc<CartState>`, so readers holding
/// an older snapshot never observe a partial update.
pub struct CartStore<C: Clock = SystemClock> {
    state: Arc<CartState>,
    clock: C,
    listeners: SlotMap<SubscriptionKey, Listener>,
}

impl CartStore<SystemClock> {
    /// Create an empty cart priced in `currency`, stamped by the wall clock.
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_clock(currency, SystemClock)
    }
}

impl<C: Clock> CartStore<C> {
    /// Create an empty cart with the given time source.
    pub fn with_clock(currency: &'static Currency, clock: C) -> Self {
        let state = CartState::empty(currency, clock.now());

        Self {
            state: Arc::new(state),
            clock,
            listeners: SlotMap::with_key(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Shared handle to the current state, safe to keep across later mutations.
    pub fn snapshot(&self) -> Arc<CartState> {
        Arc::clone(&self.state)
    }

    /// Apply an action.
    ///
    /// On success returns the (possibly unchanged) current state. Listeners are
    /// only notified when the state actually changed.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the action was rejected; the state is left as it was.
    #[tracing::instrument(
        name = "cart.store.dispatch",
        skip(self, action),
        fields(action = action.kind()),
        err(level = "warn")
    )]
    pub fn dispatch(&mut self, action: CartAction) -> Result<Arc<CartState>, CartError> {
        match self.state.apply(&action, self.clock.now())? {
            Some(next) => {
                debug!(
                    lines = next.line_count(),
                    total = next.total().to_minor_units(),
                    "applied cart action"
                );

                self.publish(next);
            }
            None => debug!("cart action left state unchanged"),
        }

        Ok(self.snapshot())
    }

    /// Add a SKU to the cart, replacing any existing line for it.
    ///
    /// # Errors
    ///
    /// See [`CartState::apply`].
    pub fn add_item(
        &mut self,
        product: Option<Product>,
        sku: Option<Sku>,
        quantity: impl Into<Quantity>,
    ) -> Result<Arc<CartState>, CartError> {
        self.dispatch(CartAction::AddToCart {
            product,
            sku,
            quantity: quantity.into(),
        })
    }

    /// Remove a SKU's line. Unknown SKUs are ignored.
    ///
    /// # Errors
    ///
    /// See [`CartState::apply`].
    pub fn remove_item(&mut self, sku_id: impl Into<SkuId>) -> Result<Arc<CartState>, CartError> {
        self.dispatch(CartAction::remove(sku_id))
    }

    /// Set a SKU's quantity. Unknown SKUs are ignored.
    ///
    /// # Errors
    ///
    /// See [`CartState::apply`].
    pub fn update_quantity(
        &mut self,
        sku_id: impl Into<SkuId>,
        quantity: impl Into<Quantity>,
    ) -> Result<Arc<CartState>, CartError> {
        self.dispatch(CartAction::update_quantity(sku_id, quantity))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// See [`CartState::apply`].
    pub fn clear(&mut self) -> Result<Arc<CartState>, CartError> {
        self.dispatch(CartAction::ClearCart)
    }

    /// Install a previously valid state, e.g. one loaded from storage.
    ///
    /// The state is trusted as-is; it does not pass through the mutation rules.
    pub fn restore(&mut self, state: CartState) {
        debug!(
            lines = state.line_count(),
            last_updated = %state.last_updated(),
            "restored cart state"
        );

        self.publish(state);
    }

    /// Register a listener called with every new state.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Arc<CartState>) + Send + 'static,
    ) -> SubscriptionKey {
        self.listeners.insert(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    fn publish(&mut self, state: CartState) {
        self.state = Arc::new(state);

        for listener in self.listeners.values_mut() {
            listener(&self.state);
        }
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for CartStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use jiff::{SignedDuration, Timestamp};
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use crate::{cart::PayloadError, clock::FixedClock};

    use super::*;

    fn store() -> (CartStore<FixedClock>, FixedClock) {
        let clock = FixedClock::default();

        (CartStore::with_clock(iso::VND, clock.clone()), clock)
    }

    fn netflix() -> Product {
        Product::new("p1", "Netflix")
    }

    fn one_month() -> Sku {
        Sku::new("sku1", "1 month", 369_000, iso::VND)
    }

    #[test]
    fn starts_empty() {
        let (store, _) = store();

        assert!(store.state().is_empty());
        assert_eq!(store.state().last_updated(), Timestamp::UNIX_EPOCH);
    }

    #[test]
    fn dispatch_stamps_last_updated() -> TestResult {
        let (mut store, clock) = store();

        clock.advance(SignedDuration::from_secs(30));
        let state = store.add_item(Some(netflix()), Some(one_month()), 1)?;

        assert_eq!(
            state.last_updated(),
            Timestamp::UNIX_EPOCH + SignedDuration::from_secs(30)
        );

        Ok(())
    }

    #[test]
    fn rejected_add_leaves_state_untouched() -> TestResult {
        let (mut store, clock) = store();
        store.add_item(Some(netflix()), Some(one_month()), 2)?;
        let before = store.snapshot();

        clock.advance(SignedDuration::from_secs(1));

        assert_eq!(
            store.add_item(None, Some(one_month()), 1),
            Err(CartError::InvalidPayload(PayloadError::MissingProduct))
        );
        assert_eq!(
            store.add_item(Some(netflix()), None, 1),
            Err(CartError::InvalidPayload(PayloadError::MissingSku))
        );
        assert_eq!(store.state(), &*before);
        assert_eq!(store.state().item_count(), 2);

        Ok(())
    }

    #[test]
    fn old_snapshots_are_not_mutated() -> TestResult {
        let (mut store, _) = store();
        let empty = store.snapshot();

        store.add_item(Some(netflix()), Some(one_month()), 1)?;

        assert!(empty.is_empty());
        assert_eq!(store.state().line_count(), 1);

        Ok(())
    }

    #[test]
    fn listeners_see_each_change() -> TestResult {
        let (mut store, _) = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        store.subscribe(move |state| {
            if let Ok(mut totals) = sink.lock() {
                totals.push(state.total().to_minor_units());
            }
        });

        store.add_item(Some(netflix()), Some(one_month()), 1)?;
        store.update_quantity("sku1", 3)?;
        store.remove_item("missing")?;
        store.clear()?;

        let totals = seen.lock().map_err(|err| err.to_string())?.clone();

        assert_eq!(totals, [369_000, 1_107_000, 0]);

        Ok(())
    }

    #[test]
    fn unsubscribed_listeners_are_silent() -> TestResult {
        let (mut store, _) = store();
        let calls = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&calls);

        let key = store.subscribe(move |_| {
            if let Ok(mut calls) = sink.lock() {
                *calls += 1;
            }
        });

        store.add_item(Some(netflix()), Some(one_month()), 1)?;

        assert!(store.unsubscribe(key));
        assert!(!store.unsubscribe(key));

        store.clear()?;

        assert_eq!(*calls.lock().map_err(|err| err.to_string())?, 1);

        Ok(())
    }

    #[test]
    fn restore_installs_state_and_notifies() -> TestResult {
        let (mut source, _) = store();
        source.add_item(Some(netflix()), Some(one_month()), 2)?;
        let saved = source.state().clone();

        let (mut store, _) = store();
        let notified = Arc::new(Mutex::new(false));
        let sink = Arc::clone(&notified);

        store.subscribe(move |_| {
            if let Ok(mut flag) = sink.lock() {
                *flag = true;
            }
        });

        store.restore(saved.clone());

        assert_eq!(store.state(), &saved);
        assert_eq!(store.state().total(), Money::from_minor(738_000, iso::VND));
        assert!(*notified.lock().map_err(|err| err.to_string())?);

        Ok(())
    }
}
