//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    actions::CartAction,
    cart::{CartError, CartState, PayloadError},
    checkout::{AuthStatus, Checkout, CheckoutError, Order},
    clock::{Clock, FixedClock, SystemClock},
    config::{CartConfig, ConfigError},
    items::CartLineItem,
    persistence::{
        CartSnapshot, CartStorage, FileStorage, MemoryStorage, PersistenceError,
        PersistenceWorker, load_cart, restore_cart, save_cart,
    },
    pricing::TotalPriceError,
    products::{Product, ProductId, Sku, SkuId},
    quantity::{Quantity, QuantityError},
    store::{CartStore, SubscriptionKey},
    summary::{CartSummary, SummaryError},
};
