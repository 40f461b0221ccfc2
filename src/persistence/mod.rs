//! Persistence
//!
//! Cart snapshots serialized as JSON into a key-value [`CartStorage`].

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use rusty_money::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::CartState,
    clock::Clock,
    config::{ConfigError, find_currency},
    items::CartLineItem,
    pricing::total_price,
    products::{ProductId, SkuId},
    quantity::Quantity,
    store::CartStore,
};

pub mod storage;
pub mod worker;

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use worker::PersistenceWorker;

/// Persistence Errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Storage backend failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// JSON encoding or decoding error
    #[error("Failed to encode or decode cart snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot names a currency we don't know
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Snapshot decoded but does not describe a valid cart
    #[error("Invalid cart snapshot: {0}")]
    InvalidSnapshot(String),

    /// Background writer could not be started
    #[error("Failed to start persistence worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// Background writer panicked
    #[error("Persistence worker panicked")]
    WorkerPanicked,
}

impl From<ConfigError> for PersistenceError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownCurrency(code) => Self::UnknownCurrency(code),
            other => Self::InvalidSnapshot(other.to_string()),
        }
    }
}

/// Serializable form of a [`CartState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// ISO 4217 alpha code
    pub currency: String,

    /// Line items in display order
    pub items: Vec<LineItemSnapshot>,

    /// Total in minor units
    pub total: i64,

    /// Last mutation time
    pub last_updated: Timestamp,
}

/// Serializable form of a [`CartLineItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemSnapshot {
    /// Parent product id
    pub product_id: ProductId,

    /// SKU id
    pub sku_id: SkuId,

    /// Product display name
    pub name: String,

    /// Variant display name
    pub sku_name: String,

    /// Unit price in minor units
    pub price: i64,

    /// Units requested
    pub quantity: Quantity,

    /// Thumbnail URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&CartLineItem> for LineItemSnapshot {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_id: item.product_id().clone(),
            sku_id: item.sku_id().clone(),
            name: item.name().to_string(),
            sku_name: item.sku_name().to_string(),
            price: item.price().to_minor_units(),
            quantity: item.quantity(),
            image: item.image().map(str::to_string),
        }
    }
}

impl From<&CartState> for CartSnapshot {
    fn from(state: &CartState) -> Self {
        Self {
            currency: state.currency().iso_alpha_code.to_string(),
            items: state.items().iter().map(LineItemSnapshot::from).collect(),
            total: state.total().to_minor_units(),
            last_updated: state.last_updated(),
        }
    }
}

impl CartSnapshot {
    /// Convert back into a cart state.
    ///
    /// Stored data comes from outside the process, so the SKU uniqueness and
    /// total of the snapshot are checked before it is accepted.
    ///
    /// # Errors
    ///
    /// - [`PersistenceError::UnknownCurrency`]: the currency code is not recognised.
    /// - [`PersistenceError::InvalidSnapshot`]: duplicate SKUs, negative prices or a stale total.
    pub fn into_state(self) -> Result<CartState, PersistenceError> {
        let currency = find_currency(&self.currency)?;
        let mut seen = FxHashSet::default();

        let items = self
            .items
            .into_iter()
            .map(|item| {
                if !seen.insert(item.sku_id.clone()) {
                    return Err(PersistenceError::InvalidSnapshot(format!(
                        "duplicate sku {}",
                        item.sku_id
                    )));
                }

                if item.price < 0 {
                    return Err(PersistenceError::InvalidSnapshot(format!(
                        "negative price for sku {}",
                        item.sku_id
                    )));
                }

                Ok(CartLineItem::from_parts(
                    item.product_id,
                    item.sku_id,
                    item.name,
                    item.sku_name,
                    Money::from_minor(item.price, currency),
                    item.quantity,
                    item.image,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = total_price(&items, currency)
            .map_err(|err| PersistenceError::InvalidSnapshot(err.to_string()))?;

        if total.to_minor_units() != self.total {
            return Err(PersistenceError::InvalidSnapshot(format!(
                "stored total {} does not match items total {}",
                self.total,
                total.to_minor_units()
            )));
        }

        Ok(CartState::from_parts(
            items,
            total,
            self.last_updated,
            currency,
        ))
    }
}

/// Write a cart state under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the storage write fails.
pub fn save_cart(
    storage: &mut impl CartStorage,
    key: &str,
    state: &CartState,
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(&CartSnapshot::from(state))?;

    storage.save(key, &json)?;

    Ok(())
}

/// Read the cart state stored under `key`, if any.
///
/// # Errors
///
/// Returns an error if the storage read fails or the stored snapshot is invalid.
pub fn load_cart(
    storage: &impl CartStorage,
    key: &str,
) -> Result<Option<CartState>, PersistenceError> {
    let Some(json) = storage.load(key)? else {
        return Ok(None);
    };

    let snapshot: CartSnapshot = serde_json::from_str(&json)?;

    snapshot.into_state().map(Some)
}

/// Restore the cart stored under `key` into `store`.
///
/// A snapshot priced in a currency other than the store's is left in storage
/// and not restored. Returns whether a state was installed.
///
/// # Errors
///
/// Returns an error if the storage read fails or the stored snapshot is invalid.
pub fn restore_cart<C: Clock>(
    storage: &impl CartStorage,
    key: &str,
    store: &mut CartStore<C>,
) -> Result<bool, PersistenceError> {
    let Some(saved) = load_cart(storage, key)? else {
        return Ok(false);
    };

    let expected = store.state().currency();

    if saved.currency() != expected {
        warn!(
            key,
            saved = saved.currency().iso_alpha_code,
            expected = expected.iso_alpha_code,
            "ignoring persisted cart in another currency"
        );

        return Ok(false);
    }

    store.restore(saved);

    Ok(true)
}
