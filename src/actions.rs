//! Cart Actions

use crate::{
    products::{Product, Sku, SkuId},
    quantity::Quantity,
};

/// A mutation request dispatched to the cart store.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add a SKU, replacing any existing line for the same SKU.
    ///
    /// `product` and `sku` are optional so that half-loaded payloads from the
    /// product source can be rejected by the store instead of the caller.
    AddToCart {
        /// Parent product
        product: Option<Product>,
        /// Variant to add
        sku: Option<Sku>,
        /// Units requested
        quantity: Quantity,
    },

    /// Drop the line for a SKU.
    RemoveFromCart {
        /// SKU to remove
        sku_id: SkuId,
    },

    /// Set the quantity of an existing line.
    UpdateQuantity {
        /// SKU to update
        sku_id: SkuId,
        /// New quantity
        quantity: Quantity,
    },

    /// Empty the cart.
    ClearCart,
}

impl CartAction {
    /// Add a fully-loaded product and SKU.
    pub fn add(product: Product, sku: Sku, quantity: impl Into<Quantity>) -> Self {
        Self::AddToCart {
            product: Some(product),
            sku: Some(sku),
            quantity: quantity.into(),
        }
    }

    /// Remove a SKU.
    pub fn remove(sku_id: impl Into<SkuId>) -> Self {
        Self::RemoveFromCart {
            sku_id: sku_id.into(),
        }
    }

    /// Update a SKU's quantity.
    pub fn update_quantity(sku_id: impl Into<SkuId>, quantity: impl Into<Quantity>) -> Self {
        Self::UpdateQuantity {
            sku_id: sku_id.into(),
            quantity: quantity.into(),
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddToCart { .. } => "add_to_cart",
            Self::RemoveFromCart { .. } => "remove_from_cart",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::ClearCart => "clear_cart",
        }
    }
}
