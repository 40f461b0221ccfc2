//! Items

use rusty_money::{Money, iso::Currency};

use crate::{
    products::{Product, ProductId, Sku, SkuId},
    quantity::Quantity,
};

/// One entry in the cart: a chosen SKU and how many of it.
///
/// Names, price and image are snapshots taken when the line was added; later
/// catalog changes do not flow into an existing line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    product_id: ProductId,
    sku_id: SkuId,
    name: String,
    sku_name: String,
    price: Money<'static, Currency>,
    quantity: Quantity,
    image: Option<String>,
}

impl CartLineItem {
    /// Build a line item from a product, one of its SKUs and a quantity.
    pub fn new(product: &Product, sku: &Sku, quantity: Quantity) -> Self {
        Self {
            product_id: product.id.clone(),
            sku_id: sku.id.clone(),
            name: product.name.clone(),
            sku_name: sku.name.clone(),
            price: sku.price,
            quantity,
            image: product.thumbnail().map(str::to_string),
        }
    }

    /// Rebuild a line item from stored parts, e.g. a persisted snapshot.
    pub(crate) fn from_parts(
        product_id: ProductId,
        sku_id: SkuId,
        name: String,
        sku_name: String,
        price: Money<'static, Currency>,
        quantity: Quantity,
        image: Option<String>,
    ) -> Self {
        Self {
            product_id,
            sku_id,
            name,
            sku_name,
            price,
            quantity,
            image,
        }
    }

    /// Parent product id
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// SKU id, unique within a cart
    pub fn sku_id(&self) -> &SkuId {
        &self.sku_id
    }

    /// Product display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant display name
    pub fn sku_name(&self) -> &str {
        &self.sku_name
    }

    /// Unit price
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.price
    }

    /// Units requested
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Thumbnail URL, if the product had one.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Thumbnail URL, falling back to `placeholder`.
    pub fn image_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.image().unwrap_or(placeholder)
    }

    /// Copy of this line with a different quantity.
    #[must_use]
    pub(crate) fn with_quantity(&self, quantity: Quantity) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}
