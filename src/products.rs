//! Products

use rusty_money::{Money, iso::Currency};

use crate::ids::TypedId;

/// Product Id
pub type ProductId = TypedId<Product>;

/// SKU Id
pub type SkuId = TypedId<Sku>;

/// Catalog product, as supplied by the product source when adding to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product display name
    pub name: String,

    /// Product image URLs, first one is used as the cart thumbnail
    pub images: Vec<String>,
}

impl Product {
    /// Create a product without images.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            images: Vec::new(),
        }
    }

    /// Attach an image URL.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    /// The cart thumbnail, if the product has any image.
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A purchasable variant of a product (e.g. "Netflix, 1 month").
#[derive(Debug, Clone, PartialEq)]
pub struct Sku {
    /// SKU id
    pub id: SkuId,

    /// Variant display name
    pub name: String,

    /// Unit price
    pub price: Money<'static, Currency>,
}

impl Sku {
    /// Create a SKU priced in minor units of the given currency.
    pub fn new(
        id: impl Into<SkuId>,
        name: impl Into<String>,
        minor_units: i64,
        currency: &'static Currency,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: Money::from_minor(minor_units, currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;

    use super::*;

    #[test]
    fn thumbnail_is_first_image() {
        let product = Product::new("p1", "Netflix")
            .with_image("/img/netflix.png")
            .with_image("/img/netflix-2.png");

        assert_eq!(product.thumbnail(), Some("/img/netflix.png"));
    }

    #[test]
    fn thumbnail_without_images() {
        assert_eq!(Product::new("p1", "Netflix").thumbnail(), None);
    }

    #[test]
    fn sku_price_in_minor_units() {
        let sku = Sku::new("sku1", "1 month", 369_000, iso::VND);

        assert_eq!(sku.price, Money::from_minor(369_000, iso::VND));
        assert_eq!(sku.id, "sku1");
    }
}
