//! Cart Summary

use std::io;

use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::CartState,
    pricing::{TotalPriceError, line_total},
};

/// Errors that can occur when writing a cart summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A line total overflowed.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Table view of a cart, as shown on the cart page.
#[derive(Debug)]
pub struct CartSummary<'a> {
    cart: &'a CartState,
    placeholder_image: Option<&'a str>,
}

impl<'a> CartSummary<'a> {
    /// Summarise `cart`.
    pub fn new(cart: &'a CartState) -> Self {
        Self {
            cart,
            placeholder_image: None,
        }
    }

    /// Include an image column, using `placeholder` for lines without one.
    #[must_use]
    pub fn with_images(mut self, placeholder: &'a str) -> Self {
        self.placeholder_image = Some(placeholder);
        self
    }

    /// Render the table as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total overflows.
    pub fn render(&self) -> Result<String, SummaryError> {
        let mut builder = Builder::default();
        let currency = self.cart.currency();
        let with_images = self.placeholder_image.is_some();

        let mut header = vec!["#", "Item", "Variant"];
        if with_images {
            header.push("Image");
        }
        header.extend(["Unit Price", "Qty", "Line Total"]);
        builder.push_record(header);

        for (idx, item) in self.cart.items().iter().enumerate() {
            let line = Money::from_minor(line_total(item)?, currency);

            let mut record = vec![
                format!("{}", idx + 1),
                item.name().to_string(),
                item.sku_name().to_string(),
            ];

            if let Some(placeholder) = self.placeholder_image {
                record.push(item.image_or(placeholder).to_string());
            }

            record.extend([
                format!("{}", item.price()),
                item.quantity().to_string(),
                format!("{line}"),
            ]);

            builder.push_record(record);
        }

        let price_columns = if with_images { 4..7 } else { 3..6 };

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Columns::new(price_columns), Alignment::right());

        Ok(format!(
            "{table}\n Items: {}  Total: {}\n",
            self.cart.item_count(),
            self.cart.total()
        ))
    }

    /// Write the table to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total overflows or the write fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        out.write_all(self.render()?.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        actions::CartAction,
        products::{Product, Sku},
    };

    use super::*;

    fn cart() -> TestResult<CartState> {
        let mut cart = CartState::empty(iso::VND, Timestamp::UNIX_EPOCH);

        for action in [
            CartAction::add(
                Product::new("p1", "Netflix").with_image("/img/netflix.png"),
                Sku::new("sku1", "1 month", 369_000, iso::VND),
                3,
            ),
            CartAction::add(
                Product::new("p2", "Spotify"),
                Sku::new("sku2", "1 year", 999_000, iso::VND),
                1,
            ),
        ] {
            if let Some(next) = cart.apply(&action, Timestamp::UNIX_EPOCH)? {
                cart = next;
            }
        }

        Ok(cart)
    }

    #[test]
    fn renders_a_row_per_line() -> TestResult {
        let cart = cart()?;
        let rendered = CartSummary::new(&cart).render()?;

        assert!(rendered.contains("Netflix"), "{rendered}");
        assert!(rendered.contains("1 month"), "{rendered}");
        assert!(rendered.contains("Spotify"), "{rendered}");
        assert!(rendered.contains("Items: 4"), "{rendered}");
        assert!(!rendered.contains("Image"), "{rendered}");

        Ok(())
    }

    #[test]
    fn image_column_uses_placeholder() -> TestResult {
        let cart = cart()?;
        let rendered = CartSummary::new(&cart)
            .with_images("/images/placeholder.png")
            .render()?;

        assert!(rendered.contains("/img/netflix.png"), "{rendered}");
        assert!(rendered.contains("/images/placeholder.png"), "{rendered}");

        Ok(())
    }

    #[test]
    fn write_to_matches_render() -> TestResult {
        let cart = cart()?;
        let summary = CartSummary::new(&cart);
        let mut out = Vec::new();

        summary.write_to(&mut out)?;

        assert_eq!(String::from_utf8(out)?, summary.render()?);

        Ok(())
    }
}
