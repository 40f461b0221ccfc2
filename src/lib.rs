//! Storefront
//!
//! Cart state for the account/subscription marketplace storefront: a
//! single-writer [`store::CartStore`] holding line items keyed by SKU with a
//! derived total, plus the persistence, checkout and summary pieces that read
//! from it.

pub mod actions;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod ids;
pub mod items;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod quantity;
pub mod store;
pub mod summary;
pub mod utils;
