//! Cart Example
//!
//! Walks a shopper through adding, updating and removing subscriptions, then
//! checks out.
//!
//! Use `-c` to load a YAML config file
//! Use `-s` to persist the cart into a directory (re-run to see it restored)
//! Use `-q` to set the first quantity, as typed into the quantity field
//! Use `--fresh` to ignore any persisted cart

use std::io;

use anyhow::Result;
use clap::Parser;
use storefront::{
    persistence::{CartStorage, FileStorage, MemoryStorage, PersistenceWorker, restore_cart},
    prelude::*,
    utils::ExampleCartArgs,
};
use tracing_subscriber::EnvFilter;

/// Cart Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = ExampleCartArgs::parse();

    let config = match &args.config {
        Some(path) => CartConfig::load(path)?,
        None => CartConfig::default(),
    };

    let storage: Box<dyn CartStorage> = match &args.storage {
        Some(dir) => Box::new(FileStorage::open(dir)?),
        None => Box::new(MemoryStorage::new()),
    };

    let mut store = CartStore::new(config.currency);

    if !args.fresh && restore_cart(&storage, &config.storage_key, &mut store)? {
        println!("Restored {} line(s) from storage", store.state().line_count());
    }

    let worker = PersistenceWorker::spawn(storage, config.storage_key.clone())?;
    worker.attach(&mut store);

    let netflix = Product::new("p1", "Netflix").with_image("/img/netflix.png");
    let spotify = Product::new("p2", "Spotify Premium");

    let quantity: Quantity = args.quantity.parse()?;

    store.add_item(
        Some(netflix.clone()),
        Some(Sku::new("sku1", "1 month", 369_000, config.currency)),
        quantity,
    )?;
    store.add_item(
        Some(spotify),
        Some(Sku::new("sku2", "1 year", 999_000, config.currency)),
        1,
    )?;

    if let Err(err) = store.add_item(Some(netflix), None, 1) {
        println!("Add rejected: {err}");
    }

    store.update_quantity("sku1", 3)?;

    CartSummary::new(store.state())
        .with_images(&config.placeholder_image)
        .write_to(io::stdout().lock())?;

    let checkout = Checkout::begin(store.state(), &true)?;
    let order = checkout.complete(&mut store)?;

    println!(
        "\nOrder placed at {}: {} line(s), {}",
        order.placed_at,
        order.items.len(),
        order.total
    );

    worker.shutdown()?;

    Ok(())
}
