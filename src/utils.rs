//! Utils

use std::path::PathBuf;

use clap::Parser;

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// YAML config file (currency, placeholder image, storage key)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to persist the cart into; in-memory when omitted
    #[clap(short, long)]
    pub storage: Option<PathBuf>,

    /// Quantity for the first add, as typed into the quantity field
    #[clap(short, long, default_value = "1")]
    pub quantity: String,

    /// Start from an empty cart even if one was persisted
    #[clap(long)]
    pub fresh: bool,
}
