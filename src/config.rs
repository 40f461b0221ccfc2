//! Configuration

use std::{fs, path::Path};

use rusty_money::{Findable, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

/// Thumbnail used for line items whose product has no image.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";

/// Storage key the cart snapshot is saved under.
pub const DEFAULT_STORAGE_KEY: &str = "cart";

/// Configuration Errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Cart settings shared by the store, the persistence layer and renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig {
    /// Currency every SKU must be priced in
    pub currency: &'static Currency,

    /// Fallback thumbnail
    pub placeholder_image: String,

    /// Key the cart is persisted under
    pub storage_key: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            currency: rusty_money::iso::VND,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// On-disk shape of [`CartConfig`]. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CartConfigFile {
    currency: Option<String>,
    placeholder_image: Option<String>,
    storage_key: Option<String>,
}

impl CartConfig {
    /// Parse a YAML document, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or names an unknown currency.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let file: CartConfigFile = serde_norway::from_str(contents)?;
        let defaults = Self::default();

        let currency = match file.currency {
            Some(code) => find_currency(&code)?,
            None => defaults.currency,
        };

        Ok(Self {
            currency,
            placeholder_image: file
                .placeholder_image
                .unwrap_or(defaults.placeholder_image),
            storage_key: file.storage_key.unwrap_or(defaults.storage_key),
        })
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }
}

/// Look up an ISO 4217 currency by alpha code (case-insensitive).
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] if the code is not recognised.
pub fn find_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    Currency::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| ConfigError::UnknownCurrency(code.to_string()))
}
