//! # Checkout Configuration
//!
//! Store header and promotion settings for the CLI.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CHECKOUT_STORE_NAME="CORNER SHOP"                                  │
//! │     CHECKOUT_DATE_FORMAT="%Y-%m-%d %H:%M"                              │
//! │     CHECKOUT_TICKET_DISCOUNT=true                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <PATH>, or                                                │
//! │     ~/.config/checkout/checkout.toml (Linux)                           │
//! │     ~/Library/Application Support/com.checkout.store/checkout.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     "CHECKOUT STORE", standard promotions                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "CHECKOUT STORE"
//! date_format = "%d, %b/%Y %H:%M"
//!
//! [promotions]
//! two_for_one = "VOUCHER"
//! bulk_item = "TSHIRT"
//! bulk_threshold = 2
//! bulk_discount_cents = 100
//! ticket_discount = false
//! ```

use std::path::{Path, PathBuf};

use checkout_core::{PromotionSettings, ReceiptFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Overrides the store name printed in the receipt header.
pub const ENV_STORE_NAME: &str = "CHECKOUT_STORE_NAME";
/// Overrides the receipt date format.
pub const ENV_DATE_FORMAT: &str = "CHECKOUT_DATE_FORMAT";
/// Switches the whole-ticket discount on or off.
pub const ENV_TICKET_DISCOUNT: &str = "CHECKOUT_TICKET_DISCOUNT";

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Receipt header settings.
    #[serde(default)]
    pub store: ReceiptFormat,

    /// Which built-in promotions are active.
    #[serde(default)]
    pub promotions: PromotionSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `explicit_path` if given (it must exist), otherwise
    ///    the platform config file if present
    /// 3. Environment variables
    pub fn load(explicit_path: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit variable lookup in place of
    /// the process environment.
    pub fn load_with<F>(explicit_path: Option<PathBuf>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document.
    pub fn from_toml(contents: &str) -> AppResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading checkout config from file");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.store.store_name.trim().is_empty() {
            return Err(AppError::InvalidConfig("store name must not be empty".into()));
        }

        if !ReceiptFormat::is_valid_date_format(&self.store.date_format) {
            return Err(AppError::InvalidConfig(format!(
                "invalid date format: '{}'",
                self.store.date_format
            )));
        }

        self.promotions
            .validate()
            .map_err(|e| AppError::InvalidConfig(format!("promotions: {}", e)))?;

        Ok(())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_STORE_NAME) {
            debug!(store_name = %name, "Overriding store name from environment");
            self.store.store_name = name;
        }

        if let Some(format) = lookup(ENV_DATE_FORMAT) {
            self.store.date_format = format;
        }

        if let Some(flag) = lookup(ENV_TICKET_DISCOUNT) {
            match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.promotions.ticket_discount = true,
                "0" | "false" | "no" | "off" => self.promotions.ticket_discount = false,
                _ => warn!(value = %flag, "Unknown ticket discount flag in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "checkout", "store")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }
}
