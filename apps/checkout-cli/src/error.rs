//! # CLI Error Type
//!
//! Everything that can stop a `checkout` run.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Error Flow in checkout-cli                         │
//! │                                                                         │
//! │  bad flag ───────────► InvalidArgument ──┐                              │
//! │  unreadable file ────► ConfigLoadFailed ─┤                              │
//! │  bad values ─────────► InvalidConfig ────┼──► main: "error: ..." exit 1 │
//! │  core failure ───────► Core ─────────────┤                              │
//! │  stdout / JSON ──────► Output ───────────┘                              │
//! │                                                                         │
//! │  Unknown item keys are NOT errors: they are logged and skipped.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use checkout_core::CoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown flag or missing flag value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Config parsed but holds unusable values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Checkout error: {0}")]
    Core(#[from] CoreError),

    /// Writing the receipt failed.
    #[error("Output failed: {0}")]
    Output(String),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigLoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Output(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Output(err.to_string())
    }
}

impl AppError {
    /// Returns true if the user can fix this by changing the command line
    /// or the config file.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidArgument(_) | AppError::ConfigLoadFailed(_) | AppError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::InvalidArgument("--bogus".to_string());
        assert_eq!(err.to_string(), "Invalid argument: --bogus");
        assert!(err.is_usage_error());

        let err: AppError = CoreError::ItemNotFound("HAT".to_string()).into();
        assert_eq!(err.to_string(), "Checkout error: Item not found: HAT");
        assert!(!err.is_usage_error());
    }

    #[test]
    fn test_toml_error_converts() {
        let parse_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::ConfigLoadFailed(_)));
    }
}
