//! # Error Types
//!
//! Domain-specific error types for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                      │
//! │  ├── CoreError        - Catalog lookups, wrapped validation            │
//! │  └── ValidationError  - Catalog construction input failures            │
//! │                                                                         │
//! │  checkout-cli errors (app crate)                                       │
//! │  └── AppError         - Config, arguments, output                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ticket operations have no error path at all: discount rules are total
//! functions and a recalculation either completes or waits for the lock.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item key is not in the catalog.
    ///
    /// ## When This Occurs
    /// - Typo at the till (`"VOUCHR"`)
    /// - Item removed from a custom catalog
    ///
    /// Recoverable: the caller skips the item or asks again.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for the recoverable "no such item" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ItemNotFound(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. a key with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. two catalog items with the same key).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
