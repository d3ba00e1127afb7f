//! # checkout-core: Ticket Discount Engine
//!
//! Builds a checkout ticket from catalog items, applies per-item and
//! whole-ticket discount rules, and renders the receipt. Pure logic with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 checkout-cli (apps/checkout-cli)                │   │
//! │  │      config file ──► arguments ──► lookups ──► print receipt    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ checkout-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │   rules   │  │  ticket   │  │  receipt  │  │   │
//! │  │   │   Item    │  │  RuleSet  │  │  Ticket   │  │  Receipt  │  │   │
//! │  │   │  lookup   │  │  2-for-1  │  │  calc()   │  │  render   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO NETWORK • ONE MUTEX PER TICKET        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Items and the read-only catalog
//! - [`rules`] - Discount rules and rule sets
//! - [`ticket`] - The thread-safe ticket and its recalculation
//! - [`receipt`] - Receipt snapshot and text layout
//! - [`money`] - Integer-cent money type
//! - [`error`] - Domain error types
//! - [`validation`] - Catalog input checks
//!
//! ## Example Usage
//!
//! ```rust
//! use checkout_core::{Catalog, RuleSet, Ticket};
//!
//! let catalog = Catalog::standard();
//! let ticket = Ticket::new(RuleSet::standard());
//!
//! for key in ["TSHIRT", "TSHIRT", "TSHIRT", "VOUCHER", "TSHIRT"] {
//!     ticket.add(catalog.lookup(key).unwrap());
//! }
//!
//! // 4 t-shirts at 19.00 + 1 voucher at 5.00
//! assert_eq!(ticket.calc().cents(), 8100);
//! println!("{ticket}");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod receipt;
pub mod rules;
pub mod ticket;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, Item};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{Receipt, ReceiptFormat, ReceiptLine};
pub use rules::{PromotionSettings, Rule, RuleSet, RuleTarget};
pub use ticket::Ticket;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an item key.
pub const MAX_ITEM_KEY_LEN: usize = 32;

/// Maximum length of an item name. The receipt prints the first
/// [`receipt::NAME_WIDTH`] characters.
pub const MAX_ITEM_NAME_LEN: usize = 40;
