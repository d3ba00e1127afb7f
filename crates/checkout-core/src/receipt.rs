//! # Receipt
//!
//! Owned snapshot of a calculated ticket and its text rendering.
//!
//! ## Layout
//! ```text
//!
//! CHECKOUT STORE   date: 18, Oct/2026 09:30
//!
//! Article              Price  Disc.  Total
//! ------------------- ------ ------ ------
//!             Voucher   5.00   0.00   5.00
//!             T-Shirt  20.00   1.00  19.00
//! ------------------- ------ ------ ------
//!                          Disc.:   10.00
//!                          Total:  481.00
//!
//! ```
//!
//! The `Disc.:` row only appears when a whole-ticket discount applied.

use std::fmt::{self, Write as _};

use chrono::format::{Item as FormatItem, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Width of the article column. Longer names are cut.
pub const NAME_WIDTH: usize = 19;

/// Store name printed in the header when none is configured.
pub const DEFAULT_STORE_NAME: &str = "CHECKOUT STORE";

/// Header date layout when none is configured (`18, Oct/2026 09:30`).
pub const DEFAULT_DATE_FORMAT: &str = "%d, %b/%Y %H:%M";

const SEPARATOR: &str = "------------------- ------ ------ ------";

// =============================================================================
// Receipt Format
// =============================================================================

/// Presentation settings for the receipt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptFormat {
    /// Header title.
    #[serde(rename = "name")]
    pub store_name: String,

    /// chrono `strftime` pattern for the header date.
    pub date_format: String,
}

impl Default for ReceiptFormat {
    fn default() -> Self {
        ReceiptFormat {
            store_name: DEFAULT_STORE_NAME.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ReceiptFormat {
    /// True if chrono can format dates with `pattern`.
    pub fn is_valid_date_format(pattern: &str) -> bool {
        !pattern.is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, FormatItem::Error))
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// One printed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub key: String,
    pub name: String,
    pub unit_price: Money,
    pub discount: Money,
    /// `unit_price - discount`
    pub line_total: Money,
}

/// A calculated ticket, detached from the ticket's lock.
///
/// Produced by [`Ticket::receipt`](crate::Ticket::receipt), which always
/// recalculates a stale ticket first, so a receipt never carries outdated
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub ticket_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    /// Sum of line totals, before the whole-ticket discount.
    pub subtotal: Money,
    pub ticket_discount: Money,
    pub total: Money,
}

impl Receipt {
    /// Renders the receipt as text.
    pub fn render(&self, format: &ReceiptFormat) -> String {
        self.display(format).to_string()
    }

    /// A `Display` adapter using the given format.
    pub fn display<'a>(&'a self, format: &'a ReceiptFormat) -> ReceiptDisplay<'a> {
        ReceiptDisplay {
            receipt: self,
            format,
        }
    }

    /// Total of all line discounts.
    pub fn item_discounts(&self) -> Money {
        self.lines.iter().map(|line| line.discount).sum()
    }

    fn header_date(&self, pattern: &str) -> String {
        let mut date = String::new();
        if ReceiptFormat::is_valid_date_format(pattern)
            && write!(date, "{}", self.created_at.format(pattern)).is_ok()
        {
            return date;
        }
        self.created_at.format(DEFAULT_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = ReceiptFormat::default();
        fmt::Display::fmt(&self.display(&format), f)
    }
}

/// Formats a [`Receipt`] with a specific [`ReceiptFormat`].
pub struct ReceiptDisplay<'a> {
    receipt: &'a Receipt,
    format: &'a ReceiptFormat,
}

impl fmt::Display for ReceiptDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let receipt = self.receipt;

        writeln!(f)?;
        writeln!(
            f,
            "{}   date:{:>19}",
            self.format.store_name,
            receipt.header_date(&self.format.date_format)
        )?;
        writeln!(f)?;
        writeln!(f, "{:<19} {:>6} {:>6} {:>6}", "Article", "Price", "Disc.", "Total")?;
        writeln!(f, "{SEPARATOR}")?;

        for line in &receipt.lines {
            writeln!(
                f,
                "{:>width$.width$} {:>6} {:>6} {:>6}",
                line.name,
                line.unit_price,
                line.discount,
                line.line_total,
                width = NAME_WIDTH
            )?;
        }

        writeln!(f, "{SEPARATOR}")?;
        if !receipt.ticket_discount.is_zero() {
            writeln!(f, "{:>31}  {:>6}", "Disc.:", receipt.ticket_discount)?;
        }
        writeln!(f, "{:>31}  {:>6}", "Total:", receipt.total)?;
        writeln!(f)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
