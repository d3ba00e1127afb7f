//! # Discount Rules
//!
//! A rule is a pure function from `(occurrence, quantity, price)` to a
//! discount amount. A [`RuleSet`] is a dispatch table that maps an item key,
//! or the whole ticket, to the rule that applies to it.
//!
//! ## Rule Arguments
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Rule(occurrence, quantity, price)                    │
//! │                                                                         │
//! │  Item rule (one call per ticket line with a matching key)               │
//! │  ────────────────────────────────────────────────────                   │
//! │  occurrence  1-based position of this line among lines of the same     │
//! │              item, in the order they were added                         │
//! │  quantity    how many lines of this item the ticket holds right now     │
//! │  price       unit price of the item                                     │
//! │                                                                         │
//! │  Ticket rule (one call per recalculation, after all item rules)         │
//! │  ──────────────────────────────────────────────────────────             │
//! │  occurrence  always 1                                                   │
//! │  quantity    total number of lines on the ticket                        │
//! │  price       subtotal after item discounts                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules must be total: a rule with nothing sensible to say returns
//! `Money::zero()`. They run while the ticket lock is held, so they must be
//! quick and must not touch the ticket.
//!
//! ## Example
//! ```rust
//! use checkout_core::money::Money;
//! use checkout_core::rules::{Rule, RuleSet};
//!
//! // 50 cents off every mug
//! let rules = RuleSet::new().with_item_rule(
//!     "MUG",
//!     Rule::named("mug-50c", |_, _, _| Money::from_cents(50)),
//! );
//! assert!(rules.item_rule("mug").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{TSHIRT, VOUCHER};
use crate::money::Money;
use crate::validation::{normalize_item_key, validate_item_key, ValidationResult};

/// Quantity the bulk rule has to exceed in the standard promotions.
pub const STANDARD_BULK_THRESHOLD: usize = 2;

/// Per-unit bulk discount in the standard promotions.
pub const STANDARD_BULK_DISCOUNT: Money = Money::from_cents(100);

// =============================================================================
// Rule
// =============================================================================

/// Signature every discount rule implements.
pub type RuleFn = dyn Fn(usize, usize, Money) -> Money + Send + Sync;

/// A named, cheaply cloneable discount function.
#[derive(Clone)]
pub struct Rule {
    name: Arc<str>,
    apply: Arc<RuleFn>,
}

impl Rule {
    /// Wraps a closure as an anonymous rule.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(usize, usize, Money) -> Money + Send + Sync + 'static,
    {
        Self::named("custom", f)
    }

    /// Wraps a closure with a name that shows up in logs and `Debug`.
    pub fn named<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(usize, usize, Money) -> Money + Send + Sync + 'static,
    {
        Rule {
            name: name.into(),
            apply: Arc::new(f),
        }
    }

    /// The rule's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the rule.
    #[inline]
    pub fn apply(&self, occurrence: usize, quantity: usize, price: Money) -> Money {
        (self.apply)(occurrence, quantity, price)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

// =============================================================================
// Built-in Rules
// =============================================================================

/// "2-for-1": every second unit of the item is free.
///
/// | occurrence | 1 | 2     | 3 | 4     |
/// |------------|---|-------|---|-------|
/// | discount   | 0 | price | 0 | price |
pub fn buy_one_get_one() -> Rule {
    Rule::named("2-for-1", |occurrence, _quantity, price| {
        if occurrence % 2 == 0 {
            price
        } else {
            Money::zero()
        }
    })
}

/// "3-plus": `per_unit` off every unit once the ticket holds more than
/// `threshold` of the item.
///
/// The discount covers all units, including the ones added before the
/// threshold was crossed, because quantity is the final count at
/// recalculation time.
pub fn bulk_discount(threshold: usize, per_unit: Money) -> Rule {
    Rule::named(format!("bulk>{threshold}"), move |_occurrence, quantity, _price| {
        if quantity > threshold {
            per_unit
        } else {
            Money::zero()
        }
    })
}

/// Whole-ticket rule: `spend_discount` off when the discounted subtotal
/// exceeds `spend_threshold`, otherwise `count_discount` off when the ticket
/// has more than `count_threshold` lines.
pub fn ticket_discount(
    spend_threshold: Money,
    spend_discount: Money,
    count_threshold: usize,
    count_discount: Money,
) -> Rule {
    Rule::named("ticket", move |_occurrence, line_count, subtotal| {
        if subtotal > spend_threshold {
            spend_discount
        } else if line_count > count_threshold {
            count_discount
        } else {
            Money::zero()
        }
    })
}

// =============================================================================
// Rule Set
// =============================================================================

/// What a rule is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleTarget {
    /// Lines of one item, by normalized catalog key.
    Item(String),
    /// The ticket as a whole.
    Ticket,
}

impl RuleTarget {
    /// Target for an item key (normalized).
    pub fn item(key: &str) -> Self {
        RuleTarget::Item(normalize_item_key(key))
    }
}

/// Dispatch table from target to rule.
///
/// A ticket takes its own copy of the set; cloning only bumps reference
/// counts on the rule closures.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<RuleTarget, Rule>,
}

impl RuleSet {
    /// An empty set: nothing is discounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Today's promotions: vouchers are 2-for-1 and t-shirts get 1.00 off
    /// each when buying 3 or more. No whole-ticket rule.
    ///
    /// Same result as `PromotionSettings::default().to_rule_set()`.
    pub fn standard() -> Self {
        RuleSet::new()
            .with_item_rule(VOUCHER, buy_one_get_one())
            .with_item_rule(
                TSHIRT,
                bulk_discount(STANDARD_BULK_THRESHOLD, STANDARD_BULK_DISCOUNT),
            )
    }

    /// Adds (or replaces) the rule for an item key.
    pub fn with_item_rule(mut self, key: &str, rule: Rule) -> Self {
        self.insert(RuleTarget::item(key), rule);
        self
    }

    /// Adds (or replaces) the whole-ticket rule.
    pub fn with_ticket_rule(mut self, rule: Rule) -> Self {
        self.insert(RuleTarget::Ticket, rule);
        self
    }

    /// Inserts a rule, returning the one it replaced.
    pub fn insert(&mut self, target: RuleTarget, rule: Rule) -> Option<Rule> {
        let target = match target {
            RuleTarget::Item(key) => RuleTarget::item(&key),
            RuleTarget::Ticket => RuleTarget::Ticket,
        };
        self.rules.insert(target, rule)
    }

    /// Rule for a target, if any.
    pub fn get(&self, target: &RuleTarget) -> Option<&Rule> {
        self.rules.get(target)
    }

    /// Rule for an item key, if any.
    pub fn item_rule(&self, key: &str) -> Option<&Rule> {
        self.rules.get(&RuleTarget::item(key))
    }

    /// The whole-ticket rule, if any.
    pub fn ticket_rule(&self) -> Option<&Rule> {
        self.rules.get(&RuleTarget::Ticket)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rule is set.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Promotion Settings
// =============================================================================

/// Tunable description of the built-in promotions.
///
/// Amounts are in cents. Missing fields take the standard values, so an
/// empty `[promotions]` table yields [`RuleSet::standard`].
///
/// ```toml
/// two_for_one = "VOUCHER"
/// bulk_item = "TSHIRT"
/// bulk_threshold = 2
/// bulk_discount_cents = 100
/// ticket_discount = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionSettings {
    /// Item that is 2-for-1, if any.
    pub two_for_one: Option<String>,

    /// Item with a bulk discount, if any.
    pub bulk_item: Option<String>,

    /// Quantity the bulk item has to exceed.
    pub bulk_threshold: usize,

    /// Per-unit bulk discount.
    pub bulk_discount_cents: i64,

    /// Enables the whole-ticket rule.
    pub ticket_discount: bool,

    pub ticket_spend_threshold_cents: i64,
    pub ticket_spend_discount_cents: i64,
    pub ticket_count_threshold: usize,
    pub ticket_count_discount_cents: i64,
}

impl Default for PromotionSettings {
    fn default() -> Self {
        PromotionSettings {
            two_for_one: Some(VOUCHER.to_string()),
            bulk_item: Some(TSHIRT.to_string()),
            bulk_threshold: STANDARD_BULK_THRESHOLD,
            bulk_discount_cents: STANDARD_BULK_DISCOUNT.cents(),
            ticket_discount: false,
            ticket_spend_threshold_cents: 50_000,
            ticket_spend_discount_cents: 1_000,
            ticket_count_threshold: 100,
            ticket_count_discount_cents: 500,
        }
    }
}

impl PromotionSettings {
    /// Settings with every promotion switched off.
    pub fn none() -> Self {
        PromotionSettings {
            two_for_one: None,
            bulk_item: None,
            ticket_discount: false,
            ..Self::default()
        }
    }

    /// Checks the configured item keys.
    pub fn validate(&self) -> ValidationResult<()> {
        for key in [&self.two_for_one, &self.bulk_item].into_iter().flatten() {
            validate_item_key(key)?;
        }
        Ok(())
    }

    /// Builds the rule set these settings describe.
    ///
    /// If the same item is named for both 2-for-1 and bulk, the bulk rule
    /// wins: an item has at most one rule.
    pub fn to_rule_set(&self) -> RuleSet {
        let mut rules = RuleSet::new();

        if let Some(key) = &self.two_for_one {
            rules.insert(RuleTarget::item(key), buy_one_get_one());
        }

        if let Some(key) = &self.bulk_item {
            rules.insert(
                RuleTarget::item(key),
                bulk_discount(
                    self.bulk_threshold,
                    Money::from_cents(self.bulk_discount_cents),
                ),
            );
        }

        if self.ticket_discount {
            rules.insert(
                RuleTarget::Ticket,
                ticket_discount(
                    Money::from_cents(self.ticket_spend_threshold_cents),
                    Money::from_cents(self.ticket_spend_discount_cents),
                    self.ticket_count_threshold,
                    Money::from_cents(self.ticket_count_discount_cents),
                ),
            );
        }

        rules
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
