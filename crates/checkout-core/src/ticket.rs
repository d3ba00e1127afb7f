//! # Ticket
//!
//! The one stateful object in the engine: an append-only list of purchased
//! lines plus the discounts and totals derived from them.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ticket Freshness                                │
//! │                                                                         │
//! │              add(item) / set_discount(rules)                           │
//! │          ┌──────────────────────────────────────┐                      │
//! │          │                                      │                      │
//! │          ▼                                      │                      │
//! │   ┌─────────────┐        calc()          ┌─────────────┐               │
//! │   │    STALE    │ ─────────────────────► │    FRESH    │               │
//! │   │  (initial)  │                        │             │               │
//! │   └─────────────┘ ◄───────────────────── └─────────────┘               │
//! │          │           add / set_discount         │                      │
//! │          │                                      │                      │
//! │          └──── render() = calc() + format ──────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! All state lives behind one `Mutex`. Every public method takes the lock
//! for its whole body, so a recalculation is atomic: no caller can observe
//! a half-updated set of line discounts. Share a ticket between threads
//! with `Arc<Ticket>`.
//!
//! ## Example
//! ```rust
//! use checkout_core::{Catalog, RuleSet, Ticket};
//!
//! let catalog = Catalog::standard();
//! let ticket = Ticket::new(RuleSet::standard());
//!
//! for key in ["VOUCHER", "TSHIRT", "VOUCHER"] {
//!     ticket.add(catalog.lookup(key).unwrap());
//! }
//!
//! assert_eq!(ticket.calc().cents(), 2500);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::catalog::Item;
use crate::money::Money;
use crate::receipt::{Receipt, ReceiptFormat, ReceiptLine};
use crate::rules::RuleSet;
use crate::validation::normalize_item_key;

// =============================================================================
// Line
// =============================================================================

/// One purchased unit. `discount` is only meaningful while the ticket is
/// fresh.
#[derive(Debug, Clone)]
struct Line {
    item: Arc<Item>,
    discount: Money,
}

// =============================================================================
// Ticket State
// =============================================================================

#[derive(Debug)]
struct TicketState {
    lines: Vec<Line>,
    rules: RuleSet,
    subtotal: Money,
    ticket_discount: Money,
    total: Money,
    fresh: bool,
    /// Per-item occurrence counter, rebuilt on every recalculation.
    occurrences: HashMap<String, usize>,
}

impl TicketState {
    fn new(rules: RuleSet) -> Self {
        TicketState {
            lines: Vec::new(),
            rules,
            subtotal: Money::zero(),
            ticket_discount: Money::zero(),
            total: Money::zero(),
            fresh: false,
            occurrences: HashMap::new(),
        }
    }

    /// Lines referencing the item with this key (full scan).
    fn count_of(&self, key: &str) -> usize {
        self.lines.iter().filter(|line| line.item.key() == key).count()
    }

    /// Re-derives every line discount and the totals.
    ///
    /// ## Algorithm
    /// 1. Reset the occurrence counter
    /// 2. For each line in add order, if its item has a rule: bump the
    ///    item's occurrence, rescan for its quantity, store
    ///    `rule(occurrence, quantity, price)` as the line discount
    /// 3. Apply the ticket rule once to the discounted subtotal
    /// 4. `total = subtotal - ticket_discount`
    ///
    /// The rescan in step 2 makes this O(n²) in the number of lines.
    fn recalculate(&mut self) -> Money {
        // Cleared first so a panicking rule cannot leave the ticket marked
        // fresh with half-updated discounts.
        self.fresh = false;
        self.occurrences.clear();

        let mut subtotal = Money::zero();

        for index in 0..self.lines.len() {
            let item = Arc::clone(&self.lines[index].item);
            let price = item.price();

            let discount = match self.rules.item_rule(item.key()) {
                Some(rule) => {
                    let occurrence = self.occurrences.entry(item.key().to_string()).or_insert(0);
                    *occurrence += 1;
                    let occurrence = *occurrence;
                    let quantity = self.count_of(item.key());
                    rule.apply(occurrence, quantity, price)
                }
                None => Money::zero(),
            };

            self.lines[index].discount = discount;
            subtotal += price - discount;
        }

        let ticket_discount = match self.rules.ticket_rule() {
            Some(rule) => rule.apply(1, self.lines.len(), subtotal),
            None => Money::zero(),
        };

        self.subtotal = subtotal;
        self.ticket_discount = ticket_discount;
        self.total = subtotal - ticket_discount;
        self.fresh = true;

        self.total
    }

    fn snapshot(&self, id: Uuid, created_at: DateTime<Utc>) -> Receipt {
        let lines = self
            .lines
            .iter()
            .map(|line| ReceiptLine {
                key: line.item.key().to_string(),
                name: line.item.name().to_string(),
                unit_price: line.item.price(),
                discount: line.discount,
                line_total: line.item.price() - line.discount,
            })
            .collect();

        Receipt {
            ticket_id: id,
            created_at,
            lines,
            subtotal: self.subtotal,
            ticket_discount: self.ticket_discount,
            total: self.total,
        }
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// A checkout ticket.
///
/// ## Invariants
/// - Lines are append-only and keep their insertion order
/// - While fresh, every line discount and the total match the current
///   lines and rules
/// - `add` and `set_discount` always leave the ticket stale
#[derive(Debug)]
pub struct Ticket {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: Mutex<TicketState>,
}

impl Ticket {
    /// Creates an empty, stale ticket stamped with the current time.
    pub fn new(rules: RuleSet) -> Self {
        Self::with_timestamp(rules, Utc::now())
    }

    /// Creates an empty ticket with a caller-supplied creation time.
    pub fn with_timestamp(rules: RuleSet, created_at: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        debug!(ticket_id = %id, rules = rules.len(), "Ticket created");
        Ticket {
            id,
            created_at,
            state: Mutex::new(TicketState::new(rules)),
        }
    }

    /// Unique ticket identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the ticket was opened.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the discount rules. Cached totals become stale.
    pub fn set_discount(&self, rules: RuleSet) {
        let mut state = self.lock();
        state.rules = rules;
        state.fresh = false;
    }

    /// Appends one unit of `item`. Does not recalculate.
    pub fn add(&self, item: Arc<Item>) {
        let mut state = self.lock();
        trace!(ticket_id = %self.id, key = %item.key(), lines = state.lines.len() + 1, "Item added");
        state.lines.push(Line {
            item,
            discount: Money::zero(),
        });
        state.fresh = false;
    }

    /// Recalculates every discount and returns the new total.
    ///
    /// Idempotent: calling it again without an intervening `add` or
    /// `set_discount` gives the same total and line discounts.
    pub fn calc(&self) -> Money {
        let mut state = self.lock();
        let total = state.recalculate();
        debug!(
            ticket_id = %self.id,
            lines = state.lines.len(),
            subtotal = %state.subtotal,
            ticket_discount = %state.ticket_discount,
            total = %total,
            "Ticket recalculated"
        );
        total
    }

    /// True if the cached totals reflect the current lines and rules.
    pub fn is_fresh(&self) -> bool {
        self.lock().fresh
    }

    /// The cached total, or `None` if the ticket needs a `calc()`.
    pub fn total(&self) -> Option<Money> {
        let state = self.lock();
        state.fresh.then_some(state.total)
    }

    /// Number of lines (units) on the ticket.
    pub fn line_count(&self) -> usize {
        self.lock().lines.len()
    }

    /// Number of lines of the item with this key.
    pub fn quantity_of(&self, key: &str) -> usize {
        self.lock().count_of(&normalize_item_key(key))
    }

    /// Recalculates if stale and returns an owned snapshot of the result.
    ///
    /// The recalculation and the copy happen under one lock acquisition, so
    /// the snapshot can never mix numbers from before and after a
    /// concurrent `add`.
    pub fn receipt(&self) -> Receipt {
        let mut state = self.lock();
        if !state.fresh {
            state.recalculate();
        }
        state.snapshot(self.id, self.created_at)
    }

    /// Formats the ticket with the given receipt layout.
    pub fn render_with(&self, format: &ReceiptFormat) -> String {
        self.receipt().render(format)
    }

    /// Formats the ticket with the default receipt layout.
    pub fn render(&self) -> String {
        self.render_with(&ReceiptFormat::default())
    }

    /// A poisoned lock only means a rule panicked mid-recalculation; the
    /// state is then marked stale and the next `calc` rebuilds it.
    fn lock(&self) -> MutexGuard<'_, TicketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.receipt(), f)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, MUG, TSHIRT, VOUCHER};
    use crate::rules::{bulk_discount, buy_one_get_one, ticket_discount, Rule};

    fn ticket_with(keys: &[&str]) -> Ticket {
        let catalog = Catalog::standard();
        let ticket = Ticket::new(RuleSet::standard());
        for key in keys {
            ticket.add(catalog.lookup(key).unwrap());
        }
        ticket
    }

    fn item(key: &str) -> Arc<Item> {
        Catalog::standard().lookup(key).unwrap()
    }

    // -------------------------------------------------------------------------
    // Reference scenarios
    // -------------------------------------------------------------------------

    #[test]
    fn test_no_discount_qualifies() {
        let ticket = ticket_with(&[VOUCHER, TSHIRT, MUG]);
        assert_eq!(ticket.calc(), Money::from_cents(3250));
    }

    #[test]
    fn test_two_for_one_pair() {
        let ticket = ticket_with(&[VOUCHER, TSHIRT, VOUCHER]);
        assert_eq!(ticket.calc(), Money::from_cents(2500));
    }

    #[test]
    fn test_bulk_tshirts() {
        let ticket = ticket_with(&[TSHIRT, TSHIRT, TSHIRT, VOUCHER, TSHIRT]);
        assert_eq!(ticket.calc(), Money::from_cents(8100));
    }

    #[test]
    fn test_all_discounts() {
        let ticket = ticket_with(&[VOUCHER, TSHIRT, VOUCHER, VOUCHER, MUG, TSHIRT, TSHIRT]);
        assert_eq!(ticket.calc(), Money::from_cents(7450));
    }

    #[test]
    fn test_line_discounts_follow_occurrence_order() {
        let ticket = ticket_with(&[VOUCHER, TSHIRT, VOUCHER, VOUCHER, MUG, TSHIRT, TSHIRT]);
        let receipt = ticket.receipt();
        let discounts: Vec<i64> = receipt.lines.iter().map(|l| l.discount.cents()).collect();
        // vouchers: 1st 0, 2nd free, 3rd 0; every t-shirt 1.00 off; mug none
        assert_eq!(discounts, vec![0, 100, 500, 0, 0, 100, 100]);
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    #[test]
    fn test_two_for_one_charges_half_rounded_up() {
        let voucher = item(VOUCHER);
        for n in 0..=9usize {
            let ticket = Ticket::new(RuleSet::standard());
            for _ in 0..n {
                ticket.add(Arc::clone(&voucher));
            }
            assert_eq!(ticket.calc(), voucher.price() * n.div_ceil(2), "n = {n}");
        }
    }

    #[test]
    fn test_bulk_threshold_totals() {
        let shirt = item(TSHIRT);
        let price = shirt.price();
        for n in 0..=8usize {
            let ticket = Ticket::new(RuleSet::standard());
            for _ in 0..n {
                ticket.add(Arc::clone(&shirt));
            }
            let expected = if n <= 2 {
                price * n
            } else {
                (price - Money::from_cents(100)) * n
            };
            assert_eq!(ticket.calc(), expected, "n = {n}");
        }
    }

    #[test]
    fn test_calc_is_idempotent() {
        let ticket = ticket_with(&[VOUCHER, TSHIRT, VOUCHER, TSHIRT, TSHIRT]);
        let first = ticket.calc();
        let first_receipt = ticket.receipt();
        let second = ticket.calc();
        let second_receipt = ticket.receipt();

        assert_eq!(first, second);
        assert_eq!(first_receipt.lines, second_receipt.lines);
        assert_eq!(first_receipt.total, second_receipt.total);
    }

    #[test]
    fn test_order_of_different_items_does_not_matter() {
        let a = ticket_with(&[VOUCHER, VOUCHER, TSHIRT, TSHIRT, TSHIRT, MUG]);
        let b = ticket_with(&[TSHIRT, MUG, VOUCHER, TSHIRT, VOUCHER, TSHIRT]);
        let c = ticket_with(&[MUG, TSHIRT, TSHIRT, TSHIRT, VOUCHER, VOUCHER]);
        assert_eq!(a.calc(), b.calc());
        assert_eq!(b.calc(), c.calc());
    }

    // -------------------------------------------------------------------------
    // Freshness
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_ticket_is_stale_with_zero_total() {
        let ticket = Ticket::new(RuleSet::standard());
        assert!(!ticket.is_fresh());
        assert_eq!(ticket.total(), None);
        assert_eq!(ticket.calc(), Money::zero());
        assert!(ticket.is_fresh());
        assert_eq!(ticket.total(), Some(Money::zero()));
    }

    #[test]
    fn test_add_after_calc_marks_stale() {
        let voucher = item(VOUCHER);
        let ticket = Ticket::new(RuleSet::standard());

        ticket.add(Arc::clone(&voucher));
        ticket.add(Arc::clone(&voucher));
        assert_eq!(ticket.calc(), voucher.price());
        assert_eq!(ticket.total(), Some(voucher.price()));

        ticket.add(Arc::clone(&voucher));
        assert!(!ticket.is_fresh());
        assert_eq!(ticket.total(), None);
        assert_eq!(ticket.calc(), voucher.price() * 2i64);

        ticket.add(voucher.clone());
        assert_eq!(ticket.calc(), voucher.price() * 2i64);
    }

    #[test]
    fn test_bulk_applies_retroactively_after_add() {
        let shirt = item(TSHIRT);
        let price = shirt.price();
        let ticket = Ticket::new(RuleSet::standard());

        ticket.add(Arc::clone(&shirt));
        ticket.add(Arc::clone(&shirt));
        assert_eq!(ticket.calc(), price * 2i64);

        ticket.add(Arc::clone(&shirt));
        assert_eq!(ticket.calc(), (price - Money::from_cents(100)) * 3i64);

        ticket.add(shirt);
        assert_eq!(ticket.calc(), (price - Money::from_cents(100)) * 4i64);
    }

    #[test]
    fn test_set_discount_marks_stale_and_reprices() {
        let ticket = ticket_with(&[VOUCHER, VOUCHER]);
        assert_eq!(ticket.calc().cents(), 500);

        ticket.set_discount(RuleSet::new());
        assert!(!ticket.is_fresh());
        assert_eq!(ticket.calc().cents(), 1000);

        ticket.set_discount(RuleSet::standard());
        assert_eq!(ticket.calc().cents(), 500);
    }

    #[test]
    fn test_receipt_recalculates_stale_ticket() {
        let ticket = ticket_with(&[VOUCHER, VOUCHER]);
        ticket.calc();
        ticket.add(item(VOUCHER));

        let receipt = ticket.receipt();
        assert_eq!(receipt.lines.len(), 3);
        assert_eq!(receipt.total.cents(), 1000);
        assert!(ticket.is_fresh());
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    #[test]
    fn test_item_without_rule_is_never_discounted() {
        let ticket = ticket_with(&[MUG, MUG, MUG, MUG]);
        assert_eq!(ticket.calc().cents(), 3000);
        assert!(ticket.receipt().lines.iter().all(|l| l.discount.is_zero()));
    }

    #[test]
    fn test_rule_receives_occurrence_and_quantity() {
        // Discount = occurrence * 10 + quantity, to expose the arguments.
        let probe = Rule::named("probe", |occurrence, quantity, _| {
            Money::from_cents((occurrence * 10 + quantity) as i64)
        });
        let ticket = ticket_with(&[MUG, VOUCHER, MUG, MUG]);
        ticket.set_discount(RuleSet::new().with_item_rule(MUG, probe));

        let discounts: Vec<i64> = ticket.receipt().lines.iter().map(|l| l.discount.cents()).collect();
        assert_eq!(discounts, vec![13, 0, 23, 33]);
    }

    #[test]
    fn test_ticket_rule_applies_once_to_discounted_subtotal() {
        let rules = RuleSet::standard().with_ticket_rule(Rule::named("probe", |occurrence, count, subtotal| {
            assert_eq!(occurrence, 1);
            assert_eq!(count, 3);
            // 5 + 20 + 0 after the voucher pair
            assert_eq!(subtotal.cents(), 2500);
            Money::from_cents(250)
        }));
        let ticket = Ticket::new(rules);
        for key in [VOUCHER, TSHIRT, VOUCHER] {
            ticket.add(item(key));
        }

        assert_eq!(ticket.calc().cents(), 2250);
        let receipt = ticket.receipt();
        assert_eq!(receipt.subtotal.cents(), 2500);
        assert_eq!(receipt.ticket_discount.cents(), 250);
    }

    #[test]
    fn test_builtin_ticket_discount_over_spend() {
        let rules = RuleSet::standard().with_ticket_rule(ticket_discount(
            Money::from_cents(50_000),
            Money::from_cents(1_000),
            100,
            Money::from_cents(500),
        ));
        let ticket = Ticket::new(rules);
        let shirt = item(TSHIRT);
        // 26 shirts at 19.00 = 494.00, 27 = 513.00
        for _ in 0..26 {
            ticket.add(Arc::clone(&shirt));
        }
        assert_eq!(ticket.calc().cents(), 49_400);
        ticket.add(shirt);
        assert_eq!(ticket.calc().cents(), 51_300 - 1_000);
    }

    #[test]
    fn test_zero_and_negative_prices() {
        let catalog = Catalog::builder()
            .item("SAMPLE", "Free Sample", Money::zero())
            .item("RETURN", "Bottle Return", Money::from_cents(-25))
            .build()
            .unwrap();
        let rules = RuleSet::new()
            .with_item_rule("SAMPLE", bulk_discount(1, Money::from_cents(10)))
            .with_item_rule("RETURN", buy_one_get_one());
        let ticket = Ticket::new(rules);

        for key in ["SAMPLE", "SAMPLE", "RETURN", "RETURN", "RETURN"] {
            ticket.add(catalog.lookup(key).unwrap());
        }

        // samples: 2 x (0 - 0.10); returns: -0.25 + 0 + -0.25
        assert_eq!(ticket.calc().cents(), -20 - 50);
    }

    #[test]
    fn test_quantity_of() {
        let ticket = ticket_with(&[VOUCHER, TSHIRT, VOUCHER]);
        assert_eq!(ticket.quantity_of(VOUCHER), 2);
        assert_eq!(ticket.quantity_of("tshirt"), 1);
        assert_eq!(ticket.quantity_of(MUG), 0);
        assert_eq!(ticket.line_count(), 3);
    }

    // -------------------------------------------------------------------------
    // Concurrency
    // -------------------------------------------------------------------------

    #[test]
    fn test_concurrent_adds_lose_nothing() {
        const THREADS: usize = 8;
        const ADDS_PER_THREAD: usize = 250;

        let ticket = Arc::new(Ticket::new(RuleSet::standard()));
        let voucher = item(VOUCHER);
        let shirt = item(TSHIRT);

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let ticket = Arc::clone(&ticket);
                let voucher = Arc::clone(&voucher);
                let shirt = Arc::clone(&shirt);
                scope.spawn(move || {
                    for i in 0..ADDS_PER_THREAD {
                        if (t + i) % 2 == 0 {
                            ticket.add(Arc::clone(&voucher));
                        } else {
                            ticket.add(Arc::clone(&shirt));
                        }
                    }
                });
            }
        });

        let total_lines = THREADS * ADDS_PER_THREAD;
        assert_eq!(ticket.line_count(), total_lines);
        assert_eq!(ticket.quantity_of(VOUCHER), total_lines / 2);
        assert_eq!(ticket.quantity_of(TSHIRT), total_lines / 2);

        // 1000 vouchers: 500 paid; 1000 shirts at 19.00
        let expected = voucher.price() * 500usize + (shirt.price() - Money::from_cents(100)) * 1000usize;
        assert_eq!(ticket.calc(), expected);
    }

    #[test]
    fn test_concurrent_calc_and_render_see_consistent_snapshots() {
        let ticket = Arc::new(Ticket::new(RuleSet::standard()));
        let voucher = item(VOUCHER);

        std::thread::scope(|scope| {
            let adder = Arc::clone(&ticket);
            let unit = Arc::clone(&voucher);
            scope.spawn(move || {
                for _ in 0..500 {
                    adder.add(Arc::clone(&unit));
                }
            });

            for _ in 0..4 {
                let reader = Arc::clone(&ticket);
                let price = voucher.price();
                scope.spawn(move || {
                    for _ in 0..100 {
                        let receipt = reader.receipt();
                        let n = receipt.lines.len();
                        assert_eq!(receipt.total, price * n.div_ceil(2));
                        let sum: Money = receipt.lines.iter().map(|l| l.line_total).sum();
                        assert_eq!(sum, receipt.subtotal);
                    }
                });
            }
        });

        assert_eq!(ticket.calc(), voucher.price() * 250usize);
    }
}
