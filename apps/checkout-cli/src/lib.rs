//! # checkout-cli
//!
//! Prints a receipt for the items named on the command line.
//!
//! ## Usage
//! ```bash
//! # Voucher, T-Shirt, Voucher  →  total 25.00
//! checkout VOUCHER TSHIRT VOUCHER
//!
//! # Same ticket as JSON
//! checkout --json VOUCHER TSHIRT VOUCHER
//!
//! # Custom config, debug logging
//! RUST_LOG=debug checkout -c ./checkout.toml MUG MUG
//! ```
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize tracing (stderr, RUST_LOG)                               │
//! │  2. Parse arguments                                                     │
//! │  3. Load config (defaults → file → environment)                         │
//! │  4. Look every key up in the catalog; unknown keys are skipped          │
//! │  5. Add items to one ticket, render receipt (text or JSON) to stdout    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;

use std::io::Write;
use std::path::PathBuf;

use checkout_core::{Catalog, PromotionSettings, RuleSet, Ticket};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::CheckoutConfig;
use error::{AppError, AppResult};

// =============================================================================
// Arguments
// =============================================================================

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// `-c, --config <PATH>`
    pub config: Option<PathBuf>,
    /// `--json`
    pub json: bool,
    /// `--no-promotions`
    pub no_promotions: bool,
    /// `-h, --help`
    pub help: bool,
    /// Item keys, in purchase order.
    pub items: Vec<String>,
}

impl CliArgs {
    /// Parses arguments (without the program name).
    pub fn parse<I>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or_else(|| {
                        AppError::InvalidArgument(format!("{} requires a path", arg))
                    })?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--json" => parsed.json = true,
                "--no-promotions" => parsed.no_promotions = true,
                "--help" | "-h" => parsed.help = true,
                "--" => parsed.items.extend(args.by_ref()),
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(AppError::InvalidArgument(flag.to_string()));
                }
                _ => parsed.items.push(arg),
            }
        }

        Ok(parsed)
    }
}

/// Help text, listing the catalog.
pub fn usage(catalog: &Catalog) -> String {
    let mut text = String::from(
        "Checkout receipt printer\n\
         \n\
         Usage: checkout [OPTIONS] <ITEM>...\n\
         \n\
         Options:\n\
         \x20 -c, --config <PATH>   Config file (TOML)\n\
         \x20     --json            Print the receipt as JSON\n\
         \x20     --no-promotions   Charge full price\n\
         \x20 -h, --help            Show this help message\n\
         \n\
         Arguments:\n",
    );
    let keys: Vec<&str> = catalog.keys().collect();
    text.push_str(&format!("  <ITEM>...   One of {} (any case)\n\n", keys.join(", ")));
    text.push_str(&format!("Items ({}):\n", catalog.len()));
    for item in catalog.items() {
        text.push_str(&format!("  {:<10} {:<20} {:>7}\n", item.key(), item.name(), item.price()));
    }
    text
}

// =============================================================================
// Checkout
// =============================================================================

/// A ticket built from command-line keys.
#[derive(Debug)]
pub struct Checkout {
    pub ticket: Ticket,
    /// Keys that were not in the catalog.
    pub skipped: Vec<String>,
}

/// Looks every key up and adds the hits to a new ticket.
///
/// Unknown keys are logged and collected in [`Checkout::skipped`]; they do
/// not abort the checkout.
pub fn build_checkout(catalog: &Catalog, rules: RuleSet, keys: &[String]) -> Checkout {
    let ticket = Ticket::new(rules);
    let mut skipped = Vec::new();

    for key in keys {
        match catalog.lookup(key) {
            Ok(item) => ticket.add(item),
            Err(err) if err.is_not_found() => {
                warn!(key = %key, "Unknown item, skipping");
                skipped.push(key.clone());
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Lookup failed, skipping");
                skipped.push(key.clone());
            }
        }
    }

    Checkout { ticket, skipped }
}

/// Chooses the rule set for this run.
pub fn rules_for(args: &CliArgs, config: &CheckoutConfig) -> RuleSet {
    if args.no_promotions {
        PromotionSettings::none().to_rule_set()
    } else {
        config.promotions.to_rule_set()
    }
}

/// Produces the text written to stdout.
pub fn render_output(checkout: &Checkout, config: &CheckoutConfig, json: bool) -> AppResult<String> {
    if json {
        let mut text = serde_json::to_string_pretty(&checkout.ticket.receipt())?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(checkout.ticket.render_with(&config.store))
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Runs the CLI with the process arguments.
pub fn run() -> AppResult<()> {
    init_tracing();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    let catalog = Catalog::standard();

    if args.help || args.items.is_empty() {
        print!("{}", usage(&catalog));
        return Ok(());
    }

    let config = CheckoutConfig::load(args.config.clone())?;
    let checkout = build_checkout(&catalog, rules_for(&args, &config), &args.items);
    let output = render_output(&checkout, &config, args.json)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(output.as_bytes())?;
    handle.flush()?;

    info!(
        ticket_id = %checkout.ticket.id(),
        lines = checkout.ticket.line_count(),
        skipped = checkout.skipped.len(),
        "Receipt printed"
    );
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show recalculations
/// - `RUST_LOG=checkout_core=trace` - Show every added line
/// - Default: warnings, plus info from this crate
///
/// Logs go to stderr so the receipt on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,checkout_cli=info"));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
