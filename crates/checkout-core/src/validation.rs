//! # Validation Module
//!
//! Input checks applied when a catalog is assembled.
//!
//! Prices are deliberately not validated here: zero-priced giveaways and
//! negative-priced return slips are legal catalog entries, and every
//! discount rule must cope with them.
//!
//! ## Usage
//! ```rust
//! use checkout_core::validation::{normalize_item_key, validate_item_key};
//!
//! assert!(validate_item_key("TSHIRT").is_ok());
//! assert!(validate_item_key("T SHIRT").is_err());
//! assert_eq!(normalize_item_key("  voucher "), "VOUCHER");
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_KEY_LEN, MAX_ITEM_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Canonical form of an item key: trimmed and ASCII-uppercased.
///
/// Catalog keys are stored in this form and lookups normalize their input
/// the same way, so `"mug"` finds `"MUG"`.
pub fn normalize_item_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}

/// Validates an item key.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_ITEM_KEY_LEN` characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_item_key(key: &str) -> ValidationResult<()> {
    let key = key.trim();

    if key.is_empty() {
        return Err(ValidationError::Required {
            field: "key".to_string(),
        });
    }

    if key.len() > MAX_ITEM_KEY_LEN {
        return Err(ValidationError::TooLong {
            field: "key".to_string(),
            max: MAX_ITEM_KEY_LEN,
        });
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "key".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an item display name.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_ITEM_NAME_LEN` characters (the receipt prints fewer)
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_ITEM_NAME_LEN,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_key() {
        assert!(validate_item_key("VOUCHER").is_ok());
        assert!(validate_item_key("T-SHIRT").is_ok());
        assert!(validate_item_key("mug_2").is_ok());

        assert!(validate_item_key("").is_err());
        assert!(validate_item_key("   ").is_err());
        assert!(validate_item_key("has space").is_err());
        assert!(validate_item_key("CAFÉ").is_err());
        assert!(validate_item_key(&"A".repeat(MAX_ITEM_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Coffee Mug").is_ok());
        assert!(validate_item_name(&"x".repeat(MAX_ITEM_NAME_LEN)).is_ok());

        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"x".repeat(MAX_ITEM_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_normalize_item_key() {
        assert_eq!(normalize_item_key("tshirt"), "TSHIRT");
        assert_eq!(normalize_item_key("\tMug\n"), "MUG");
        assert_eq!(normalize_item_key(""), "");
    }
}
