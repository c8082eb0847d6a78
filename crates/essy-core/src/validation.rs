//! # Input Validation
//!
//! Field-level validators shared by the catalog and checkout layers.
//!
//! Each validator returns a [`ValidationError`] naming the offending
//! field, so callers can surface the message directly for re-entry.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;

/// Maximum length for product names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for descriptions and free-text notes.
pub const MAX_TEXT_LENGTH: usize = 500;

/// Upper bound on a tax rate: 100% in basis points.
pub const MAX_TAX_RATE_BPS: u32 = 10_000;

/// Validates a product name: required, at most [`MAX_NAME_LENGTH`] chars.
pub fn validate_product_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates an optional free-text field (description, note).
pub fn validate_text(field: &str, value: &Option<String>) -> Result<(), ValidationError> {
    if let Some(text) = value {
        if text.chars().count() > MAX_TEXT_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_TEXT_LENGTH,
            });
        }
    }
    Ok(())
}

/// Validates a price: strictly positive.
pub fn validate_price(price: Money) -> Result<(), ValidationError> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level: never negative.
pub fn validate_stock(stock: i64) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a cart line quantity: 1..=[`crate::MAX_ITEM_QUANTITY`].
pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 1 || quantity > crate::MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: crate::MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a tendered payment amount: strictly positive.
pub fn validate_payment_amount(amount: Money) -> Result<(), ValidationError> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate: at most 100%.
pub fn validate_tax_rate(rate: TaxRate) -> Result<(), ValidationError> {
    if rate.bps() > MAX_TAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: MAX_TAX_RATE_BPS as i64,
        });
    }
    Ok(())
}

/// Parses a tendered amount string from the payment entry field.
///
/// Accepts digits with optional dot thousands separators, e.g.
/// `"50000"` or `"50.000"`.
pub fn parse_amount(input: &str) -> Result<Money, ValidationError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != '.').collect();
    if cleaned.is_empty() {
        return Err(ValidationError::Required {
            field: "amount".to_string(),
        });
    }
    cleaned
        .parse::<i64>()
        .map(Money::from_minor)
        .map_err(|_| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a valid amount", input.trim()),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
