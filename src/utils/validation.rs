//! Validation utilities
//!
//! Semantic checks shared by the managers. Request-shaping concerns (field
//! presence, enum membership, date parsing) belong to the caller; everything
//! here is re-checked by the core so an invariant violation fails loudly even
//! behind a sloppy boundary.

use bigdecimal::BigDecimal;

use crate::types::{LedgerError, LedgerResult};

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(amount: &BigDecimal, what: &str) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(LedgerError::Validation(format!(
            "{what} must be positive"
        )))
    } else {
        Ok(())
    }
}

/// Validate that an amount is zero or more
pub fn validate_non_negative_amount(amount: &BigDecimal, what: &str) -> LedgerResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(LedgerError::Validation(format!(
            "{what} must not be negative"
        )))
    } else {
        Ok(())
    }
}

/// Validate a human-readable name
pub fn validate_name(name: &str, what: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{what} cannot be empty")));
    }
    if name.len() > 100 {
        return Err(LedgerError::Validation(format!(
            "{what} cannot exceed 100 characters"
        )));
    }
    Ok(())
}
