//! Request and response bodies
//!
//! All bodies use camelCase field names. Amounts travel as decimal strings
//! (or plain JSON numbers on input) and are never converted to floats.

pub mod claims;
pub mod payment;
pub mod policy;
pub mod reports;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validator for amounts that must be strictly positive
pub(crate) fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive").with_message("must be greater than 0".into()))
    }
}
