//! Balance computation
//!
//! The remaining balance of a policy is always recomputed from the full set
//! of its completed payments:
//!
//! ```text
//! remaining = max(premium - Σ completed amounts, 0)
//! ```
//!
//! It is never maintained by subtracting individual payments, so repeated
//! reconciliation converges to the same value.

use core_kernel::{Money, MoneyError};

use crate::payment::Payment;

/// Computes the remaining balance from the premium and completed amounts
///
/// # Errors
///
/// Returns `MoneyError::Overflow` if the amounts cannot be summed
pub fn compute_balance<'a, I>(premium: Money, completed: I) -> Result<Money, MoneyError>
where
    I: IntoIterator<Item = &'a Money>,
{
    let paid = Money::checked_sum(completed)?;
    Ok(premium.saturating_sub(&paid))
}

/// Sum of the completed payments in `payments`
pub fn total_completed(payments: &[Payment]) -> Result<Money, MoneyError> {
    Money::checked_sum(
        payments
            .iter()
            .filter(|p| p.status.is_completed())
            .map(|p| &p.amount),
    )
}
