//! Custom Test Assertions
//!
//! Balance checks that print the numbers involved when they fail.

use core_kernel::Money;
use domain_billing::{compute_balance, Payment};
use domain_policy::{Policy, PolicyStatus};

/// Asserts that the policy's stored balance equals its premium minus its
/// completed payments, floored at zero
///
/// Payments of other policies are ignored.
pub fn assert_balance_consistent(policy: &Policy, payments: &[Payment]) {
    let completed: Vec<Money> = payments
        .iter()
        .filter(|p| p.policy_id == policy.id && p.status.is_completed())
        .map(|p| p.amount)
        .collect();
    let expected = compute_balance(policy.premium, &completed).expect("balance overflow");

    assert_eq!(
        policy.remaining_balance, expected,
        "Stored balance {} does not match premium {} minus {} completed payments",
        policy.remaining_balance,
        policy.premium,
        completed.len()
    );
}

/// Asserts the policy's balance and status together
pub fn assert_policy_balance(policy: &Policy, balance: Money, status: PolicyStatus) {
    assert_eq!(
        (policy.remaining_balance, policy.status),
        (balance, status),
        "Policy {} has balance {} ({}), expected {} ({})",
        policy.id,
        policy.remaining_balance,
        policy.status,
        balance,
        status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{PaymentBuilder, PolicyBuilder};
    use core_kernel::UserId;
    use domain_billing::PaymentStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_consistent_balance_passes() {
        let mut policy = PolicyBuilder::new(UserId::new()).premium(Money::new(dec!(100))).build();
        let payments = vec![
            PaymentBuilder::for_policy(&policy).amount(Money::new(dec!(60))).build(),
            PaymentBuilder::for_policy(&policy)
                .amount(Money::new(dec!(30)))
                .status(PaymentStatus::Failed)
                .build(),
        ];
        policy.settle(Money::new(dec!(40)));

        assert_balance_consistent(&policy, &payments);
        assert_policy_balance(&policy, Money::new(dec!(40)), PolicyStatus::Active);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_stale_balance_fails() {
        let policy = PolicyBuilder::new(UserId::new()).premium(Money::new(dec!(100))).build();
        let paid = PaymentBuilder::for_policy(&policy).amount(Money::new(dec!(60))).build();

        assert_balance_consistent(&policy, &[paid]);
    }
}
