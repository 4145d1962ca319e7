//! Account statistics and history reports

use std::collections::HashMap;
use std::sync::Arc;

use core_kernel::{Money, MoneyError, PolicyId, UserId};
use domain_policy::{Policy, PolicyPort, PolicyQuery, PolicySortField, PolicyType, SortOrder};

use crate::balance::total_completed;
use crate::error::BillingError;
use crate::payment::Payment;
use crate::ports::BillingPort;

/// Totals over a user's policies and payments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountStatistics {
    pub total_policies: usize,
    /// Sum of completed payments
    pub total_spent: Money,
    pub total_premiums: Money,
    pub total_remaining_balance: Money,
}

impl AccountStatistics {
    /// Computes the totals; pending and failed payments are not spent
    pub fn compute(policies: &[Policy], payments: &[Payment]) -> Result<Self, MoneyError> {
        Ok(Self {
            total_policies: policies.len(),
            total_spent: total_completed(payments)?,
            total_premiums: Money::checked_sum(policies.iter().map(|p| &p.premium))?,
            total_remaining_balance: Money::checked_sum(policies.iter().map(|p| &p.remaining_balance))?,
        })
    }
}

/// A payment with the type of the policy it paid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentHistoryEntry {
    pub payment: Payment,
    pub policy_type: Option<PolicyType>,
}

/// Read-only reports over a user's account
#[derive(Clone)]
pub struct ReportService {
    billing: Arc<dyn BillingPort>,
    policies: Arc<dyn PolicyPort>,
}

impl ReportService {
    /// Creates a new report service
    pub fn new(billing: Arc<dyn BillingPort>, policies: Arc<dyn PolicyPort>) -> Self {
        Self { billing, policies }
    }

    /// Totals for the user's account
    pub async fn account_statistics(&self, user_id: UserId) -> Result<AccountStatistics, BillingError> {
        let policies = self.policies.find_policies(PolicyQuery::for_owner(user_id)).await?;
        let payments = self.billing.payments_for_user(user_id).await?;
        Ok(AccountStatistics::compute(&policies, &payments)?)
    }

    /// The user's payments, newest first, with the policy type
    pub async fn payment_history(&self, user_id: UserId) -> Result<Vec<PaymentHistoryEntry>, BillingError> {
        let payments = self.billing.payments_for_user(user_id).await?;
        let types: HashMap<PolicyId, PolicyType> = self
            .policies
            .find_policies(PolicyQuery::for_owner(user_id))
            .await?
            .into_iter()
            .map(|p| (p.id, p.policy_type))
            .collect();

        Ok(payments
            .into_iter()
            .map(|payment| PaymentHistoryEntry {
                policy_type: types.get(&payment.policy_id).copied(),
                payment,
            })
            .collect())
    }

    /// The user's policies, most recently acquired first
    pub async fn policy_history(&self, user_id: UserId) -> Result<Vec<Policy>, BillingError> {
        let query = PolicyQuery {
            owner_id: Some(user_id),
            sort_by: PolicySortField::CreatedAt,
            order: SortOrder::Desc,
            ..Default::default()
        };
        Ok(self.policies.find_policies(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{PaymentMethod, PaymentStatus};
    use chrono::NaiveDate;
    use domain_policy::PolicyApplication;
    use rust_decimal_macros::dec;

    fn policy(owner: UserId, premium: rust_decimal::Decimal) -> Policy {
        Policy::acquire(
            owner,
            PolicyApplication {
                policy_type: PolicyType::Auto,
                coverage: Money::new(dec!(1000)),
                premium: Money::new(premium),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_statistics_ignore_failed_payments() {
        let owner = UserId::new();
        let mut a = policy(owner, dec!(100));
        let b = policy(owner, dec!(50));

        let paid = Payment::completed(a.id, owner, Money::new(dec!(30)), PaymentMethod::Zelle, None).unwrap();
        let mut voided = Payment::completed(a.id, owner, Money::new(dec!(20)), PaymentMethod::Yappy, None).unwrap();
        voided.change_status(PaymentStatus::Failed, None).unwrap();
        a.settle(Money::new(dec!(70)));

        let stats = AccountStatistics::compute(&[a, b], &[paid, voided]).unwrap();
        assert_eq!(stats.total_policies, 2);
        assert_eq!(stats.total_spent, Money::new(dec!(30)));
        assert_eq!(stats.total_premiums, Money::new(dec!(150)));
        assert_eq!(stats.total_remaining_balance, Money::new(dec!(120)));
    }
}
