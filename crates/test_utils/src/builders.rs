//! Test Data Builders
//!
//! Builders for the domain entities. Tests set only the fields they care
//! about; everything else gets a valid default.

use chrono::NaiveDate;
use core_kernel::{Money, PolicyId, UserId};
use domain_billing::{Payment, PaymentMethod, PaymentStatus};
use domain_policy::{Policy, PolicyApplication, PolicyStatus, PolicyType};

use crate::fixtures::{DateFixtures, MoneyFixtures};

/// Builder for policies
///
/// ```rust
/// use test_utils::PolicyBuilder;
/// use core_kernel::{Money, UserId};
/// use rust_decimal_macros::dec;
///
/// let owner = UserId::new();
/// let policy = PolicyBuilder::new(owner).premium(Money::new(dec!(100))).build();
/// assert_eq!(policy.remaining_balance, Money::new(dec!(100)));
/// ```
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    owner_id: UserId,
    policy_type: PolicyType,
    coverage: Money,
    premium: Money,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: Option<PolicyStatus>,
}

impl PolicyBuilder {
    /// Creates a builder for an active auto policy owned by `owner_id`
    pub fn new(owner_id: UserId) -> Self {
        Self {
            owner_id,
            policy_type: PolicyType::Auto,
            coverage: MoneyFixtures::coverage(),
            premium: MoneyFixtures::premium(),
            start_date: DateFixtures::policy_start(),
            end_date: DateFixtures::policy_end(),
            status: None,
        }
    }

    pub fn policy_type(mut self, policy_type: PolicyType) -> Self {
        self.policy_type = policy_type;
        self
    }

    pub fn coverage(mut self, coverage: Money) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn premium(mut self, premium: Money) -> Self {
        self.premium = premium;
        self
    }

    pub fn period(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Overrides the status, e.g. to build a cancelled policy
    pub fn status(mut self, status: PolicyStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// The application this builder describes
    pub fn application(&self) -> PolicyApplication {
        PolicyApplication {
            policy_type: self.policy_type,
            coverage: self.coverage,
            premium: self.premium,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Builds the policy
    ///
    /// # Panics
    ///
    /// Panics if the configured application is invalid
    pub fn build(self) -> Policy {
        let mut policy = Policy::acquire(self.owner_id, self.application())
            .expect("builder produced an invalid policy application");
        if let Some(status) = self.status {
            policy.status = status;
        }
        policy
    }
}

/// Builder for payments
#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    policy_id: PolicyId,
    user_id: UserId,
    amount: Money,
    method: PaymentMethod,
    status: PaymentStatus,
    reference: Option<String>,
}

impl PaymentBuilder {
    /// Creates a builder for a completed bank transfer against `policy`
    pub fn for_policy(policy: &Policy) -> Self {
        Self {
            policy_id: policy.id,
            user_id: policy.owner_id,
            amount: MoneyFixtures::installment(),
            method: PaymentMethod::BankTransfer,
            status: PaymentStatus::Completed,
            reference: None,
        }
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Builds the payment
    ///
    /// # Panics
    ///
    /// Panics if the amount is not positive or the reference is blank
    pub fn build(self) -> Payment {
        let mut payment = Payment::completed(
            self.policy_id,
            self.user_id,
            self.amount,
            self.method,
            self.reference,
        )
        .expect("builder produced an invalid payment");
        if self.status != PaymentStatus::Completed {
            payment
                .change_status(self.status, None)
                .expect("status change without reference cannot fail");
        }
        payment
    }
}
