//! Policy entity
//!
//! A policy is an insurance contract with a fixed premium and a payable
//! balance. The balance starts at the premium and is only ever lowered by
//! settlement from completed payments (see `domain_billing::reconciler`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, PolicyId, UserId};
use crate::error::PolicyError;

/// Line of business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    #[serde(alias = "vida")]
    Life,
    Auto,
    #[serde(alias = "salud")]
    Health,
    #[serde(alias = "hogar")]
    Home,
}

impl PolicyType {
    /// Returns the canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Life => "life",
            PolicyType::Auto => "auto",
            PolicyType::Health => "health",
            PolicyType::Home => "home",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyType {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "life" | "vida" => Ok(PolicyType::Life),
            "auto" => Ok(PolicyType::Auto),
            "health" | "salud" => Ok(PolicyType::Health),
            "home" | "hogar" => Ok(PolicyType::Home),
            other => Err(PolicyError::validation(format!("unknown policy type '{}'", other))),
        }
    }
}

/// Policy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    /// Premium still (partly) outstanding
    Active,
    /// Premium fully paid
    Completed,
    /// Term ended
    Expired,
    /// Cancelled administratively
    Cancelled,
}

impl PolicyStatus {
    /// Returns the canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "active",
            PolicyStatus::Completed => "completed",
            PolicyStatus::Expired => "expired",
            PolicyStatus::Cancelled => "cancelled",
        }
    }

    /// The status a live policy must have for the given remaining balance
    pub fn for_balance(balance: Money) -> Self {
        if balance.is_positive() {
            PolicyStatus::Active
        } else {
            PolicyStatus::Completed
        }
    }

    /// Returns true for statuses driven by the balance rather than by an administrator
    pub fn is_balance_driven(&self) -> bool {
        matches!(self, PolicyStatus::Active | PolicyStatus::Completed)
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(PolicyStatus::Active),
            "completed" => Ok(PolicyStatus::Completed),
            "expired" => Ok(PolicyStatus::Expired),
            "cancelled" => Ok(PolicyStatus::Cancelled),
            other => Err(PolicyError::validation(format!("unknown policy status '{}'", other))),
        }
    }
}

/// Data supplied by a user acquiring a policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyApplication {
    pub policy_type: PolicyType,
    pub coverage: Money,
    pub premium: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PolicyApplication {
    /// Checks amounts and the coverage period
    pub fn validate(&self) -> Result<(), PolicyError> {
        validate_amount("coverage", self.coverage)?;
        validate_amount("premium", self.premium)?;
        validate_period(self.start_date, self.end_date)
    }
}

/// Administrative changes to a policy
///
/// The premium is deliberately absent: it is fixed at acquisition and the
/// balance invariant depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyChanges {
    pub policy_type: Option<PolicyType>,
    pub coverage: Option<Money>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PolicyStatus>,
}

impl PolicyChanges {
    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        self.policy_type.is_none()
            && self.coverage.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.status.is_none()
    }
}

/// Outcome of settling a policy against a freshly computed balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub previous_balance: Money,
    pub remaining_balance: Money,
    pub previous_status: PolicyStatus,
    pub status: PolicyStatus,
}

impl Settlement {
    /// Returns true if the policy needs to be written back
    pub fn changed(&self) -> bool {
        self.previous_balance != self.remaining_balance || self.previous_status != self.status
    }
}

/// An insurance policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub owner_id: UserId,
    pub policy_type: PolicyType,
    pub coverage: Money,
    pub premium: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub remaining_balance: Money,
    pub status: PolicyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// Creates an active policy whose balance equals its premium
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Validation` if the application is invalid
    pub fn acquire(owner_id: UserId, application: PolicyApplication) -> Result<Self, PolicyError> {
        application.validate()?;
        let now = Utc::now();

        Ok(Self {
            id: PolicyId::new_v7(),
            owner_id,
            policy_type: application.policy_type,
            coverage: application.coverage,
            premium: application.premium,
            start_date: application.start_date,
            end_date: application.end_date,
            remaining_balance: application.premium,
            status: PolicyStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if the policy belongs to the user
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Returns true if the policy's status allows new payments
    pub fn accepts_payments(&self) -> bool {
        self.status.is_balance_driven()
    }

    /// Applies a recomputed balance and derives the status from it
    ///
    /// A zero balance completes an active policy. A positive balance on a
    /// completed policy (a completed payment was voided) reactivates it.
    /// Expired and cancelled policies keep their status.
    pub fn settle(&mut self, balance: Money) -> Settlement {
        let previous_balance = self.remaining_balance;
        let previous_status = self.status;

        self.remaining_balance = balance;
        if self.status.is_balance_driven() {
            self.status = PolicyStatus::for_balance(balance);
        }

        let settlement = Settlement {
            previous_balance,
            remaining_balance: self.remaining_balance,
            previous_status,
            status: self.status,
        };
        if settlement.changed() {
            self.updated_at = Utc::now();
        }
        settlement
    }

    /// Applies administrative changes
    ///
    /// # Errors
    ///
    /// - `Validation` if the coverage is out of range or the period is inverted
    /// - `InvalidStateTransition` if a balance-driven status contradicts the balance
    pub fn apply_changes(&mut self, changes: &PolicyChanges) -> Result<(), PolicyError> {
        let start_date = changes.start_date.unwrap_or(self.start_date);
        let end_date = changes.end_date.unwrap_or(self.end_date);
        validate_period(start_date, end_date)?;

        if let Some(coverage) = changes.coverage {
            validate_amount("coverage", coverage)?;
        }

        if let Some(status) = changes.status {
            let expected = PolicyStatus::for_balance(self.remaining_balance);
            if status.is_balance_driven() && status != expected {
                return Err(PolicyError::InvalidStateTransition {
                    from: self.status.to_string(),
                    to: status.to_string(),
                });
            }
        }

        if let Some(policy_type) = changes.policy_type {
            self.policy_type = policy_type;
        }
        if let Some(coverage) = changes.coverage {
            self.coverage = coverage;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        self.start_date = start_date;
        self.end_date = end_date;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_amount(field: &str, amount: Money) -> Result<(), PolicyError> {
    if !amount.is_positive() {
        return Err(PolicyError::validation(format!("{} must be a positive amount", field)));
    }
    if !amount.fits_storage() {
        return Err(PolicyError::validation(format!(
            "{} cannot exceed {}",
            field,
            Money::max_stored().amount()
        )));
    }
    Ok(())
}

fn validate_period(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), PolicyError> {
    if start_date >= end_date {
        return Err(PolicyError::validation("start date must be earlier than end date"));
    }
    Ok(())
}
