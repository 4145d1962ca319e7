//! Payment records
//!
//! A payment is created `completed` by the submission use case. Afterwards
//! only its status and external reference can change, through the
//! administrative endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, PaymentId, PolicyId, UserId};

use crate::error::BillingError;

/// Payment channel
///
/// Serialized with the channel names customers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Bank transfer
    #[serde(rename = "Transferencia")]
    BankTransfer,
    /// Yappy wallet
    Yappy,
    /// Zelle transfer
    Zelle,
    /// Mobile payment
    #[serde(rename = "Pago Móvil")]
    MobilePayment,
    /// Credit card
    #[serde(rename = "Tarjeta de Crédito")]
    CreditCard,
    /// Debit card
    #[serde(rename = "Tarjeta de Débito")]
    DebitCard,
}

impl PaymentMethod {
    /// All accepted channels
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::BankTransfer,
        PaymentMethod::Yappy,
        PaymentMethod::Zelle,
        PaymentMethod::MobilePayment,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
    ];

    /// Returns the channel name
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Transferencia",
            PaymentMethod::Yappy => "Yappy",
            PaymentMethod::Zelle => "Zelle",
            PaymentMethod::MobilePayment => "Pago Móvil",
            PaymentMethod::CreditCard => "Tarjeta de Crédito",
            PaymentMethod::DebitCard => "Tarjeta de Débito",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| BillingError::validation(format!("unsupported payment method '{}'", s)))
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting confirmation
    Pending,
    /// Counts towards the policy balance
    Completed,
    /// Rejected or voided
    Failed,
}

impl PaymentStatus {
    /// Returns the status name
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Returns true if the payment counts towards the balance
    pub fn is_completed(&self) -> bool {
        matches!(self, PaymentStatus::Completed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(BillingError::validation(format!("unknown payment status '{}'", other))),
        }
    }
}

/// Result of an administrative status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

impl StatusChange {
    /// Returns true if the payment entered or left `completed`
    ///
    /// Only such changes alter the policy's balance.
    pub fn crosses_completed(&self) -> bool {
        self.from.is_completed() != self.to.is_completed()
    }
}

/// A payment against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Policy being paid
    pub policy_id: PolicyId,
    /// Paying user
    pub user_id: UserId,
    /// Payment amount, always positive
    pub amount: Money,
    /// Payment channel
    pub method: PaymentMethod,
    /// Status
    pub status: PaymentStatus,
    /// External reference (bank ref, wallet transaction id), unique when set
    pub reference: Option<String>,
    /// When the payment was made
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a completed payment
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` if the amount is not positive or
    /// the reference is blank
    pub fn completed(
        policy_id: PolicyId,
        user_id: UserId,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> Result<Self, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::validation("amount must be greater than 0"));
        }
        let reference = normalize_reference(reference)?;
        let now = Utc::now();

        Ok(Self {
            id: PaymentId::new_v7(),
            policy_id,
            user_id,
            amount,
            method,
            status: PaymentStatus::Completed,
            reference,
            paid_at: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Changes the status and, if given, the reference
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` for a blank reference
    pub fn change_status(
        &mut self,
        status: PaymentStatus,
        reference: Option<String>,
    ) -> Result<StatusChange, BillingError> {
        let change = StatusChange {
            from: self.status,
            to: status,
        };
        if let Some(reference) = normalize_reference(reference)? {
            self.reference = Some(reference);
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(change)
    }
}

fn normalize_reference(reference: Option<String>) -> Result<Option<String>, BillingError> {
    match reference {
        None => Ok(None),
        Some(r) => {
            let trimmed = r.trim();
            if trimmed.is_empty() {
                return Err(BillingError::validation("reference cannot be blank"));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}
