//! Payment DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Money, PaymentId, PolicyId, UserId};
use domain_billing::{
    Payment, PaymentMethod, PaymentReceipt, PaymentRequest, PaymentStatus, PaymentStatusUpdate, PaymentWithBalance,
};

use super::positive_amount;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub policy_id: PolicyId,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    /// One of the accepted channel names, e.g. `"Zelle"` or `"Pago Móvil"`
    pub method: String,
    #[validate(length(min = 1, max = 100))]
    pub reference: Option<String>,
}

impl CreatePaymentRequest {
    pub fn into_request(self) -> Result<PaymentRequest, ApiError> {
        Ok(PaymentRequest {
            policy_id: self.policy_id,
            amount: Money::new(self.amount),
            method: self.method.parse::<PaymentMethod>()?,
            reference: self.reference,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusRequest {
    pub status: String,
    #[validate(length(min = 1, max = 100))]
    pub reference: Option<String>,
}

impl UpdatePaymentStatusRequest {
    pub fn into_update(self) -> Result<PaymentStatusUpdate, ApiError> {
        Ok(PaymentStatusUpdate {
            status: self.status.parse::<PaymentStatus>()?,
            reference: self.reference,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub policy_id: PolicyId,
    pub user_id: UserId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            policy_id: p.policy_id,
            user_id: p.user_id,
            amount: p.amount,
            method: p.method,
            status: p.status,
            reference: p.reference,
            paid_at: p.paid_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Body of `POST /payments` and of each `GET /payments` entry
///
/// `remainingBalance` is null in a listing when the policy is gone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithBalanceResponse {
    pub payment: PaymentResponse,
    pub remaining_balance: Option<Money>,
}

impl From<PaymentReceipt> for PaymentWithBalanceResponse {
    fn from(receipt: PaymentReceipt) -> Self {
        Self {
            payment: receipt.payment.into(),
            remaining_balance: Some(receipt.remaining_balance),
        }
    }
}

impl From<PaymentWithBalance> for PaymentWithBalanceResponse {
    fn from(entry: PaymentWithBalance) -> Self {
        Self {
            payment: entry.payment.into(),
            remaining_balance: entry.remaining_balance,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentEnvelope {
    pub payment: PaymentResponse,
}
