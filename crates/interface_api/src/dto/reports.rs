//! Report DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use core_kernel::{Money, PaymentId, PolicyId};
use domain_billing::{AccountStatistics, PaymentHistoryEntry, PaymentMethod, PaymentStatus};
use domain_policy::PolicyType;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_policies: usize,
    pub total_spent: Money,
    pub total_premiums: Money,
    pub total_remaining_balance: Money,
}

impl From<AccountStatistics> for StatisticsResponse {
    fn from(s: AccountStatistics) -> Self {
        Self {
            total_policies: s.total_policies,
            total_spent: s.total_spent,
            total_premiums: s.total_premiums,
            total_remaining_balance: s.total_remaining_balance,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryItem {
    pub payment_id: PaymentId,
    pub policy_id: PolicyId,
    pub policy_type: Option<PolicyType>,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

impl From<PaymentHistoryEntry> for PaymentHistoryItem {
    fn from(entry: PaymentHistoryEntry) -> Self {
        let p = entry.payment;
        Self {
            payment_id: p.id,
            policy_id: p.policy_id,
            policy_type: entry.policy_type,
            amount: p.amount,
            method: p.method,
            status: p.status,
            paid_at: p.paid_at,
        }
    }
}
