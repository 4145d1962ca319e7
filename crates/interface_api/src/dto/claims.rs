//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClaimId, PolicyId};
use domain_claims::{Claim, ClaimReport, ClaimStatus, ClaimWithPolicy};
use domain_policy::PolicyType;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimRequest {
    pub policy_id: PolicyId,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    /// Date of the loss
    pub date: NaiveDate,
}

impl From<CreateClaimRequest> for ClaimReport {
    fn from(r: CreateClaimRequest) -> Self {
        ClaimReport {
            policy_id: r.policy_id,
            description: r.description,
            loss_date: r.date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub policy_id: PolicyId,
    pub description: String,
    pub date: NaiveDate,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<PolicyType>,
}

impl From<Claim> for ClaimResponse {
    fn from(c: Claim) -> Self {
        Self {
            id: c.id,
            policy_id: c.policy_id,
            description: c.description,
            date: c.loss_date,
            status: c.status,
            created_at: c.created_at,
            policy_type: None,
        }
    }
}

impl From<ClaimWithPolicy> for ClaimResponse {
    fn from(entry: ClaimWithPolicy) -> Self {
        Self {
            policy_type: entry.policy_type,
            ..entry.claim.into()
        }
    }
}
