//! Claims use cases

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use chrono::NaiveDate;
use core_kernel::{PolicyId, UserId};
use domain_policy::{PolicyPort, PolicyQuery, PolicyType};

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::ports::ClaimsPort;

/// A loss report submitted by a policy owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReport {
    pub policy_id: PolicyId,
    pub description: String,
    pub loss_date: NaiveDate,
}

/// A claim with the type of the policy it was reported against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimWithPolicy {
    pub claim: Claim,
    /// `None` when the policy no longer exists
    pub policy_type: Option<PolicyType>,
}

/// Service for reporting and listing claims
#[derive(Clone)]
pub struct ClaimsService {
    claims: Arc<dyn ClaimsPort>,
    policies: Arc<dyn PolicyPort>,
}

impl ClaimsService {
    pub fn new(claims: Arc<dyn ClaimsPort>, policies: Arc<dyn PolicyPort>) -> Self {
        Self { claims, policies }
    }

    /// Reports a loss against one of the user's policies
    ///
    /// # Errors
    ///
    /// - `Validation` if the description is blank
    /// - `PolicyNotFound` if the policy does not exist or belongs to someone else
    #[instrument(skip(self, report), fields(policy_id = %report.policy_id))]
    pub async fn report(&self, user_id: UserId, report: ClaimReport) -> Result<Claim, ClaimError> {
        let claim = Claim::report(user_id, report.policy_id, report.description, report.loss_date)?;

        let policy = self.policies.get_policy(report.policy_id).await?;
        if !policy.is_owned_by(user_id) {
            warn!("Claim reported against a policy the user does not own");
            return Err(ClaimError::PolicyNotFound(report.policy_id.to_string()));
        }

        let claim = self.claims.create_claim(claim).await?;
        info!(claim_id = %claim.id, "Claim reported");
        Ok(claim)
    }

    /// The user's claims, newest first
    pub async fn list(&self, user_id: UserId) -> Result<Vec<ClaimWithPolicy>, ClaimError> {
        let claims = self.claims.claims_for_user(user_id).await?;
        let types: HashMap<PolicyId, PolicyType> = self
            .policies
            .find_policies(PolicyQuery::for_owner(user_id))
            .await?
            .into_iter()
            .map(|p| (p.id, p.policy_type))
            .collect();

        Ok(claims
            .into_iter()
            .map(|claim| ClaimWithPolicy {
                policy_type: types.get(&claim.policy_id).copied(),
                claim,
            })
            .collect())
    }
}
