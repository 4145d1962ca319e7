//! Policy domain services
//!
//! `PolicyService` is the use-case layer over a [`PolicyPort`]. Every
//! user-facing read is scoped to the caller: a policy owned by someone else
//! is reported as not found rather than forbidden.

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{PolicyId, UserId};

use crate::error::PolicyError;
use crate::policy::{Policy, PolicyApplication, PolicyChanges};
use crate::ports::{PolicyPort, PolicyQuery};

/// Service for acquiring, querying and administering policies
#[derive(Clone)]
pub struct PolicyService {
    port: Arc<dyn PolicyPort>,
}

impl PolicyService {
    /// Creates a new policy service
    pub fn new(port: Arc<dyn PolicyPort>) -> Self {
        Self { port }
    }

    /// Acquires a new policy for the user
    ///
    /// The policy starts `active` with a remaining balance equal to its premium.
    #[instrument(skip(self, application), fields(policy_type = %application.policy_type))]
    pub async fn acquire(&self, owner_id: UserId, application: PolicyApplication) -> Result<Policy, PolicyError> {
        let policy = Policy::acquire(owner_id, application)?;
        let policy = self.port.create_policy(policy).await?;

        info!(policy_id = %policy.id, owner_id = %owner_id, premium = %policy.premium, "Policy acquired");
        Ok(policy)
    }

    /// Lists the user's policies with the query's filters and ordering
    pub async fn list(&self, owner_id: UserId, query: PolicyQuery) -> Result<Vec<Policy>, PolicyError> {
        let query = PolicyQuery {
            owner_id: Some(owner_id),
            ..query
        };
        Ok(self.port.find_policies(query).await?)
    }

    /// Returns one of the user's policies
    pub async fn get(&self, owner_id: UserId, id: PolicyId) -> Result<Policy, PolicyError> {
        let policy = self.port.get_policy(id).await?;
        if !policy.is_owned_by(owner_id) {
            return Err(PolicyError::not_found(id));
        }
        Ok(policy)
    }

    /// Applies administrative changes to any policy
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: PolicyId, changes: PolicyChanges) -> Result<Policy, PolicyError> {
        if changes.is_empty() {
            return Err(PolicyError::validation("no fields to update"));
        }
        let policy = self.port.update_policy(id, changes).await?;

        info!(policy_id = %id, status = %policy.status, "Policy updated");
        Ok(policy)
    }

    /// Deletes one of the user's policies
    ///
    /// Fails with `Conflict` while payments or claims reference it.
    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: UserId, id: PolicyId) -> Result<(), PolicyError> {
        self.get(owner_id, id).await?;
        self.port.delete_policy(id).await?;

        info!(policy_id = %id, "Policy deleted");
        Ok(())
    }
}
