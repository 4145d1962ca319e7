//! Policy Domain Ports
//!
//! `PolicyPort` is everything the policy domain needs from storage. The
//! PostgreSQL adapter lives in `infra_db`; the in-memory adapter below backs
//! unit tests.
//!
//! ```rust,ignore
//! let service = PolicyService::new(Arc::new(PostgresPolicyAdapter::new(pool)));
//! let policies = service.list(user_id, PolicyQuery::default()).await?;
//! ```

use async_trait::async_trait;
use std::str::FromStr;

use core_kernel::{DomainPort, HealthCheckable, Money, PolicyId, PortError, UserId};

use crate::error::PolicyError;
use crate::policy::{Policy, PolicyChanges, PolicyStatus, PolicyType};

/// Field a policy listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicySortField {
    #[default]
    StartDate,
    EndDate,
    Coverage,
    Premium,
    /// Acquisition time; not selectable from the public query string
    CreatedAt,
}

impl PolicySortField {
    /// Column name used by SQL adapters
    pub fn column(&self) -> &'static str {
        match self {
            PolicySortField::StartDate => "start_date",
            PolicySortField::EndDate => "end_date",
            PolicySortField::Coverage => "coverage",
            PolicySortField::Premium => "premium",
            PolicySortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for PolicySortField {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startDate" => Ok(PolicySortField::StartDate),
            "endDate" => Ok(PolicySortField::EndDate),
            "coverage" => Ok(PolicySortField::Coverage),
            "premium" => Ok(PolicySortField::Premium),
            other => Err(PolicyError::validation(format!(
                "invalid sort field '{}', expected one of startDate, endDate, coverage, premium",
                other
            ))),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(PolicyError::validation(format!(
                "invalid sort order '{}', expected asc or desc",
                other
            ))),
        }
    }
}

/// Query parameters for finding policies
#[derive(Debug, Clone, Default)]
pub struct PolicyQuery {
    /// Only policies owned by this user
    pub owner_id: Option<UserId>,
    /// Filter by line of business
    pub policy_type: Option<PolicyType>,
    /// Filter by status
    pub status: Option<PolicyStatus>,
    /// Only policies with at least this remaining balance
    pub min_balance: Option<Money>,
    /// Sort field
    pub sort_by: PolicySortField,
    /// Sort direction
    pub order: SortOrder,
}

impl PolicyQuery {
    /// Creates a query for one user's policies
    pub fn for_owner(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }

    /// Returns true if the policy passes every filter
    pub fn matches(&self, policy: &Policy) -> bool {
        if let Some(owner_id) = self.owner_id {
            if policy.owner_id != owner_id {
                return false;
            }
        }
        if let Some(policy_type) = self.policy_type {
            if policy.policy_type != policy_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if policy.status != status {
                return false;
            }
        }
        if let Some(min_balance) = self.min_balance {
            if policy.remaining_balance < min_balance {
                return false;
            }
        }
        true
    }

    /// Orders policies according to the query
    pub fn sort(&self, policies: &mut [Policy]) {
        policies.sort_by(|a, b| {
            let ordering = match self.sort_by {
                PolicySortField::StartDate => a.start_date.cmp(&b.start_date),
                PolicySortField::EndDate => a.end_date.cmp(&b.end_date),
                PolicySortField::Coverage => a.coverage.cmp(&b.coverage),
                PolicySortField::Premium => a.premium.cmp(&b.premium),
                PolicySortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

/// Storage operations for policies
#[async_trait]
pub trait PolicyPort: DomainPort + HealthCheckable {
    /// Persists a newly acquired policy
    async fn create_policy(&self, policy: Policy) -> Result<Policy, PortError>;

    /// Retrieves a policy by ID, or `PortError::NotFound`
    async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError>;

    /// Finds policies matching the query, ordered as requested
    async fn find_policies(&self, query: PolicyQuery) -> Result<Vec<Policy>, PortError>;

    /// Applies administrative changes under a row lock and returns the result
    ///
    /// The policy's own rules are enforced via [`Policy::apply_changes`];
    /// rule violations come back as `PortError::Validation` or `Conflict`.
    async fn update_policy(&self, id: PolicyId, changes: PolicyChanges) -> Result<Policy, PortError>;

    /// Deletes a policy
    ///
    /// Fails with `PortError::Conflict` while payments or claims reference it.
    async fn delete_policy(&self, id: PolicyId) -> Result<(), PortError>;
}

/// Maps a rule violation raised inside an adapter onto the port error
pub fn policy_rule_violation(err: PolicyError) -> PortError {
    match err {
        PolicyError::Validation(message) => PortError::validation(message),
        PolicyError::InvalidStateTransition { from, to } => {
            PortError::conflict(format!("invalid status change from {} to {}", from, to))
        }
        PolicyError::NotFound(id) => PortError::not_found("Policy", id),
        PolicyError::Conflict(message) => PortError::conflict(message),
        PolicyError::Store(err) => err,
    }
}

/// Mock implementation of PolicyPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of PolicyPort
    #[derive(Debug, Default, Clone)]
    pub struct MockPolicyPort {
        policies: Arc<RwLock<HashMap<PolicyId, Policy>>>,
    }

    impl MockPolicyPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with policies for testing
        pub async fn with_policies(policies: Vec<Policy>) -> Self {
            let port = Self::new();
            for policy in policies {
                port.policies.write().await.insert(policy.id, policy);
            }
            port
        }

        /// Number of stored policies
        pub async fn count(&self) -> usize {
            self.policies.read().await.len()
        }
    }

    impl DomainPort for MockPolicyPort {}

    #[async_trait]
    impl HealthCheckable for MockPolicyPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-policy-port", 0)
        }
    }

    #[async_trait]
    impl PolicyPort for MockPolicyPort {
        async fn create_policy(&self, policy: Policy) -> Result<Policy, PortError> {
            let mut policies = self.policies.write().await;
            if policies.contains_key(&policy.id) {
                return Err(PortError::conflict(format!("policy {} already exists", policy.id)));
            }
            policies.insert(policy.id, policy.clone());
            Ok(policy)
        }

        async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
            self.policies
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Policy", id))
        }

        async fn find_policies(&self, query: PolicyQuery) -> Result<Vec<Policy>, PortError> {
            let policies = self.policies.read().await;
            let mut results: Vec<Policy> = policies
                .values()
                .filter(|p| query.matches(p))
                .cloned()
                .collect();
            query.sort(&mut results);
            Ok(results)
        }

        async fn update_policy(&self, id: PolicyId, changes: PolicyChanges) -> Result<Policy, PortError> {
            let mut policies = self.policies.write().await;
            let policy = policies
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Policy", id))?;

            let mut updated = policy.clone();
            updated.apply_changes(&changes).map_err(policy_rule_violation)?;
            *policy = updated.clone();
            Ok(updated)
        }

        async fn delete_policy(&self, id: PolicyId) -> Result<(), PortError> {
            self.policies
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Policy", id))
        }
    }
}
