//! PostgreSQL Claims Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_claims::{Claim, ClaimsPort};

use crate::error::DatabaseError;
use crate::repositories::claims::{ClaimRow, ClaimsRepository};

/// PostgreSQL-backed implementation of `ClaimsPort`
#[derive(Debug, Clone)]
pub struct PostgresClaimsAdapter {
    repository: ClaimsRepository,
    pool: PgPool,
}

impl PostgresClaimsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresClaimsAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClaimsAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-claims-adapter").await
    }
}

#[async_trait]
impl ClaimsPort for PostgresClaimsAdapter {
    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    async fn create_claim(&self, claim: Claim) -> Result<Claim, PortError> {
        match self.repository.insert(&ClaimRow::from(&claim)).await {
            Ok(()) => Ok(claim),
            Err(DatabaseError::ForeignKeyViolation(_)) => Err(PortError::not_found("Policy", claim.policy_id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn claims_for_user(&self, user_id: UserId) -> Result<Vec<Claim>, PortError> {
        let rows = self.repository.find_by_user(user_id.into()).await?;
        Ok(rows.into_iter().map(Claim::from).collect())
    }
}
