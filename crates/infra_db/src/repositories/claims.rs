//! Claims repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, PolicyId, UserId};
use domain_claims::claim as domain;

use crate::error::DatabaseError;

/// Claim status, stored as the `claim_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    UnderReview,
    Approved,
    Denied,
}

impl From<domain::ClaimStatus> for ClaimStatus {
    fn from(value: domain::ClaimStatus) -> Self {
        match value {
            domain::ClaimStatus::Pending => ClaimStatus::Pending,
            domain::ClaimStatus::UnderReview => ClaimStatus::UnderReview,
            domain::ClaimStatus::Approved => ClaimStatus::Approved,
            domain::ClaimStatus::Denied => ClaimStatus::Denied,
        }
    }
}

impl From<ClaimStatus> for domain::ClaimStatus {
    fn from(value: ClaimStatus) -> Self {
        match value {
            ClaimStatus::Pending => domain::ClaimStatus::Pending,
            ClaimStatus::UnderReview => domain::ClaimStatus::UnderReview,
            ClaimStatus::Approved => domain::ClaimStatus::Approved,
            ClaimStatus::Denied => domain::ClaimStatus::Denied,
        }
    }
}

/// Database row representation of a claim
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub user_id: Uuid,
    pub policy_id: Uuid,
    pub description: String,
    pub loss_date: NaiveDate,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&domain::Claim> for ClaimRow {
    fn from(claim: &domain::Claim) -> Self {
        Self {
            claim_id: *claim.id.as_uuid(),
            user_id: *claim.user_id.as_uuid(),
            policy_id: *claim.policy_id.as_uuid(),
            description: claim.description.clone(),
            loss_date: claim.loss_date,
            status: claim.status.into(),
            created_at: claim.created_at,
        }
    }
}

impl From<ClaimRow> for domain::Claim {
    fn from(row: ClaimRow) -> Self {
        Self {
            id: ClaimId::from_uuid(row.claim_id),
            user_id: UserId::from_uuid(row.user_id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            description: row.description,
            loss_date: row.loss_date,
            status: row.status.into(),
            created_at: row.created_at,
        }
    }
}

/// Repository for the `claims` table
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &ClaimRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (claim_id, user_id, policy_id, description, loss_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.claim_id)
        .bind(row.user_id)
        .bind(row.policy_id)
        .bind(&row.description)
        .bind(row.loss_date)
        .bind(row.status)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A user's claims, newest first
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<ClaimRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT claim_id, user_id, policy_id, description, loss_date, status, created_at
            FROM claims
            WHERE user_id = $1
            ORDER BY created_at DESC, claim_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
