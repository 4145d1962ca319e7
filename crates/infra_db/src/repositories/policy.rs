//! Policy repository
//!
//! Reads go through the pool; the balance writes made by payment
//! submission and reconciliation run on a caller-supplied connection inside
//! a transaction that first takes the row lock with `SELECT … FOR UPDATE`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{Money, PolicyId, UserId};
use domain_policy::policy as domain;

use crate::error::DatabaseError;

const POLICY_COLUMNS: &str = "policy_id, owner_id, policy_type, coverage, premium, start_date, \
     end_date, remaining_balance, status, created_at, updated_at";

/// Line of business, stored as the `policy_type` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "policy_type", rename_all = "lowercase")]
pub enum PolicyType {
    Life,
    Auto,
    Health,
    Home,
}

/// Policy status, stored as the `policy_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "policy_status", rename_all = "lowercase")]
pub enum PolicyStatus {
    Active,
    Completed,
    Expired,
    Cancelled,
}

impl From<domain::PolicyType> for PolicyType {
    fn from(value: domain::PolicyType) -> Self {
        match value {
            domain::PolicyType::Life => PolicyType::Life,
            domain::PolicyType::Auto => PolicyType::Auto,
            domain::PolicyType::Health => PolicyType::Health,
            domain::PolicyType::Home => PolicyType::Home,
        }
    }
}

impl From<PolicyType> for domain::PolicyType {
    fn from(value: PolicyType) -> Self {
        match value {
            PolicyType::Life => domain::PolicyType::Life,
            PolicyType::Auto => domain::PolicyType::Auto,
            PolicyType::Health => domain::PolicyType::Health,
            PolicyType::Home => domain::PolicyType::Home,
        }
    }
}

impl From<domain::PolicyStatus> for PolicyStatus {
    fn from(value: domain::PolicyStatus) -> Self {
        match value {
            domain::PolicyStatus::Active => PolicyStatus::Active,
            domain::PolicyStatus::Completed => PolicyStatus::Completed,
            domain::PolicyStatus::Expired => PolicyStatus::Expired,
            domain::PolicyStatus::Cancelled => PolicyStatus::Cancelled,
        }
    }
}

impl From<PolicyStatus> for domain::PolicyStatus {
    fn from(value: PolicyStatus) -> Self {
        match value {
            PolicyStatus::Active => domain::PolicyStatus::Active,
            PolicyStatus::Completed => domain::PolicyStatus::Completed,
            PolicyStatus::Expired => domain::PolicyStatus::Expired,
            PolicyStatus::Cancelled => domain::PolicyStatus::Cancelled,
        }
    }
}

/// Database row representation of a policy
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PolicyRow {
    pub policy_id: Uuid,
    pub owner_id: Uuid,
    pub policy_type: PolicyType,
    pub coverage: Decimal,
    pub premium: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub remaining_balance: Decimal,
    pub status: PolicyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&domain::Policy> for PolicyRow {
    fn from(policy: &domain::Policy) -> Self {
        Self {
            policy_id: *policy.id.as_uuid(),
            owner_id: *policy.owner_id.as_uuid(),
            policy_type: policy.policy_type.into(),
            coverage: policy.coverage.amount(),
            premium: policy.premium.amount(),
            start_date: policy.start_date,
            end_date: policy.end_date,
            remaining_balance: policy.remaining_balance.amount(),
            status: policy.status.into(),
            created_at: policy.created_at,
            updated_at: policy.updated_at,
        }
    }
}

impl From<PolicyRow> for domain::Policy {
    fn from(row: PolicyRow) -> Self {
        Self {
            id: PolicyId::from_uuid(row.policy_id),
            owner_id: UserId::from_uuid(row.owner_id),
            policy_type: row.policy_type.into(),
            coverage: Money::new(row.coverage),
            premium: Money::new(row.premium),
            start_date: row.start_date,
            end_date: row.end_date,
            remaining_balance: Money::new(row.remaining_balance),
            status: row.status.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Filters and ordering for policy listings
#[derive(Debug, Clone)]
pub struct PolicyFilter {
    pub owner_id: Option<Uuid>,
    pub policy_type: Option<PolicyType>,
    pub status: Option<PolicyStatus>,
    pub min_balance: Option<Decimal>,
    /// Column to order by; must be one of the fixed policy columns
    pub sort_column: &'static str,
    pub descending: bool,
}

/// Repository for the `policies` table
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a policy row
    pub async fn insert(&self, row: &PolicyRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO policies (
                policy_id, owner_id, policy_type, coverage, premium, start_date,
                end_date, remaining_balance, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.policy_id)
        .bind(row.owner_id)
        .bind(row.policy_type)
        .bind(row.coverage)
        .bind(row.premium)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.remaining_balance)
        .bind(row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a policy by id
    pub async fn get(&self, policy_id: Uuid) -> Result<Option<PolicyRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {} FROM policies WHERE policy_id = $1",
            POLICY_COLUMNS
        ))
        .bind(policy_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists policies matching the filter
    pub async fn find(&self, filter: &PolicyFilter) -> Result<Vec<PolicyRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM policies WHERE TRUE", POLICY_COLUMNS));

        if let Some(owner_id) = filter.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(policy_type) = filter.policy_type {
            builder.push(" AND policy_type = ").push_bind(policy_type);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(min_balance) = filter.min_balance {
            builder.push(" AND remaining_balance >= ").push_bind(min_balance);
        }
        builder
            .push(" ORDER BY ")
            .push(filter.sort_column)
            .push(if filter.descending { " DESC" } else { " ASC" })
            .push(", policy_id");

        let rows = builder
            .build_query_as::<PolicyRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Deletes a policy; returns false if it did not exist
    ///
    /// Fails with `ForeignKeyViolation` while payments or claims reference it.
    pub async fn delete(&self, policy_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM policies WHERE policy_id = $1")
            .bind(policy_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches a policy and locks its row for the rest of the transaction
    pub async fn lock(conn: &mut PgConnection, policy_id: Uuid) -> Result<Option<PolicyRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {} FROM policies WHERE policy_id = $1 FOR UPDATE",
            POLICY_COLUMNS
        ))
        .bind(policy_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Writes every mutable column of a policy
    ///
    /// The premium and owner are never rewritten.
    pub async fn update(conn: &mut PgConnection, row: &PolicyRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE policies
            SET policy_type = $2,
                coverage = $3,
                start_date = $4,
                end_date = $5,
                remaining_balance = $6,
                status = $7,
                updated_at = $8
            WHERE policy_id = $1
            "#,
        )
        .bind(row.policy_id)
        .bind(row.policy_type)
        .bind(row.coverage)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.remaining_balance)
        .bind(row.status)
        .bind(row.updated_at)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Policy", row.policy_id));
        }
        Ok(())
    }
}
