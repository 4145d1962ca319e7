//! Payment repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{Money, PaymentId, PolicyId, UserId};
use domain_billing::payment as domain;

use crate::error::DatabaseError;

const PAYMENT_COLUMNS: &str = "payment_id, policy_id, user_id, amount, method, status, reference, \
     paid_at, created_at, updated_at";

/// Payment status, stored as the `payment_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl From<domain::PaymentStatus> for PaymentStatus {
    fn from(value: domain::PaymentStatus) -> Self {
        match value {
            domain::PaymentStatus::Pending => PaymentStatus::Pending,
            domain::PaymentStatus::Completed => PaymentStatus::Completed,
            domain::PaymentStatus::Failed => PaymentStatus::Failed,
        }
    }
}

impl From<PaymentStatus> for domain::PaymentStatus {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Pending => domain::PaymentStatus::Pending,
            PaymentStatus::Completed => domain::PaymentStatus::Completed,
            PaymentStatus::Failed => domain::PaymentStatus::Failed,
        }
    }
}

/// Database row representation of a payment
///
/// `method` holds the channel name (`"Pago Móvil"`, …), checked by the table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub policy_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&domain::Payment> for PaymentRow {
    fn from(payment: &domain::Payment) -> Self {
        Self {
            payment_id: *payment.id.as_uuid(),
            policy_id: *payment.policy_id.as_uuid(),
            user_id: *payment.user_id.as_uuid(),
            amount: payment.amount.amount(),
            method: payment.method.as_str().to_string(),
            status: payment.status.into(),
            reference: payment.reference.clone(),
            paid_at: payment.paid_at,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

impl TryFrom<PaymentRow> for domain::Payment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let method = row
            .method
            .parse::<domain::PaymentMethod>()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(Self {
            id: PaymentId::from_uuid(row.payment_id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            user_id: UserId::from_uuid(row.user_id),
            amount: Money::new(row.amount),
            method,
            status: row.status.into(),
            reference: row.reference,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for the `payments` table
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a payment by id
    pub async fn get(&self, payment_id: Uuid) -> Result<Option<PaymentRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE payment_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// A user's payments, newest first
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC, payment_id DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a payment row
    pub async fn insert(conn: &mut PgConnection, row: &PaymentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, policy_id, user_id, amount, method, status,
                reference, paid_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(row.payment_id)
        .bind(row.policy_id)
        .bind(row.user_id)
        .bind(row.amount)
        .bind(&row.method)
        .bind(row.status)
        .bind(&row.reference)
        .bind(row.paid_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Fetches a payment and locks its row for the rest of the transaction
    pub async fn lock(conn: &mut PgConnection, payment_id: Uuid) -> Result<Option<PaymentRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE payment_id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Writes a payment's status and reference
    pub async fn update_status(conn: &mut PgConnection, row: &PaymentRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, reference = $3, updated_at = $4
            WHERE payment_id = $1
            "#,
        )
        .bind(row.payment_id)
        .bind(row.status)
        .bind(&row.reference)
        .bind(row.updated_at)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", row.payment_id));
        }
        Ok(())
    }

    /// Amounts of the completed payments against a policy
    pub async fn completed_amounts(conn: &mut PgConnection, policy_id: Uuid) -> Result<Vec<Decimal>, DatabaseError> {
        let amounts = sqlx::query_scalar::<_, Decimal>(
            "SELECT amount FROM payments WHERE policy_id = $1 AND status = 'completed'",
        )
        .bind(policy_id)
        .fetch_all(conn)
        .await?;

        Ok(amounts)
    }
}
