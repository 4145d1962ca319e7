//! Policy DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Money, PolicyId};
use domain_policy::{Policy, PolicyApplication, PolicyChanges, PolicyQuery, PolicyStatus, PolicyType};

use super::positive_amount;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyRequest {
    pub policy_type: String,
    #[validate(custom(function = "positive_amount"))]
    pub coverage: Decimal,
    #[validate(custom(function = "positive_amount"))]
    pub premium: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CreatePolicyRequest {
    pub fn into_application(self) -> Result<PolicyApplication, ApiError> {
        Ok(PolicyApplication {
            policy_type: self.policy_type.parse()?,
            coverage: Money::new(self.coverage),
            premium: Money::new(self.premium),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Administrative policy update; the premium cannot change
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyRequest {
    pub policy_type: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub coverage: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub premium: Option<Decimal>,
}

impl UpdatePolicyRequest {
    pub fn into_changes(self) -> Result<PolicyChanges, ApiError> {
        if self.premium.is_some() {
            return Err(ApiError::validation("premium cannot be changed"));
        }
        Ok(PolicyChanges {
            policy_type: self.policy_type.as_deref().map(str::parse).transpose()?,
            coverage: self.coverage.map(Money::new),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.as_deref().map(str::parse).transpose()?,
        })
    }
}

/// Query string of `GET /policies`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPoliciesQuery {
    #[serde(rename = "type")]
    pub policy_type: Option<String>,
    pub status: Option<String>,
    pub min_balance: Option<Decimal>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListPoliciesQuery {
    pub fn into_query(self) -> Result<PolicyQuery, ApiError> {
        Ok(PolicyQuery {
            owner_id: None,
            policy_type: self.policy_type.as_deref().map(str::parse).transpose()?,
            status: self.status.as_deref().map(str::parse).transpose()?,
            min_balance: self.min_balance.map(Money::new),
            sort_by: self.sort_by.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
            order: self.order.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub id: PolicyId,
    pub policy_type: PolicyType,
    pub coverage: Money,
    pub premium: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub remaining_balance: Money,
    pub status: PolicyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Policy> for PolicyResponse {
    fn from(p: Policy) -> Self {
        Self {
            id: p.id,
            policy_type: p.policy_type,
            coverage: p.coverage,
            premium: p.premium,
            start_date: p.start_date,
            end_date: p.end_date,
            remaining_balance: p.remaining_balance,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_policy::{PolicySortField, SortOrder};
    use rust_decimal_macros::dec;

    #[test]
    fn test_list_query_defaults_to_start_date_desc() {
        let query = ListPoliciesQuery::default().into_query().unwrap();
        assert_eq!(query.sort_by, PolicySortField::StartDate);
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let query = ListPoliciesQuery {
            sort_by: Some("owner".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_query(), Err(ApiError::Validation { .. })));
    }

    #[test]
    fn test_premium_change_is_rejected() {
        let request = UpdatePolicyRequest {
            premium: Some(dec!(10)),
            ..Default::default()
        };
        assert!(matches!(request.into_changes(), Err(ApiError::Validation { .. })));
    }
}
