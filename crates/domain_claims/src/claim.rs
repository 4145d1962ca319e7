//! Claim entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, PolicyId, UserId};
use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Reported, not yet looked at
    Pending,
    UnderReview,
    Approved,
    Denied,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::UnderReview => "under_review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Denied => "denied",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClaimStatus::Pending),
            "under_review" => Ok(ClaimStatus::UnderReview),
            "approved" => Ok(ClaimStatus::Approved),
            "denied" => Ok(ClaimStatus::Denied),
            other => Err(ClaimError::Validation(format!("unknown claim status '{}'", other))),
        }
    }
}

/// A loss reported against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    /// Reporting user, always the policy owner
    pub user_id: UserId,
    pub policy_id: PolicyId,
    pub description: String,
    /// Date of loss
    pub loss_date: NaiveDate,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a pending claim
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::Validation` if the description is blank
    pub fn report(
        user_id: UserId,
        policy_id: PolicyId,
        description: impl Into<String>,
        loss_date: NaiveDate,
    ) -> Result<Self, ClaimError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(ClaimError::Validation("description is required".to_string()));
        }

        Ok(Self {
            id: ClaimId::new_v7(),
            user_id,
            policy_id,
            description,
            loss_date,
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_starts_pending() {
        let claim = Claim::report(
            UserId::new(),
            PolicyId::new(),
            " Rear-end collision ",
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        )
        .unwrap();
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.description, "Rear-end collision");
    }

    #[test]
    fn test_blank_description_rejected() {
        let result = Claim::report(
            UserId::new(),
            PolicyId::new(),
            "   ",
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        );
        assert!(matches!(result, Err(ClaimError::Validation(_))));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [ClaimStatus::Pending, ClaimStatus::UnderReview, ClaimStatus::Approved, ClaimStatus::Denied] {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
        }
    }
}
