//! PolicyService tests against the in-memory port

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Money, PolicyId, UserId};
use domain_policy::ports::mock::MockPolicyPort;
use domain_policy::{
    PolicyApplication, PolicyChanges, PolicyError, PolicyQuery, PolicyService, PolicySortField,
    PolicyStatus, PolicyType, SortOrder,
};

fn application(policy_type: PolicyType, premium: rust_decimal::Decimal, start_month: u32) -> PolicyApplication {
    PolicyApplication {
        policy_type,
        coverage: Money::new(premium * dec!(100)),
        premium: Money::new(premium),
        start_date: NaiveDate::from_ymd_opt(2025, start_month, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, start_month, 1).unwrap(),
    }
}

fn service() -> (PolicyService, MockPolicyPort) {
    let port = MockPolicyPort::new();
    (PolicyService::new(Arc::new(port.clone())), port)
}

#[tokio::test]
async fn acquire_persists_policy() {
    let (service, port) = service();
    let owner = UserId::new();

    let policy = service
        .acquire(owner, application(PolicyType::Life, dec!(100), 1))
        .await
        .unwrap();

    assert_eq!(port.count().await, 1);
    let fetched = service.get(owner, policy.id).await.unwrap();
    assert_eq!(fetched, policy);
}

#[tokio::test]
async fn invalid_application_is_not_persisted() {
    let (service, port) = service();
    let mut app = application(PolicyType::Life, dec!(100), 1);
    app.premium = Money::zero();

    let result = service.acquire(UserId::new(), app).await;
    assert!(matches!(result, Err(PolicyError::Validation(_))));
    assert_eq!(port.count().await, 0);
}

#[tokio::test]
async fn another_users_policy_is_not_found() {
    let (service, _) = service();
    let owner = UserId::new();
    let policy = service
        .acquire(owner, application(PolicyType::Auto, dec!(80), 2))
        .await
        .unwrap();

    let result = service.get(UserId::new(), policy.id).await;
    assert!(matches!(result, Err(PolicyError::NotFound(_))));
}

#[tokio::test]
async fn missing_policy_is_not_found() {
    let (service, _) = service();
    let result = service.get(UserId::new(), PolicyId::new()).await;
    assert!(matches!(result, Err(PolicyError::NotFound(_))));
}

#[tokio::test]
async fn list_is_scoped_filtered_and_sorted() {
    let (service, _) = service();
    let owner = UserId::new();
    service.acquire(owner, application(PolicyType::Auto, dec!(300), 3)).await.unwrap();
    service.acquire(owner, application(PolicyType::Life, dec!(100), 1)).await.unwrap();
    service.acquire(owner, application(PolicyType::Auto, dec!(200), 2)).await.unwrap();
    service.acquire(UserId::new(), application(PolicyType::Auto, dec!(900), 4)).await.unwrap();

    let all = service.list(owner, PolicyQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    // default ordering is newest start date first
    assert_eq!(all[0].premium, Money::new(dec!(300)));
    assert_eq!(all[2].premium, Money::new(dec!(100)));

    let autos = service
        .list(
            owner,
            PolicyQuery {
                policy_type: Some(PolicyType::Auto),
                sort_by: PolicySortField::Premium,
                order: SortOrder::Asc,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let premiums: Vec<_> = autos.iter().map(|p| p.premium).collect();
    assert_eq!(premiums, vec![Money::new(dec!(200)), Money::new(dec!(300))]);

    let large = service
        .list(
            owner,
            PolicyQuery {
                min_balance: Some(Money::new(dec!(250))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(large.len(), 1);
}

#[tokio::test]
async fn list_cannot_be_widened_to_other_owners() {
    let (service, _) = service();
    let owner = UserId::new();
    let other = UserId::new();
    service.acquire(other, application(PolicyType::Home, dec!(50), 1)).await.unwrap();

    let query = PolicyQuery::for_owner(other);
    let listed = service.list(owner, query).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn update_applies_changes() {
    let (service, _) = service();
    let owner = UserId::new();
    let policy = service
        .acquire(owner, application(PolicyType::Health, dec!(120), 1))
        .await
        .unwrap();

    let updated = service
        .update(
            policy.id,
            PolicyChanges {
                status: Some(PolicyStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, PolicyStatus::Cancelled);
    assert_eq!(updated.remaining_balance, Money::new(dec!(120)));
}

#[tokio::test]
async fn update_rejects_completing_an_unpaid_policy() {
    let (service, _) = service();
    let policy = service
        .acquire(UserId::new(), application(PolicyType::Health, dec!(120), 1))
        .await
        .unwrap();

    let result = service
        .update(
            policy.id,
            PolicyChanges {
                status: Some(PolicyStatus::Completed),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(PolicyError::Conflict(_))));
}

#[tokio::test]
async fn update_without_changes_is_rejected() {
    let (service, _) = service();
    let result = service.update(PolicyId::new(), PolicyChanges::default()).await;
    assert!(matches!(result, Err(PolicyError::Validation(_))));
}

#[tokio::test]
async fn delete_removes_own_policy_only() {
    let (service, port) = service();
    let owner = UserId::new();
    let policy = service
        .acquire(owner, application(PolicyType::Life, dec!(10), 1))
        .await
        .unwrap();

    let denied = service.delete(UserId::new(), policy.id).await;
    assert!(matches!(denied, Err(PolicyError::NotFound(_))));
    assert_eq!(port.count().await, 1);

    service.delete(owner, policy.id).await.unwrap();
    assert_eq!(port.count().await, 0);
}
