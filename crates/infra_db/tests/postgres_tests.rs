//! PostgreSQL adapter tests
//!
//! These start a PostgreSQL container and are ignored by default.
//! Run with `cargo test -p infra_db -- --ignored`.

use std::sync::Arc;

use core_kernel::{HealthCheckable, Money, UserId};
use domain_billing::{
    BillingError, BillingPort, PaymentMethod, PaymentRequest, PaymentService, PaymentStatus, PaymentStatusUpdate,
};
use domain_claims::{ClaimError, ClaimReport, ClaimStatus, ClaimsService};
use domain_policy::{
    PolicyChanges, PolicyError, PolicyPort, PolicyQuery, PolicySortField, PolicyStatus, PolicyType, SortOrder,
};
use infra_db::{PostgresBillingAdapter, PostgresClaimsAdapter, PostgresPolicyAdapter};
use rust_decimal_macros::dec;
use test_utils::{db_test, DateFixtures, PolicyBuilder, TestDatabase, TextFixtures};

struct Adapters {
    policies: Arc<PostgresPolicyAdapter>,
    billing: Arc<PostgresBillingAdapter>,
    claims: Arc<PostgresClaimsAdapter>,
}

fn adapters(db: &TestDatabase) -> Adapters {
    Adapters {
        policies: Arc::new(PostgresPolicyAdapter::new(db.pool().clone())),
        billing: Arc::new(PostgresBillingAdapter::new(db.pool().clone())),
        claims: Arc::new(PostgresClaimsAdapter::new(db.pool().clone())),
    }
}

fn payment_service(a: &Adapters) -> PaymentService {
    PaymentService::new(a.billing.clone(), a.policies.clone())
}

fn request(policy_id: core_kernel::PolicyId, amount: rust_decimal::Decimal) -> PaymentRequest {
    PaymentRequest {
        policy_id,
        amount: Money::new(amount),
        method: PaymentMethod::Zelle,
        reference: None,
    }
}

db_test!(test_health_checks, |db| {
    let a = adapters(&db);
    assert!(a.policies.health_check().await.is_operational());
    assert!(a.billing.health_check().await.is_operational());
    assert!(a.claims.health_check().await.is_operational());
});

db_test!(test_policy_roundtrip_and_filters, |db| {
    let a = adapters(&db);
    let owner = UserId::new();

    let life = PolicyBuilder::new(owner)
        .policy_type(PolicyType::Life)
        .premium(Money::new(dec!(300)))
        .build();
    let auto = PolicyBuilder::new(owner)
        .policy_type(PolicyType::Auto)
        .premium(Money::new(dec!(120)))
        .build();
    let foreign = PolicyBuilder::new(UserId::new()).build();
    for policy in [&life, &auto, &foreign] {
        a.policies.create_policy(policy.clone()).await.unwrap();
    }

    let loaded = a.policies.get_policy(life.id).await.unwrap();
    assert_eq!(loaded.policy_type, PolicyType::Life);
    assert_eq!(loaded.premium, Money::new(dec!(300)));
    assert_eq!(loaded.remaining_balance, Money::new(dec!(300)));
    assert_eq!(loaded.status, PolicyStatus::Active);

    let by_premium = a
        .policies
        .find_policies(PolicyQuery {
            sort_by: PolicySortField::Premium,
            order: SortOrder::Asc,
            ..PolicyQuery::for_owner(owner)
        })
        .await
        .unwrap();
    let ids: Vec<_> = by_premium.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![auto.id, life.id]);

    let filtered = a
        .policies
        .find_policies(PolicyQuery {
            policy_type: Some(PolicyType::Auto),
            min_balance: Some(Money::new(dec!(100))),
            ..PolicyQuery::for_owner(owner)
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, auto.id);
});

db_test!(test_update_policy_rejects_inconsistent_status, |db| {
    let a = adapters(&db);
    let policy = PolicyBuilder::new(UserId::new()).build();
    a.policies.create_policy(policy.clone()).await.unwrap();

    let updated = a
        .policies
        .update_policy(
            policy.id,
            PolicyChanges {
                policy_type: Some(PolicyType::Home),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.policy_type, PolicyType::Home);

    let err = a
        .policies
        .update_policy(
            policy.id,
            PolicyChanges {
                status: Some(PolicyStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_conflict());
});

db_test!(test_submission_pays_down_to_completion, |db| {
    let a = adapters(&db);
    let owner = UserId::new();
    let policy = PolicyBuilder::new(owner).premium(Money::new(dec!(100))).build();
    a.policies.create_policy(policy.clone()).await.unwrap();
    let service = payment_service(&a);

    let first = service.submit_payment(owner, request(policy.id, dec!(60))).await.unwrap();
    assert_eq!(first.remaining_balance, Money::new(dec!(40)));
    assert_eq!(first.payment.status, PaymentStatus::Completed);

    let second = service.submit_payment(owner, request(policy.id, dec!(40))).await.unwrap();
    assert_eq!(second.remaining_balance, Money::zero());

    let stored = a.policies.get_policy(policy.id).await.unwrap();
    assert_eq!(stored.status, PolicyStatus::Completed);

    let err = service
        .submit_payment(owner, request(policy.id, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::InvalidState(_)));

    let listed = a.billing.payments_for_user(owner).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.payment.id);
});

db_test!(test_overpayment_creates_no_record, |db| {
    let a = adapters(&db);
    let owner = UserId::new();
    let policy = PolicyBuilder::new(owner).premium(Money::new(dec!(50))).build();
    a.policies.create_policy(policy.clone()).await.unwrap();

    let err = payment_service(&a)
        .submit_payment(owner, request(policy.id, dec!(75)))
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::ExceedsBalance { .. }));

    assert!(a.billing.payments_for_user(owner).await.unwrap().is_empty());
    let stored = a.policies.get_policy(policy.id).await.unwrap();
    assert_eq!(stored.remaining_balance, Money::new(dec!(50)));
});

db_test!(test_concurrent_submissions_never_exceed_premium, |db| {
    let a = adapters(&db);
    let owner = UserId::new();
    let policy = PolicyBuilder::new(owner).premium(Money::new(dec!(100))).build();
    a.policies.create_policy(policy.clone()).await.unwrap();
    let service = payment_service(&a);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let policy_id = policy.id;
        handles.push(tokio::spawn(async move {
            service.submit_payment(owner, request(policy_id, dec!(30))).await
        }));
    }
    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 3);
    let stored = a.policies.get_policy(policy.id).await.unwrap();
    assert_eq!(stored.remaining_balance, Money::new(dec!(10)));
});

db_test!(test_duplicate_reference_is_a_conflict, |db| {
    let a = adapters(&db);
    let owner = UserId::new();
    let policy = PolicyBuilder::new(owner).build();
    a.policies.create_policy(policy.clone()).await.unwrap();
    let service = payment_service(&a);
    let reference = TextFixtures::payment_reference();

    let mut req = request(policy.id, dec!(10));
    req.reference = Some(reference.clone());
    service.submit_payment(owner, req.clone()).await.unwrap();

    let err = service.submit_payment(owner, req).await.unwrap_err();
    assert!(matches!(err, BillingError::Conflict(_)));
});

db_test!(test_voiding_a_payment_reactivates_policy, |db| {
    let a = adapters(&db);
    let owner = UserId::new();
    let policy = PolicyBuilder::new(owner).premium(Money::new(dec!(100))).build();
    a.policies.create_policy(policy.clone()).await.unwrap();
    let service = payment_service(&a);

    let receipt = service.submit_payment(owner, request(policy.id, dec!(100))).await.unwrap();
    assert_eq!(receipt.remaining_balance, Money::zero());

    let voided = service
        .update_payment_status(
            receipt.payment.id,
            PaymentStatusUpdate {
                status: PaymentStatus::Failed,
                reference: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(voided.status, PaymentStatus::Failed);

    let stored = a.policies.get_policy(policy.id).await.unwrap();
    assert_eq!(stored.remaining_balance, Money::new(dec!(100)));
    assert_eq!(stored.status, PolicyStatus::Active);
});

db_test!(test_delete_referenced_policy_conflicts, |db| {
    let a = adapters(&db);
    let owner = UserId::new();
    let paid = PolicyBuilder::new(owner).build();
    let unpaid = PolicyBuilder::new(owner).build();
    a.policies.create_policy(paid.clone()).await.unwrap();
    a.policies.create_policy(unpaid.clone()).await.unwrap();
    payment_service(&a)
        .submit_payment(owner, request(paid.id, dec!(10)))
        .await
        .unwrap();

    let err = a.policies.delete_policy(paid.id).await.unwrap_err();
    assert!(err.is_conflict());

    a.policies.delete_policy(unpaid.id).await.unwrap();
    let err = a.policies.get_policy(unpaid.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(PolicyError::from(err), PolicyError::NotFound(_)));
});

db_test!(test_claims_are_listed_with_policy_type, |db| {
    let a = adapters(&db);
    let owner = UserId::new();
    let policy = PolicyBuilder::new(owner).policy_type(PolicyType::Health).build();
    a.policies.create_policy(policy.clone()).await.unwrap();
    let service = ClaimsService::new(a.claims.clone(), a.policies.clone());

    let claim = service
        .report(
            owner,
            ClaimReport {
                policy_id: policy.id,
                description: TextFixtures::claim_description(),
                loss_date: DateFixtures::loss_date(),
            },
        )
        .await
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::Pending);

    let err = service
        .report(
            UserId::new(),
            ClaimReport {
                policy_id: policy.id,
                description: TextFixtures::claim_description(),
                loss_date: DateFixtures::loss_date(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::PolicyNotFound(_)));

    let listed = service.list(owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].claim.id, claim.id);
    assert_eq!(listed[0].policy_type, Some(PolicyType::Health));
});
