//! HTTP tests over the in-memory stores

use std::str::FromStr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{Money, UserId};
use domain_billing::ports::mock::InMemoryStore;
use domain_policy::Policy;
use interface_api::auth::{create_token, ADMIN_ROLE};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState, Stores};
use test_utils::PolicyBuilder;

struct Harness {
    server: TestServer,
    store: InMemoryStore,
    config: ApiConfig,
}

impl Harness {
    async fn new(policies: Vec<Policy>) -> Self {
        let store = InMemoryStore::with_policies(policies).await;
        let config = ApiConfig::default();
        let stores = Stores {
            policies: Arc::new(store.clone()),
            billing: Arc::new(store.clone()),
            claims: Arc::new(store.clone()),
        };
        let server = TestServer::new(create_router(AppState::new(config.clone(), stores))).unwrap();
        Self { server, store, config }
    }

    fn token(&self, user: UserId) -> String {
        create_token(user, vec!["customer".to_string()], &self.config.jwt_secret, 300).unwrap()
    }

    fn admin_token(&self) -> String {
        create_token(UserId::new(), vec![ADMIN_ROLE.to_string()], &self.config.jwt_secret, 300).unwrap()
    }
}

fn amount(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("amount serialized as string")).unwrap()
}

fn policy_with_premium(owner: UserId, premium: Decimal) -> Policy {
    PolicyBuilder::new(owner).premium(Money::new(premium)).build()
}

fn payment_body(policy: &Policy, amount: u32) -> Value {
    json!({ "policyId": policy.id, "amount": amount, "method": "Zelle" })
}

#[tokio::test]
async fn test_health_is_public() {
    let h = Harness::new(vec![]).await;

    let response = h.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let ready = h.server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
    assert_eq!(ready.json::<Value>()["components"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_api_requires_bearer_token() {
    let h = Harness::new(vec![]).await;

    let response = h.server.get("/api/v1/payments").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthorized");

    let response = h.server.get("/api/v1/payments").authorization_bearer("not-a-jwt").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_policy_is_paid_down_to_completion() {
    let h = Harness::new(vec![]).await;
    let user = UserId::new();
    let token = h.token(user);

    let created = h
        .server
        .post("/api/v1/policies")
        .authorization_bearer(&token)
        .json(&json!({
            "policyType": "auto",
            "coverage": 10000,
            "premium": 100,
            "startDate": "2025-01-01",
            "endDate": "2026-01-01"
        }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let policy: Value = created.json();
    assert_eq!(policy["status"], "active");
    let policy_id = policy["id"].clone();

    let first = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy_id, "amount": 60, "method": "Pago Móvil" }))
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);
    let body: Value = first.json();
    assert_eq!(amount(&body["remainingBalance"]), dec!(40));
    assert_eq!(body["payment"]["status"], "completed");
    assert_eq!(body["payment"]["method"], "Pago Móvil");

    let second = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy_id, "amount": "40.00", "method": "Yappy" }))
        .await;
    assert_eq!(second.status_code(), StatusCode::CREATED);
    assert_eq!(amount(&second.json::<Value>()["remainingBalance"]), dec!(0));

    let fetched = h
        .server
        .get(&format!("/api/v1/policies/{}", policy_id.as_str().unwrap()))
        .authorization_bearer(&token)
        .await;
    assert_eq!(fetched.json::<Value>()["status"], "completed");

    let third = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy_id, "amount": 1, "method": "Zelle" }))
        .await;
    assert_eq!(third.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(third.json::<Value>()["error"], "invalid_state");

    let listed = h.server.get("/api/v1/payments").authorization_bearer(&token).await;
    let listed: Value = listed.json();
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["payment"]["method"], "Yappy");
}

#[tokio::test]
async fn test_overpayment_is_rejected_without_record() {
    let user = UserId::new();
    let policy = policy_with_premium(user, dec!(50));
    let h = Harness::new(vec![policy.clone()]).await;

    let response = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&h.token(user))
        .json(&payment_body(&policy, 75))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "exceeds_balance");
    assert_eq!(h.store.payment_count().await, 0);
}

#[tokio::test]
async fn test_foreign_or_missing_policy_is_not_found() {
    let owner = UserId::new();
    let policy = policy_with_premium(owner, dec!(100));
    let h = Harness::new(vec![policy.clone()]).await;
    let stranger = h.token(UserId::new());

    let foreign = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&stranger)
        .json(&payment_body(&policy, 10))
        .await;
    assert_eq!(foreign.status_code(), StatusCode::NOT_FOUND);

    let missing = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&stranger)
        .json(&payment_body(&policy_with_premium(owner, dec!(10)), 10))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_payment_bodies_are_validation_errors() {
    let user = UserId::new();
    let policy = policy_with_premium(user, dec!(100));
    let h = Harness::new(vec![policy.clone()]).await;
    let token = h.token(user);

    let unknown_method = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy.id, "amount": 10, "method": "Cash" }))
        .await;
    assert_eq!(unknown_method.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_method.json::<Value>()["error"], "validation_error");

    let zero = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy.id, "amount": 0, "method": "Zelle" }))
        .await;
    assert_eq!(zero.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = zero.json();
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"][0].as_str().unwrap().starts_with("amount"));

    let missing_field = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy.id }))
        .await;
    assert_eq!(missing_field.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_void_reactivates_policy() {
    let user = UserId::new();
    let policy = policy_with_premium(user, dec!(100));
    let h = Harness::new(vec![policy.clone()]).await;
    let token = h.token(user);

    let paid = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&payment_body(&policy, 100))
        .await;
    let payment_id = paid.json::<Value>()["payment"]["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/payments/{}", payment_id);

    let forbidden = h
        .server
        .put(&path)
        .authorization_bearer(&token)
        .json(&json!({ "status": "failed" }))
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    let voided = h
        .server
        .put(&path)
        .authorization_bearer(&h.admin_token())
        .json(&json!({ "status": "failed", "reference": "VOID-1" }))
        .await;
    assert_eq!(voided.status_code(), StatusCode::OK);
    let body: Value = voided.json();
    assert_eq!(body["payment"]["status"], "failed");
    assert_eq!(body["payment"]["reference"], "VOID-1");

    let fetched: Value = h
        .server
        .get(&format!("/api/v1/policies/{}", policy.id.as_uuid()))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(fetched["status"], "active");
    assert_eq!(amount(&fetched["remainingBalance"]), dec!(100));
}

#[tokio::test]
async fn test_reconciliation_failure_reports_payment_id() {
    let user = UserId::new();
    let policy = policy_with_premium(user, dec!(100));
    let h = Harness::new(vec![policy.clone()]).await;
    h.store.fail_policy_saves(true);

    let response = h
        .server
        .post("/api/v1/payments")
        .authorization_bearer(&h.token(user))
        .json(&payment_body(&policy, 30))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "reconciliation_failure");
    assert!(body["details"][0].as_str().unwrap().starts_with("paymentId: "));
    assert_eq!(h.store.payment_count().await, 1);
}

#[tokio::test]
async fn test_policy_listing_filters_and_sorts() {
    let user = UserId::new();
    let cheap = policy_with_premium(user, dec!(100));
    let pricey = policy_with_premium(user, dec!(900));
    let h = Harness::new(vec![cheap.clone(), pricey.clone(), policy_with_premium(UserId::new(), dec!(5))]).await;
    let token = h.token(user);

    let listed: Value = h
        .server
        .get("/api/v1/policies")
        .add_query_param("sortBy", "premium")
        .add_query_param("order", "asc")
        .authorization_bearer(&token)
        .await
        .json();
    let ids: Vec<&str> = listed.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![cheap.id.as_uuid().to_string(), pricey.id.as_uuid().to_string()]);

    let filtered: Value = h
        .server
        .get("/api/v1/policies")
        .add_query_param("minBalance", "500")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let bad_sort = h
        .server
        .get("/api/v1/policies")
        .add_query_param("sortBy", "owner")
        .authorization_bearer(&token)
        .await;
    assert_eq!(bad_sort.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_policy_update_requires_admin_and_keeps_premium() {
    let user = UserId::new();
    let policy = policy_with_premium(user, dec!(100));
    let h = Harness::new(vec![policy.clone()]).await;
    let path = format!("/api/v1/policies/{}", policy.id.as_uuid());

    let forbidden = h
        .server
        .put(&path)
        .authorization_bearer(&h.token(user))
        .json(&json!({ "policyType": "home" }))
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    let premium = h
        .server
        .put(&path)
        .authorization_bearer(&h.admin_token())
        .json(&json!({ "premium": 10 }))
        .await;
    assert_eq!(premium.status_code(), StatusCode::BAD_REQUEST);

    let updated = h
        .server
        .put(&path)
        .authorization_bearer(&h.admin_token())
        .json(&json!({ "policyType": "home", "status": "cancelled" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let body: Value = updated.json();
    assert_eq!(body["policyType"], "home");
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn test_delete_paid_policy_conflicts() {
    let user = UserId::new();
    let paid = policy_with_premium(user, dec!(100));
    let unpaid = policy_with_premium(user, dec!(100));
    let h = Harness::new(vec![paid.clone(), unpaid.clone()]).await;
    let token = h.token(user);

    h.server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&payment_body(&paid, 10))
        .await;

    let conflict = h
        .server
        .delete(&format!("/api/v1/policies/{}", paid.id.as_uuid()))
        .authorization_bearer(&token)
        .await;
    assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

    let deleted = h
        .server
        .delete(&format!("/api/v1/policies/{}", unpaid.id.as_uuid()))
        .authorization_bearer(&token)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_policy_with_claim_conflicts() {
    let user = UserId::new();
    let policy = policy_with_premium(user, dec!(100));
    let h = Harness::new(vec![policy.clone()]).await;
    let token = h.token(user);

    let claim = h
        .server
        .post("/api/v1/claims")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy.id, "description": "Hail damage to the roof", "date": "2025-06-15" }))
        .await;
    assert_eq!(claim.status_code(), StatusCode::CREATED);

    let response = h
        .server
        .delete(&format!("/api/v1/policies/{}", policy.id.as_uuid()))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "conflict");
}

#[tokio::test]
async fn test_oversized_premium_is_a_validation_error() {
    let h = Harness::new(vec![]).await;
    let token = h.token(UserId::new());

    let response = h
        .server
        .post("/api/v1/policies")
        .authorization_bearer(&token)
        .json(&json!({
            "policyType": "auto",
            "coverage": 10000,
            "premium": 100000000000000u64,
            "startDate": "2025-01-01",
            "endDate": "2026-01-01"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "validation_error");
}

#[tokio::test]
async fn test_claims_and_reports() {
    let user = UserId::new();
    let policy = policy_with_premium(user, dec!(100));
    let h = Harness::new(vec![policy.clone()]).await;
    let token = h.token(user);

    let claim = h
        .server
        .post("/api/v1/claims")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy.id, "description": "Rear-ended at a light", "date": "2025-06-15" }))
        .await;
    assert_eq!(claim.status_code(), StatusCode::CREATED);
    assert_eq!(claim.json::<Value>()["status"], "pending");

    let blank = h
        .server
        .post("/api/v1/claims")
        .authorization_bearer(&token)
        .json(&json!({ "policyId": policy.id, "description": "", "date": "2025-06-15" }))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

    let claims: Value = h.server.get("/api/v1/claims").authorization_bearer(&token).await.json();
    assert_eq!(claims[0]["policyType"], "auto");

    h.server
        .post("/api/v1/payments")
        .authorization_bearer(&token)
        .json(&payment_body(&policy, 30))
        .await;

    let stats: Value = h.server.get("/api/v1/reports/stats").authorization_bearer(&token).await.json();
    assert_eq!(stats["totalPolicies"], 1);
    assert_eq!(amount(&stats["totalSpent"]), dec!(30));
    assert_eq!(amount(&stats["totalRemainingBalance"]), dec!(70));

    let history: Value = h.server.get("/api/v1/reports/payments").authorization_bearer(&token).await.json();
    assert_eq!(history[0]["policyType"], "auto");
    assert_eq!(history[0]["method"], "Zelle");

    let policies: Value = h.server.get("/api/v1/reports/policies").authorization_bearer(&token).await.json();
    assert_eq!(policies.as_array().unwrap().len(), 1);
}
