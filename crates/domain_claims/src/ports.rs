//! Claims Domain Ports

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, UserId};

use crate::claim::Claim;

/// Storage operations for claims
#[async_trait]
pub trait ClaimsPort: DomainPort + HealthCheckable {
    /// Persists a new claim
    async fn create_claim(&self, claim: Claim) -> Result<Claim, PortError>;

    /// The user's claims, newest first
    async fn claims_for_user(&self, user_id: UserId) -> Result<Vec<Claim>, PortError>;
}

/// Mock implementation of ClaimsPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ClaimsPort
    #[derive(Debug, Default, Clone)]
    pub struct MockClaimsPort {
        claims: Arc<RwLock<Vec<Claim>>>,
    }

    impl MockClaimsPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of stored claims
        pub async fn count(&self) -> usize {
            self.claims.read().await.len()
        }
    }

    impl DomainPort for MockClaimsPort {}

    #[async_trait]
    impl HealthCheckable for MockClaimsPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-claims-port", 0)
        }
    }

    #[async_trait]
    impl ClaimsPort for MockClaimsPort {
        async fn create_claim(&self, claim: Claim) -> Result<Claim, PortError> {
            self.claims.write().await.push(claim.clone());
            Ok(claim)
        }

        async fn claims_for_user(&self, user_id: UserId) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .claims
                .read()
                .await
                .iter()
                .rev()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect())
        }
    }
}
