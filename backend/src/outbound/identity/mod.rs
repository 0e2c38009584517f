//! Federated identity adapters.
//!
//! [`FirebaseIdentityVerifier`] checks Firebase ID tokens. Deployments
//! without a Firebase project wire [`UnconfiguredIdentityVerifier`] so the
//! federated route answers `service_unavailable` instead of failing start-up.

mod dto;
mod firebase;

use async_trait::async_trait;

use crate::domain::FederatedIdentity;
use crate::domain::ports::{IdentityVerificationError, IdentityVerifier};

pub use firebase::{FIREBASE_JWKS_URL, FirebaseIdentityVerifier};

/// Verifier used when no identity provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredIdentityVerifier;

#[async_trait]
impl IdentityVerifier for UnconfiguredIdentityVerifier {
    async fn verify(&self, _id_token: &str) -> Result<FederatedIdentity, IdentityVerificationError> {
        Err(IdentityVerificationError::unconfigured())
    }
}
