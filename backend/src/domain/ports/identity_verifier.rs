//! Port for checking identity tokens minted by a federated provider.

use async_trait::async_trait;

use crate::domain::FederatedIdentity;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity verifiers.
    pub enum IdentityVerificationError {
        /// The provider's token failed verification.
        Rejected { message: String } => "identity token rejected: {message}",
        /// The provider could not be reached or answered unexpectedly.
        Upstream { message: String } => "identity provider unavailable: {message}",
        /// No provider is configured for this deployment.
        Unconfigured => "federated sign-in is not configured",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, IdentityVerificationError>;
}
