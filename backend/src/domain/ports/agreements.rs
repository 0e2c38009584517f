//! Driving port for agreements and signature collection.

use async_trait::async_trait;

use crate::domain::{
    Agreement, AgreementDraft, AgreementFilter, AgreementId, AgreementPatch, AuthenticatedCaller,
    Error, SigningParty,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Agreements: Send + Sync {
    /// Requires the landlord role and ownership of the property.
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: AgreementDraft,
    ) -> Result<Agreement, Error>;

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: AgreementFilter,
    ) -> Result<Vec<Agreement>, Error>;

    async fn get(&self, caller: &AuthenticatedCaller, id: AgreementId)
    -> Result<Agreement, Error>;

    /// Edit a draft. Anything but the landlord's own draft is not found.
    async fn update(
        &self,
        caller: &AuthenticatedCaller,
        id: AgreementId,
        patch: AgreementPatch,
    ) -> Result<Agreement, Error>;

    /// Sign as `party`, recording `ip`.
    async fn sign(
        &self,
        caller: &AuthenticatedCaller,
        id: AgreementId,
        party: SigningParty,
        ip: Option<String>,
    ) -> Result<Agreement, Error>;
}
