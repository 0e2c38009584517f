//! Agreement lifecycle service: drafting, editing and signature collection.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{AgreementRepository, Agreements, PropertyRepository, SignatureRecord};
use crate::domain::repository_errors::{map_agreement_error, map_property_error};
use crate::domain::{
    Agreement, AgreementDraft, AgreementFilter, AgreementId, AgreementPatch, AuthenticatedCaller,
    Error, Role, SigningParty,
};

const NOT_FOUND: &str = "Agreement not found";
const NOT_EDITABLE: &str = "Agreement not found or cannot be updated";

/// Agreement service implementing the [`Agreements`] driving port.
///
/// The property repository is consulted only to confirm that a landlord owns
/// the listing an agreement is drafted against.
#[derive(Clone)]
pub struct AgreementService<A, P> {
    agreements: Arc<A>,
    properties: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<A, P> AgreementService<A, P> {
    /// Build the service; `properties` is consulted for ownership when drafting.
    pub fn new(agreements: Arc<A>, properties: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            agreements,
            properties,
            clock,
        }
    }
}

impl<A, P> AgreementService<A, P>
where
    A: AgreementRepository,
{
    async fn visible(
        &self,
        caller: &AuthenticatedCaller,
        id: &AgreementId,
    ) -> Result<Option<Agreement>, Error> {
        self.agreements
            .find_for_participant(id, &caller.user_id)
            .await
            .map_err(map_agreement_error)
    }
}

#[async_trait]
impl<A, P> Agreements for AgreementService<A, P>
where
    A: AgreementRepository,
    P: PropertyRepository,
{
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: AgreementDraft,
    ) -> Result<Agreement, Error> {
        caller.require_any_role(&[Role::Landlord])?;
        draft.validate()?;
        let owned = self
            .properties
            .find_for_owner(&draft.property, &caller.user_id)
            .await
            .map_err(map_property_error)?;
        if owned.is_none() {
            return Err(Error::not_found("Property not found or access denied"));
        }

        let agreement = draft.into_agreement(caller.user_id, self.clock.utc());
        self.agreements
            .insert(&agreement)
            .await
            .map_err(map_agreement_error)?;
        info!(
            agreement_id = %agreement.id,
            property_id = %agreement.property,
            "agreement drafted"
        );
        Ok(agreement)
    }

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: AgreementFilter,
    ) -> Result<Vec<Agreement>, Error> {
        self.agreements
            .list(&caller.user_id, &filter)
            .await
            .map_err(map_agreement_error)
    }

    async fn get(
        &self,
        caller: &AuthenticatedCaller,
        id: AgreementId,
    ) -> Result<Agreement, Error> {
        self.visible(caller, &id)
            .await?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn update(
        &self,
        caller: &AuthenticatedCaller,
        id: AgreementId,
        patch: AgreementPatch,
    ) -> Result<Agreement, Error> {
        let mut agreement = self
            .visible(caller, &id)
            .await?
            .filter(|agreement| agreement.is_editable_by(&caller.user_id))
            .ok_or_else(|| Error::not_found(NOT_EDITABLE))?;

        patch.validate()?;
        patch.apply_to(&mut agreement, self.clock.utc());
        agreement.validate_terms()?;

        self.agreements
            .replace_draft(&agreement)
            .await
            .map_err(map_agreement_error)?
            .ok_or_else(|| Error::not_found(NOT_EDITABLE))
    }

    async fn sign(
        &self,
        caller: &AuthenticatedCaller,
        id: AgreementId,
        party: SigningParty,
        ip: Option<String>,
    ) -> Result<Agreement, Error> {
        let agreement = self
            .visible(caller, &id)
            .await?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        agreement.authorize_signature(party, &caller.user_id)?;

        let record = SignatureRecord {
            agreement: id,
            party,
            signer: caller.user_id,
            ip,
            signed_at: self.clock.utc(),
        };
        let signed = self
            .agreements
            .record_signature(&record)
            .await
            .map_err(map_agreement_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        info!(
            agreement_id = %id,
            party = ?party,
            status = signed.status.as_str(),
            "agreement signed"
        );
        Ok(signed)
    }
}

#[cfg(test)]
#[path = "agreement_service_tests.rs"]
mod tests;
