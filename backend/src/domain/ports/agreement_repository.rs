//! Port abstraction for agreement persistence.
//!
//! Reads are scoped to participants. Writes carry their own guard so that a
//! concurrent change between read and write cannot slip through: draft
//! replacement requires `status = draft` and the landlord, and signature
//! recording requires the caller to hold the signing side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Agreement, AgreementFilter, AgreementId, SigningParty, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by agreement repository adapters.
    pub enum AgreementPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "agreement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "agreement repository query failed: {message}",
    }
}

/// A signature to record atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    pub agreement: AgreementId,
    pub party: SigningParty,
    pub signer: UserId,
    pub ip: Option<String>,
    pub signed_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    async fn insert(&self, agreement: &Agreement) -> Result<(), AgreementPersistenceError>;

    /// Agreements on the filter's side for `caller`, newest first.
    async fn list(
        &self,
        caller: &UserId,
        filter: &AgreementFilter,
    ) -> Result<Vec<Agreement>, AgreementPersistenceError>;

    /// Fetch when `caller` is the landlord or the tenant.
    async fn find_for_participant(
        &self,
        id: &AgreementId,
        caller: &UserId,
    ) -> Result<Option<Agreement>, AgreementPersistenceError>;

    /// Overwrite the editable terms of a draft owned by `agreement.landlord`.
    /// Returns `None` when the stored record is no longer such a draft.
    async fn replace_draft(
        &self,
        agreement: &Agreement,
    ) -> Result<Option<Agreement>, AgreementPersistenceError>;

    /// Set the party's signature and recompute the status in one update.
    /// Returns `None` when the signer no longer holds the side or the
    /// agreement has left the signing states.
    async fn record_signature(
        &self,
        record: &SignatureRecord,
    ) -> Result<Option<Agreement>, AgreementPersistenceError>;
}
