//! In-memory `AgreementRepository`.
//!
//! Signing checks the signer and the status, flips the flag and recomputes
//! the status while holding the write lock, mirroring the single guarded
//! `UPDATE` of the Diesel adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{AgreementPersistenceError, AgreementRepository, SignatureRecord};
use crate::domain::{Agreement, AgreementFilter, AgreementId, UserId};

use super::newest_first;

/// In-memory agreement store. Signing runs under the write lock.
#[derive(Debug, Default)]
pub struct MemoryAgreementRepository {
    agreements: RwLock<HashMap<AgreementId, Agreement>>,
}

impl MemoryAgreementRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgreementRepository for MemoryAgreementRepository {
    async fn insert(&self, agreement: &Agreement) -> Result<(), AgreementPersistenceError> {
        self.agreements
            .write()
            .await
            .insert(agreement.id, agreement.clone());
        Ok(())
    }

    async fn list(
        &self,
        caller: &UserId,
        filter: &AgreementFilter,
    ) -> Result<Vec<Agreement>, AgreementPersistenceError> {
        let mut listed: Vec<Agreement> = self
            .agreements
            .read()
            .await
            .values()
            .filter(|agreement| filter.matches(agreement, caller))
            .cloned()
            .collect();
        newest_first(&mut listed, |agreement| (agreement.created_at, agreement.id));
        Ok(listed)
    }

    async fn find_for_participant(
        &self,
        id: &AgreementId,
        caller: &UserId,
    ) -> Result<Option<Agreement>, AgreementPersistenceError> {
        Ok(self
            .agreements
            .read()
            .await
            .get(id)
            .filter(|agreement| agreement.is_participant(caller))
            .cloned())
    }

    async fn replace_draft(
        &self,
        agreement: &Agreement,
    ) -> Result<Option<Agreement>, AgreementPersistenceError> {
        let mut agreements = self.agreements.write().await;
        Ok(agreements
            .get_mut(&agreement.id)
            .filter(|stored| stored.is_editable_by(&agreement.landlord))
            .map(|stored| {
                let replaced = Agreement {
                    property: stored.property,
                    landlord: stored.landlord,
                    status: stored.status,
                    signatures: stored.signatures.clone(),
                    termination: stored.termination.clone(),
                    created_at: stored.created_at,
                    ..agreement.clone()
                };
                *stored = replaced;
                stored.clone()
            }))
    }

    async fn record_signature(
        &self,
        record: &SignatureRecord,
    ) -> Result<Option<Agreement>, AgreementPersistenceError> {
        let mut agreements = self.agreements.write().await;
        Ok(agreements
            .get_mut(&record.agreement)
            .filter(|stored| {
                stored
                    .authorize_signature(record.party, &record.signer)
                    .is_ok()
            })
            .map(|stored| {
                stored.apply_signature(record.party, record.ip.clone(), record.signed_at);
                stored.clone()
            }))
    }
}
