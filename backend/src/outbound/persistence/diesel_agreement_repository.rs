//! PostgreSQL-backed `AgreementRepository` implementation using Diesel ORM.
//!
//! Guards are part of each write's `WHERE` clause. A signature sets the
//! party's flag, timestamp and IP and recomputes the status from the other
//! party's stored flag in the same statement, so two parties signing at once
//! both land and the agreement ends up `active`.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AgreementPersistenceError, AgreementRepository, SignatureRecord};
use crate::domain::{
    Agreement, AgreementFilter, AgreementId, AgreementSide, AgreementStatus, PropertyId,
    Signatures, SigningParty, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::{
    from_json, from_json_opt, from_label, parse_label, to_json, to_json_opt, to_label,
};
use super::models::{AgreementRow, AgreementTermsChangeset, NewAgreementRow};
use super::pool::{DbPool, PoolError};
use super::schema::agreements;

/// Statuses in which a signature may still be recorded.
const SIGNABLE_STATUSES: [&str; 3] = [
    AgreementStatus::Draft.as_str(),
    AgreementStatus::PendingSignature.as_str(),
    AgreementStatus::Active.as_str(),
];

const STATUS_AFTER_LANDLORD_SIGNS: &str =
    "CASE WHEN tenant_signed THEN 'active' ELSE 'pending_signature' END";
const STATUS_AFTER_TENANT_SIGNS: &str =
    "CASE WHEN landlord_signed THEN 'active' ELSE 'pending_signature' END";

/// Diesel-backed implementation of the agreement repository port.
#[derive(Clone)]
pub struct DieselAgreementRepository {
    pool: DbPool,
}

impl DieselAgreementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AgreementPersistenceError {
    map_basic_pool_error(error, |message| AgreementPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> AgreementPersistenceError {
    map_basic_diesel_error(
        error,
        AgreementPersistenceError::query,
        AgreementPersistenceError::connection,
    )
}

fn row_to_agreement(row: AgreementRow) -> Result<Agreement, AgreementPersistenceError> {
    let AgreementRow {
        id,
        property_id,
        landlord_id,
        tenant_id,
        agreement_type,
        start_date,
        end_date,
        rent_amount,
        security_deposit,
        rent_payment_date,
        late_penalty_percentage,
        maintenance_terms,
        lock_in_period,
        notice_period,
        police_verification_status,
        rent_escalation,
        clauses,
        status,
        document_url,
        landlord_signed,
        landlord_signed_at,
        landlord_ip,
        tenant_signed,
        tenant_signed_at,
        tenant_ip,
        termination,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<Agreement, String> {
        Ok(Agreement {
            id: AgreementId::from_uuid(id),
            property: PropertyId::from_uuid(property_id),
            landlord: UserId::from_uuid(landlord_id),
            tenant: tenant_id.map(UserId::from_uuid),
            agreement_type: from_label(agreement_type, "agreement_type")?,
            start_date,
            end_date,
            rent_amount,
            security_deposit,
            rent_payment_date: u8::try_from(rent_payment_date)
                .map_err(|err| format!("decode rent_payment_date: {err}"))?,
            late_penalty_percentage,
            maintenance_terms: from_json_opt(maintenance_terms, "maintenance_terms")?,
            lock_in_period: u32::try_from(lock_in_period)
                .map_err(|err| format!("decode lock_in_period: {err}"))?,
            notice_period: u32::try_from(notice_period)
                .map_err(|err| format!("decode notice_period: {err}"))?,
            police_verification_status: from_label(
                police_verification_status,
                "police_verification_status",
            )?,
            rent_escalation: from_json_opt(rent_escalation, "rent_escalation")?,
            clauses: from_json(clauses, "clauses")?,
            status: parse_label::<AgreementStatus>(&status, "status")?,
            document_url,
            signatures: Signatures {
                landlord_signed,
                landlord_signed_at,
                landlord_ip,
                tenant_signed,
                tenant_signed_at,
                tenant_ip,
            },
            termination: from_json_opt(termination, "termination")?,
            created_at,
            updated_at,
        })
    };
    decode().map_err(AgreementPersistenceError::query)
}

/// Text and JSONB encodings shared by insert and draft replacement.
struct EncodedTerms {
    agreement_type: String,
    police_verification_status: String,
    maintenance_terms: Option<serde_json::Value>,
    rent_escalation: Option<serde_json::Value>,
    clauses: serde_json::Value,
    lock_in_period: i32,
    notice_period: i32,
}

fn encode_terms(agreement: &Agreement) -> Result<EncodedTerms, AgreementPersistenceError> {
    let encode = || -> Result<EncodedTerms, String> {
        Ok(EncodedTerms {
            agreement_type: to_label(&agreement.agreement_type, "agreement_type")?,
            police_verification_status: to_label(
                &agreement.police_verification_status,
                "police_verification_status",
            )?,
            maintenance_terms: to_json_opt(
                agreement.maintenance_terms.as_ref(),
                "maintenance_terms",
            )?,
            rent_escalation: to_json_opt(agreement.rent_escalation.as_ref(), "rent_escalation")?,
            clauses: to_json(&agreement.clauses, "clauses")?,
            lock_in_period: i32::try_from(agreement.lock_in_period)
                .map_err(|err| format!("encode lock_in_period: {err}"))?,
            notice_period: i32::try_from(agreement.notice_period)
                .map_err(|err| format!("encode notice_period: {err}"))?,
        })
    };
    encode().map_err(AgreementPersistenceError::query)
}

#[async_trait]
impl AgreementRepository for DieselAgreementRepository {
    async fn insert(&self, agreement: &Agreement) -> Result<(), AgreementPersistenceError> {
        let terms = encode_terms(agreement)?;
        let termination = to_json_opt(agreement.termination.as_ref(), "termination")
            .map_err(AgreementPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let signatures = &agreement.signatures;
        let row = NewAgreementRow {
            id: *agreement.id.as_uuid(),
            property_id: *agreement.property.as_uuid(),
            landlord_id: *agreement.landlord.as_uuid(),
            tenant_id: agreement.tenant.map(|id| *id.as_uuid()),
            agreement_type: &terms.agreement_type,
            start_date: agreement.start_date,
            end_date: agreement.end_date,
            rent_amount: agreement.rent_amount,
            security_deposit: agreement.security_deposit,
            rent_payment_date: i16::from(agreement.rent_payment_date),
            late_penalty_percentage: agreement.late_penalty_percentage,
            maintenance_terms: terms.maintenance_terms,
            lock_in_period: terms.lock_in_period,
            notice_period: terms.notice_period,
            police_verification_status: &terms.police_verification_status,
            rent_escalation: terms.rent_escalation,
            clauses: terms.clauses,
            status: agreement.status.as_str(),
            document_url: agreement.document_url.as_deref(),
            landlord_signed: signatures.landlord_signed,
            landlord_signed_at: signatures.landlord_signed_at,
            landlord_ip: signatures.landlord_ip.as_deref(),
            tenant_signed: signatures.tenant_signed,
            tenant_signed_at: signatures.tenant_signed_at,
            tenant_ip: signatures.tenant_ip.as_deref(),
            termination,
            created_at: agreement.created_at,
            updated_at: agreement.updated_at,
        };

        diesel::insert_into(agreements::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        caller: &UserId,
        filter: &AgreementFilter,
    ) -> Result<Vec<Agreement>, AgreementPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = agreements::table.into_boxed();
        query = match filter.side {
            AgreementSide::Landlord => query.filter(agreements::landlord_id.eq(caller.as_uuid())),
            AgreementSide::Tenant => query.filter(agreements::tenant_id.eq(caller.as_uuid())),
        };
        if let Some(status) = filter.status {
            query = query.filter(agreements::status.eq(status.as_str()));
        }

        let rows: Vec<AgreementRow> = query
            .order((agreements::created_at.desc(), agreements::id.desc()))
            .select(AgreementRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_agreement).collect()
    }

    async fn find_for_participant(
        &self,
        id: &AgreementId,
        caller: &UserId,
    ) -> Result<Option<Agreement>, AgreementPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = agreements::table
            .filter(agreements::id.eq(id.as_uuid()))
            .filter(
                agreements::landlord_id
                    .eq(caller.as_uuid())
                    .or(agreements::tenant_id.eq(caller.as_uuid())),
            )
            .select(AgreementRow::as_select())
            .first::<AgreementRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_agreement).transpose()
    }

    async fn replace_draft(
        &self,
        agreement: &Agreement,
    ) -> Result<Option<Agreement>, AgreementPersistenceError> {
        let terms = encode_terms(agreement)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = AgreementTermsChangeset {
            tenant_id: agreement.tenant.map(|id| *id.as_uuid()),
            agreement_type: &terms.agreement_type,
            start_date: agreement.start_date,
            end_date: agreement.end_date,
            rent_amount: agreement.rent_amount,
            security_deposit: agreement.security_deposit,
            rent_payment_date: i16::from(agreement.rent_payment_date),
            late_penalty_percentage: agreement.late_penalty_percentage,
            maintenance_terms: terms.maintenance_terms,
            lock_in_period: terms.lock_in_period,
            notice_period: terms.notice_period,
            police_verification_status: &terms.police_verification_status,
            rent_escalation: terms.rent_escalation,
            clauses: terms.clauses,
            document_url: agreement.document_url.as_deref(),
            updated_at: agreement.updated_at,
        };

        let row = diesel::update(
            agreements::table
                .filter(agreements::id.eq(agreement.id.as_uuid()))
                .filter(agreements::landlord_id.eq(agreement.landlord.as_uuid()))
                .filter(agreements::status.eq(AgreementStatus::Draft.as_str())),
        )
        .set(&changes)
        .returning(AgreementRow::as_returning())
        .get_result::<AgreementRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_agreement).transpose()
    }

    async fn record_signature(
        &self,
        record: &SignatureRecord,
    ) -> Result<Option<Agreement>, AgreementPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let signable = agreements::table
            .filter(agreements::id.eq(record.agreement.as_uuid()))
            .filter(agreements::status.eq_any(SIGNABLE_STATUSES));
        let signer = record.signer.as_uuid();
        let ip = record.ip.as_deref();

        let row = match record.party {
            SigningParty::Landlord => {
                diesel::update(signable.filter(agreements::landlord_id.eq(signer)))
                    .set((
                        agreements::landlord_signed.eq(true),
                        agreements::landlord_signed_at.eq(Some(record.signed_at)),
                        agreements::landlord_ip.eq(ip),
                        agreements::status.eq(sql::<Text>(STATUS_AFTER_LANDLORD_SIGNS)),
                        agreements::updated_at.eq(record.signed_at),
                    ))
                    .returning(AgreementRow::as_returning())
                    .get_result::<AgreementRow>(&mut conn)
                    .await
            }
            SigningParty::Tenant => {
                diesel::update(signable.filter(agreements::tenant_id.eq(signer)))
                    .set((
                        agreements::tenant_signed.eq(true),
                        agreements::tenant_signed_at.eq(Some(record.signed_at)),
                        agreements::tenant_ip.eq(ip),
                        agreements::status.eq(sql::<Text>(STATUS_AFTER_TENANT_SIGNS)),
                        agreements::updated_at.eq(record.signed_at),
                    ))
                    .returning(AgreementRow::as_returning())
                    .get_result::<AgreementRow>(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_agreement).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion edge cases.

    use chrono::{Duration, Utc};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::AgreementType;

    #[fixture]
    fn row() -> AgreementRow {
        let now = Utc::now();
        AgreementRow {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            tenant_id: Some(Uuid::new_v4()),
            agreement_type: "11_months".to_owned(),
            start_date: now,
            end_date: now + Duration::days(334),
            rent_amount: 22_000.0,
            security_deposit: 66_000.0,
            rent_payment_date: 5,
            late_penalty_percentage: 2.0,
            maintenance_terms: None,
            lock_in_period: 6,
            notice_period: 1,
            police_verification_status: "pending".to_owned(),
            rent_escalation: None,
            clauses: json!([]),
            status: "pending_signature".to_owned(),
            document_url: None,
            landlord_signed: true,
            landlord_signed_at: Some(now),
            landlord_ip: Some("10.0.0.1".to_owned()),
            tenant_signed: false,
            tenant_signed_at: None,
            tenant_ip: None,
            termination: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_regroups_signature_columns(row: AgreementRow) {
        let agreement = row_to_agreement(row).expect("valid row");

        assert_eq!(agreement.agreement_type, AgreementType::ElevenMonths);
        assert_eq!(agreement.status, AgreementStatus::PendingSignature);
        assert!(agreement.signatures.landlord_signed);
        assert_eq!(agreement.signatures.landlord_ip.as_deref(), Some("10.0.0.1"));
        assert!(!agreement.signatures.tenant_signed);
    }

    #[rstest]
    fn negative_lock_in_is_a_query_error(mut row: AgreementRow) {
        row.lock_in_period = -1;

        let error = row_to_agreement(row).expect_err("negative period");

        assert!(matches!(error, AgreementPersistenceError::Query { .. }));
    }

    #[test]
    fn signable_statuses_match_the_domain() {
        for label in SIGNABLE_STATUSES {
            let status: AgreementStatus = label.parse().expect("known status");
            assert!(status.accepts_signatures());
        }
    }
}
