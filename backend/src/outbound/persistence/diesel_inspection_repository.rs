//! PostgreSQL-backed `InspectionRepository` implementation using Diesel ORM.
//!
//! Visibility covers the agreement's landlord and tenant (copied onto the
//! row at creation) and the conductor.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Jsonb;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{InspectionPersistenceError, InspectionRepository};
use crate::domain::{
    AgreementId, Inspection, InspectionFilter, InspectionId, InspectionPhoto, InspectionType,
    PropertyId, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::{from_json, from_label, parse_label, to_json, to_label};
use super::models::{InspectionRow, NewInspectionRow};
use super::pool::{DbPool, PoolError};
use super::schema::inspections;

/// Diesel-backed implementation of the inspection repository port.
#[derive(Clone)]
pub struct DieselInspectionRepository {
    pool: DbPool,
}

impl DieselInspectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InspectionPersistenceError {
    map_basic_pool_error(error, |message| InspectionPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> InspectionPersistenceError {
    map_basic_diesel_error(
        error,
        InspectionPersistenceError::query,
        InspectionPersistenceError::connection,
    )
}

fn row_to_inspection(row: InspectionRow) -> Result<Inspection, InspectionPersistenceError> {
    let InspectionRow {
        id,
        agreement_id,
        property_id,
        landlord_id,
        tenant_id,
        inspection_type,
        inspection_date,
        conducted_by,
        photos,
        issues,
        overall_condition,
        signatures,
        disputed,
        dispute_reason,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<Inspection, String> {
        Ok(Inspection {
            id: InspectionId::from_uuid(id),
            agreement: AgreementId::from_uuid(agreement_id),
            property: PropertyId::from_uuid(property_id),
            landlord: UserId::from_uuid(landlord_id),
            tenant: tenant_id.map(UserId::from_uuid),
            kind: parse_label::<InspectionType>(&inspection_type, "inspection_type")?,
            inspection_date,
            conducted_by: UserId::from_uuid(conducted_by),
            photos: from_json(photos, "photos")?,
            issues: from_json(issues, "issues")?,
            overall_condition: from_label(overall_condition, "overall_condition")?,
            signatures: from_json(signatures, "signatures")?,
            disputed,
            dispute_reason,
            created_at,
            updated_at,
        })
    };
    decode().map_err(InspectionPersistenceError::query)
}

#[async_trait]
impl InspectionRepository for DieselInspectionRepository {
    async fn insert(&self, inspection: &Inspection) -> Result<(), InspectionPersistenceError> {
        let encode = || -> Result<_, String> {
            Ok((
                to_json(&inspection.photos, "photos")?,
                to_json(&inspection.issues, "issues")?,
                to_label(&inspection.overall_condition, "overall_condition")?,
                to_json(&inspection.signatures, "signatures")?,
            ))
        };
        let (photos, issues, overall_condition, signatures) =
            encode().map_err(InspectionPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewInspectionRow {
            id: *inspection.id.as_uuid(),
            agreement_id: *inspection.agreement.as_uuid(),
            property_id: *inspection.property.as_uuid(),
            landlord_id: *inspection.landlord.as_uuid(),
            tenant_id: inspection.tenant.map(|id| *id.as_uuid()),
            inspection_type: inspection.kind.as_str(),
            inspection_date: inspection.inspection_date,
            conducted_by: *inspection.conducted_by.as_uuid(),
            photos,
            issues,
            overall_condition,
            signatures,
            disputed: inspection.disputed,
            dispute_reason: inspection.dispute_reason.as_deref(),
            created_at: inspection.created_at,
            updated_at: inspection.updated_at,
        };

        diesel::insert_into(inspections::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        caller: &UserId,
        filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, InspectionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = inspections::table
            .filter(
                inspections::landlord_id
                    .eq(caller.as_uuid())
                    .or(inspections::tenant_id.eq(caller.as_uuid()))
                    .or(inspections::conducted_by.eq(caller.as_uuid())),
            )
            .into_boxed();
        if let Some(agreement) = filter.agreement {
            query = query.filter(inspections::agreement_id.eq(*agreement.as_uuid()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(inspections::inspection_type.eq(kind.as_str()));
        }

        let rows: Vec<InspectionRow> = query
            .order((inspections::inspection_date.desc(), inspections::id.desc()))
            .select(InspectionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_inspection).collect()
    }

    async fn find_for_participant(
        &self,
        id: &InspectionId,
        caller: &UserId,
    ) -> Result<Option<Inspection>, InspectionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = inspections::table
            .filter(inspections::id.eq(id.as_uuid()))
            .filter(
                inspections::landlord_id
                    .eq(caller.as_uuid())
                    .or(inspections::tenant_id.eq(caller.as_uuid()))
                    .or(inspections::conducted_by.eq(caller.as_uuid())),
            )
            .select(InspectionRow::as_select())
            .first::<InspectionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_inspection).transpose()
    }

    async fn append_photo(
        &self,
        id: &InspectionId,
        caller: &UserId,
        photo: &InspectionPhoto,
    ) -> Result<Option<Inspection>, InspectionPersistenceError> {
        let appended = to_json(std::slice::from_ref(photo), "photos")
            .map_err(InspectionPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(
            inspections::table
                .filter(inspections::id.eq(id.as_uuid()))
                .filter(
                    inspections::landlord_id
                        .eq(caller.as_uuid())
                        .or(inspections::tenant_id.eq(caller.as_uuid()))
                        .or(inspections::conducted_by.eq(caller.as_uuid())),
                ),
        )
        .set((
            inspections::photos.eq(sql::<Jsonb>("photos || ").bind::<Jsonb, _>(appended)),
            inspections::updated_at.eq(photo.uploaded_at),
        ))
        .returning(InspectionRow::as_returning())
        .get_result::<InspectionRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_inspection).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::Condition;

    #[fixture]
    fn row() -> InspectionRow {
        let now = Utc::now();
        InspectionRow {
            id: Uuid::new_v4(),
            agreement_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            tenant_id: None,
            inspection_type: InspectionType::MoveIn.as_str().to_owned(),
            inspection_date: now,
            conducted_by: Uuid::new_v4(),
            photos: json!([{
                "url": "https://cdn.example/kitchen.jpg",
                "room": "kitchen",
                "uploaded_at": "2025-01-15T09:00:00Z"
            }]),
            issues: json!([]),
            overall_condition: "good".to_owned(),
            signatures: json!({
                "landlord_signed": false,
                "tenant_signed": false
            }),
            disputed: false,
            dispute_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_decodes_photos_and_condition(row: InspectionRow) {
        let inspection = row_to_inspection(row).expect("valid row");

        assert_eq!(inspection.kind, InspectionType::MoveIn);
        assert_eq!(inspection.overall_condition, Condition::Good);
        assert_eq!(inspection.photos.len(), 1);
        assert_eq!(inspection.photos[0].room, "kitchen");
    }

    #[rstest]
    fn unknown_condition_is_a_query_error(mut row: InspectionRow) {
        row.overall_condition = "pristine".to_owned();

        let error = row_to_inspection(row).expect_err("bad condition");

        assert!(matches!(error, InspectionPersistenceError::Query { .. }));
    }
}
