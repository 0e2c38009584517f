//! PostgreSQL-backed `PropertyRepository` implementation using Diesel ORM.
//!
//! Every statement filters on `owner_id`, so another landlord's listing is
//! never read or written. Media appends use JSONB concatenation in a single
//! `UPDATE` so concurrent uploads do not overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Jsonb;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PropertyPersistenceError, PropertyRepository};
use crate::domain::{
    AgreementId, MediaItem, Property, PropertyFilter, PropertyId, PropertyPatch, PropertyStatus,
    UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::{
    escape_like, from_json, from_json_opt, parse_label, to_json, to_json_opt, to_label,
};
use super::models::{NewPropertyRow, PropertyChangeset, PropertyRow};
use super::pool::{DbPool, PoolError};
use super::schema::properties;

/// Diesel-backed implementation of the property repository port.
#[derive(Clone)]
pub struct DieselPropertyRepository {
    pool: DbPool,
}

impl DieselPropertyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PropertyPersistenceError {
    map_basic_pool_error(error, |message| PropertyPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> PropertyPersistenceError {
    map_basic_diesel_error(
        error,
        PropertyPersistenceError::query,
        PropertyPersistenceError::connection,
    )
}

fn row_to_property(row: PropertyRow) -> Result<Property, PropertyPersistenceError> {
    let PropertyRow {
        id,
        owner_id,
        title,
        address,
        specs,
        amenities,
        media,
        expected_rent,
        expected_deposit,
        description,
        maintenance_details,
        status,
        available_from,
        current_agreement_id,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<Property, String> {
        Ok(Property {
            id: PropertyId::from_uuid(id),
            owner: UserId::from_uuid(owner_id),
            title,
            address: from_json(address, "address")?,
            specs: from_json(specs, "specs")?,
            amenities,
            media: from_json(media, "media")?,
            expected_rent,
            expected_deposit,
            description,
            maintenance_details: from_json_opt(maintenance_details, "maintenance_details")?,
            status: parse_label::<PropertyStatus>(&status, "status")?,
            available_from,
            current_agreement: current_agreement_id.map(AgreementId::from_uuid),
            created_at,
            updated_at,
        })
    };
    decode().map_err(PropertyPersistenceError::query)
}

struct EncodedPatch {
    address: Option<serde_json::Value>,
    specs: Option<serde_json::Value>,
    maintenance_details: Option<serde_json::Value>,
}

fn encode_patch(patch: &PropertyPatch) -> Result<EncodedPatch, PropertyPersistenceError> {
    let encode = || -> Result<EncodedPatch, String> {
        Ok(EncodedPatch {
            address: to_json_opt(patch.address.as_ref(), "address")?,
            specs: to_json_opt(patch.specs.as_ref(), "specs")?,
            maintenance_details: to_json_opt(
                patch.maintenance_details.as_ref(),
                "maintenance_details",
            )?,
        })
    };
    encode().map_err(PropertyPersistenceError::query)
}

#[async_trait]
impl PropertyRepository for DieselPropertyRepository {
    async fn insert(&self, property: &Property) -> Result<(), PropertyPersistenceError> {
        let encode = || -> Result<_, String> {
            Ok((
                to_json(&property.address, "address")?,
                to_json(&property.specs, "specs")?,
                to_json(&property.media, "media")?,
                to_json_opt(property.maintenance_details.as_ref(), "maintenance_details")?,
            ))
        };
        let (address, specs, media, maintenance_details) =
            encode().map_err(PropertyPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewPropertyRow {
            id: *property.id.as_uuid(),
            owner_id: *property.owner.as_uuid(),
            title: &property.title,
            address,
            specs,
            amenities: &property.amenities,
            media,
            expected_rent: property.expected_rent,
            expected_deposit: property.expected_deposit,
            description: property.description.as_deref(),
            maintenance_details,
            status: property.status.as_str(),
            available_from: property.available_from,
            current_agreement_id: property.current_agreement.map(|id| *id.as_uuid()),
            created_at: property.created_at,
            updated_at: property.updated_at,
        };

        diesel::insert_into(properties::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, PropertyPersistenceError> {
        let bhk = filter
            .bhk
            .map(|bhk| to_label(&bhk, "bhk"))
            .transpose()
            .map_err(PropertyPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = properties::table
            .filter(properties::owner_id.eq(owner.as_uuid()))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(properties::status.eq(status.as_str()));
        }
        if let Some(city) = filter.city.as_deref() {
            query = query.filter(properties::city.ilike(escape_like(city)));
        }
        if let Some(bhk) = bhk {
            query = query.filter(properties::bhk.eq(bhk));
        }

        let rows: Vec<PropertyRow> = query
            .order((properties::created_at.desc(), properties::id.desc()))
            .select(PropertyRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_property).collect()
    }

    async fn find_for_owner(
        &self,
        id: &PropertyId,
        owner: &UserId,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = properties::table
            .filter(properties::id.eq(id.as_uuid()))
            .filter(properties::owner_id.eq(owner.as_uuid()))
            .select(PropertyRow::as_select())
            .first::<PropertyRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_property).transpose()
    }

    async fn update(
        &self,
        id: &PropertyId,
        owner: &UserId,
        patch: &PropertyPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        let encoded = encode_patch(patch)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = PropertyChangeset {
            title: patch.title.as_deref(),
            address: encoded.address,
            specs: encoded.specs,
            amenities: patch.amenities.as_deref(),
            expected_rent: patch.expected_rent,
            expected_deposit: patch.expected_deposit,
            description: patch.description.as_deref(),
            maintenance_details: encoded.maintenance_details,
            status: patch.status.map(PropertyStatus::as_str),
            available_from: patch.available_from,
            current_agreement_id: patch.current_agreement.map(|id| *id.as_uuid()),
            updated_at: Some(now),
        };

        let row = diesel::update(
            properties::table
                .filter(properties::id.eq(id.as_uuid()))
                .filter(properties::owner_id.eq(owner.as_uuid())),
        )
        .set(&changes)
        .returning(PropertyRow::as_returning())
        .get_result::<PropertyRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_property).transpose()
    }

    async fn delete(
        &self,
        id: &PropertyId,
        owner: &UserId,
    ) -> Result<bool, PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(
            properties::table
                .filter(properties::id.eq(id.as_uuid()))
                .filter(properties::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn append_media(
        &self,
        id: &PropertyId,
        owner: &UserId,
        items: &[MediaItem],
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        let appended = to_json(items, "media").map_err(PropertyPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(
            properties::table
                .filter(properties::id.eq(id.as_uuid()))
                .filter(properties::owner_id.eq(owner.as_uuid())),
        )
        .set((
            properties::media.eq(sql::<Jsonb>("media || ").bind::<Jsonb, _>(appended)),
            properties::updated_at.eq(now),
        ))
        .returning(PropertyRow::as_returning())
        .get_result::<PropertyRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_property).transpose()
    }
}
