//! Property listing service.
//!
//! All repository calls carry the caller as owner, so another landlord's
//! listing reads as missing rather than forbidden.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::media::check_batch;
use crate::domain::ports::{MediaStore, Properties, PropertyRepository};
use crate::domain::repository_errors::{map_media_error, map_property_error};
use crate::domain::{
    AuthenticatedCaller, Error, MediaFolder, MediaItem, MediaKind, Property, PropertyDraft,
    PropertyFilter, PropertyId, PropertyPatch, Role, UploadFile,
};

const NOT_FOUND: &str = "Property not found";

/// Listing service implementing the [`Properties`](crate::domain::ports::Properties) driving port.
#[derive(Clone)]
pub struct PropertyService<P> {
    properties: Arc<P>,
    media: Arc<dyn MediaStore>,
    clock: Arc<dyn Clock>,
}

impl<P> PropertyService<P> {
    /// Build the service over the listing store and media store.
    pub fn new(properties: Arc<P>, media: Arc<dyn MediaStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            properties,
            media,
            clock,
        }
    }
}

impl<P> PropertyService<P>
where
    P: PropertyRepository,
{
    async fn owned(&self, caller: &AuthenticatedCaller, id: &PropertyId) -> Result<Property, Error> {
        self.properties
            .find_for_owner(id, &caller.user_id)
            .await
            .map_err(map_property_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

#[async_trait]
impl<P> Properties for PropertyService<P>
where
    P: PropertyRepository,
{
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: PropertyDraft,
    ) -> Result<Property, Error> {
        caller.require_any_role(&[Role::Landlord])?;
        draft.validate()?;
        let property = draft.into_property(caller.user_id, self.clock.utc());
        self.properties
            .insert(&property)
            .await
            .map_err(map_property_error)?;
        info!(property_id = %property.id, owner = %caller.user_id, "property created");
        Ok(property)
    }

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: PropertyFilter,
    ) -> Result<Vec<Property>, Error> {
        self.properties
            .list_for_owner(&caller.user_id, &filter)
            .await
            .map_err(map_property_error)
    }

    async fn get(&self, caller: &AuthenticatedCaller, id: PropertyId) -> Result<Property, Error> {
        self.owned(caller, &id).await
    }

    async fn update(
        &self,
        caller: &AuthenticatedCaller,
        id: PropertyId,
        patch: PropertyPatch,
    ) -> Result<Property, Error> {
        patch.validate()?;
        if patch.is_empty() {
            return self.owned(caller, &id).await;
        }
        self.properties
            .update(&id, &caller.user_id, &patch, self.clock.utc())
            .await
            .map_err(map_property_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn delete(&self, caller: &AuthenticatedCaller, id: PropertyId) -> Result<(), Error> {
        let removed = self
            .properties
            .delete(&id, &caller.user_id)
            .await
            .map_err(map_property_error)?;
        if !removed {
            return Err(Error::not_found(NOT_FOUND));
        }
        info!(property_id = %id, "property deleted");
        Ok(())
    }

    async fn add_media(
        &self,
        caller: &AuthenticatedCaller,
        id: PropertyId,
        files: Vec<UploadFile>,
        caption: Option<String>,
    ) -> Result<Property, Error> {
        check_batch(&files)?;
        self.owned(caller, &id).await?;

        let folder = MediaFolder::for_property(&id);
        let now = self.clock.utc();
        let mut items = Vec::with_capacity(files.len());
        for file in &files {
            let stored = self
                .media
                .upload(file, &folder)
                .await
                .map_err(map_media_error)?;
            items.push(MediaItem {
                url: stored.url,
                kind: MediaKind::from_mime(&file.mime_type),
                caption: caption.clone(),
                uploaded_at: now,
            });
        }

        self.properties
            .append_media(&id, &caller.user_id, &items, now)
            .await
            .map_err(map_property_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

#[cfg(test)]
#[path = "property_service_tests.rs"]
mod tests;
