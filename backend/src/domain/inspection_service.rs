//! Inspection service: condition reports tied to an agreement.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AgreementRepository, InspectionRepository, Inspections, MediaStore, PhotoUpload,
};
use crate::domain::repository_errors::{
    map_agreement_error, map_inspection_error, map_media_error,
};
use crate::domain::{
    AuthenticatedCaller, DEFAULT_PHOTO_ROOM, Error, Inspection, InspectionDraft, InspectionFilter,
    InspectionId, InspectionPhoto, MediaFolder,
};

const NOT_FOUND: &str = "Inspection not found";

/// Inspection service behind the
/// [`Inspections`](crate::domain::ports::Inspections) driving port.
#[derive(Clone)]
pub struct InspectionService<I, A> {
    inspections: Arc<I>,
    agreements: Arc<A>,
    media: Arc<dyn MediaStore>,
    clock: Arc<dyn Clock>,
}

impl<I, A> InspectionService<I, A> {
    /// Build the service. Photos are uploaded through `media` before they are appended.
    pub fn new(
        inspections: Arc<I>,
        agreements: Arc<A>,
        media: Arc<dyn MediaStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inspections,
            agreements,
            media,
            clock,
        }
    }
}

impl<I, A> InspectionService<I, A>
where
    I: InspectionRepository,
{
    async fn visible(
        &self,
        caller: &AuthenticatedCaller,
        id: &InspectionId,
    ) -> Result<Inspection, Error> {
        self.inspections
            .find_for_participant(id, &caller.user_id)
            .await
            .map_err(map_inspection_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

fn room_or_default(room: Option<String>) -> String {
    room.map(|room| room.trim().to_owned())
        .filter(|room| !room.is_empty())
        .unwrap_or_else(|| DEFAULT_PHOTO_ROOM.to_owned())
}

#[async_trait]
impl<I, A> Inspections for InspectionService<I, A>
where
    I: InspectionRepository,
    A: AgreementRepository,
{
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: InspectionDraft,
    ) -> Result<Inspection, Error> {
        draft.validate()?;
        let agreement = self
            .agreements
            .find_for_participant(&draft.agreement, &caller.user_id)
            .await
            .map_err(map_agreement_error)?
            .ok_or_else(|| Error::not_found("Agreement not found"))?;

        let inspection = draft.into_inspection(caller.user_id, &agreement, self.clock.utc());
        self.inspections
            .insert(&inspection)
            .await
            .map_err(map_inspection_error)?;
        info!(
            inspection_id = %inspection.id,
            agreement_id = %inspection.agreement,
            kind = inspection.kind.as_str(),
            "inspection recorded"
        );
        Ok(inspection)
    }

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: InspectionFilter,
    ) -> Result<Vec<Inspection>, Error> {
        self.inspections
            .list(&caller.user_id, &filter)
            .await
            .map_err(map_inspection_error)
    }

    async fn get(
        &self,
        caller: &AuthenticatedCaller,
        id: InspectionId,
    ) -> Result<Inspection, Error> {
        self.visible(caller, &id).await
    }

    async fn add_photo(
        &self,
        caller: &AuthenticatedCaller,
        id: InspectionId,
        upload: PhotoUpload,
    ) -> Result<InspectionPhoto, Error> {
        upload.file.check()?;
        self.visible(caller, &id).await?;

        let stored = self
            .media
            .upload(&upload.file, &MediaFolder::for_inspection(&id))
            .await
            .map_err(map_media_error)?;
        let photo = InspectionPhoto {
            url: stored.url,
            room: room_or_default(upload.room),
            description: upload.description,
            uploaded_at: self.clock.utc(),
        };
        self.inspections
            .append_photo(&id, &caller.user_id, &photo)
            .await
            .map_err(map_inspection_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        Ok(photo)
    }
}

#[cfg(test)]
#[path = "inspection_service_tests.rs"]
mod tests;
