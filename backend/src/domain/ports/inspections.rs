//! Driving port for inspections.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedCaller, Error, Inspection, InspectionDraft, InspectionFilter, InspectionId,
    InspectionPhoto, UploadFile,
};

/// Photo upload plus its form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file: UploadFile,
    pub room: Option<String>,
    pub description: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Inspections: Send + Sync {
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: InspectionDraft,
    ) -> Result<Inspection, Error>;

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: InspectionFilter,
    ) -> Result<Vec<Inspection>, Error>;

    async fn get(
        &self,
        caller: &AuthenticatedCaller,
        id: InspectionId,
    ) -> Result<Inspection, Error>;

    /// Upload a photo and append it; returns the appended entry.
    async fn add_photo(
        &self,
        caller: &AuthenticatedCaller,
        id: InspectionId,
        upload: PhotoUpload,
    ) -> Result<InspectionPhoto, Error>;
}
