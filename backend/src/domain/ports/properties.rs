//! Driving port for a landlord's property listings.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedCaller, Error, Property, PropertyDraft, PropertyFilter, PropertyId,
    PropertyPatch, UploadFile,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Properties: Send + Sync {
    /// Requires the landlord role.
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: PropertyDraft,
    ) -> Result<Property, Error>;

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: PropertyFilter,
    ) -> Result<Vec<Property>, Error>;

    async fn get(&self, caller: &AuthenticatedCaller, id: PropertyId) -> Result<Property, Error>;

    async fn update(
        &self,
        caller: &AuthenticatedCaller,
        id: PropertyId,
        patch: PropertyPatch,
    ) -> Result<Property, Error>;

    async fn delete(&self, caller: &AuthenticatedCaller, id: PropertyId) -> Result<(), Error>;

    /// Upload files to the listing's folder and append them as media.
    async fn add_media(
        &self,
        caller: &AuthenticatedCaller,
        id: PropertyId,
        files: Vec<UploadFile>,
        caption: Option<String>,
    ) -> Result<Property, Error>;
}
