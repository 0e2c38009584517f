//! Driving port for generic uploads and deletions.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedCaller, Error, MediaDeletion, UploadFile, UploadOptions, UploadedFile,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Upload each file in order, optionally recording document metadata.
    async fn upload(
        &self,
        caller: &AuthenticatedCaller,
        files: Vec<UploadFile>,
        options: UploadOptions,
    ) -> Result<Vec<UploadedFile>, Error>;

    /// Remove an object, and its metadata when `delete_from_documents`.
    async fn delete(
        &self,
        caller: &AuthenticatedCaller,
        public_id: &str,
        delete_from_documents: bool,
    ) -> Result<MediaDeletion, Error>;
}
