//! Port for the external object store that holds uploaded files.

use async_trait::async_trait;

use crate::domain::{MediaFolder, StoredObject, UploadFile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// The store refused or failed the request.
        Upstream { message: String } => "media store request failed: {message}",
        /// No store is configured for this deployment.
        Unconfigured => "media storage is not configured",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(
        &self,
        file: &UploadFile,
        folder: &MediaFolder,
    ) -> Result<StoredObject, MediaStoreError>;

    /// Remove an object. A missing object counts as removed.
    async fn destroy(&self, public_id: &str) -> Result<(), MediaStoreError>;
}
