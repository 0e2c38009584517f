//! Object storage adapters for uploaded files.

mod cloudinary;
mod dto;

use async_trait::async_trait;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{MediaFolder, StoredObject, UploadFile};

pub use cloudinary::{CloudinaryCredentials, CloudinaryMediaStore};

/// Store used when no media credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredMediaStore;

#[async_trait]
impl MediaStore for UnconfiguredMediaStore {
    async fn upload(
        &self,
        _file: &UploadFile,
        _folder: &MediaFolder,
    ) -> Result<StoredObject, MediaStoreError> {
        Err(MediaStoreError::unconfigured())
    }

    async fn destroy(&self, _public_id: &str) -> Result<(), MediaStoreError> {
        Err(MediaStoreError::unconfigured())
    }
}
