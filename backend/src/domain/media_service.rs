//! Generic media gateway: proxies uploads to the media store and optionally
//! records document metadata.
//!
//! Deleting with metadata is two independent writes. The external object
//! goes first; a metadata failure afterwards is logged and surfaced, and a
//! retry is safe because the store treats a missing object as deleted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{error, info};

use crate::domain::media::{check_batch, is_valid_category};
use crate::domain::ports::{DocumentRepository, MediaGateway, MediaStore};
use crate::domain::repository_errors::{map_document_error, map_media_error};
use crate::domain::{
    AuthenticatedCaller, Document, DocumentId, DocumentStatus, DocumentSummary, Error,
    MediaDeletion, MediaFolder, StoredObject, UploadFile, UploadOptions, UploadedFile, UserId,
};

/// Upload and deletion workflow behind the
/// [`MediaGateway`](crate::domain::ports::MediaGateway) driving port.
#[derive(Clone)]
pub struct MediaService<D> {
    documents: Arc<D>,
    store: Arc<dyn MediaStore>,
    clock: Arc<dyn Clock>,
}

impl<D> MediaService<D> {
    /// Build the service over the document metadata store and the external media store.
    pub fn new(documents: Arc<D>, store: Arc<dyn MediaStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            documents,
            store,
            clock,
        }
    }
}

fn document_for(
    owner: UserId,
    file: &UploadFile,
    stored: &StoredObject,
    options: &UploadOptions,
    now: DateTime<Utc>,
) -> Document {
    Document {
        id: DocumentId::random(),
        uploaded_by: owner,
        name: file.file_name.clone(),
        kind: options.kind.unwrap_or_default(),
        category: options.category.clone(),
        url: stored.url.clone(),
        public_id: stored.public_id.clone(),
        file_size: Some(file.len() as u64),
        mime_type: Some(file.mime_type.clone()),
        related_model: options.related_model,
        related_id: options.related_id,
        is_public: false,
        status: DocumentStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl<D> MediaGateway for MediaService<D>
where
    D: DocumentRepository,
{
    async fn upload(
        &self,
        caller: &AuthenticatedCaller,
        files: Vec<UploadFile>,
        options: UploadOptions,
    ) -> Result<Vec<UploadedFile>, Error> {
        check_batch(&files)?;
        if options
            .category
            .as_deref()
            .is_some_and(|category| !is_valid_category(category))
        {
            return Err(Error::invalid_request(
                "category may contain only letters, digits, '_' and '-'",
            ));
        }

        let folder =
            MediaFolder::for_upload(options.kind, options.category.as_deref(), &caller.user_id);
        let mut uploaded = Vec::with_capacity(files.len());
        for file in &files {
            let stored = self
                .store
                .upload(file, &folder)
                .await
                .map_err(map_media_error)?;

            let document = if options.save_to_documents {
                let document =
                    document_for(caller.user_id, file, &stored, &options, self.clock.utc());
                self.documents
                    .insert(&document)
                    .await
                    .map_err(map_document_error)?;
                Some(DocumentSummary::from(&document))
            } else {
                None
            };

            uploaded.push(UploadedFile {
                url: stored.url,
                public_id: stored.public_id,
                file_name: file.file_name.clone(),
                file_size: file.len() as u64,
                mime_type: file.mime_type.clone(),
                document,
            });
        }
        info!(
            user_id = %caller.user_id,
            folder = folder.as_str(),
            count = uploaded.len(),
            "media uploaded"
        );
        Ok(uploaded)
    }

    async fn delete(
        &self,
        caller: &AuthenticatedCaller,
        public_id: &str,
        delete_from_documents: bool,
    ) -> Result<MediaDeletion, Error> {
        if public_id.trim().is_empty() {
            return Err(Error::invalid_request("public_id is required"));
        }

        if !delete_from_documents {
            self.store
                .destroy(public_id)
                .await
                .map_err(map_media_error)?;
            return Ok(MediaDeletion {
                public_id: public_id.to_owned(),
                document_id: None,
            });
        }

        let document = self
            .documents
            .find_by_public_id(public_id, &caller.user_id)
            .await
            .map_err(map_document_error)?
            .ok_or_else(|| Error::not_found("Document not found"))?;
        self.store
            .destroy(public_id)
            .await
            .map_err(map_media_error)?;
        if let Err(failure) = self.documents.delete(&document.id, &caller.user_id).await {
            error!(
                public_id,
                document_id = %document.id,
                error = %failure,
                "media object deleted but document metadata remains"
            );
            return Err(map_document_error(failure));
        }
        Ok(MediaDeletion {
            public_id: public_id.to_owned(),
            document_id: Some(document.id),
        })
    }
}

#[cfg(test)]
#[path = "media_service_tests.rs"]
mod tests;
