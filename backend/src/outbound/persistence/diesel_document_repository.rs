//! PostgreSQL-backed `DocumentRepository` implementation using Diesel ORM.
//!
//! Lookups and deletes are scoped to the uploader.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DocumentPersistenceError, DocumentRepository};
use crate::domain::{Document, DocumentId, DocumentStatus, DocumentType, RelatedModel, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::parse_label;
use super::models::{DocumentRow, NewDocumentRow};
use super::pool::{DbPool, PoolError};
use super::schema::documents;

/// Diesel-backed implementation of the document repository port.
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DocumentPersistenceError {
    map_basic_pool_error(error, |message| DocumentPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> DocumentPersistenceError {
    map_basic_diesel_error(
        error,
        DocumentPersistenceError::query,
        DocumentPersistenceError::connection,
    )
}

fn row_to_document(row: DocumentRow) -> Result<Document, DocumentPersistenceError> {
    let DocumentRow {
        id,
        uploaded_by,
        name,
        document_type,
        category,
        url,
        public_id,
        file_size,
        mime_type,
        related_model,
        related_id,
        is_public,
        status,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<Document, String> {
        Ok(Document {
            id: DocumentId::from_uuid(id),
            uploaded_by: UserId::from_uuid(uploaded_by),
            name,
            kind: parse_label::<DocumentType>(&document_type, "document_type")?,
            category,
            url,
            public_id,
            file_size: file_size
                .map(|size| {
                    u64::try_from(size).map_err(|_| format!("file_size: negative value {size}"))
                })
                .transpose()?,
            mime_type,
            related_model: related_model
                .as_deref()
                .map(|label| parse_label::<RelatedModel>(label, "related_model"))
                .transpose()?,
            related_id,
            is_public,
            status: parse_label::<DocumentStatus>(&status, "status")?,
            created_at,
            updated_at,
        })
    };
    decode().map_err(DocumentPersistenceError::query)
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn insert(&self, document: &Document) -> Result<(), DocumentPersistenceError> {
        let file_size = document
            .file_size
            .map(i64::try_from)
            .transpose()
            .map_err(|err| DocumentPersistenceError::query(format!("file_size: {err}")))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewDocumentRow {
            id: *document.id.as_uuid(),
            uploaded_by: *document.uploaded_by.as_uuid(),
            name: &document.name,
            document_type: document.kind.as_str(),
            category: document.category.as_deref(),
            url: &document.url,
            public_id: &document.public_id,
            file_size,
            mime_type: document.mime_type.as_deref(),
            related_model: document.related_model.map(RelatedModel::as_str),
            related_id: document.related_id,
            is_public: document.is_public,
            status: document.status.as_str(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        };

        diesel::insert_into(documents::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_public_id(
        &self,
        public_id: &str,
        owner: &UserId,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = documents::table
            .filter(documents::public_id.eq(public_id))
            .filter(documents::uploaded_by.eq(owner.as_uuid()))
            .order(documents::created_at.desc())
            .select(DocumentRow::as_select())
            .first::<DocumentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_document).transpose()
    }

    async fn delete(&self, id: &DocumentId, owner: &UserId) -> Result<bool, DocumentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(
            documents::table
                .filter(documents::id.eq(id.as_uuid()))
                .filter(documents::uploaded_by.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn row() -> DocumentRow {
        let now = Utc::now();
        DocumentRow {
            id: Uuid::new_v4(),
            uploaded_by: Uuid::new_v4(),
            name: "lease.pdf".to_owned(),
            document_type: "agreement".to_owned(),
            category: None,
            url: "https://cdn.example/lease.pdf".to_owned(),
            public_id: "rentfit/lease".to_owned(),
            file_size: Some(2048),
            mime_type: Some("application/pdf".to_owned()),
            related_model: Some("Agreement".to_owned()),
            related_id: None,
            is_public: false,
            status: "pending".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_decodes_labels(row: DocumentRow) {
        let document = row_to_document(row).expect("valid row");

        assert_eq!(document.kind, DocumentType::Agreement);
        assert_eq!(document.related_model, Some(RelatedModel::Agreement));
        assert_eq!(document.file_size, Some(2048));
    }

    #[rstest]
    fn negative_size_is_a_query_error(mut row: DocumentRow) {
        row.file_size = Some(-1);

        let error = row_to_document(row).expect_err("negative size");

        assert!(matches!(error, DocumentPersistenceError::Query { .. }));
    }
}
