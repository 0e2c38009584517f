//! In-memory `DocumentRepository`, scoped to the uploader.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{DocumentPersistenceError, DocumentRepository};
use crate::domain::{Document, DocumentId, UserId};

/// In-memory document metadata store.
#[derive(Debug, Default)]
pub struct MemoryDocumentRepository {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl MemoryDocumentRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn insert(&self, document: &Document) -> Result<(), DocumentPersistenceError> {
        self.documents
            .write()
            .await
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn find_by_public_id(
        &self,
        public_id: &str,
        owner: &UserId,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        Ok(self
            .documents
            .read()
            .await
            .values()
            .filter(|document| document.public_id == public_id && &document.uploaded_by == owner)
            .max_by_key(|document| document.created_at)
            .cloned())
    }

    async fn delete(&self, id: &DocumentId, owner: &UserId) -> Result<bool, DocumentPersistenceError> {
        let mut documents = self.documents.write().await;
        let owned = documents
            .get(id)
            .is_some_and(|document| &document.uploaded_by == owner);
        if owned {
            documents.remove(id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{DocumentStatus, DocumentType};

    fn document(owner: UserId) -> Document {
        let now = Utc::now();
        Document {
            id: DocumentId::random(),
            uploaded_by: owner,
            name: "pan.pdf".to_owned(),
            kind: DocumentType::Kyc,
            category: None,
            url: "https://cdn.example/pan.pdf".to_owned(),
            public_id: "rentfit/kyc/pan".to_owned(),
            file_size: Some(1024),
            mime_type: Some("application/pdf".to_owned()),
            related_model: None,
            related_id: None,
            is_public: false,
            status: DocumentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lookup_and_delete_are_owner_scoped() {
        let owner = UserId::random();
        let stored = document(owner);
        let repo = MemoryDocumentRepository::new();
        repo.insert(&stored).await.expect("insert");
        let stranger = UserId::random();

        assert!(repo
            .find_by_public_id(&stored.public_id, &stranger)
            .await
            .expect("lookup")
            .is_none());
        assert!(!repo.delete(&stored.id, &stranger).await.expect("delete"));
        assert!(repo.delete(&stored.id, &owner).await.expect("delete"));
        assert!(repo
            .find_by_public_id(&stored.public_id, &owner)
            .await
            .expect("lookup")
            .is_none());
    }
}
