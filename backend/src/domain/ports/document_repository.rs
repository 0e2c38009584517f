//! Port abstraction for document metadata, scoped to the uploader.

use async_trait::async_trait;

use crate::domain::{Document, DocumentId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by document repository adapters.
    pub enum DocumentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "document repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "document repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, document: &Document) -> Result<(), DocumentPersistenceError>;

    async fn find_by_public_id(
        &self,
        public_id: &str,
        owner: &UserId,
    ) -> Result<Option<Document>, DocumentPersistenceError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &DocumentId, owner: &UserId) -> Result<bool, DocumentPersistenceError>;
}
