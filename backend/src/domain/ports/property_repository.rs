//! Port abstraction for property listings.
//!
//! Every method takes the owner so adapters fold ownership into the query
//! itself; a listing owned by someone else is indistinguishable from a
//! missing one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{MediaItem, Property, PropertyFilter, PropertyId, PropertyPatch, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by property repository adapters.
    pub enum PropertyPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "property repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "property repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn insert(&self, property: &Property) -> Result<(), PropertyPersistenceError>;

    /// Owner's listings matching `filter`, newest first.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, PropertyPersistenceError>;

    async fn find_for_owner(
        &self,
        id: &PropertyId,
        owner: &UserId,
    ) -> Result<Option<Property>, PropertyPersistenceError>;

    /// Apply `patch` and return the updated listing.
    async fn update(
        &self,
        id: &PropertyId,
        owner: &UserId,
        patch: &PropertyPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, PropertyPersistenceError>;

    /// Returns whether a listing was removed.
    async fn delete(&self, id: &PropertyId, owner: &UserId)
    -> Result<bool, PropertyPersistenceError>;

    /// Append media items in one atomic update.
    async fn append_media(
        &self,
        id: &PropertyId,
        owner: &UserId,
        items: &[MediaItem],
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, PropertyPersistenceError>;
}
