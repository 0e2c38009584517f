//! In-memory `PropertyRepository`, scoped to the owner.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{PropertyPersistenceError, PropertyRepository};
use crate::domain::{MediaItem, Property, PropertyFilter, PropertyId, PropertyPatch, UserId};

use super::newest_first;

/// In-memory listing store.
#[derive(Debug, Default)]
pub struct MemoryPropertyRepository {
    properties: RwLock<HashMap<PropertyId, Property>>,
}

impl MemoryPropertyRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyRepository for MemoryPropertyRepository {
    async fn insert(&self, property: &Property) -> Result<(), PropertyPersistenceError> {
        self.properties
            .write()
            .await
            .insert(property.id, property.clone());
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, PropertyPersistenceError> {
        let mut listed: Vec<Property> = self
            .properties
            .read()
            .await
            .values()
            .filter(|property| property.is_owned_by(owner) && filter.matches(property))
            .cloned()
            .collect();
        newest_first(&mut listed, |property| (property.created_at, property.id));
        Ok(listed)
    }

    async fn find_for_owner(
        &self,
        id: &PropertyId,
        owner: &UserId,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        Ok(self
            .properties
            .read()
            .await
            .get(id)
            .filter(|property| property.is_owned_by(owner))
            .cloned())
    }

    async fn update(
        &self,
        id: &PropertyId,
        owner: &UserId,
        patch: &PropertyPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        let mut properties = self.properties.write().await;
        Ok(properties
            .get_mut(id)
            .filter(|property| property.is_owned_by(owner))
            .map(|property| {
                patch.apply_to(property, now);
                property.clone()
            }))
    }

    async fn delete(
        &self,
        id: &PropertyId,
        owner: &UserId,
    ) -> Result<bool, PropertyPersistenceError> {
        let mut properties = self.properties.write().await;
        let owned = properties
            .get(id)
            .is_some_and(|property| property.is_owned_by(owner));
        if owned {
            properties.remove(id);
        }
        Ok(owned)
    }

    async fn append_media(
        &self,
        id: &PropertyId,
        owner: &UserId,
        items: &[MediaItem],
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        let mut properties = self.properties.write().await;
        Ok(properties
            .get_mut(id)
            .filter(|property| property.is_owned_by(owner))
            .map(|property| {
                property.media.extend_from_slice(items);
                property.updated_at = now;
                property.clone()
            }))
    }
}
