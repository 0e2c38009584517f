//! In-memory `InspectionRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{InspectionPersistenceError, InspectionRepository};
use crate::domain::{Inspection, InspectionFilter, InspectionId, InspectionPhoto, UserId};

use super::newest_first;

/// In-memory inspection store.
#[derive(Debug, Default)]
pub struct MemoryInspectionRepository {
    inspections: RwLock<HashMap<InspectionId, Inspection>>,
}

impl MemoryInspectionRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InspectionRepository for MemoryInspectionRepository {
    async fn insert(&self, inspection: &Inspection) -> Result<(), InspectionPersistenceError> {
        self.inspections
            .write()
            .await
            .insert(inspection.id, inspection.clone());
        Ok(())
    }

    async fn list(
        &self,
        caller: &UserId,
        filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, InspectionPersistenceError> {
        let mut listed: Vec<Inspection> = self
            .inspections
            .read()
            .await
            .values()
            .filter(|inspection| inspection.is_participant(caller) && filter.matches(inspection))
            .cloned()
            .collect();
        newest_first(&mut listed, |inspection| {
            (inspection.inspection_date, inspection.id)
        });
        Ok(listed)
    }

    async fn find_for_participant(
        &self,
        id: &InspectionId,
        caller: &UserId,
    ) -> Result<Option<Inspection>, InspectionPersistenceError> {
        Ok(self
            .inspections
            .read()
            .await
            .get(id)
            .filter(|inspection| inspection.is_participant(caller))
            .cloned())
    }

    async fn append_photo(
        &self,
        id: &InspectionId,
        caller: &UserId,
        photo: &InspectionPhoto,
    ) -> Result<Option<Inspection>, InspectionPersistenceError> {
        let mut inspections = self.inspections.write().await;
        Ok(inspections
            .get_mut(id)
            .filter(|inspection| inspection.is_participant(caller))
            .map(|inspection| {
                inspection.photos.push(photo.clone());
                inspection.updated_at = photo.uploaded_at;
                inspection.clone()
            }))
    }
}
