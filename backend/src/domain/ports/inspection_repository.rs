//! Port abstraction for inspection persistence, scoped to the agreement's
//! parties and the conductor.

use async_trait::async_trait;

use crate::domain::{Inspection, InspectionFilter, InspectionId, InspectionPhoto, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by inspection repository adapters.
    pub enum InspectionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "inspection repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "inspection repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InspectionRepository: Send + Sync {
    async fn insert(&self, inspection: &Inspection) -> Result<(), InspectionPersistenceError>;

    /// Visible inspections matching `filter`, latest inspection date first.
    async fn list(
        &self,
        caller: &UserId,
        filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, InspectionPersistenceError>;

    async fn find_for_participant(
        &self,
        id: &InspectionId,
        caller: &UserId,
    ) -> Result<Option<Inspection>, InspectionPersistenceError>;

    /// Append one photo atomically.
    async fn append_photo(
        &self,
        id: &InspectionId,
        caller: &UserId,
        photo: &InspectionPhoto,
    ) -> Result<Option<Inspection>, InspectionPersistenceError>;
}
