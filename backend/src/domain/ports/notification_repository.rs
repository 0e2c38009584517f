//! Port abstraction for notification persistence, scoped to the recipient.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Notification, NotificationFilter, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification repository adapters.
    pub enum NotificationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a notification produced by a trigger.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationPersistenceError>;

    /// Newest notifications first, at most `limit`.
    async fn list(
        &self,
        user: &UserId,
        filter: &NotificationFilter,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationPersistenceError>;

    async fn mark_read(
        &self,
        id: &NotificationId,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, NotificationPersistenceError>;

    /// Mark every unread notification read; returns how many changed.
    async fn mark_all_read(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError>;
}
