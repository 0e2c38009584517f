//! In-memory `NotificationRepository`, scoped to the recipient.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::{Notification, NotificationFilter, NotificationId, UserId};

use super::newest_first;

/// In-memory notification inbox.
#[derive(Debug, Default)]
pub struct MemoryNotificationRepository {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl MemoryNotificationRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationPersistenceError> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        user: &UserId,
        filter: &NotificationFilter,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let mut listed: Vec<Notification> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|notification| &notification.user == user && filter.matches(notification))
            .cloned()
            .collect();
        newest_first(&mut listed, |notification| {
            (notification.created_at, notification.id)
        });
        listed.truncate(limit);
        Ok(listed)
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, NotificationPersistenceError> {
        let mut notifications = self.notifications.write().await;
        Ok(notifications
            .get_mut(id)
            .filter(|notification| &notification.user == user)
            .map(|notification| {
                notification.mark_read(now);
                notification.clone()
            }))
    }

    async fn mark_all_read(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut changed = 0;
        for notification in self
            .notifications
            .write()
            .await
            .values_mut()
            .filter(|notification| &notification.user == user && !notification.is_read)
        {
            notification.mark_read(now);
            changed += 1;
        }
        Ok(changed)
    }
}
