//! Notification inbox service. Notifications are produced elsewhere; the
//! recipient can only read them and mark them read.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{NotificationRepository, Notifications};
use crate::domain::repository_errors::map_notification_error;
use crate::domain::{
    AuthenticatedCaller, Error, NOTIFICATION_LIST_LIMIT, Notification, NotificationFilter,
    NotificationId,
};

/// Notification inbox behind the
/// [`Notifications`](crate::domain::ports::Notifications) driving port.
#[derive(Clone)]
pub struct NotificationService<N> {
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<N> NotificationService<N> {
    /// Build the service; `clock` stamps `read_at`.
    pub fn new(notifications: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }
}

#[async_trait]
impl<N> Notifications for NotificationService<N>
where
    N: NotificationRepository,
{
    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, Error> {
        self.notifications
            .list(&caller.user_id, &filter, NOTIFICATION_LIST_LIMIT)
            .await
            .map_err(map_notification_error)
    }

    async fn mark_read(
        &self,
        caller: &AuthenticatedCaller,
        id: NotificationId,
    ) -> Result<Notification, Error> {
        self.notifications
            .mark_read(&id, &caller.user_id, self.clock.utc())
            .await
            .map_err(map_notification_error)?
            .ok_or_else(|| Error::not_found("Notification not found"))
    }

    async fn mark_all_read(&self, caller: &AuthenticatedCaller) -> Result<u64, Error> {
        let changed = self
            .notifications
            .mark_all_read(&caller.user_id, self.clock.utc())
            .await
            .map_err(map_notification_error)?;
        debug!(user_id = %caller.user_id, changed, "notifications marked read");
        Ok(changed)
    }
}
