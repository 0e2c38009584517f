//! Driving port for the caller's notifications.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedCaller, Error, Notification, NotificationFilter, NotificationId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifications: Send + Sync {
    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, Error>;

    async fn mark_read(
        &self,
        caller: &AuthenticatedCaller,
        id: NotificationId,
    ) -> Result<Notification, Error>;

    /// Returns how many notifications changed.
    async fn mark_all_read(&self, caller: &AuthenticatedCaller) -> Result<u64, Error>;
}
