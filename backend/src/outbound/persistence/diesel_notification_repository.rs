//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::{
    Notification, NotificationFilter, NotificationId, NotificationType, TicketPriority, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::{from_json, from_label, parse_label, to_json, to_label};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationPersistenceError {
    map_basic_pool_error(error, |message| NotificationPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationPersistenceError {
    map_basic_diesel_error(
        error,
        NotificationPersistenceError::query,
        NotificationPersistenceError::connection,
    )
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationPersistenceError> {
    let NotificationRow {
        id,
        user_id,
        notification_type,
        title,
        message,
        is_read,
        read_at,
        link_to,
        related_model,
        related_id,
        channels,
        delivery_status,
        priority,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<Notification, String> {
        Ok(Notification {
            id: NotificationId::from_uuid(id),
            user: UserId::from_uuid(user_id),
            kind: parse_label::<NotificationType>(&notification_type, "notification_type")?,
            title,
            message,
            is_read,
            read_at,
            link_to,
            related_model: related_model
                .map(|label| from_label(label, "related_model"))
                .transpose()?,
            related_id,
            channels: from_json(channels, "channels")?,
            delivery_status: from_json(delivery_status, "delivery_status")?,
            priority: parse_label::<TicketPriority>(&priority, "priority")?,
            created_at,
            updated_at,
        })
    };
    decode().map_err(NotificationPersistenceError::query)
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationPersistenceError> {
        let encode = || -> Result<_, String> {
            Ok((
                notification
                    .related_model
                    .map(|subject| to_label(&subject, "related_model"))
                    .transpose()?,
                to_json(&notification.channels, "channels")?,
                to_json(&notification.delivery_status, "delivery_status")?,
            ))
        };
        let (related_model, channels, delivery_status) =
            encode().map_err(NotificationPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewNotificationRow {
            id: *notification.id.as_uuid(),
            user_id: *notification.user.as_uuid(),
            notification_type: notification.kind.as_str(),
            title: &notification.title,
            message: &notification.message,
            is_read: notification.is_read,
            read_at: notification.read_at,
            link_to: notification.link_to.as_deref(),
            related_model,
            related_id: notification.related_id,
            channels,
            delivery_status,
            priority: notification.priority.as_str(),
            created_at: notification.created_at,
            updated_at: notification.updated_at,
        };

        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        user: &UserId,
        filter: &NotificationFilter,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = notifications::table
            .filter(notifications::user_id.eq(user.as_uuid()))
            .into_boxed();
        if let Some(is_read) = filter.is_read {
            query = query.filter(notifications::is_read.eq(is_read));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(notifications::notification_type.eq(kind.as_str()));
        }

        let rows: Vec<NotificationRow> = query
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(limit)
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_notification).collect()
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id.as_uuid()))
                .filter(notifications::user_id.eq(user.as_uuid())),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(Some(now)),
            notifications::updated_at.eq(now),
        ))
        .returning(NotificationRow::as_returning())
        .get_result::<NotificationRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_notification).transpose()
    }

    async fn mark_all_read(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changed = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user.as_uuid()))
                .filter(notifications::is_read.eq(false)),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(Some(now)),
            notifications::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(u64::try_from(changed).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion edge cases.

    use rstest::{fixture, rstest};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::NotificationSubject;

    #[fixture]
    fn row() -> NotificationRow {
        let now = Utc::now();
        NotificationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            notification_type: "agreement_signed".to_owned(),
            title: "Agreement signed".to_owned(),
            message: "Your tenant signed".to_owned(),
            is_read: false,
            read_at: None,
            link_to: None,
            related_model: Some("Agreement".to_owned()),
            related_id: Some(Uuid::new_v4()),
            channels: json!({ "in_app": true, "email": false, "sms": false, "push": false }),
            delivery_status: json!({
                "email_sent": false,
                "email_sent_at": null,
                "sms_sent": false,
                "sms_sent_at": null,
                "push_sent": false,
                "push_sent_at": null
            }),
            priority: "high".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_decodes_subject_and_channels(row: NotificationRow) {
        let notification = row_to_notification(row).expect("valid row");

        assert_eq!(notification.kind, NotificationType::AgreementSigned);
        assert_eq!(notification.related_model, Some(NotificationSubject::Agreement));
        assert!(notification.channels.in_app);
        assert_eq!(notification.priority, TicketPriority::High);
    }

    #[rstest]
    fn unknown_subject_is_a_query_error(mut row: NotificationRow) {
        row.related_model = Some("Property".to_owned());

        let error = row_to_notification(row).expect_err("bad subject");

        assert!(matches!(error, NotificationPersistenceError::Query { .. }));
    }
}
