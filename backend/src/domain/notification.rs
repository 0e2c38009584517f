//! In-app notifications addressed to one user.
//!
//! Notifications are produced by background triggers through the repository's
//! `insert`; the API only lists them and flips read flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ids::{NotificationId, UserId};
use super::ticket::TicketPriority;

/// Upper bound on notifications returned by one listing.
pub const NOTIFICATION_LIST_LIMIT: usize = 50;

/// Event that raised a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    RentDue,
    RentOverdue,
    PaymentReceived,
    AgreementExpiring,
    AgreementSigned,
    TicketUpdate,
    InspectionScheduled,
    System,
    Other,
}

impl NotificationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RentDue => "rent_due",
            Self::RentOverdue => "rent_overdue",
            Self::PaymentReceived => "payment_received",
            Self::AgreementExpiring => "agreement_expiring",
            Self::AgreementSigned => "agreement_signed",
            Self::TicketUpdate => "ticket_update",
            Self::InspectionScheduled => "inspection_scheduled",
            Self::System => "system",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::RentDue,
            Self::RentOverdue,
            Self::PaymentReceived,
            Self::AgreementExpiring,
            Self::AgreementSigned,
            Self::TicketUpdate,
            Self::InspectionScheduled,
            Self::System,
            Self::Other,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == s)
        .ok_or_else(|| format!("unknown notification type: {s}"))
    }
}

/// Record a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum NotificationSubject {
    Agreement,
    Payment,
    Ticket,
    Inspection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Channels {
    pub in_app: bool,
    pub email: bool,
    pub sms: bool,
    pub push: bool,
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            in_app: true,
            email: false,
            sms: false,
            push: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryStatus {
    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub sms_sent: bool,
    pub sms_sent_at: Option<DateTime<Utc>>,
    pub push_sent: bool,
    pub push_sent_at: Option<DateTime<Utc>>,
}

/// Stored in-app notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    pub id: NotificationId,
    pub user: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub link_to: Option<String>,
    pub related_model: Option<NotificationSubject>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub related_id: Option<Uuid>,
    pub channels: Channels,
    pub delivery_status: DeliveryStatus,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Unread in-app notification for `user`.
    pub fn new(
        user: UserId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::random(),
            user,
            kind,
            title: title.into(),
            message: message.into(),
            is_read: false,
            read_at: None,
            link_to: None,
            related_model: None,
            related_id: None,
            channels: Channels::default(),
            delivery_status: DeliveryStatus::default(),
            priority: TicketPriority::Medium,
            created_at: now,
            updated_at: now,
        }
    }

    /// Point the notification at a related record.
    pub fn about(mut self, subject: NotificationSubject, id: Uuid) -> Self {
        self.related_model = Some(subject);
        self.related_id = Some(id);
        self
    }

    pub fn mark_read(&mut self, now: DateTime<Utc>) {
        self.is_read = true;
        self.read_at = Some(now);
        self.updated_at = now;
    }
}

/// Legal list filters for the caller's notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct NotificationFilter {
    pub is_read: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        self.is_read.is_none_or(|read| notification.is_read == read)
            && self.kind.is_none_or(|kind| notification.kind == kind)
    }
}
