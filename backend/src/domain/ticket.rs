//! Support tickets with an append-only message thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;
use super::ids::{AgreementId, TicketId, UserId};
use super::validation::Violations;

/// Ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    Maintenance,
    RentReceiptIssue,
    AgreementRenewal,
    EarlyExit,
    Dispute,
    PaymentIssue,
    General,
}

impl TicketType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::RentReceiptIssue => "rent_receipt_issue",
            Self::AgreementRenewal => "agreement_renewal",
            Self::EarlyExit => "early_exit",
            Self::Dispute => "dispute",
            Self::PaymentIssue => "payment_issue",
            Self::General => "general",
        }
    }
}

impl std::str::FromStr for TicketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maintenance" => Ok(Self::Maintenance),
            "rent_receipt_issue" => Ok(Self::RentReceiptIssue),
            "agreement_renewal" => Ok(Self::AgreementRenewal),
            "early_exit" => Ok(Self::EarlyExit),
            "dispute" => Ok(Self::Dispute),
            "payment_issue" => Ok(Self::PaymentIssue),
            "general" => Ok(Self::General),
            other => Err(format!("unknown ticket type: {other}")),
        }
    }
}

/// Ticket lifecycle. A message on a closed ticket moves it back to `open`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
    Escalated,
}

impl TicketStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Escalated => "escalated",
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "escalated" => Ok(Self::Escalated),
            other => Err(format!("unknown ticket status: {other}")),
        }
    }
}

/// Triage priority, `medium` when omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown ticket priority: {other}")),
        }
    }
}

/// Who wrote a ticket message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    #[default]
    User,
    Ai,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Document,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Attachment {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub filename: String,
}

/// One message in a ticket thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketMessage {
    pub sender_id: UserId,
    pub sender_type: SenderType,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub timestamp: DateTime<Utc>,
}

/// Stored support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Ticket {
    pub id: TicketId,
    pub agreement: Option<AgreementId>,
    pub author: UserId,
    pub assigned_to: Option<UserId>,
    #[serde(rename = "type")]
    pub kind: TicketType,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub messages: Vec<TicketMessage>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<UserId>,
    pub resolution_notes: Option<String>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Author or assignee.
    pub fn is_participant(&self, caller: &UserId) -> bool {
        &self.author == caller || self.assigned_to.as_ref() == Some(caller)
    }

    /// Append a message; a closed ticket reopens.
    pub fn push_message(&mut self, message: TicketMessage) {
        self.updated_at = message.timestamp;
        self.messages.push(message);
        if self.status == TicketStatus::Closed {
            self.status = TicketStatus::Open;
        }
    }
}

/// Caller-supplied ticket content. A stray `author` or `status` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketDraft {
    #[serde(default)]
    pub agreement: Option<AgreementId>,
    #[serde(rename = "type")]
    pub kind: TicketType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
}

impl TicketDraft {
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        violations.required("title", &self.title);
        violations.required("description", &self.description);
        violations.finish()
    }

    /// Open a ticket authored by `author`.
    pub fn into_ticket(self, author: UserId, now: DateTime<Utc>) -> Ticket {
        Ticket {
            id: TicketId::random(),
            agreement: self.agreement,
            author,
            assigned_to: None,
            kind: self.kind,
            title: self.title,
            description: self.description,
            status: TicketStatus::Open,
            priority: self.priority.unwrap_or_default(),
            messages: Vec::new(),
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
            escalated_at: None,
            escalation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of a new thread message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewMessage {
    pub content: String,
    #[serde(default)]
    pub sender_type: Option<SenderType>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        violations.required("content", &self.content);
        violations.finish()
    }

    /// Stamp the message with its sender and time.
    pub fn into_message(self, sender: UserId, now: DateTime<Utc>) -> TicketMessage {
        TicketMessage {
            sender_id: sender,
            sender_type: self.sender_type.unwrap_or_default(),
            content: self.content,
            attachments: self.attachments,
            timestamp: now,
        }
    }
}

/// Status transition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TicketStatusChange {
    pub status: TicketStatus,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    #[serde(default)]
    pub escalation_reason: Option<String>,
}

impl TicketStatusChange {
    /// Apply the transition. Resolving records who and when; escalating
    /// records when and why.
    pub fn apply_to(&self, ticket: &mut Ticket, caller: UserId, now: DateTime<Utc>) {
        ticket.status = self.status;
        match self.status {
            TicketStatus::Resolved => {
                ticket.resolved_at = Some(now);
                ticket.resolved_by = Some(caller);
                if self.resolution_notes.is_some() {
                    ticket.resolution_notes.clone_from(&self.resolution_notes);
                }
            }
            TicketStatus::Escalated => {
                ticket.escalated_at = Some(now);
                if self.escalation_reason.is_some() {
                    ticket.escalation_reason.clone_from(&self.escalation_reason);
                }
            }
            _ => {}
        }
        ticket.updated_at = now;
    }
}

/// Legal list filters for tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    #[serde(rename = "type")]
    pub kind: Option<TicketType>,
    pub agreement: Option<AgreementId>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.is_none_or(|status| ticket.status == status)
            && self.kind.is_none_or(|kind| ticket.kind == kind)
            && self.agreement.is_none_or(|id| ticket.agreement == Some(id))
    }
}
