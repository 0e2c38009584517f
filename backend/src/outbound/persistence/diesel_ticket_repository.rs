//! PostgreSQL-backed `TicketRepository` implementation using Diesel ORM.
//!
//! Appending a message concatenates onto the JSONB thread and flips a
//! `closed` ticket back to `open` in the same statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Jsonb, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{
    AgreementId, Ticket, TicketFilter, TicketId, TicketMessage, TicketPriority, TicketStatus,
    TicketStatusChange, TicketType, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::{from_json, parse_label, to_json};
use super::models::{NewTicketRow, TicketRow, TicketStatusChangeset};
use super::pool::{DbPool, PoolError};
use super::schema::tickets;

const REOPEN_IF_CLOSED: &str = "CASE WHEN status = 'closed' THEN 'open' ELSE status END";

/// Diesel-backed implementation of the ticket repository port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TicketPersistenceError {
    map_basic_pool_error(error, |message| TicketPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> TicketPersistenceError {
    map_basic_diesel_error(
        error,
        TicketPersistenceError::query,
        TicketPersistenceError::connection,
    )
}

fn row_to_ticket(row: TicketRow) -> Result<Ticket, TicketPersistenceError> {
    let TicketRow {
        id,
        agreement_id,
        author_id,
        assigned_to,
        ticket_type,
        title,
        description,
        status,
        priority,
        messages,
        resolved_at,
        resolved_by,
        resolution_notes,
        escalated_at,
        escalation_reason,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<Ticket, String> {
        Ok(Ticket {
            id: TicketId::from_uuid(id),
            agreement: agreement_id.map(AgreementId::from_uuid),
            author: UserId::from_uuid(author_id),
            assigned_to: assigned_to.map(UserId::from_uuid),
            kind: parse_label::<TicketType>(&ticket_type, "ticket_type")?,
            title,
            description,
            status: parse_label::<TicketStatus>(&status, "status")?,
            priority: parse_label::<TicketPriority>(&priority, "priority")?,
            messages: from_json(messages, "messages")?,
            resolved_at,
            resolved_by: resolved_by.map(UserId::from_uuid),
            resolution_notes,
            escalated_at,
            escalation_reason,
            created_at,
            updated_at,
        })
    };
    decode().map_err(TicketPersistenceError::query)
}

/// Columns a status change writes; resolution and escalation details only
/// for their own status.
fn status_changeset<'a>(
    change: &'a TicketStatusChange,
    caller: &UserId,
    now: DateTime<Utc>,
) -> TicketStatusChangeset<'a> {
    let resolving = change.status == TicketStatus::Resolved;
    let escalating = change.status == TicketStatus::Escalated;
    TicketStatusChangeset {
        status: change.status.as_str(),
        resolved_at: resolving.then_some(now),
        resolved_by: resolving.then(|| *caller.as_uuid()),
        resolution_notes: change.resolution_notes.as_deref().filter(|_| resolving),
        escalated_at: escalating.then_some(now),
        escalation_reason: change.escalation_reason.as_deref().filter(|_| escalating),
        updated_at: now,
    }
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        let messages =
            to_json(&ticket.messages, "messages").map_err(TicketPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewTicketRow {
            id: *ticket.id.as_uuid(),
            agreement_id: ticket.agreement.map(|id| *id.as_uuid()),
            author_id: *ticket.author.as_uuid(),
            assigned_to: ticket.assigned_to.map(|id| *id.as_uuid()),
            ticket_type: ticket.kind.as_str(),
            title: &ticket.title,
            description: &ticket.description,
            status: ticket.status.as_str(),
            priority: ticket.priority.as_str(),
            messages,
            resolved_at: ticket.resolved_at,
            resolved_by: ticket.resolved_by.map(|id| *id.as_uuid()),
            resolution_notes: ticket.resolution_notes.as_deref(),
            escalated_at: ticket.escalated_at,
            escalation_reason: ticket.escalation_reason.as_deref(),
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        };

        diesel::insert_into(tickets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_participating(
        &self,
        caller: &UserId,
        filter: &TicketFilter,
    ) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = tickets::table
            .filter(
                tickets::author_id
                    .eq(caller.as_uuid())
                    .or(tickets::assigned_to.eq(caller.as_uuid())),
            )
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(tickets::status.eq(status.as_str()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(tickets::ticket_type.eq(kind.as_str()));
        }
        if let Some(agreement) = filter.agreement {
            query = query.filter(tickets::agreement_id.eq(*agreement.as_uuid()));
        }

        let rows: Vec<TicketRow> = query
            .order((tickets::created_at.desc(), tickets::id.desc()))
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_ticket).collect()
    }

    async fn find_for_participant(
        &self,
        id: &TicketId,
        caller: &UserId,
    ) -> Result<Option<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = tickets::table
            .filter(tickets::id.eq(id.as_uuid()))
            .filter(
                tickets::author_id
                    .eq(caller.as_uuid())
                    .or(tickets::assigned_to.eq(caller.as_uuid())),
            )
            .select(TicketRow::as_select())
            .first::<TicketRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn append_message(
        &self,
        id: &TicketId,
        caller: &UserId,
        message: &TicketMessage,
    ) -> Result<Option<Ticket>, TicketPersistenceError> {
        let appended = to_json(std::slice::from_ref(message), "messages")
            .map_err(TicketPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(
            tickets::table.filter(tickets::id.eq(id.as_uuid())).filter(
                tickets::author_id
                    .eq(caller.as_uuid())
                    .or(tickets::assigned_to.eq(caller.as_uuid())),
            ),
        )
        .set((
            tickets::messages.eq(sql::<Jsonb>("messages || ").bind::<Jsonb, _>(appended)),
            tickets::status.eq(sql::<Text>(REOPEN_IF_CLOSED)),
            tickets::updated_at.eq(message.timestamp),
        ))
        .returning(TicketRow::as_returning())
        .get_result::<TicketRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn update_status(
        &self,
        id: &TicketId,
        caller: &UserId,
        change: &TicketStatusChange,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = status_changeset(change, caller, now);

        let row = diesel::update(
            tickets::table.filter(tickets::id.eq(id.as_uuid())).filter(
                tickets::author_id
                    .eq(caller.as_uuid())
                    .or(tickets::assigned_to.eq(caller.as_uuid())),
            ),
        )
        .set(&changes)
        .returning(TicketRow::as_returning())
        .get_result::<TicketRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Changeset construction and row conversion.

    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn change(status: TicketStatus) -> TicketStatusChange {
        TicketStatusChange {
            status,
            resolution_notes: Some("Fixed the tap".to_owned()),
            escalation_reason: Some("No response".to_owned()),
        }
    }

    #[rstest]
    fn resolving_records_resolver_and_notes_only() {
        let caller = UserId::random();
        let now = Utc::now();
        let change = change(TicketStatus::Resolved);

        let changes = status_changeset(&change, &caller, now);

        assert_eq!(changes.resolved_at, Some(now));
        assert_eq!(changes.resolved_by, Some(*caller.as_uuid()));
        assert_eq!(changes.resolution_notes, Some("Fixed the tap"));
        assert_eq!(changes.escalated_at, None);
        assert_eq!(changes.escalation_reason, None);
    }

    #[rstest]
    fn escalating_records_reason_only() {
        let change = change(TicketStatus::Escalated);

        let changes = status_changeset(&change, &UserId::random(), Utc::now());

        assert!(changes.escalated_at.is_some());
        assert_eq!(changes.escalation_reason, Some("No response"));
        assert_eq!(changes.resolved_by, None);
    }

    #[rstest]
    fn row_decodes_thread() {
        let now = Utc::now();
        let sender = Uuid::new_v4();
        let row = TicketRow {
            id: Uuid::new_v4(),
            agreement_id: None,
            author_id: sender,
            assigned_to: None,
            ticket_type: "maintenance".to_owned(),
            title: "Leaking tap".to_owned(),
            description: "Kitchen tap drips".to_owned(),
            status: "open".to_owned(),
            priority: "medium".to_owned(),
            messages: json!([{
                "sender_id": sender,
                "sender_type": "user",
                "content": "Any update?",
                "timestamp": "2025-01-15T09:00:00Z"
            }]),
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
            escalated_at: None,
            escalation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let ticket = row_to_ticket(row).expect("valid row");

        assert_eq!(ticket.messages.len(), 1);
        assert_eq!(ticket.messages[0].content, "Any update?");
    }
}
