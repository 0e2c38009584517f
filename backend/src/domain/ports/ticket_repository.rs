//! Port abstraction for ticket persistence.
//!
//! Listing is limited to tickets the caller authored; single-ticket access
//! also admits the assignee.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Ticket, TicketFilter, TicketId, TicketMessage, TicketStatusChange, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ticket repository adapters.
    pub enum TicketPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError>;

    /// Tickets `caller` authored or is assigned to, newest first.
    async fn list_participating(
        &self,
        caller: &UserId,
        filter: &TicketFilter,
    ) -> Result<Vec<Ticket>, TicketPersistenceError>;

    async fn find_for_participant(
        &self,
        id: &TicketId,
        caller: &UserId,
    ) -> Result<Option<Ticket>, TicketPersistenceError>;

    /// Append a message and reopen a closed ticket in the same update.
    async fn append_message(
        &self,
        id: &TicketId,
        caller: &UserId,
        message: &TicketMessage,
    ) -> Result<Option<Ticket>, TicketPersistenceError>;

    async fn update_status(
        &self,
        id: &TicketId,
        caller: &UserId,
        change: &TicketStatusChange,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>, TicketPersistenceError>;
}
