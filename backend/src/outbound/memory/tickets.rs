//! In-memory `TicketRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{Ticket, TicketFilter, TicketId, TicketMessage, TicketStatusChange, UserId};

use super::newest_first;

/// In-memory support ticket store.
#[derive(Debug, Default)]
pub struct MemoryTicketRepository {
    tickets: RwLock<HashMap<TicketId, Ticket>>,
}

impl MemoryTicketRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketRepository for MemoryTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        self.tickets.write().await.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn list_participating(
        &self,
        caller: &UserId,
        filter: &TicketFilter,
    ) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut listed: Vec<Ticket> = self
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.is_participant(caller) && filter.matches(ticket))
            .cloned()
            .collect();
        newest_first(&mut listed, |ticket| (ticket.created_at, ticket.id));
        Ok(listed)
    }

    async fn find_for_participant(
        &self,
        id: &TicketId,
        caller: &UserId,
    ) -> Result<Option<Ticket>, TicketPersistenceError> {
        Ok(self
            .tickets
            .read()
            .await
            .get(id)
            .filter(|ticket| ticket.is_participant(caller))
            .cloned())
    }

    async fn append_message(
        &self,
        id: &TicketId,
        caller: &UserId,
        message: &TicketMessage,
    ) -> Result<Option<Ticket>, TicketPersistenceError> {
        let mut tickets = self.tickets.write().await;
        Ok(tickets
            .get_mut(id)
            .filter(|ticket| ticket.is_participant(caller))
            .map(|ticket| {
                ticket.push_message(message.clone());
                ticket.clone()
            }))
    }

    async fn update_status(
        &self,
        id: &TicketId,
        caller: &UserId,
        change: &TicketStatusChange,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>, TicketPersistenceError> {
        let mut tickets = self.tickets.write().await;
        Ok(tickets
            .get_mut(id)
            .filter(|ticket| ticket.is_participant(caller))
            .map(|ticket| {
                change.apply_to(ticket, *caller, now);
                ticket.clone()
            }))
    }
}
