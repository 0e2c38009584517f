//! Support ticket service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{TicketRepository, Tickets};
use crate::domain::repository_errors::map_ticket_error;
use crate::domain::{
    AuthenticatedCaller, Error, NewMessage, Ticket, TicketDraft, TicketFilter, TicketId,
    TicketStatusChange,
};

const NOT_FOUND: &str = "Ticket not found";

/// Support ticket service implementing the [`Tickets`](crate::domain::ports::Tickets) driving port.
#[derive(Clone)]
pub struct TicketService<T> {
    tickets: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<T> TicketService<T> {
    /// Build the service; `clock` stamps messages and status changes.
    pub fn new(tickets: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self { tickets, clock }
    }
}

#[async_trait]
impl<T> Tickets for TicketService<T>
where
    T: TicketRepository,
{
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: TicketDraft,
    ) -> Result<Ticket, Error> {
        draft.validate()?;
        let ticket = draft.into_ticket(caller.user_id, self.clock.utc());
        self.tickets
            .insert(&ticket)
            .await
            .map_err(map_ticket_error)?;
        info!(ticket_id = %ticket.id, kind = ticket.kind.as_str(), "ticket opened");
        Ok(ticket)
    }

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: TicketFilter,
    ) -> Result<Vec<Ticket>, Error> {
        self.tickets
            .list_participating(&caller.user_id, &filter)
            .await
            .map_err(map_ticket_error)
    }

    async fn get(&self, caller: &AuthenticatedCaller, id: TicketId) -> Result<Ticket, Error> {
        self.tickets
            .find_for_participant(&id, &caller.user_id)
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn add_message(
        &self,
        caller: &AuthenticatedCaller,
        id: TicketId,
        message: NewMessage,
    ) -> Result<Ticket, Error> {
        message.validate()?;
        let message = message.into_message(caller.user_id, self.clock.utc());
        self.tickets
            .append_message(&id, &caller.user_id, &message)
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn update_status(
        &self,
        caller: &AuthenticatedCaller,
        id: TicketId,
        change: TicketStatusChange,
    ) -> Result<Ticket, Error> {
        let ticket = self
            .tickets
            .update_status(&id, &caller.user_id, &change, self.clock.utc())
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        info!(ticket_id = %id, status = ticket.status.as_str(), "ticket status changed");
        Ok(ticket)
    }
}

#[cfg(test)]
#[path = "ticket_service_tests.rs"]
mod tests;
