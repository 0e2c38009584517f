//! Driving port for support tickets.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedCaller, Error, NewMessage, Ticket, TicketDraft, TicketFilter, TicketId,
    TicketStatusChange,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Tickets: Send + Sync {
    async fn create(&self, caller: &AuthenticatedCaller, draft: TicketDraft)
    -> Result<Ticket, Error>;

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: TicketFilter,
    ) -> Result<Vec<Ticket>, Error>;

    async fn get(&self, caller: &AuthenticatedCaller, id: TicketId) -> Result<Ticket, Error>;

    async fn add_message(
        &self,
        caller: &AuthenticatedCaller,
        id: TicketId,
        message: NewMessage,
    ) -> Result<Ticket, Error>;

    async fn update_status(
        &self,
        caller: &AuthenticatedCaller,
        id: TicketId,
        change: TicketStatusChange,
    ) -> Result<Ticket, Error>;
}
