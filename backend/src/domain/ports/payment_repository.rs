//! Port abstraction for payment persistence, scoped to payer or receiver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Payment, PaymentFilter, PaymentId, PaymentStatusUpdate, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by payment repository adapters.
    pub enum PaymentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "payment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "payment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> Result<(), PaymentPersistenceError>;

    /// Payments the caller pays or receives, latest due date first.
    async fn list(
        &self,
        caller: &UserId,
        filter: &PaymentFilter,
    ) -> Result<Vec<Payment>, PaymentPersistenceError>;

    async fn find_for_participant(
        &self,
        id: &PaymentId,
        caller: &UserId,
    ) -> Result<Option<Payment>, PaymentPersistenceError>;

    /// Apply a settlement update; `paid` stamps `paid_date` with `now`.
    async fn update_status(
        &self,
        id: &PaymentId,
        caller: &UserId,
        update: &PaymentStatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Payment>, PaymentPersistenceError>;
}
