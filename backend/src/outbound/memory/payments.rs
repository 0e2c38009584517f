//! In-memory `PaymentRepository`, scoped to payer and receiver.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{PaymentPersistenceError, PaymentRepository};
use crate::domain::{Payment, PaymentFilter, PaymentId, PaymentStatusUpdate, UserId};

use super::newest_first;

/// In-memory payment store.
#[derive(Debug, Default)]
pub struct MemoryPaymentRepository {
    payments: RwLock<HashMap<PaymentId, Payment>>,
}

impl MemoryPaymentRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), PaymentPersistenceError> {
        self.payments
            .write()
            .await
            .insert(payment.id, payment.clone());
        Ok(())
    }

    async fn list(
        &self,
        caller: &UserId,
        filter: &PaymentFilter,
    ) -> Result<Vec<Payment>, PaymentPersistenceError> {
        let mut listed: Vec<Payment> = self
            .payments
            .read()
            .await
            .values()
            .filter(|payment| payment.is_participant(caller) && filter.matches(payment))
            .cloned()
            .collect();
        newest_first(&mut listed, |payment| (payment.due_date, payment.id));
        Ok(listed)
    }

    async fn find_for_participant(
        &self,
        id: &PaymentId,
        caller: &UserId,
    ) -> Result<Option<Payment>, PaymentPersistenceError> {
        Ok(self
            .payments
            .read()
            .await
            .get(id)
            .filter(|payment| payment.is_participant(caller))
            .cloned())
    }

    async fn update_status(
        &self,
        id: &PaymentId,
        caller: &UserId,
        update: &PaymentStatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Payment>, PaymentPersistenceError> {
        let mut payments = self.payments.write().await;
        Ok(payments
            .get_mut(id)
            .filter(|payment| payment.is_participant(caller))
            .map(|payment| {
                update.apply_to(payment, now);
                payment.clone()
            }))
    }
}
