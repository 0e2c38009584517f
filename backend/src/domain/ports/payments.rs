//! Driving port for payments.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedCaller, Error, Payment, PaymentDraft, PaymentFilter, PaymentId,
    PaymentStatusUpdate,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Payments: Send + Sync {
    /// The caller must be the agreement's tenant; the landlord receives.
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: PaymentDraft,
    ) -> Result<Payment, Error>;

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: PaymentFilter,
    ) -> Result<Vec<Payment>, Error>;

    async fn get(&self, caller: &AuthenticatedCaller, id: PaymentId) -> Result<Payment, Error>;

    async fn update_status(
        &self,
        caller: &AuthenticatedCaller,
        id: PaymentId,
        update: PaymentStatusUpdate,
    ) -> Result<Payment, Error>;
}
