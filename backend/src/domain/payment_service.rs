//! Payment service: tenants record payments against their agreements and
//! either party follows settlement.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{AgreementRepository, PaymentRepository, Payments};
use crate::domain::repository_errors::{map_agreement_error, map_payment_error};
use crate::domain::{
    AuthenticatedCaller, Error, Payment, PaymentDraft, PaymentFilter, PaymentId,
    PaymentStatusUpdate,
};

const NOT_FOUND: &str = "Payment not found";

/// Payment service implementing the [`Payments`](crate::domain::ports::Payments) driving port.
#[derive(Clone)]
pub struct PaymentService<Pay, A> {
    payments: Arc<Pay>,
    agreements: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<Pay, A> PaymentService<Pay, A> {
    /// Build the service over the payment and agreement stores.
    pub fn new(payments: Arc<Pay>, agreements: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            payments,
            agreements,
            clock,
        }
    }
}

#[async_trait]
impl<Pay, A> Payments for PaymentService<Pay, A>
where
    Pay: PaymentRepository,
    A: AgreementRepository,
{
    async fn create(
        &self,
        caller: &AuthenticatedCaller,
        draft: PaymentDraft,
    ) -> Result<Payment, Error> {
        draft.validate()?;
        let agreement = self
            .agreements
            .find_for_participant(&draft.agreement, &caller.user_id)
            .await
            .map_err(map_agreement_error)?
            .ok_or_else(|| Error::not_found("Agreement not found"))?;
        if agreement.tenant != Some(caller.user_id) {
            return Err(Error::forbidden("Unauthorized"));
        }

        let payment = draft.into_payment(caller.user_id, &agreement, self.clock.utc());
        self.payments
            .insert(&payment)
            .await
            .map_err(map_payment_error)?;
        info!(
            payment_id = %payment.id,
            agreement_id = %payment.agreement,
            amount = payment.amount,
            "payment recorded"
        );
        Ok(payment)
    }

    async fn list(
        &self,
        caller: &AuthenticatedCaller,
        filter: PaymentFilter,
    ) -> Result<Vec<Payment>, Error> {
        self.payments
            .list(&caller.user_id, &filter)
            .await
            .map_err(map_payment_error)
    }

    async fn get(&self, caller: &AuthenticatedCaller, id: PaymentId) -> Result<Payment, Error> {
        self.payments
            .find_for_participant(&id, &caller.user_id)
            .await
            .map_err(map_payment_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn update_status(
        &self,
        caller: &AuthenticatedCaller,
        id: PaymentId,
        update: PaymentStatusUpdate,
    ) -> Result<Payment, Error> {
        let payment = self
            .payments
            .update_status(&id, &caller.user_id, &update, self.clock.utc())
            .await
            .map_err(map_payment_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        info!(payment_id = %id, status = payment.status.as_str(), "payment status updated");
        Ok(payment)
    }
}

#[cfg(test)]
#[path = "payment_service_tests.rs"]
mod tests;
