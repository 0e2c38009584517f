//! PostgreSQL-backed `PaymentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PaymentPersistenceError, PaymentRepository};
use crate::domain::{
    AgreementId, Payment, PaymentFilter, PaymentId, PaymentMethod, PaymentStatus,
    PaymentStatusUpdate, PaymentType, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::{from_label, parse_label, to_label};
use super::models::{NewPaymentRow, PaymentRow, PaymentSettlementChangeset};
use super::pool::{DbPool, PoolError};
use super::schema::payments;

/// Diesel-backed implementation of the payment repository port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PaymentPersistenceError {
    map_basic_pool_error(error, |message| PaymentPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> PaymentPersistenceError {
    map_basic_diesel_error(
        error,
        PaymentPersistenceError::query,
        PaymentPersistenceError::connection,
    )
}

fn method_label(
    method: Option<PaymentMethod>,
) -> Result<Option<String>, PaymentPersistenceError> {
    method
        .map(|method| to_label(&method, "payment_method"))
        .transpose()
        .map_err(PaymentPersistenceError::query)
}

fn row_to_payment(row: PaymentRow) -> Result<Payment, PaymentPersistenceError> {
    let PaymentRow {
        id,
        agreement_id,
        payer_id,
        receiver_id,
        amount,
        payment_type,
        description,
        due_date,
        paid_date,
        status,
        payment_method,
        transaction_id,
        razorpay_order_id,
        razorpay_payment_id,
        razorpay_signature,
        late_fee,
        notes,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<Payment, String> {
        Ok(Payment {
            id: PaymentId::from_uuid(id),
            agreement: AgreementId::from_uuid(agreement_id),
            payer: UserId::from_uuid(payer_id),
            receiver: UserId::from_uuid(receiver_id),
            amount,
            kind: parse_label::<PaymentType>(&payment_type, "payment_type")?,
            description,
            due_date,
            paid_date,
            status: parse_label::<PaymentStatus>(&status, "status")?,
            payment_method: payment_method
                .map(|label| from_label(label, "payment_method"))
                .transpose()?,
            transaction_id,
            razorpay_order_id,
            razorpay_payment_id,
            razorpay_signature,
            late_fee,
            notes,
            created_at,
            updated_at,
        })
    };
    decode().map_err(PaymentPersistenceError::query)
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), PaymentPersistenceError> {
        let payment_method = method_label(payment.payment_method)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewPaymentRow {
            id: *payment.id.as_uuid(),
            agreement_id: *payment.agreement.as_uuid(),
            payer_id: *payment.payer.as_uuid(),
            receiver_id: *payment.receiver.as_uuid(),
            amount: payment.amount,
            payment_type: payment.kind.as_str(),
            description: payment.description.as_deref(),
            due_date: payment.due_date,
            paid_date: payment.paid_date,
            status: payment.status.as_str(),
            payment_method,
            transaction_id: payment.transaction_id.as_deref(),
            razorpay_order_id: payment.razorpay_order_id.as_deref(),
            razorpay_payment_id: payment.razorpay_payment_id.as_deref(),
            razorpay_signature: payment.razorpay_signature.as_deref(),
            late_fee: payment.late_fee,
            notes: payment.notes.as_deref(),
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        };

        diesel::insert_into(payments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        caller: &UserId,
        filter: &PaymentFilter,
    ) -> Result<Vec<Payment>, PaymentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = payments::table
            .filter(
                payments::payer_id
                    .eq(caller.as_uuid())
                    .or(payments::receiver_id.eq(caller.as_uuid())),
            )
            .into_boxed();
        if let Some(agreement) = filter.agreement {
            query = query.filter(payments::agreement_id.eq(*agreement.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(payments::status.eq(status.as_str()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(payments::payment_type.eq(kind.as_str()));
        }

        let rows: Vec<PaymentRow> = query
            .order((payments::due_date.desc(), payments::id.desc()))
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_payment).collect()
    }

    async fn find_for_participant(
        &self,
        id: &PaymentId,
        caller: &UserId,
    ) -> Result<Option<Payment>, PaymentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = payments::table
            .filter(payments::id.eq(id.as_uuid()))
            .filter(
                payments::payer_id
                    .eq(caller.as_uuid())
                    .or(payments::receiver_id.eq(caller.as_uuid())),
            )
            .select(PaymentRow::as_select())
            .first::<PaymentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_payment).transpose()
    }

    async fn update_status(
        &self,
        id: &PaymentId,
        caller: &UserId,
        update: &PaymentStatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Payment>, PaymentPersistenceError> {
        let payment_method = method_label(update.payment_method)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = PaymentSettlementChangeset {
            status: update.status.map(PaymentStatus::as_str),
            paid_date: (update.status == Some(PaymentStatus::Paid)).then_some(now),
            payment_method,
            transaction_id: update.transaction_id.as_deref(),
            razorpay_order_id: update.razorpay_order_id.as_deref(),
            razorpay_payment_id: update.razorpay_payment_id.as_deref(),
            razorpay_signature: update.razorpay_signature.as_deref(),
            updated_at: now,
        };

        let row = diesel::update(
            payments::table.filter(payments::id.eq(id.as_uuid())).filter(
                payments::payer_id
                    .eq(caller.as_uuid())
                    .or(payments::receiver_id.eq(caller.as_uuid())),
            ),
        )
        .set(&changes)
        .returning(PaymentRow::as_returning())
        .get_result::<PaymentRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_payment).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn row() -> PaymentRow {
        let now = Utc::now();
        PaymentRow {
            id: Uuid::new_v4(),
            agreement_id: Uuid::new_v4(),
            payer_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            amount: 22_000.0,
            payment_type: "rent".to_owned(),
            description: None,
            due_date: now,
            paid_date: None,
            status: "pending".to_owned(),
            payment_method: Some("bank_transfer".to_owned()),
            transaction_id: None,
            razorpay_order_id: None,
            razorpay_payment_id: None,
            razorpay_signature: None,
            late_fee: 0.0,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_decodes_method_label(row: PaymentRow) {
        let payment = row_to_payment(row).expect("valid row");

        assert_eq!(payment.kind, PaymentType::Rent);
        assert_eq!(payment.payment_method, Some(PaymentMethod::BankTransfer));
    }

    #[rstest]
    fn unknown_status_is_a_query_error(mut row: PaymentRow) {
        row.status = "bounced".to_owned();

        let error = row_to_payment(row).expect_err("bad status");

        assert!(matches!(error, PaymentPersistenceError::Query { .. }));
    }

    #[test]
    fn absent_method_encodes_as_null() {
        assert_eq!(method_label(None).expect("encodes"), None);
        assert_eq!(
            method_label(Some(PaymentMethod::Upi)).expect("encodes").as_deref(),
            Some("upi")
        );
    }
}
