//! Payment obligations between an agreement's tenant and landlord.
//!
//! Gateway correlation ids are stored as opaque strings; nothing here talks
//! to a payment gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;
use super::agreement::Agreement;
use super::ids::{AgreementId, PaymentId, UserId};
use super::validation::Violations;

/// What a payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Rent,
    Deposit,
    Maintenance,
    Penalty,
    Refund,
    Other,
}

impl PaymentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Deposit => "deposit",
            Self::Maintenance => "maintenance",
            Self::Penalty => "penalty",
            Self::Refund => "refund",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rent" => Ok(Self::Rent),
            "deposit" => Ok(Self::Deposit),
            "maintenance" => Ok(Self::Maintenance),
            "penalty" => Ok(Self::Penalty),
            "refund" => Ok(Self::Refund),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown payment type: {other}")),
        }
    }
}

/// Settlement state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Paid,
    Overdue,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// How the payer settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    BankTransfer,
    Cash,
    Card,
    Other,
}

/// Stored payment. `receiver` is always the agreement's landlord.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Payment {
    pub id: PaymentId,
    pub agreement: AgreementId,
    pub payer: UserId,
    pub receiver: UserId,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: PaymentType,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub late_fee: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Whether `caller` pays or receives this payment.
    pub fn is_participant(&self, caller: &UserId) -> bool {
        &self.payer == caller || &self.receiver == caller
    }
}

/// Caller-supplied payment content.
///
/// Unknown fields are ignored rather than rejected so that a stray
/// `receiver` or `payer` in the body has no effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentDraft {
    pub agreement: AgreementId,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: PaymentType,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub late_fee: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaymentDraft {
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        violations.non_negative("amount", self.amount);
        if let Some(fee) = self.late_fee {
            violations.non_negative("late_fee", fee);
        }
        violations.finish()
    }

    /// Materialise a pending payment from `payer` to the agreement's
    /// landlord.
    pub fn into_payment(self, payer: UserId, agreement: &Agreement, now: DateTime<Utc>) -> Payment {
        Payment {
            id: PaymentId::random(),
            agreement: agreement.id,
            payer,
            receiver: agreement.landlord,
            amount: self.amount,
            kind: self.kind,
            description: self.description,
            due_date: self.due_date,
            paid_date: None,
            status: PaymentStatus::Pending,
            payment_method: self.payment_method,
            transaction_id: None,
            razorpay_order_id: None,
            razorpay_payment_id: None,
            razorpay_signature: None,
            late_fee: self.late_fee.unwrap_or(0.0),
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Settlement update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PaymentStatusUpdate {
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

impl PaymentStatusUpdate {
    /// Apply in place. Moving to `paid` stamps `paid_date` with `now`.
    pub fn apply_to(&self, payment: &mut Payment, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            payment.status = status;
            if status == PaymentStatus::Paid {
                payment.paid_date = Some(now);
            }
        }
        if self.payment_method.is_some() {
            payment.payment_method = self.payment_method;
        }
        if self.transaction_id.is_some() {
            payment.transaction_id.clone_from(&self.transaction_id);
        }
        if self.razorpay_order_id.is_some() {
            payment.razorpay_order_id.clone_from(&self.razorpay_order_id);
        }
        if self.razorpay_payment_id.is_some() {
            payment.razorpay_payment_id.clone_from(&self.razorpay_payment_id);
        }
        if self.razorpay_signature.is_some() {
            payment.razorpay_signature.clone_from(&self.razorpay_signature);
        }
        payment.updated_at = now;
    }
}

/// Legal list filters for payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct PaymentFilter {
    pub agreement: Option<AgreementId>,
    pub status: Option<PaymentStatus>,
    #[serde(rename = "type")]
    pub kind: Option<PaymentType>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.agreement.is_none_or(|id| payment.agreement == id)
            && self.status.is_none_or(|status| payment.status == status)
            && self.kind.is_none_or(|kind| payment.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::agreement::{
        AgreementDraft, AgreementType, PoliceVerificationStatus,
    };
    use crate::domain::ids::PropertyId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn agreement(landlord: UserId, tenant: UserId) -> Agreement {
        AgreementDraft {
            property: PropertyId::random(),
            tenant: Some(tenant),
            agreement_type: AgreementType::LongTerm,
            start_date: now(),
            end_date: now() + chrono::Duration::days(365),
            rent_amount: 15000.0,
            security_deposit: 30000.0,
            rent_payment_date: 5,
            late_penalty_percentage: 2.0,
            maintenance_terms: None,
            lock_in_period: 6,
            notice_period: 1,
            police_verification_status: PoliceVerificationStatus::Pending,
            rent_escalation: None,
            clauses: Vec::new(),
            document_url: None,
        }
        .into_agreement(landlord, now())
    }

    #[test]
    fn stray_receiver_in_body_is_ignored() {
        let landlord = UserId::random();
        let tenant = UserId::random();
        let agreement = agreement(landlord, tenant);
        let body = serde_json::json!({
            "agreement": agreement.id,
            "amount": 15000.0,
            "type": "rent",
            "due_date": "2025-03-05T00:00:00Z",
            "receiver": UserId::random(),
        });
        let draft: PaymentDraft = serde_json::from_value(body).expect("draft");
        let payment = draft.into_payment(tenant, &agreement, now());
        assert_eq!(payment.receiver, landlord);
        assert_eq!(payment.payer, tenant);
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[rstest]
    #[case(PaymentStatus::Paid, true)]
    #[case(PaymentStatus::Processing, false)]
    #[case(PaymentStatus::Failed, false)]
    fn paid_status_stamps_paid_date(#[case] status: PaymentStatus, #[case] stamped: bool) {
        let tenant = UserId::random();
        let agreement = agreement(UserId::random(), tenant);
        let mut payment = PaymentDraft {
            agreement: agreement.id,
            amount: 100.0,
            kind: PaymentType::Maintenance,
            description: None,
            due_date: now(),
            payment_method: None,
            late_fee: None,
            notes: None,
        }
        .into_payment(tenant, &agreement, now());
        let later = now() + chrono::Duration::hours(2);
        PaymentStatusUpdate {
            status: Some(status),
            transaction_id: Some("txn-1".to_owned()),
            ..PaymentStatusUpdate::default()
        }
        .apply_to(&mut payment, later);
        assert_eq!(payment.paid_date.is_some(), stamped);
        if stamped {
            assert_eq!(payment.paid_date, Some(later));
        }
        assert_eq!(payment.transaction_id.as_deref(), Some("txn-1"));
    }

    #[test]
    fn later_update_keeps_gateway_references_it_omits() {
        let tenant = UserId::random();
        let agreement = agreement(UserId::random(), tenant);
        let mut payment = PaymentDraft {
            agreement: agreement.id,
            amount: 100.0,
            kind: PaymentType::Rent,
            description: None,
            due_date: now(),
            payment_method: None,
            late_fee: None,
            notes: None,
        }
        .into_payment(tenant, &agreement, now());
        let order = PaymentStatusUpdate {
            status: Some(PaymentStatus::Processing),
            razorpay_order_id: Some("order_9A".to_owned()),
            ..PaymentStatusUpdate::default()
        };
        order.apply_to(&mut payment, now());
        PaymentStatusUpdate {
            status: Some(PaymentStatus::Paid),
            razorpay_payment_id: Some("pay_9A".to_owned()),
            ..PaymentStatusUpdate::default()
        }
        .apply_to(&mut payment, now());

        assert_eq!(payment.razorpay_order_id.as_deref(), Some("order_9A"));
        assert_eq!(payment.razorpay_payment_id.as_deref(), Some("pay_9A"));
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(order.razorpay_order_id.as_deref(), Some("order_9A"));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let draft = PaymentDraft {
            agreement: AgreementId::random(),
            amount: -1.0,
            kind: PaymentType::Rent,
            description: None,
            due_date: now(),
            payment_method: None,
            late_fee: Some(-2.0),
            notes: None,
        };
        let error = draft.validate().expect_err("negative");
        assert_eq!(error.message(), "Validation failed");
    }

    #[test]
    fn filter_accepts_type_query_key() {
        let filter: PaymentFilter =
            serde_json::from_value(serde_json::json!({ "type": "deposit" })).expect("filter");
        assert_eq!(filter.kind, Some(PaymentType::Deposit));
    }
}
