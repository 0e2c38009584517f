//! Internal Diesel models for database rows.
//!
//! These structs map directly to database tables and are never exposed
//! outside the persistence module. Conversion to and from domain types
//! happens in the repository implementations.
//!
//! Read rows are owned; insert rows and changesets borrow from the domain
//! value being written.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{
    agreements, documents, inspections, notifications, payments, properties, tickets, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub federated_id: Option<String>,
    pub image: Option<String>,
    pub roles: Vec<String>,
    pub checkpoint: String,
    pub landlord_profile: Option<Value>,
    pub tenant_profile: Option<Value>,
    pub subscription: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub federated_id: Option<&'a str>,
    pub image: Option<&'a str>,
    pub roles: Vec<String>,
    pub checkpoint: &'a str,
    pub landlord_profile: Option<Value>,
    pub tenant_profile: Option<Value>,
    pub subscription: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whole-record replacement; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub federated_id: Option<&'a str>,
    pub image: Option<&'a str>,
    pub roles: Vec<String>,
    pub checkpoint: &'a str,
    pub landlord_profile: Option<Value>,
    pub tenant_profile: Option<Value>,
    pub subscription: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PropertyRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub address: Value,
    pub specs: Value,
    pub amenities: Vec<String>,
    pub media: Value,
    pub expected_rent: f64,
    pub expected_deposit: f64,
    pub description: Option<String>,
    pub maintenance_details: Option<Value>,
    pub status: String,
    pub available_from: Option<DateTime<Utc>>,
    pub current_agreement_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert row; the generated `city` and `bhk` columns are omitted.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = properties)]
pub(crate) struct NewPropertyRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub address: Value,
    pub specs: Value,
    pub amenities: &'a [String],
    pub media: Value,
    pub expected_rent: f64,
    pub expected_deposit: f64,
    pub description: Option<&'a str>,
    pub maintenance_details: Option<Value>,
    pub status: &'a str,
    pub available_from: Option<DateTime<Utc>>,
    pub current_agreement_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = properties)]
pub(crate) struct PropertyChangeset<'a> {
    pub title: Option<&'a str>,
    pub address: Option<Value>,
    pub specs: Option<Value>,
    pub amenities: Option<&'a [String]>,
    pub expected_rent: Option<f64>,
    pub expected_deposit: Option<f64>,
    pub description: Option<&'a str>,
    pub maintenance_details: Option<Value>,
    pub status: Option<&'a str>,
    pub available_from: Option<DateTime<Utc>>,
    pub current_agreement_id: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Agreements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = agreements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AgreementRow {
    pub id: Uuid,
    pub property_id: Uuid,
    pub landlord_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub agreement_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent_amount: f64,
    pub security_deposit: f64,
    pub rent_payment_date: i16,
    pub late_penalty_percentage: f64,
    pub maintenance_terms: Option<Value>,
    pub lock_in_period: i32,
    pub notice_period: i32,
    pub police_verification_status: String,
    pub rent_escalation: Option<Value>,
    pub clauses: Value,
    pub status: String,
    pub document_url: Option<String>,
    pub landlord_signed: bool,
    pub landlord_signed_at: Option<DateTime<Utc>>,
    pub landlord_ip: Option<String>,
    pub tenant_signed: bool,
    pub tenant_signed_at: Option<DateTime<Utc>>,
    pub tenant_ip: Option<String>,
    pub termination: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = agreements)]
pub(crate) struct NewAgreementRow<'a> {
    pub id: Uuid,
    pub property_id: Uuid,
    pub landlord_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub agreement_type: &'a str,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent_amount: f64,
    pub security_deposit: f64,
    pub rent_payment_date: i16,
    pub late_penalty_percentage: f64,
    pub maintenance_terms: Option<Value>,
    pub lock_in_period: i32,
    pub notice_period: i32,
    pub police_verification_status: &'a str,
    pub rent_escalation: Option<Value>,
    pub clauses: Value,
    pub status: &'a str,
    pub document_url: Option<&'a str>,
    pub landlord_signed: bool,
    pub landlord_signed_at: Option<DateTime<Utc>>,
    pub landlord_ip: Option<&'a str>,
    pub tenant_signed: bool,
    pub tenant_signed_at: Option<DateTime<Utc>>,
    pub tenant_ip: Option<&'a str>,
    pub termination: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable terms of a draft. Status, parties other than the tenant and
/// signatures are never rewritten through this changeset.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = agreements)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AgreementTermsChangeset<'a> {
    pub tenant_id: Option<Uuid>,
    pub agreement_type: &'a str,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent_amount: f64,
    pub security_deposit: f64,
    pub rent_payment_date: i16,
    pub late_penalty_percentage: f64,
    pub maintenance_terms: Option<Value>,
    pub lock_in_period: i32,
    pub notice_period: i32,
    pub police_verification_status: &'a str,
    pub rent_escalation: Option<Value>,
    pub clauses: Value,
    pub document_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub payer_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: f64,
    pub payment_type: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub status: String,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub late_fee: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub(crate) struct NewPaymentRow<'a> {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub payer_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: f64,
    pub payment_type: &'a str,
    pub description: Option<&'a str>,
    pub due_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub status: &'a str,
    pub payment_method: Option<String>,
    pub transaction_id: Option<&'a str>,
    pub razorpay_order_id: Option<&'a str>,
    pub razorpay_payment_id: Option<&'a str>,
    pub razorpay_signature: Option<&'a str>,
    pub late_fee: f64,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Settlement update; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = payments)]
pub(crate) struct PaymentSettlementChangeset<'a> {
    pub status: Option<&'a str>,
    pub paid_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<&'a str>,
    pub razorpay_order_id: Option<&'a str>,
    pub razorpay_payment_id: Option<&'a str>,
    pub razorpay_signature: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Inspections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inspections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InspectionRow {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub property_id: Uuid,
    pub landlord_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub inspection_type: String,
    pub inspection_date: DateTime<Utc>,
    pub conducted_by: Uuid,
    pub photos: Value,
    pub issues: Value,
    pub overall_condition: String,
    pub signatures: Value,
    pub disputed: bool,
    pub dispute_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inspections)]
pub(crate) struct NewInspectionRow<'a> {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub property_id: Uuid,
    pub landlord_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub inspection_type: &'a str,
    pub inspection_date: DateTime<Utc>,
    pub conducted_by: Uuid,
    pub photos: Value,
    pub issues: Value,
    pub overall_condition: String,
    pub signatures: Value,
    pub disputed: bool,
    pub dispute_reason: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TicketRow {
    pub id: Uuid,
    pub agreement_id: Option<Uuid>,
    pub author_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub ticket_type: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub messages: Value,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub resolution_notes: Option<String>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub(crate) struct NewTicketRow<'a> {
    pub id: Uuid,
    pub agreement_id: Option<Uuid>,
    pub author_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub ticket_type: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub messages: Value,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub resolution_notes: Option<&'a str>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status transition; resolution and escalation fields are only written
/// for the matching status.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tickets)]
pub(crate) struct TicketStatusChangeset<'a> {
    pub status: &'a str,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub resolution_notes: Option<&'a str>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub link_to: Option<String>,
    pub related_model: Option<String>,
    pub related_id: Option<Uuid>,
    pub channels: Value,
    pub delivery_status: Value,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub link_to: Option<&'a str>,
    pub related_model: Option<String>,
    pub related_id: Option<Uuid>,
    pub channels: Value,
    pub delivery_status: Value,
    pub priority: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub uploaded_by: Uuid,
    pub name: String,
    pub document_type: String,
    pub category: Option<String>,
    pub url: String,
    pub public_id: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub related_model: Option<String>,
    pub related_id: Option<Uuid>,
    pub is_public: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub id: Uuid,
    pub uploaded_by: Uuid,
    pub name: &'a str,
    pub document_type: &'a str,
    pub category: Option<&'a str>,
    pub url: &'a str,
    pub public_id: &'a str,
    pub file_size: Option<i64>,
    pub mime_type: Option<&'a str>,
    pub related_model: Option<&'a str>,
    pub related_id: Option<Uuid>,
    pub is_public: bool,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
