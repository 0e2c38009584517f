//! Rent and deposit payment handlers.

use actix_web::{HttpResponse, get, post, put, web};
use serde_json::json;

use super::ApiResult;
use super::auth::Caller;
use super::envelope;
use super::state::HttpState;
use super::validation::{FieldName, parse_id};
use crate::domain::{PaymentDraft, PaymentFilter, PaymentId, PaymentStatusUpdate};

const ID: FieldName = FieldName::new("id");

/// Record a pending payment against an agreement the caller is party to.
/// The payer is the caller and the receiver is the agreement's landlord.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = PaymentDraft,
    responses(
        (status = 201, description = "Payment recorded"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 404, description = "Agreement not found or not a party", body = super::ErrorEnvelope)
    ),
    tags = ["payments"],
    operation_id = "createPayment"
)]
#[post("/payments")]
pub async fn create_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<PaymentDraft>,
) -> ApiResult<HttpResponse> {
    let payment = state.payments.create(&caller, payload.into_inner()).await?;
    Ok(envelope::created(json!({ "payment": payment }), "Payment created successfully"))
}

/// Payments the caller sent or received, soonest due first.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(PaymentFilter),
    responses(
        (status = 200, description = "Payments"),
        (status = 400, description = "Invalid filter", body = super::ErrorEnvelope)
    ),
    tags = ["payments"],
    operation_id = "listPayments"
)]
#[get("/payments")]
pub async fn list_payments(
    state: web::Data<HttpState>,
    caller: Caller,
    filter: web::Query<PaymentFilter>,
) -> ApiResult<HttpResponse> {
    let payments = state.payments.list(&caller, filter.into_inner()).await?;
    Ok(envelope::ok(json!({ "payments": payments })))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    params(("id" = String, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment"),
        (status = 404, description = "Not found or not a party", body = super::ErrorEnvelope)
    ),
    tags = ["payments"],
    operation_id = "getPayment"
)]
#[get("/payments/{id}")]
pub async fn get_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: PaymentId = parse_id(&path, ID)?;
    let payment = state.payments.get(&caller, id).await?;
    Ok(envelope::ok(json!({ "payment": payment })))
}

#[utoipa::path(
    put,
    path = "/api/v1/payments/{id}/status",
    params(("id" = String, Path, description = "Payment id")),
    request_body = PaymentStatusUpdate,
    responses(
        (status = 200, description = "Updated payment"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 404, description = "Not found or not a party", body = super::ErrorEnvelope)
    ),
    tags = ["payments"],
    operation_id = "updatePaymentStatus"
)]
#[put("/payments/{id}/status")]
pub async fn update_payment_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<PaymentStatusUpdate>,
) -> ApiResult<HttpResponse> {
    let id: PaymentId = parse_id(&path, ID)?;
    let payment = state
        .payments
        .update_status(&caller, id, payload.into_inner())
        .await?;
    Ok(envelope::ok(json!({ "payment": payment })))
}
