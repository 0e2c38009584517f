//! Rental agreement handlers, including signature collection.

use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use super::ApiResult;
use super::auth::{Caller, client_ip};
use super::envelope;
use super::state::HttpState;
use super::validation::{FieldName, parse_id};
use crate::domain::{
    AgreementDraft, AgreementFilter, AgreementId, AgreementPatch, AgreementSide, AgreementStatus,
    SigningParty,
};

const ID: FieldName = FieldName::new("id");

/// Which side of the agreements to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListRole {
    Landlord,
    #[default]
    Tenant,
}

/// Query string of `GET /agreements`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(deny_unknown_fields)]
pub struct AgreementListQuery {
    /// Defaults to `tenant`.
    pub role: Option<ListRole>,
    pub status: Option<AgreementStatus>,
}

impl From<AgreementListQuery> for AgreementFilter {
    fn from(query: AgreementListQuery) -> Self {
        let side = match query.role.unwrap_or_default() {
            ListRole::Landlord => AgreementSide::Landlord,
            ListRole::Tenant => AgreementSide::Tenant,
        };
        Self {
            side,
            status: query.status,
        }
    }
}

/// Body of `POST /agreements/{id}/sign`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SignRequest {
    pub role: SigningParty,
}

/// Draft an agreement for one of the caller's properties.
#[utoipa::path(
    post,
    path = "/api/v1/agreements",
    request_body = AgreementDraft,
    responses(
        (status = 201, description = "Agreement drafted"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 403, description = "Landlord role required", body = super::ErrorEnvelope),
        (status = 404, description = "Property not found or not owned", body = super::ErrorEnvelope)
    ),
    tags = ["agreements"],
    operation_id = "createAgreement"
)]
#[post("/agreements")]
pub async fn create_agreement(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<AgreementDraft>,
) -> ApiResult<HttpResponse> {
    let agreement = state.agreements.create(&caller, payload.into_inner()).await?;
    Ok(envelope::created(
        json!({ "agreement": agreement }),
        "Agreement created successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/agreements",
    params(AgreementListQuery),
    responses(
        (status = 200, description = "Agreements on the requested side"),
        (status = 400, description = "Invalid filter", body = super::ErrorEnvelope)
    ),
    tags = ["agreements"],
    operation_id = "listAgreements"
)]
#[get("/agreements")]
pub async fn list_agreements(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<AgreementListQuery>,
) -> ApiResult<HttpResponse> {
    let agreements = state
        .agreements
        .list(&caller, query.into_inner().into())
        .await?;
    Ok(envelope::ok(json!({ "agreements": agreements })))
}

/// Visible to the landlord and the tenant only.
#[utoipa::path(
    get,
    path = "/api/v1/agreements/{id}",
    params(("id" = String, Path, description = "Agreement id")),
    responses(
        (status = 200, description = "Agreement"),
        (status = 404, description = "Not found or not a party", body = super::ErrorEnvelope)
    ),
    tags = ["agreements"],
    operation_id = "getAgreement"
)]
#[get("/agreements/{id}")]
pub async fn get_agreement(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: AgreementId = parse_id(&path, ID)?;
    let agreement = state.agreements.get(&caller, id).await?;
    Ok(envelope::ok(json!({ "agreement": agreement })))
}

#[utoipa::path(
    put,
    path = "/api/v1/agreements/{id}",
    params(("id" = String, Path, description = "Agreement id")),
    request_body = AgreementPatch,
    responses(
        (status = 200, description = "Updated draft"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 404, description = "Not the landlord's draft", body = super::ErrorEnvelope)
    ),
    tags = ["agreements"],
    operation_id = "updateAgreement"
)]
#[put("/agreements/{id}")]
pub async fn update_agreement(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<AgreementPatch>,
) -> ApiResult<HttpResponse> {
    let id: AgreementId = parse_id(&path, ID)?;
    let agreement = state
        .agreements
        .update(&caller, id, payload.into_inner())
        .await?;
    Ok(envelope::ok(json!({ "agreement": agreement })))
}

/// Sign as landlord or tenant. The client address is recorded with the
/// signature, and the agreement activates once both sides have signed.
#[utoipa::path(
    post,
    path = "/api/v1/agreements/{id}/sign",
    params(("id" = String, Path, description = "Agreement id")),
    request_body = SignRequest,
    responses(
        (status = 200, description = "Signature recorded"),
        (status = 403, description = "Caller is not that party", body = super::ErrorEnvelope),
        (status = 404, description = "Not found", body = super::ErrorEnvelope),
        (status = 409, description = "Agreement can no longer be signed", body = super::ErrorEnvelope)
    ),
    tags = ["agreements"],
    operation_id = "signAgreement"
)]
#[post("/agreements/{id}/sign")]
pub async fn sign_agreement(
    req: HttpRequest,
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<SignRequest>,
) -> ApiResult<HttpResponse> {
    let id: AgreementId = parse_id(&path, ID)?;
    let agreement = state
        .agreements
        .sign(&caller, id, payload.role, client_ip(&req))
        .await?;
    Ok(envelope::ok_with_message(
        json!({ "agreement": agreement }),
        "Agreement signed successfully",
    ))
}
