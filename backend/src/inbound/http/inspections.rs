//! Move-in, move-out and periodic inspection handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use serde_json::json;

use super::ApiResult;
use super::auth::Caller;
use super::envelope;
use super::multipart::read_upload_form;
use super::state::HttpState;
use super::validation::{FieldName, missing_field_error, parse_id};
use crate::domain::ports::PhotoUpload;
use crate::domain::{InspectionDraft, InspectionFilter, InspectionId};

const ID: FieldName = FieldName::new("id");
const PHOTO_FIELDS: &[&str] = &["file", "photo"];

#[utoipa::path(
    post,
    path = "/api/v1/inspections",
    request_body = InspectionDraft,
    responses(
        (status = 201, description = "Inspection recorded"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 404, description = "Agreement not found or not a party", body = super::ErrorEnvelope)
    ),
    tags = ["inspections"],
    operation_id = "createInspection"
)]
#[post("/inspections")]
pub async fn create_inspection(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<InspectionDraft>,
) -> ApiResult<HttpResponse> {
    let inspection = state.inspections.create(&caller, payload.into_inner()).await?;
    Ok(envelope::created(
        json!({ "inspection": inspection }),
        "Inspection created successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/inspections",
    params(InspectionFilter),
    responses(
        (status = 200, description = "Inspections the caller conducted"),
        (status = 400, description = "Invalid filter", body = super::ErrorEnvelope)
    ),
    tags = ["inspections"],
    operation_id = "listInspections"
)]
#[get("/inspections")]
pub async fn list_inspections(
    state: web::Data<HttpState>,
    caller: Caller,
    filter: web::Query<InspectionFilter>,
) -> ApiResult<HttpResponse> {
    let inspections = state.inspections.list(&caller, filter.into_inner()).await?;
    Ok(envelope::ok(json!({ "inspections": inspections })))
}

#[utoipa::path(
    get,
    path = "/api/v1/inspections/{id}",
    params(("id" = String, Path, description = "Inspection id")),
    responses(
        (status = 200, description = "Inspection"),
        (status = 404, description = "Not found", body = super::ErrorEnvelope)
    ),
    tags = ["inspections"],
    operation_id = "getInspection"
)]
#[get("/inspections/{id}")]
pub async fn get_inspection(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: InspectionId = parse_id(&path, ID)?;
    let inspection = state.inspections.get(&caller, id).await?;
    Ok(envelope::ok(json!({ "inspection": inspection })))
}

/// Attach one photo. Multipart fields: `file`, optional `room` (defaults to
/// `general`) and `description`.
#[utoipa::path(
    post,
    path = "/api/v1/inspections/{id}/photos",
    params(("id" = String, Path, description = "Inspection id")),
    request_body(content_type = "multipart/form-data", description = "Photo and labels"),
    responses(
        (status = 200, description = "Appended photo"),
        (status = 400, description = "Missing or invalid file", body = super::ErrorEnvelope),
        (status = 404, description = "Not found", body = super::ErrorEnvelope),
        (status = 502, description = "Media store failure", body = super::ErrorEnvelope)
    ),
    tags = ["inspections"],
    operation_id = "addInspectionPhoto"
)]
#[post("/inspections/{id}/photos")]
pub async fn add_inspection_photo(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let id: InspectionId = parse_id(&path, ID)?;
    let mut form = read_upload_form(payload, PHOTO_FIELDS).await?;
    let room = form.owned_text("room");
    let description = form.owned_text("description");
    let file = form
        .files
        .drain(..)
        .next()
        .ok_or_else(|| missing_field_error(FieldName::new("file")))?;

    let photo = state
        .inspections
        .add_photo(
            &caller,
            id,
            PhotoUpload {
                file,
                room,
                description,
            },
        )
        .await?;
    Ok(envelope::ok_with_message(
        json!({ "photo": photo }),
        "Photo uploaded successfully",
    ))
}
