//! Property listing handlers. Every route is scoped to the caller's own
//! listings.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::json;

use super::ApiResult;
use super::auth::Caller;
use super::envelope;
use super::multipart::read_upload_form;
use super::state::HttpState;
use super::validation::{FieldName, missing_field_error, parse_id};
use crate::domain::{PropertyDraft, PropertyFilter, PropertyId, PropertyPatch};

const ID: FieldName = FieldName::new("id");
const MEDIA_FIELDS: &[&str] = &["file", "files", "media"];

/// Create a listing owned by the caller. Requires the landlord role.
#[utoipa::path(
    post,
    path = "/api/v1/properties",
    request_body = PropertyDraft,
    responses(
        (status = 201, description = "Property created"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 403, description = "Landlord role required", body = super::ErrorEnvelope)
    ),
    tags = ["properties"],
    operation_id = "createProperty"
)]
#[post("/properties")]
pub async fn create_property(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<PropertyDraft>,
) -> ApiResult<HttpResponse> {
    let property = state.properties.create(&caller, payload.into_inner()).await?;
    Ok(envelope::created(json!({ "property": property }), "Property created successfully"))
}

/// The caller's listings, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/properties",
    params(PropertyFilter),
    responses(
        (status = 200, description = "Listings"),
        (status = 400, description = "Invalid filter", body = super::ErrorEnvelope)
    ),
    tags = ["properties"],
    operation_id = "listProperties"
)]
#[get("/properties")]
pub async fn list_properties(
    state: web::Data<HttpState>,
    caller: Caller,
    filter: web::Query<PropertyFilter>,
) -> ApiResult<HttpResponse> {
    let properties = state.properties.list(&caller, filter.into_inner()).await?;
    Ok(envelope::ok(json!({ "properties": properties })))
}

#[utoipa::path(
    get,
    path = "/api/v1/properties/{id}",
    params(("id" = String, Path, description = "Property id")),
    responses(
        (status = 200, description = "Listing"),
        (status = 404, description = "Not found or not owned", body = super::ErrorEnvelope)
    ),
    tags = ["properties"],
    operation_id = "getProperty"
)]
#[get("/properties/{id}")]
pub async fn get_property(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: PropertyId = parse_id(&path, ID)?;
    let property = state.properties.get(&caller, id).await?;
    Ok(envelope::ok(json!({ "property": property })))
}

/// Apply a partial update. The owner cannot be changed.
#[utoipa::path(
    put,
    path = "/api/v1/properties/{id}",
    params(("id" = String, Path, description = "Property id")),
    request_body = PropertyPatch,
    responses(
        (status = 200, description = "Updated listing"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 404, description = "Not found or not owned", body = super::ErrorEnvelope)
    ),
    tags = ["properties"],
    operation_id = "updateProperty"
)]
#[put("/properties/{id}")]
pub async fn update_property(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<PropertyPatch>,
) -> ApiResult<HttpResponse> {
    let id: PropertyId = parse_id(&path, ID)?;
    let property = state
        .properties
        .update(&caller, id, payload.into_inner())
        .await?;
    Ok(envelope::ok(json!({ "property": property })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/properties/{id}",
    params(("id" = String, Path, description = "Property id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or not owned", body = super::ErrorEnvelope)
    ),
    tags = ["properties"],
    operation_id = "deleteProperty"
)]
#[delete("/properties/{id}")]
pub async fn delete_property(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: PropertyId = parse_id(&path, ID)?;
    state.properties.delete(&caller, id).await?;
    Ok(envelope::message("Property deleted successfully"))
}

/// Upload photos or videos and append them to the listing.
///
/// Multipart fields: `file`/`files`/`media` (one or more), optional `caption`.
#[utoipa::path(
    post,
    path = "/api/v1/properties/{id}/media",
    params(("id" = String, Path, description = "Property id")),
    request_body(content_type = "multipart/form-data", description = "Media files"),
    responses(
        (status = 200, description = "Appended media entries"),
        (status = 400, description = "Missing or invalid file", body = super::ErrorEnvelope),
        (status = 404, description = "Not found or not owned", body = super::ErrorEnvelope),
        (status = 502, description = "Media store failure", body = super::ErrorEnvelope)
    ),
    tags = ["properties"],
    operation_id = "addPropertyMedia"
)]
#[post("/properties/{id}/media")]
pub async fn add_property_media(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let id: PropertyId = parse_id(&path, ID)?;
    let form = read_upload_form(payload, MEDIA_FIELDS).await?;
    if form.files.is_empty() {
        return Err(missing_field_error(FieldName::new("file")));
    }
    let added = form.files.len();
    let caption = form.owned_text("caption");
    let property = state
        .properties
        .add_media(&caller, id, form.files, caption)
        .await?;
    let skip = property.media.len().saturating_sub(added);
    let media: Vec<_> = property.media.iter().skip(skip).collect();
    Ok(envelope::ok(json!({ "media": media })))
}
