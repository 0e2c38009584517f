//! Generic media uploads and deletions against the external object store.
//!
//! ```text
//! POST   /api/v1/media/upload            multipart: file, type?, category?, related_model?, related_id?, save_to_documents?
//! POST   /api/v1/media/upload-multiple   multipart: files (up to 10), same fields
//! DELETE /api/v1/media/{public_id}?delete_from_documents=true
//! ```

use std::str::FromStr;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use super::ApiResult;
use super::auth::Caller;
use super::envelope;
use super::multipart::{UploadForm, read_upload_form};
use super::state::HttpState;
use super::validation::{FieldName, invalid_value_error, parse_flag, parse_id};
use crate::domain::{DocumentType, Error, RelatedModel, UploadOptions};

const TYPE: FieldName = FieldName::new("type");
const RELATED_MODEL: FieldName = FieldName::new("related_model");
const RELATED_ID: FieldName = FieldName::new("related_id");
const SAVE_TO_DOCUMENTS: FieldName = FieldName::new("save_to_documents");

/// Query string of `DELETE /media/{public_id}`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(deny_unknown_fields)]
pub struct DeleteMediaQuery {
    /// Also remove the caller's document record for the object.
    #[serde(default)]
    pub delete_from_documents: bool,
}

fn parse_enum<T: FromStr>(form: &UploadForm, field: FieldName, name: &str) -> Result<Option<T>, Error> {
    form.text(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| invalid_value_error(field, raw, "is not a recognised value"))
        })
        .transpose()
}

fn upload_options(form: &UploadForm) -> Result<UploadOptions, Error> {
    Ok(UploadOptions {
        kind: parse_enum::<DocumentType>(form, TYPE, "type")?,
        category: form.owned_text("category"),
        related_model: parse_enum::<RelatedModel>(form, RELATED_MODEL, "related_model")?,
        related_id: form
            .text("related_id")
            .map(|raw| parse_id::<Uuid>(raw, RELATED_ID))
            .transpose()?,
        save_to_documents: form
            .text("save_to_documents")
            .map(|raw| parse_flag(raw, SAVE_TO_DOCUMENTS))
            .transpose()?
            .unwrap_or(false),
    })
}

/// Upload one file. The response is the stored file itself.
#[utoipa::path(
    post,
    path = "/api/v1/media/upload",
    request_body(content_type = "multipart/form-data", description = "File and document fields"),
    responses(
        (status = 200, description = "Uploaded file"),
        (status = 400, description = "Missing, oversized or unsupported file", body = super::ErrorEnvelope),
        (status = 502, description = "Media store failure", body = super::ErrorEnvelope)
    ),
    tags = ["media"],
    operation_id = "uploadFile"
)]
#[post("/media/upload")]
pub async fn upload_file(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let mut form = read_upload_form(payload, &["file"]).await?;
    let options = upload_options(&form)?;
    let file = form
        .files
        .drain(..)
        .next()
        .ok_or_else(|| Error::invalid_request("No file uploaded"))?;

    let uploaded = state.media.upload(&caller, vec![file], options).await?;
    let first = uploaded
        .into_iter()
        .next()
        .ok_or_else(|| Error::internal("upload returned no file"))?;
    Ok(envelope::ok(first))
}

/// Upload up to ten files into the same folder.
#[utoipa::path(
    post,
    path = "/api/v1/media/upload-multiple",
    request_body(content_type = "multipart/form-data", description = "Files and document fields"),
    responses(
        (status = 200, description = "Uploaded files and their count"),
        (status = 400, description = "Missing, oversized or unsupported files", body = super::ErrorEnvelope),
        (status = 502, description = "Media store failure", body = super::ErrorEnvelope)
    ),
    tags = ["media"],
    operation_id = "uploadFiles"
)]
#[post("/media/upload-multiple")]
pub async fn upload_files(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let form = read_upload_form(payload, &["files"]).await?;
    if form.files.is_empty() {
        return Err(Error::invalid_request("No files uploaded"));
    }
    let options = upload_options(&form)?;

    let uploaded = state.media.upload(&caller, form.files, options).await?;
    let count = uploaded.len();
    Ok(envelope::ok(json!({ "files": uploaded, "count": count })))
}

/// Remove an object. Public ids may contain `/`, so the route matches the
/// rest of the path.
#[utoipa::path(
    delete,
    path = "/api/v1/media/{public_id}",
    params(
        ("public_id" = String, Path, description = "Object id in the media store"),
        DeleteMediaQuery
    ),
    responses(
        (status = 200, description = "Object deleted"),
        (status = 404, description = "Document not found or not owned", body = super::ErrorEnvelope),
        (status = 502, description = "Media store failure", body = super::ErrorEnvelope)
    ),
    tags = ["media"],
    operation_id = "deleteFile"
)]
#[delete("/media/{public_id:.*}")]
pub async fn delete_file(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    query: web::Query<DeleteMediaQuery>,
) -> ApiResult<HttpResponse> {
    let public_id = path.into_inner();
    if public_id.trim().is_empty() {
        return Err(Error::invalid_request("Public ID is required"));
    }
    let delete_from_documents = query.delete_from_documents;
    let deletion = state
        .media
        .delete(&caller, &public_id, delete_from_documents)
        .await?;
    let message = if delete_from_documents {
        "File and document deleted successfully"
    } else {
        "File deleted successfully from Cloudinary"
    };
    Ok(envelope::ok_with_message(deletion, message))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    use super::*;
    use crate::domain::ports::MockMediaGateway;
    use crate::domain::{DocumentId, MediaDeletion, UploadedFile};
    use crate::inbound::http::error::query_error_handler;
    use crate::inbound::http::test_utils::{
        Part, StateBuilder, bearer, json_body, multipart_post, tenant_caller,
    };

    async fn call(
        state: web::Data<HttpState>,
        request: test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(state)
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .service(
                    web::scope("/api/v1")
                        .service(upload_file)
                        .service(upload_files)
                        .service(delete_file),
                ),
        )
        .await;
        test::call_service(&app, request.insert_header(bearer()).to_request()).await
    }

    fn uploaded(name: &str) -> UploadedFile {
        UploadedFile {
            url: format!("https://cdn.example/{name}"),
            public_id: format!("rentfit/kyc/{name}"),
            file_name: name.to_owned(),
            file_size: 3,
            mime_type: "image/png".to_owned(),
            document: None,
        }
    }

    fn png(name: &'static str, field: &'static str) -> Part<'static> {
        Part::File {
            name: field,
            file_name: name,
            mime: "image/png",
            bytes: b"png",
        }
    }

    #[actix_web::test]
    async fn single_upload_parses_document_fields() {
        let mut media = MockMediaGateway::new();
        media
            .expect_upload()
            .withf(|_, files, options| {
                files.len() == 1
                    && options.kind == Some(DocumentType::Kyc)
                    && options.category.as_deref() == Some("aadhar")
                    && options.save_to_documents
            })
            .return_once(|_, _, _| Ok(vec![uploaded("front.png")]));
        let state = StateBuilder::authenticated_as(tenant_caller()).media(media).build();

        let response = call(
            state,
            multipart_post(
                "/api/v1/media/upload",
                &[
                    png("front.png", "file"),
                    Part::Text { name: "type", value: "kyc" },
                    Part::Text { name: "category", value: "aadhar" },
                    Part::Text { name: "save_to_documents", value: "true" },
                ],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["file_name"], json!("front.png"));
        assert_eq!(body["data"]["document"], json!(null));
    }

    #[actix_web::test]
    async fn unknown_document_type_is_rejected() {
        let state = StateBuilder::authenticated_as(tenant_caller()).build();

        let response = call(
            state,
            multipart_post(
                "/api/v1/media/upload",
                &[png("front.png", "file"), Part::Text { name: "type", value: "passport" }],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["details"]["fields"][0]["field"], json!("type"));
    }

    #[actix_web::test]
    async fn multiple_upload_reports_count() {
        let mut media = MockMediaGateway::new();
        media
            .expect_upload()
            .withf(|_, files, _| files.len() == 2)
            .return_once(|_, _, _| Ok(vec![uploaded("a.png"), uploaded("b.png")]));
        let state = StateBuilder::authenticated_as(tenant_caller()).media(media).build();

        let response = call(
            state,
            multipart_post(
                "/api/v1/media/upload-multiple",
                &[png("a.png", "files"), png("b.png", "files")],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["count"], json!(2));
    }

    #[actix_web::test]
    async fn multiple_upload_without_files_is_rejected() {
        let state = StateBuilder::authenticated_as(tenant_caller()).build();

        let response = call(
            state,
            multipart_post(
                "/api/v1/media/upload-multiple",
                &[Part::Text { name: "type", value: "kyc" }],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            json!("No files uploaded")
        );
    }

    #[actix_web::test]
    async fn delete_accepts_nested_public_ids() {
        let document_id = DocumentId::random();
        let mut media = MockMediaGateway::new();
        media
            .expect_delete()
            .withf(|_, public_id, with_document| {
                public_id == "rentfit/kyc/aadhar/front" && *with_document
            })
            .return_once(move |_, public_id, _| {
                Ok(MediaDeletion {
                    public_id: public_id.to_owned(),
                    document_id: Some(document_id),
                })
            });
        let state = StateBuilder::authenticated_as(tenant_caller()).media(media).build();

        let response = call(
            state,
            test::TestRequest::delete()
                .uri("/api/v1/media/rentfit/kyc/aadhar/front?delete_from_documents=true"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], json!("File and document deleted successfully"));
        assert_eq!(body["data"]["document_id"], json!(document_id.to_string()));
    }

    #[actix_web::test]
    async fn delete_without_flag_only_touches_the_store() {
        let mut media = MockMediaGateway::new();
        media
            .expect_delete()
            .withf(|_, _, with_document| !*with_document)
            .return_once(|_, public_id, _| {
                Ok(MediaDeletion {
                    public_id: public_id.to_owned(),
                    document_id: None,
                })
            });
        let state = StateBuilder::authenticated_as(tenant_caller()).media(media).build();

        let response =
            call(state, test::TestRequest::delete().uri("/api/v1/media/rentfit/users/x")).await;

        assert_eq!(
            json_body(response).await["message"],
            json!("File deleted successfully from Cloudinary")
        );
    }
}
