//! Success envelope shared by every JSON endpoint.
//!
//! ```text
//! {"success": true, "data": {...}, "message": "Property created successfully"}
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Body of every successful response.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn respond<T: Serialize>(status: StatusCode, data: Option<T>, message: Option<&str>) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        success: true,
        data,
        message: message.map(str::to_owned),
    })
}

/// `200` with `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::OK, Some(data), None)
}

/// `200` with `data` and a message.
pub fn ok_with_message<T: Serialize>(data: T, message: &str) -> HttpResponse {
    respond(StatusCode::OK, Some(data), Some(message))
}

/// `201` with `data` and a message.
pub fn created<T: Serialize>(data: T, message: &str) -> HttpResponse {
    respond(StatusCode::CREATED, Some(data), Some(message))
}

/// `200` carrying only a message.
pub fn message(message: &str) -> HttpResponse {
    respond::<()>(StatusCode::OK, None, Some(message))
}
