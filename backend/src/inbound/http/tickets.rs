//! Support ticket handlers: raising issues, threading replies and moving
//! tickets through their lifecycle.

use actix_web::{HttpResponse, get, post, put, web};
use serde_json::json;

use super::ApiResult;
use super::auth::Caller;
use super::envelope;
use super::state::HttpState;
use super::validation::{FieldName, parse_id};
use crate::domain::{NewMessage, TicketDraft, TicketFilter, TicketId, TicketStatusChange};

const ID: FieldName = FieldName::new("id");

#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = TicketDraft,
    responses(
        (status = 201, description = "Ticket raised"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<TicketDraft>,
) -> ApiResult<HttpResponse> {
    let ticket = state.tickets.create(&caller, payload.into_inner()).await?;
    Ok(envelope::created(json!({ "ticket": ticket }), "Ticket created successfully"))
}

/// Tickets the caller raised, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    params(TicketFilter),
    responses(
        (status = 200, description = "Tickets"),
        (status = 400, description = "Invalid filter", body = super::ErrorEnvelope)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("/tickets")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    caller: Caller,
    filter: web::Query<TicketFilter>,
) -> ApiResult<HttpResponse> {
    let tickets = state.tickets.list(&caller, filter.into_inner()).await?;
    Ok(envelope::ok(json!({ "tickets": tickets })))
}

#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket"),
        (status = 404, description = "Not found", body = super::ErrorEnvelope)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: TicketId = parse_id(&path, ID)?;
    let ticket = state.tickets.get(&caller, id).await?;
    Ok(envelope::ok(json!({ "ticket": ticket })))
}

/// Append a message to the thread.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/messages",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = NewMessage,
    responses(
        (status = 200, description = "Ticket with the new message"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 404, description = "Not found", body = super::ErrorEnvelope)
    ),
    tags = ["tickets"],
    operation_id = "addTicketMessage"
)]
#[post("/tickets/{id}/messages")]
pub async fn add_ticket_message(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<NewMessage>,
) -> ApiResult<HttpResponse> {
    let id: TicketId = parse_id(&path, ID)?;
    let ticket = state
        .tickets
        .add_message(&caller, id, payload.into_inner())
        .await?;
    Ok(envelope::ok(json!({ "ticket": ticket })))
}

#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}/status",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = TicketStatusChange,
    responses(
        (status = 200, description = "Updated ticket"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 404, description = "Not found", body = super::ErrorEnvelope)
    ),
    tags = ["tickets"],
    operation_id = "updateTicketStatus"
)]
#[put("/tickets/{id}/status")]
pub async fn update_ticket_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<TicketStatusChange>,
) -> ApiResult<HttpResponse> {
    let id: TicketId = parse_id(&path, ID)?;
    let ticket = state
        .tickets
        .update_status(&caller, id, payload.into_inner())
        .await?;
    Ok(envelope::ok(json!({ "ticket": ticket })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    use super::*;
    use crate::domain::TicketStatus;
    use crate::domain::ports::MockTickets;
    use crate::inbound::http::error::json_error_handler;
    use crate::inbound::http::test_utils::{StateBuilder, bearer, json_body, tenant_caller};

    async fn call(
        state: web::Data<HttpState>,
        request: test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(state)
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .service(
                    web::scope("/api/v1")
                        .service(add_ticket_message)
                        .service(update_ticket_status),
                ),
        )
        .await;
        test::call_service(&app, request.insert_header(bearer()).to_request()).await
    }

    #[actix_web::test]
    async fn status_change_reaches_the_service() {
        let mut tickets = MockTickets::new();
        tickets
            .expect_update_status()
            .withf(|_, _, change| {
                change.status == TicketStatus::Resolved
                    && change.resolution_notes.as_deref() == Some("Plumber fixed the tap")
            })
            .return_once(|_, _, _| Err(crate::domain::Error::not_found("Ticket not found")));
        let state = StateBuilder::authenticated_as(tenant_caller())
            .tickets(tickets)
            .build();

        let response = call(
            state,
            test::TestRequest::put()
                .uri(&format!("/api/v1/tickets/{}/status", TicketId::random()))
                .set_json(json!({ "status": "resolved", "resolution_notes": "Plumber fixed the tap" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn messages_reject_unknown_fields() {
        let state = StateBuilder::authenticated_as(tenant_caller()).build();

        let response = call(
            state,
            test::TestRequest::post()
                .uri(&format!("/api/v1/tickets/{}/messages", TicketId::random()))
                .set_json(json!({ "content": "Any update?", "sender_id": "someone" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], json!("invalid_request"));
    }
}
