//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler, the entity schemas they return
//! and the bearer-token security scheme. The document is served by Swagger
//! UI in debug builds and printed by `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Agreement, Document, DocumentSummary, Error, ErrorCode, Inspection, InspectionPhoto,
    MediaDeletion, Notification, Payment, Property, Ticket, UploadedFile, User,
};
use crate::inbound::http::ErrorEnvelope;
use crate::inbound::http::health::HealthBody;

/// Name of the bearer security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerAuth";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Session token returned by /api/v1/auth/register, /login or /federated.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "RentFit backend API",
        description = "Property rental management: listings, agreements, payments, inspections, support tickets and media."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::federated,
        crate::inbound::http::accounts::me,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::change_password,
        crate::inbound::http::properties::create_property,
        crate::inbound::http::properties::list_properties,
        crate::inbound::http::properties::get_property,
        crate::inbound::http::properties::update_property,
        crate::inbound::http::properties::delete_property,
        crate::inbound::http::properties::add_property_media,
        crate::inbound::http::agreements::create_agreement,
        crate::inbound::http::agreements::list_agreements,
        crate::inbound::http::agreements::get_agreement,
        crate::inbound::http::agreements::update_agreement,
        crate::inbound::http::agreements::sign_agreement,
        crate::inbound::http::payments::create_payment,
        crate::inbound::http::payments::list_payments,
        crate::inbound::http::payments::get_payment,
        crate::inbound::http::payments::update_payment_status,
        crate::inbound::http::inspections::create_inspection,
        crate::inbound::http::inspections::list_inspections,
        crate::inbound::http::inspections::get_inspection,
        crate::inbound::http::inspections::add_inspection_photo,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_all_notifications_read,
        crate::inbound::http::notifications::mark_notification_read,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::add_ticket_message,
        crate::inbound::http::tickets::update_ticket_status,
        crate::inbound::http::media::upload_file,
        crate::inbound::http::media::upload_files,
        crate::inbound::http::media::delete_file,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        ErrorEnvelope,
        HealthBody,
        User,
        Property,
        Agreement,
        Payment,
        Inspection,
        InspectionPhoto,
        Ticket,
        Notification,
        Document,
        DocumentSummary,
        UploadedFile,
        MediaDeletion,
    )),
    tags(
        (name = "auth", description = "Registration, sign-in and profile"),
        (name = "properties", description = "Landlord listings"),
        (name = "agreements", description = "Rental agreements and signatures"),
        (name = "payments", description = "Rent, deposit and fee payments"),
        (name = "inspections", description = "Move-in, move-out and periodic inspections"),
        (name = "notifications", description = "In-app notifications"),
        (name = "tickets", description = "Support tickets"),
        (name = "media", description = "File uploads to the media store"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
