//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate requests into driving-port calls on [`state::HttpState`]
//! and wrap results in the `{success, data, message}` envelope. Failures are
//! rendered by [`error`].

pub mod accounts;
pub mod agreements;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod health;
pub mod inspections;
pub mod media;
mod multipart;
pub mod notifications;
pub mod payments;
pub mod properties;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod validation;

use actix_web::web;

pub use error::{ApiResult, ErrorEnvelope};

/// Mount every `/api/v1` route plus the extractor error handlers.
///
/// The caller supplies [`state::HttpState`] as app data.
///
/// ```ignore
/// App::new().app_data(http_state).configure(backend::inbound::http::configure)
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(
            web::scope("/api/v1")
                .service(accounts::register)
                .service(accounts::login)
                .service(accounts::federated)
                .service(accounts::me)
                .service(accounts::update_profile)
                .service(accounts::change_password)
                .service(properties::create_property)
                .service(properties::list_properties)
                .service(properties::get_property)
                .service(properties::update_property)
                .service(properties::delete_property)
                .service(properties::add_property_media)
                .service(agreements::create_agreement)
                .service(agreements::list_agreements)
                .service(agreements::get_agreement)
                .service(agreements::update_agreement)
                .service(agreements::sign_agreement)
                .service(payments::create_payment)
                .service(payments::list_payments)
                .service(payments::get_payment)
                .service(payments::update_payment_status)
                .service(inspections::create_inspection)
                .service(inspections::list_inspections)
                .service(inspections::get_inspection)
                .service(inspections::add_inspection_photo)
                .service(notifications::list_notifications)
                .service(notifications::mark_all_notifications_read)
                .service(notifications::mark_notification_read)
                .service(tickets::create_ticket)
                .service(tickets::list_tickets)
                .service(tickets::get_ticket)
                .service(tickets::add_ticket_message)
                .service(tickets::update_ticket_status)
                .service(media::upload_file)
                .service(media::upload_files)
                .service(media::delete_file),
        )
        .service(health::health)
        .service(health::ready)
        .service(health::live);
}
