//! Mapping from driven-port failures to domain errors.
//!
//! Connection loss surfaces as `service_unavailable` so clients may retry;
//! query failures are internal and get redacted at the HTTP edge.

use super::Error;
use super::ports::{
    AgreementPersistenceError, DocumentPersistenceError, InspectionPersistenceError,
    MediaStoreError, NotificationPersistenceError, PasswordHashError, PaymentPersistenceError,
    PropertyPersistenceError, TicketPersistenceError, UserPersistenceError,
};

macro_rules! map_persistence_error {
    ($fn_name:ident, $error:ident, $label:literal) => {
        pub(crate) fn $fn_name(error: $error) -> Error {
            match error {
                $error::Connection { message } => {
                    Error::service_unavailable(format!(concat!($label, " repository unavailable: {}"), message))
                }
                $error::Query { message } => {
                    Error::internal(format!(concat!($label, " repository error: {}"), message))
                }
            }
        }
    };
}

map_persistence_error!(map_property_error, PropertyPersistenceError, "property");
map_persistence_error!(map_agreement_error, AgreementPersistenceError, "agreement");
map_persistence_error!(map_payment_error, PaymentPersistenceError, "payment");
map_persistence_error!(map_inspection_error, InspectionPersistenceError, "inspection");
map_persistence_error!(map_ticket_error, TicketPersistenceError, "ticket");
map_persistence_error!(map_notification_error, NotificationPersistenceError, "notification");
map_persistence_error!(map_document_error, DocumentPersistenceError, "document");

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { .. } => {
            Error::conflict("User with this email already exists")
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_media_error(error: MediaStoreError) -> Error {
    match error {
        MediaStoreError::Upstream { message } => {
            Error::upstream(format!("media store request failed: {message}"))
        }
        MediaStoreError::Unconfigured => {
            Error::service_unavailable("Media storage is not configured")
        }
    }
}
