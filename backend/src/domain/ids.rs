//! Strongly typed record identifiers.
//!
//! Every stored record is keyed by a UUID v4. Wrapping each in its own type
//! stops a payment id from being passed where an agreement id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidIdError {
    kind: &'static str,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its textual form.
            pub fn new(value: impl AsRef<str>) -> Result<Self, InvalidIdError> {
                Uuid::parse_str(value.as_ref().trim())
                    .map(Self)
                    .map_err(|_| InvalidIdError { kind: $kind })
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_id!(
    /// Identifier of a user account.
    UserId,
    "user id"
);
define_id!(
    /// Identifier of a property listing.
    PropertyId,
    "property id"
);
define_id!(
    /// Identifier of a rental agreement.
    AgreementId,
    "agreement id"
);
define_id!(
    /// Identifier of a payment obligation.
    PaymentId,
    "payment id"
);
define_id!(
    /// Identifier of an inspection record.
    InspectionId,
    "inspection id"
);
define_id!(
    /// Identifier of a support ticket.
    TicketId,
    "ticket id"
);
define_id!(
    /// Identifier of a notification.
    NotificationId,
    "notification id"
);
define_id!(
    /// Identifier of a stored document's metadata record.
    DocumentId,
    "document id"
);
