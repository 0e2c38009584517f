//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, tokens, identity and media) are
//! implemented by outbound adapters. Driving ports (one per resource) are
//! implemented by the domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod agreement_repository;
mod document_repository;
mod identity_verifier;
mod inspection_repository;
mod media_store;
mod notification_repository;
mod password_hasher;
mod payment_repository;
mod property_repository;
mod ticket_repository;
mod token_service;
mod user_repository;

mod accounts;
mod agreements;
mod inspections;
mod media_gateway;
mod notifications;
mod payments;
mod properties;
mod tickets;

#[cfg(test)]
pub use agreement_repository::MockAgreementRepository;
pub use agreement_repository::{AgreementPersistenceError, AgreementRepository, SignatureRecord};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use document_repository::{DocumentPersistenceError, DocumentRepository};
#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
pub use identity_verifier::{IdentityVerificationError, IdentityVerifier};
#[cfg(test)]
pub use inspection_repository::MockInspectionRepository;
pub use inspection_repository::{InspectionPersistenceError, InspectionRepository};
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{PaymentPersistenceError, PaymentRepository};
#[cfg(test)]
pub use property_repository::MockPropertyRepository;
pub use property_repository::{PropertyPersistenceError, PropertyRepository};
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketPersistenceError, TicketRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::{Accounts, PasswordChange};
#[cfg(test)]
pub use agreements::MockAgreements;
pub use agreements::Agreements;
#[cfg(test)]
pub use inspections::MockInspections;
pub use inspections::{Inspections, PhotoUpload};
#[cfg(test)]
pub use media_gateway::MockMediaGateway;
pub use media_gateway::MediaGateway;
#[cfg(test)]
pub use notifications::MockNotifications;
pub use notifications::Notifications;
#[cfg(test)]
pub use payments::MockPayments;
pub use payments::Payments;
#[cfg(test)]
pub use properties::MockProperties;
pub use properties::Properties;
#[cfg(test)]
pub use tickets::MockTickets;
pub use tickets::Tickets;
