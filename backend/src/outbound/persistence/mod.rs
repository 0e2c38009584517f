//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements one domain port on top of a shared
//! [`DbPool`] (`diesel-async` over `bb8`). Row structs and the table schema
//! stay private to this module; adapters translate rows into domain
//! entities and map Diesel failures onto the port's error type.
//!
//! Ownership and participant checks are expressed as `WHERE` clauses, so a
//! record the caller may not see behaves exactly like a missing one.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselPropertyRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/rentfit")).await?;
//! let properties = DieselPropertyRepository::new(pool);
//! ```

mod diesel_agreement_repository;
mod diesel_basic_error_mapping;
mod diesel_document_repository;
mod diesel_inspection_repository;
mod diesel_notification_repository;
mod diesel_payment_repository;
mod diesel_property_repository;
mod diesel_ticket_repository;
mod diesel_user_repository;
mod json_serializers;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_agreement_repository::DieselAgreementRepository;
pub use diesel_document_repository::DieselDocumentRepository;
pub use diesel_inspection_repository::DieselInspectionRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_property_repository::DieselPropertyRepository;
pub use diesel_ticket_repository::DieselTicketRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
