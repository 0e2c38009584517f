//! In-process repositories used when no database is configured.
//!
//! Each store keeps its records in a `tokio::sync::RwLock<HashMap>`. Scoping
//! reuses the entity predicates (`is_participant`, `is_owned_by`) so the
//! visibility rules match the SQL `WHERE` clauses of the Diesel adapters.
//! Every read-modify-write happens inside one write-lock critical section,
//! which gives array appends and signing the same atomicity as a single
//! `UPDATE`.
//!
//! Data is lost on restart; these adapters back local development and the
//! integration suites.

mod agreements;
mod documents;
mod inspections;
mod notifications;
mod payments;
mod properties;
mod tickets;
mod users;

pub use agreements::MemoryAgreementRepository;
pub use documents::MemoryDocumentRepository;
pub use inspections::MemoryInspectionRepository;
pub use notifications::MemoryNotificationRepository;
pub use payments::MemoryPaymentRepository;
pub use properties::MemoryPropertyRepository;
pub use tickets::MemoryTicketRepository;
pub use users::MemoryUserRepository;

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

/// Sort newest first, breaking ties on the id so listings are stable.
fn newest_first<T, K: Ord>(records: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, K)) {
    records.sort_by_key(|record| Reverse(key(record)));
}
