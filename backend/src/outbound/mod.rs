//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories used when no database is configured
//! - **security**: bcrypt password hashing and HS256 session tokens
//! - **identity**: Firebase ID-token verification
//! - **media**: Cloudinary object storage
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub(crate) mod http_errors;
pub mod identity;
pub mod media;
pub mod memory;
pub mod persistence;
pub mod security;
