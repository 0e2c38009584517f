//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHashError {
        /// Hashing or verification could not complete.
        Failed { message: String } => "password hashing failed: {message}",
    }
}

/// Hashing is CPU bound; adapters run it off the async executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Whether `password` matches `hash`. A malformed hash is an error, a
    /// mismatch is `Ok(false)`.
    async fn verify(&self, password: &Password, hash: &PasswordHash)
    -> Result<bool, PasswordHashError>;
}
