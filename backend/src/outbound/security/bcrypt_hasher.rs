//! bcrypt-backed `PasswordHasher`.
//!
//! bcrypt is deliberately slow, so both operations run on tokio's blocking
//! pool rather than on an async worker.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Hashes passwords with a fixed bcrypt work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Work factor used when none is configured.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hasher using `cost` rounds. Tests use the minimum of 4.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, PasswordHashError>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHashError::failed(format!("hashing task aborted: {err}")))?
        .map_err(|err| PasswordHashError::failed(err.to_string()))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let plain = Zeroizing::new(password.expose().to_owned());
        let cost = self.cost;
        let encoded = run_blocking(move || bcrypt::hash(plain.as_str(), cost)).await?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let plain = Zeroizing::new(password.expose().to_owned());
        let encoded = hash.as_str().to_owned();
        run_blocking(move || bcrypt::verify(plain.as_str(), &encoded)).await
    }
}
