//! Driving port for sign-up, sign-in and profile management.
//!
//! Inbound adapters call this port to authenticate callers and manage the
//! caller's own account without touching hashing, tokens or storage.

use async_trait::async_trait;

use crate::domain::{
    AuthSession, AuthenticatedCaller, Error, LoginCredentials, Password, ProfileUpdate,
    Registration, User,
};

/// Current and replacement passwords for a change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current: Password,
    pub replacement: Password,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Create a local account and sign it in.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Check local credentials and issue a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    /// Exchange a provider identity token, creating or linking the account.
    async fn federated_sign_in(&self, id_token: &str) -> Result<AuthSession, Error>;

    /// Resolve a bearer token to the stored caller.
    async fn authenticate(&self, bearer: &str) -> Result<AuthenticatedCaller, Error>;

    /// The caller's stored record.
    async fn current_user(&self, caller: &AuthenticatedCaller) -> Result<User, Error>;

    async fn update_profile(
        &self,
        caller: &AuthenticatedCaller,
        update: ProfileUpdate,
    ) -> Result<User, Error>;

    async fn change_password(
        &self,
        caller: &AuthenticatedCaller,
        change: PasswordChange,
    ) -> Result<(), Error>;
}
