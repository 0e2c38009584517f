//! Account domain service: registration, sign-in, token resolution and
//! self-service profile changes.
//!
//! Authentication failures use deliberately generic messages so that a
//! caller cannot tell an unknown email from a wrong password.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    Accounts, IdentityVerificationError, IdentityVerifier, PasswordChange, PasswordHasher,
    TokenError, TokenService, UserRepository,
};
use crate::domain::repository_errors::{map_hash_error, map_user_error};
use crate::domain::{
    AuthSession, AuthenticatedCaller, Error, FederatedIdentity, LoginCredentials, ProfileUpdate,
    Registration, User,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const FEDERATED_ONLY: &str = "Please sign in with your identity provider";

/// Account service implementing the [`Accounts`] driving port.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    verifier: Arc<dyn IdentityVerifier>,
    clock: Arc<dyn Clock>,
}

impl<U> AccountService<U> {
    /// Wire the account service to its store, hasher, token issuer and identity verifier.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        verifier: Arc<dyn IdentityVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            verifier,
            clock,
        }
    }
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("Token expired"),
        TokenError::Invalid { .. } => Error::unauthorized("Invalid token"),
        TokenError::Signing { message } => {
            Error::internal(format!("token signing failed: {message}"))
        }
    }
}

fn map_verifier_error(error: IdentityVerificationError) -> Error {
    match error {
        IdentityVerificationError::Rejected { message } => {
            warn!(reason = %message, "federated identity token rejected");
            Error::unauthorized("Invalid identity token")
        }
        IdentityVerificationError::Upstream { message } => {
            Error::upstream(format!("identity provider unavailable: {message}"))
        }
        IdentityVerificationError::Unconfigured => {
            Error::service_unavailable("Federated sign-in is not configured")
        }
    }
}

/// Fold provider-asserted details into an existing account. Returns whether
/// anything changed.
fn link_identity(user: &mut User, identity: &FederatedIdentity) -> bool {
    let mut changed = false;
    if user.federated_id.is_none() {
        user.federated_id = Some(identity.subject_id.clone());
        changed = true;
    }
    if user.image.is_none() && identity.picture.is_some() {
        user.image.clone_from(&identity.picture);
        changed = true;
    }
    match provider_name(identity) {
        Some(name) if name != user.name => {
            user.name = name;
            changed = true;
        }
        _ => {}
    }
    changed
}

fn provider_name(identity: &FederatedIdentity) -> Option<String> {
    identity
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    fn session(&self, user: User) -> Result<AuthSession, Error> {
        let token = self.tokens.issue(&user).map_err(map_token_error)?;
        Ok(AuthSession { user, token })
    }

    async fn load(&self, caller: &AuthenticatedCaller) -> Result<User, Error> {
        self.users
            .find_by_id(&caller.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[async_trait]
impl<U> Accounts for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let existing = self
            .users
            .find_by_email(&registration.email)
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::conflict("User with this email already exists"));
        }

        let hash = self
            .hasher
            .hash(&registration.password)
            .await
            .map_err(map_hash_error)?;
        let user = User::local(
            registration.name,
            registration.email,
            hash,
            registration.roles,
            self.clock.utc(),
        );
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "registered local account");
        self.session(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        let Some(hash) = user.password_hash.as_ref() else {
            return Err(Error::unauthorized(FEDERATED_ONLY));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.session(user)
    }

    async fn federated_sign_in(&self, id_token: &str) -> Result<AuthSession, Error> {
        let identity = self
            .verifier
            .verify(id_token)
            .await
            .map_err(map_verifier_error)?;
        let now = self.clock.utc();

        let existing = self
            .users
            .find_by_email(&identity.email)
            .await
            .map_err(map_user_error)?;
        let user = match existing {
            Some(mut user) => {
                if link_identity(&mut user, &identity) {
                    user.updated_at = now;
                    self.users.update(&user).await.map_err(map_user_error)?;
                }
                user
            }
            None => {
                let name = provider_name(&identity)
                    .unwrap_or_else(|| identity.email.local_part().to_owned());
                let user = User::federated(
                    name,
                    identity.email.clone(),
                    identity.subject_id.clone(),
                    identity.picture.clone(),
                    now,
                );
                self.users.insert(&user).await.map_err(map_user_error)?;
                info!(user_id = %user.id, "created account from federated sign-in");
                user
            }
        };
        self.session(user)
    }

    async fn authenticate(&self, bearer: &str) -> Result<AuthenticatedCaller, Error> {
        let user_id = self.tokens.verify(bearer).map_err(map_token_error)?;
        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("User not found"))?;
        Ok(AuthenticatedCaller::from(&user))
    }

    async fn current_user(&self, caller: &AuthenticatedCaller) -> Result<User, Error> {
        self.load(caller).await
    }

    async fn update_profile(
        &self,
        caller: &AuthenticatedCaller,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = self.load(caller).await?;
        update.apply_to(&mut user, self.clock.utc());
        self.users.update(&user).await.map_err(map_user_error)?;
        Ok(user)
    }

    async fn change_password(
        &self,
        caller: &AuthenticatedCaller,
        change: PasswordChange,
    ) -> Result<(), Error> {
        let mut user = self.load(caller).await?;
        let Some(current_hash) = user.password_hash.as_ref() else {
            return Err(Error::invalid_request(
                "This account has no password; sign in with your identity provider",
            ));
        };
        let matches = self
            .hasher
            .verify(&change.current, current_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::invalid_request("Current password is incorrect"));
        }
        let replacement = self
            .hasher
            .hash(&change.replacement)
            .await
            .map_err(map_hash_error)?;
        user.password_hash = Some(replacement);
        user.updated_at = self.clock.utc();
        self.users.update(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "password changed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
