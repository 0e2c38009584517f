//! Authentication primitives: credentials, password hashes, and the resolved
//! caller identity attached to every protected request.
//!
//! Inbound adapters parse raw strings through these constructors before any
//! port or service sees them, so services can rely on normalised emails and
//! non-empty passwords.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::error::Error;
use super::ids::UserId;
use super::user::{DisplayName, Email, Role, User, UserValidationError};

/// Minimum accepted length for a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validation failures for credential payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email failed validation.
    #[error(transparent)]
    Email(#[from] UserValidationError),
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password shorter than [`MIN_PASSWORD_LEN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// Opaque one-way password hash. Its contents never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string for persistence and verification.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Plaintext password held in a buffer that is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept any non-empty password (used for login and current-password checks).
    pub fn existing(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Accept a new password satisfying the length policy.
    pub fn new_secret(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext for handing to a hasher.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Validated local login credentials.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::existing(password)?,
        })
    }

    /// Normalised email used for the lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated local registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: DisplayName,
    pub email: Email,
    pub password: Password,
    pub roles: BTreeSet<Role>,
}

/// Identity asserted by an external provider after token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub subject_id: String,
    pub email: Email,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Caller resolved from a bearer token and re-read from the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    pub user_id: UserId,
    pub email: Email,
    pub roles: BTreeSet<Role>,
}

impl AuthenticatedCaller {
    /// Whether the caller holds at least one of `required`.
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        required.iter().any(|role| self.roles.contains(role))
    }

    /// Fail with `Forbidden` unless the caller holds one of `required`.
    pub fn require_any_role(&self, required: &[Role]) -> Result<(), Error> {
        if self.has_any_role(required) {
            Ok(())
        } else {
            Err(Error::forbidden("Insufficient permissions"))
        }
    }
}

impl From<&User> for AuthenticatedCaller {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Signed bearer token handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded token string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Result of a successful sign-in or registration.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthSession {
    pub user: User,
    pub token: AccessToken,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::Email(UserValidationError::EmptyEmail))]
    #[case("ada", "pw", CredentialsValidationError::Email(UserValidationError::InvalidEmail))]
    #[case("ada@example.com", "", CredentialsValidationError::EmptyPassword)]
    fn login_credentials_reject_invalid_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("invalid");
        assert_eq!(err, expected);
    }

    #[test]
    fn login_password_keeps_whitespace() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", " pw ").expect("valid");
        assert_eq!(creds.password().expose(), " pw ");
    }

    #[rstest]
    #[case("12345", false)]
    #[case("123456", true)]
    fn new_passwords_respect_minimum_length(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(Password::new_secret(raw).is_ok(), accepted);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let password = Password::existing("hunter22").expect("non-empty");
        let hash = PasswordHash::new("$2b$10$abc");
        assert!(!format!("{password:?}").contains("hunter22"));
        assert!(!format!("{hash:?}").contains("abc"));
    }

    #[test]
    fn caller_role_intersection() {
        let caller = AuthenticatedCaller {
            user_id: UserId::random(),
            email: Email::new("ada@example.com").expect("valid"),
            roles: BTreeSet::from([Role::Tenant]),
        };
        assert!(caller.has_any_role(&[Role::Landlord, Role::Tenant]));
        assert!(!caller.has_any_role(&[Role::Landlord]));
        assert!(!caller.has_any_role(&[]));
        assert!(caller.require_any_role(&[Role::Tenant]).is_ok());
        let denied = caller
            .require_any_role(&[Role::Landlord])
            .expect_err("landlord only");
        assert_eq!(denied.code(), crate::domain::ErrorCode::Forbidden);
    }
}
