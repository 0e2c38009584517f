//! Port for issuing and checking bearer tokens.

use crate::domain::{AccessToken, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token services.
    pub enum TokenError {
        /// Signature, format or claims were rejected.
        Invalid { message: String } => "invalid token: {message}",
        /// The token is past its expiry.
        Expired => "token expired",
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Token signing is cheap and synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `user` carrying its id, email and roles.
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError>;

    /// Check signature and expiry and return the subject.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
