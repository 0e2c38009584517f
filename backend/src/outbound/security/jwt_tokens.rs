//! HS256 session tokens via `jsonwebtoken`.
//!
//! Expiry is checked against the injected clock instead of the system time
//! so tokens behave consistently under a fixed test clock.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AccessToken, User, UserId};

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    email: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens signed with a shared secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(secret: &Zeroizing<String>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError> {
        let now = self.clock.utc();
        let claims = SessionClaims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            roles: user.roles.iter().map(|role| role.as_str().to_owned()).collect(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            })?;

        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        UserId::new(&claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }
}
