//! Wire shapes for Google's JWKS document and Firebase ID-token claims.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct JwksDto {
    #[serde(default)]
    pub(super) keys: Vec<JwkDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JwkDto {
    pub(super) kid: String,
    #[serde(default)]
    pub(super) kty: String,
    pub(super) n: String,
    pub(super) e: String,
}

/// Claims of a Firebase ID token after signature, audience and issuer checks.
#[derive(Debug, Deserialize)]
pub(super) struct FirebaseClaimsDto {
    pub(super) sub: String,
    pub(super) email: Option<String>,
    pub(super) name: Option<String>,
    pub(super) picture: Option<String>,
}
