//! Firebase ID-token verification against Google's published signing keys.
//!
//! Tokens are RS256 JWTs. The signing keys rotate, so the JWKS document is
//! cached for the `max-age` Google advertises and refetched once when a
//! token names a key the cache does not hold.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::{Client, header};
use tokio::sync::RwLock;
use tracing::debug;

use super::dto::{FirebaseClaimsDto, JwksDto};
use crate::domain::ports::{IdentityVerificationError, IdentityVerifier};
use crate::domain::{Email, FederatedIdentity};
use crate::outbound::http_errors::{status_message, transport_message};

/// Google's JWKS endpoint for Firebase Auth signing keys.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);

#[derive(Default)]
struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    expires_at: Option<Instant>,
}

impl KeyCache {
    fn fresh_key(&self, kid: &str) -> Option<DecodingKey> {
        let fresh = self.expires_at.is_some_and(|at| Instant::now() < at);
        if fresh {
            self.keys.get(kid).cloned()
        } else {
            None
        }
    }
}

/// Verifies Firebase ID tokens minted for one project.
pub struct FirebaseIdentityVerifier {
    client: Client,
    jwks_url: String,
    project_id: String,
    issuer: String,
    keys: RwLock<KeyCache>,
}

impl FirebaseIdentityVerifier {
    /// Build a verifier for `project_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(project_id: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let project_id = project_id.into();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            jwks_url: FIREBASE_JWKS_URL.to_owned(),
            issuer: format!("{ISSUER_PREFIX}{project_id}"),
            project_id,
            keys: RwLock::new(KeyCache::default()),
        })
    }

    /// Fetch signing keys from `url` instead of Google's endpoint.
    #[must_use]
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityVerificationError> {
        if let Some(key) = self.keys.read().await.fresh_key(kid) {
            return Ok(key);
        }

        let refreshed = self.fetch_keys().await?;
        let mut cache = self.keys.write().await;
        *cache = refreshed;
        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| IdentityVerificationError::rejected(format!("unknown signing key {kid}")))
    }

    async fn fetch_keys(&self) -> Result<KeyCache, IdentityVerificationError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| IdentityVerificationError::upstream(transport_message(&err)))?;

        let status = response.status();
        let ttl = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEY_TTL);
        let body = response
            .bytes()
            .await
            .map_err(|err| IdentityVerificationError::upstream(transport_message(&err)))?;
        if !status.is_success() {
            return Err(IdentityVerificationError::upstream(status_message(
                status,
                body.as_ref(),
            )));
        }

        let keys = parse_jwks(body.as_ref())?;
        debug!(keys = keys.len(), ttl_secs = ttl.as_secs(), "refreshed identity signing keys");
        Ok(KeyCache {
            keys,
            expires_at: Some(Instant::now() + ttl),
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, IdentityVerificationError> {
        let header = jsonwebtoken::decode_header(id_token)
            .map_err(|err| IdentityVerificationError::rejected(err.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityVerificationError::rejected(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityVerificationError::rejected("token names no signing key"))?;

        let key = self.decoding_key(&kid).await?;
        let claims = jsonwebtoken::decode::<FirebaseClaimsDto>(id_token, &key, &self.validation())
            .map_err(|err| IdentityVerificationError::rejected(err.to_string()))?
            .claims;
        into_identity(claims)
    }
}

fn parse_jwks(body: &[u8]) -> Result<HashMap<String, DecodingKey>, IdentityVerificationError> {
    let jwks: JwksDto = serde_json::from_slice(body).map_err(|err| {
        IdentityVerificationError::upstream(format!("invalid JWKS payload: {err}"))
    })?;
    jwks.keys
        .into_iter()
        .filter(|jwk| jwk.kty.is_empty() || jwk.kty == "RSA")
        .map(|jwk| {
            DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
                .map(|key| (jwk.kid, key))
                .map_err(|err| {
                    IdentityVerificationError::upstream(format!("invalid JWKS key: {err}"))
                })
        })
        .collect()
}

fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|seconds| seconds.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn into_identity(claims: FirebaseClaimsDto) -> Result<FederatedIdentity, IdentityVerificationError> {
    if claims.sub.trim().is_empty() {
        return Err(IdentityVerificationError::rejected("token has an empty subject"));
    }
    let email = claims
        .email
        .ok_or_else(|| IdentityVerificationError::rejected("token carries no email"))?;
    let email =
        Email::new(&email).map_err(|err| IdentityVerificationError::rejected(err.to_string()))?;
    Ok(FederatedIdentity {
        subject_id: claims.sub,
        email,
        name: claims.name.filter(|name| !name.trim().is_empty()),
        picture: claims.picture,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    const TEST_KEY_PEM: &[u8] = include_bytes!("fixtures/test_signing_key.pem");
    const TEST_KEY_MODULUS: &str = "ll84jl-nkocoIEgU0PiZuAfXp-RFE_XamSgdUyhlYkujUMOjsrewC8YpmLmgiagl88i-prKp8PhpfJUIanr6xV1wNMNxEG6685cm6UIpRUfShqHqY1mnXBidnrKT7Hy_EF6OOWuCz3d3eDs_fwoTJaoWp0IHnv4tTzczhLZRTJulSJOSMTA7t2QgVbm8xGU57Lepz41Z1z0E1AegxtXg1aejFxPIUpmp0r1M1UkPjmPWkOjTuIvWkPM08oxrK5yYYJLU9_f6sK6P9plxayB9pKpmWIyAFxQZrj2Z0Y_al52GLfPFPi6bAYZZkYkcu4LwH6HCSPXkVUIiT3ZVIanLaQ";
    const TEST_KID: &str = "test-key";
    const PROJECT: &str = "rentfit-test";

    fn jwks() -> Value {
        json!({ "keys": [{ "kid": TEST_KID, "kty": "RSA", "alg": "RS256", "n": TEST_KEY_MODULUS, "e": "AQAB" }] })
    }

    fn preloaded_verifier() -> FirebaseIdentityVerifier {
        let verifier = FirebaseIdentityVerifier::new(PROJECT, Duration::from_secs(1))
            .expect("client builds");
        let keys = parse_jwks(jwks().to_string().as_bytes()).expect("jwks parses");
        {
            let mut cache = verifier.keys.try_write().expect("uncontended");
            *cache = KeyCache {
                keys,
                expires_at: Some(Instant::now() + Duration::from_secs(600)),
            };
        }
        verifier
    }

    fn sign(claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(TEST_KID.to_owned());
        let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM).expect("test key parses");
        jsonwebtoken::encode(&header, claims, &key).expect("token signs")
    }

    fn claims(audience: &str) -> Value {
        let now = Utc::now().timestamp();
        json!({
            "sub": "firebase-uid-1",
            "aud": audience,
            "iss": format!("{ISSUER_PREFIX}{audience}"),
            "iat": now,
            "exp": now + 3600,
            "email": "meera@example.com",
            "name": "Meera",
            "picture": "https://cdn.example/meera.png"
        })
    }

    #[tokio::test]
    async fn accepts_token_for_the_project() {
        let verifier = preloaded_verifier();

        let identity = verifier.verify(&sign(&claims(PROJECT))).await.expect("valid token");

        assert_eq!(identity.subject_id, "firebase-uid-1");
        assert_eq!(identity.email.as_ref(), "meera@example.com");
        assert_eq!(identity.name.as_deref(), Some("Meera"));
    }

    #[tokio::test]
    async fn rejects_token_for_another_project() {
        let verifier = preloaded_verifier();

        let error = verifier
            .verify(&sign(&claims("someone-else")))
            .await
            .expect_err("foreign audience");

        assert!(matches!(error, IdentityVerificationError::Rejected { .. }));
    }

    #[tokio::test]
    async fn rejects_token_without_email() {
        let verifier = preloaded_verifier();
        let mut claims = claims(PROJECT);
        claims.as_object_mut().expect("object").remove("email");

        let error = verifier.verify(&sign(&claims)).await.expect_err("no email");

        assert_eq!(error, IdentityVerificationError::rejected("token carries no email"));
    }

    #[tokio::test]
    async fn rejects_unsigned_garbage() {
        let verifier = preloaded_verifier();

        let error = verifier.verify("garbage").await.expect_err("not a jwt");

        assert!(matches!(error, IdentityVerificationError::Rejected { .. }));
    }

    #[rstest]
    #[case("public, max-age=19800, must-revalidate", Some(19_800))]
    #[case("no-cache", None)]
    #[case("max-age=abc", None)]
    fn reads_max_age(#[case] header: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_max_age(header), expected.map(Duration::from_secs));
    }
}
