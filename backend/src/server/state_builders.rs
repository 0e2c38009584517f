//! Builders for the HTTP state: storage selection plus the credential,
//! identity and media collaborators.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use backend::domain::ports::{IdentityVerifier, MediaStore};
use backend::inbound::http::state::HttpState;
use backend::outbound::identity::{FirebaseIdentityVerifier, UnconfiguredIdentityVerifier};
use backend::outbound::media::{CloudinaryMediaStore, UnconfiguredMediaStore};
use backend::outbound::security::{BcryptPasswordHasher, JwtTokenService};
use backend::wiring::{Collaborators, DieselStores, MemoryStores, http_state};

use super::ServerConfig;

fn client_error(what: &str, err: &reqwest::Error) -> std::io::Error {
    std::io::Error::other(format!("{what} client could not be built: {err}"))
}

/// Firebase verification when a project is configured, otherwise a
/// verifier that reports federated sign-in as unavailable.
fn build_identity_verifier(config: &ServerConfig) -> std::io::Result<Arc<dyn IdentityVerifier>> {
    match &config.firebase_project {
        Some(project) => {
            let verifier = FirebaseIdentityVerifier::new(project.as_str(), config.outbound_timeout)
                .map_err(|err| client_error("identity", &err))?;
            info!(project = %project, "federated sign-in enabled");
            Ok(Arc::new(verifier))
        }
        None => {
            warn!("no Firebase project configured; federated sign-in disabled");
            Ok(Arc::new(UnconfiguredIdentityVerifier))
        }
    }
}

fn build_media_store(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn MediaStore>> {
    match &config.cloudinary {
        Some(credentials) => {
            let store =
                CloudinaryMediaStore::new(credentials.clone(), config.outbound_timeout, clock)
                    .map_err(|err| client_error("media", &err))?;
            info!(cloud = %credentials.cloud_name, "media uploads enabled");
            Ok(Arc::new(store))
        }
        None => {
            warn!("no Cloudinary credentials configured; media uploads disabled");
            Ok(Arc::new(UnconfiguredMediaStore))
        }
    }
}

fn build_collaborators(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Collaborators> {
    Ok(Collaborators {
        hasher: Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
        tokens: Arc::new(JwtTokenService::new(
            &config.jwt_secret,
            config.token_ttl,
            clock.clone(),
        )),
        identity: build_identity_verifier(config)?,
        media: build_media_store(config, clock.clone())?,
        clock,
    })
}

/// Wire services over PostgreSQL when a pool is configured, otherwise over
/// the in-memory stores.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let collaborators = build_collaborators(config, clock)?;
    let state = match &config.db_pool {
        Some(pool) => http_state(DieselStores::postgres(pool), collaborators),
        None => {
            warn!("no database configured; using in-memory stores, data is lost on restart");
            http_state(MemoryStores::in_memory(), collaborators)
        }
    };
    Ok(web::Data::new(state))
}

#[cfg(test)]
mod tests {
    use backend::domain::ErrorCode;
    use backend::domain::ports::{IdentityVerificationError, MediaStoreError};
    use backend::domain::{MediaFolder, UploadFile, UserId};
    use zeroize::Zeroizing;

    use super::*;

    fn config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("valid address"),
            Zeroizing::new("test-secret".to_owned()),
        )
    }

    #[tokio::test]
    async fn missing_project_disables_federated_sign_in() {
        let verifier = build_identity_verifier(&config()).expect("builds");

        let error = verifier.verify("token").await.expect_err("unconfigured");

        assert_eq!(error, IdentityVerificationError::unconfigured());
    }

    #[tokio::test]
    async fn missing_credentials_disable_uploads() {
        let store = build_media_store(&config(), Arc::new(DefaultClock)).expect("builds");
        let file = UploadFile {
            file_name: "a.png".to_owned(),
            mime_type: "image/png".to_owned(),
            bytes: bytes::Bytes::from_static(b"png"),
        };

        let error = store
            .upload(&file, &MediaFolder::for_upload(None, None, &UserId::random()))
            .await
            .expect_err("unconfigured");

        assert_eq!(error, MediaStoreError::unconfigured());
    }

    #[actix_rt::test]
    async fn memory_state_serves_federated_sign_in_as_unavailable() {
        let state = build_http_state(&config()).expect("state builds");

        let error = state
            .accounts
            .federated_sign_in("token")
            .await
            .expect_err("unconfigured");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
