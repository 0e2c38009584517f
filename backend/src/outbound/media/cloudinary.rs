//! Signed Cloudinary uploads and deletions.
//!
//! Every request is signed by hashing the sorted parameters followed by the
//! API secret. The account must accept SHA-256 signatures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::dto::{DestroyResponseDto, ErrorEnvelopeDto, UploadResponseDto};
use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{MediaFolder, StoredObject, UploadFile};
use crate::outbound::http_errors::{body_preview, status_message, transport_message};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Account credentials for the Cloudinary upload API.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// [`MediaStore`] backed by Cloudinary.
pub struct CloudinaryMediaStore {
    client: Client,
    base_url: String,
    credentials: CloudinaryCredentials,
    clock: Arc<dyn Clock>,
}

impl CloudinaryMediaStore {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        credentials: CloudinaryCredentials,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: API_BASE.to_owned(),
            credentials,
            clock,
        })
    }

    /// Point requests at another API root, such as a local stub.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/{}/{resource_type}/{action}",
            self.base_url.trim_end_matches('/'),
            self.credentials.cloud_name
        )
    }

    fn timestamp(&self) -> String {
        self.clock.utc().timestamp().to_string()
    }

    async fn post(&self, url: String, form: Form) -> Result<bytes::Bytes, MediaStoreError> {
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| MediaStoreError::upstream(transport_message(&err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| MediaStoreError::upstream(transport_message(&err)))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body)
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(
        &self,
        file: &UploadFile,
        folder: &MediaFolder,
    ) -> Result<StoredObject, MediaStoreError> {
        let timestamp = self.timestamp();
        let signature = sign(
            &[("folder", folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.credentials.api_secret,
        );
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|err| MediaStoreError::upstream(err.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("folder", folder.as_str().to_owned())
            .text("timestamp", timestamp)
            .text("api_key", self.credentials.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let body = self.post(self.endpoint("auto", "upload"), form).await?;
        let stored = parse_upload(body.as_ref())?;
        debug!(public_id = %stored.public_id, bytes = file.len(), "uploaded media object");
        Ok(stored)
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaStoreError> {
        let timestamp = self.timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.credentials.api_secret,
        );
        let form = Form::new()
            .text("public_id", public_id.to_owned())
            .text("timestamp", timestamp)
            .text("api_key", self.credentials.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let body = self.post(self.endpoint("image", "destroy"), form).await?;
        let outcome = parse_destroy(body.as_ref())?;
        if outcome == DestroyOutcome::Missing {
            warn!(public_id, "media object was already gone");
        }
        Ok(())
    }
}

/// Hex SHA-256 of `k1=v1&k2=v2...` (keys sorted) followed by the secret.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(key, _)| *key);
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn parse_upload(body: &[u8]) -> Result<StoredObject, MediaStoreError> {
    let dto: UploadResponseDto = serde_json::from_slice(body).map_err(|err| {
        MediaStoreError::upstream(format!("invalid upload response: {err}: {}", body_preview(body)))
    })?;
    Ok(StoredObject {
        url: dto.secure_url,
        public_id: dto.public_id,
    })
}

#[derive(Debug, PartialEq, Eq)]
enum DestroyOutcome {
    Removed,
    Missing,
}

fn parse_destroy(body: &[u8]) -> Result<DestroyOutcome, MediaStoreError> {
    let dto: DestroyResponseDto = serde_json::from_slice(body).map_err(|err| {
        MediaStoreError::upstream(format!("invalid destroy response: {err}"))
    })?;
    match dto.result.as_str() {
        "ok" => Ok(DestroyOutcome::Removed),
        "not found" => Ok(DestroyOutcome::Missing),
        other => Err(MediaStoreError::upstream(format!("destroy refused: {other}"))),
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MediaStoreError {
    match serde_json::from_slice::<ErrorEnvelopeDto>(body) {
        Ok(envelope) => MediaStoreError::upstream(format!(
            "status {}: {}",
            status.as_u16(),
            envelope.error.message
        )),
        Err(_) => MediaStoreError::upstream(status_message(status, body)),
    }
}
