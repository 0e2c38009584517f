//! Buffered multipart form reading for upload routes.
//!
//! File parts are read into memory with a hard size ceiling so an oversized
//! upload is rejected before it is fully buffered.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart, MultipartError};
use bytes::BytesMut;
use futures_util::StreamExt;
use tracing::debug;

use crate::domain::media::{MAX_FILE_BYTES, MAX_FILES_PER_UPLOAD};
use crate::domain::{Error, UploadFile};

const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;
const FALLBACK_MIME: &str = "application/octet-stream";

/// Files and text fields of one multipart request.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) files: Vec<UploadFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Trimmed text field, `None` when absent or blank.
    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn owned_text(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_owned)
    }
}

fn multipart_error(err: MultipartError) -> Error {
    Error::invalid_request(format!("Invalid multipart body: {err}"))
}

async fn read_limited(field: &mut Field, limit: usize, too_large: &str) -> Result<BytesMut, Error> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(multipart_error)?;
        if buffer.len() + chunk.len() > limit {
            return Err(Error::invalid_request(too_large.to_owned()));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// Read every part, treating those named in `file_fields` as files.
pub(crate) async fn read_upload_form(
    mut payload: Multipart,
    file_fields: &[&str],
) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(multipart_error)?;
        let name = field.name().unwrap_or_default().to_owned();

        if file_fields.contains(&name.as_str()) {
            if form.files.len() == MAX_FILES_PER_UPLOAD {
                return Err(Error::invalid_request(format!(
                    "Too many files. Maximum is {MAX_FILES_PER_UPLOAD} per upload."
                )));
            }
            let file_name = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .unwrap_or("upload")
                .to_owned();
            let mime_type = field
                .content_type()
                .map_or_else(|| FALLBACK_MIME.to_owned(), |mime| mime.essence_str().to_owned());
            let bytes =
                read_limited(&mut field, MAX_FILE_BYTES, "File too large. Maximum size is 10MB.")
                    .await?;
            debug!(field = %name, file_name, size = bytes.len(), "received file part");
            form.files.push(UploadFile {
                file_name,
                mime_type,
                bytes: bytes.freeze(),
            });
        } else {
            let bytes =
                read_limited(&mut field, MAX_TEXT_FIELD_BYTES, "Form field too large").await?;
            let value = String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::invalid_request(format!("{name} must be UTF-8 text")))?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_fields_read_as_absent() {
        let mut form = UploadForm::default();
        form.fields.insert("room".to_owned(), "  ".to_owned());
        form.fields.insert("caption".to_owned(), " Lounge ".to_owned());

        assert_eq!(form.text("room"), None);
        assert_eq!(form.text("caption"), Some("Lounge"));
        assert_eq!(form.text("missing"), None);
    }
}
