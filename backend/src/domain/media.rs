//! Upload rules for the media gateway.
//!
//! Files are proxied to the external media store; these types carry the
//! bytes and decide where they land.

use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Error;
use super::document::{DocumentSummary, DocumentType, RelatedModel};
use super::ids::{InspectionId, PropertyId, UserId};

/// Root folder for every upload.
pub const MEDIA_ROOT: &str = "rentfit";
/// Per-file size ceiling in bytes.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
/// Most files accepted by one multi-file upload.
pub const MAX_FILES_PER_UPLOAD: usize = 10;
/// MIME types accepted by every upload route.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/quicktime",
    "application/pdf",
];

/// One file received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reject disallowed types and oversized files.
    pub fn check(&self) -> Result<(), Error> {
        if !ALLOWED_MIME_TYPES.contains(&self.mime_type.as_str()) {
            return Err(Error::invalid_request(
                "Invalid file type. Only images, videos, and PDFs are allowed.",
            ));
        }
        if self.len() > MAX_FILE_BYTES {
            return Err(Error::invalid_request("File too large. Maximum size is 10MB."));
        }
        Ok(())
    }
}

/// Reject empty or oversized batches and any file failing [`UploadFile::check`].
pub fn check_batch(files: &[UploadFile]) -> Result<(), Error> {
    if files.is_empty() {
        return Err(Error::invalid_request("No files uploaded"));
    }
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(Error::invalid_request(format!(
            "Too many files. Maximum is {MAX_FILES_PER_UPLOAD} per upload."
        )));
    }
    files.iter().try_for_each(UploadFile::check)
}

/// Folder a file is stored under in the media store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFolder(String);

impl MediaFolder {
    /// `rentfit/{type}[/{category}]` when a type is given, otherwise the
    /// caller's personal folder.
    pub fn for_upload(kind: Option<DocumentType>, category: Option<&str>, caller: &UserId) -> Self {
        match kind {
            Some(kind) => match category {
                Some(category) => Self(format!("{MEDIA_ROOT}/{}/{category}", kind.as_str())),
                None => Self(format!("{MEDIA_ROOT}/{}", kind.as_str())),
            },
            None => Self(format!("{MEDIA_ROOT}/users/{caller}")),
        }
    }

    pub fn for_property(id: &PropertyId) -> Self {
        Self(format!("{MEDIA_ROOT}/properties/{id}"))
    }

    pub fn for_inspection(id: &InspectionId) -> Self {
        Self(format!("{MEDIA_ROOT}/inspections/{id}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Location returned by the media store after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
}

/// Form fields accompanying a generic upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub kind: Option<DocumentType>,
    pub category: Option<String>,
    pub related_model: Option<RelatedModel>,
    pub related_id: Option<Uuid>,
    pub save_to_documents: bool,
}

/// Category labels become folder segments, so only a safe alphabet passes.
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category.len() <= 64
        && category
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

/// Result of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadedFile {
    pub url: String,
    pub public_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub document: Option<DocumentSummary>,
}

/// Outcome of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MediaDeletion {
    pub public_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<super::ids::DocumentId>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn file(mime: &str, len: usize) -> UploadFile {
        UploadFile {
            file_name: "lease.pdf".to_owned(),
            mime_type: mime.to_owned(),
            bytes: Bytes::from(vec![0_u8; len]),
        }
    }

    #[rstest]
    #[case("image/png", 10, true)]
    #[case("video/quicktime", 10, true)]
    #[case("application/pdf", MAX_FILE_BYTES, true)]
    #[case("application/pdf", MAX_FILE_BYTES + 1, false)]
    #[case("text/plain", 10, false)]
    #[case("image/svg+xml", 10, false)]
    fn upload_checks(#[case] mime: &str, #[case] len: usize, #[case] ok: bool) {
        assert_eq!(file(mime, len).check().is_ok(), ok);
    }

    #[test]
    fn batches_are_bounded() {
        assert!(check_batch(&[]).is_err());
        let eleven: Vec<_> = (0..11).map(|_| file("image/png", 10)).collect();
        assert!(check_batch(&eleven).is_err());
        assert!(check_batch(&eleven[..10]).is_ok());
        assert!(check_batch(&[file("image/png", 10), file("text/plain", 10)]).is_err());
    }

    #[test]
    fn folder_defaults_to_caller() {
        let caller = UserId::random();
        let folder = MediaFolder::for_upload(None, Some("ignored"), &caller);
        assert_eq!(folder.as_str(), format!("rentfit/users/{caller}"));
    }

    #[rstest]
    #[case(DocumentType::Kyc, None, "rentfit/kyc")]
    #[case(DocumentType::Receipt, Some("rent_receipt"), "rentfit/receipt/rent_receipt")]
    fn folder_uses_type_and_category(
        #[case] kind: DocumentType,
        #[case] category: Option<&str>,
        #[case] expected: &str,
    ) {
        let folder = MediaFolder::for_upload(Some(kind), category, &UserId::random());
        assert_eq!(folder.as_str(), expected);
    }

    #[rstest]
    #[case("aadhaar", true)]
    #[case("rent-receipt_2", true)]
    #[case("../etc", false)]
    #[case("", false)]
    fn category_alphabet(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(is_valid_category(raw), ok);
    }
}
