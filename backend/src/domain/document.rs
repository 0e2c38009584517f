//! Metadata for files kept in the external media store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ids::{DocumentId, UserId};

/// Kind of stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Kyc,
    Agreement,
    Receipt,
    Inspection,
    #[default]
    Other,
}

impl DocumentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kyc => "kyc",
            Self::Agreement => "agreement",
            Self::Receipt => "receipt",
            Self::Inspection => "inspection",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kyc" => Ok(Self::Kyc),
            "agreement" => Ok(Self::Agreement),
            "receipt" => Ok(Self::Receipt),
            "inspection" => Ok(Self::Inspection),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Kind of record a document is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RelatedModel {
    User,
    Property,
    Agreement,
    Payment,
    Inspection,
    Ticket,
}

impl RelatedModel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Property => "Property",
            Self::Agreement => "Agreement",
            Self::Payment => "Payment",
            Self::Inspection => "Inspection",
            Self::Ticket => "Ticket",
        }
    }
}

impl std::str::FromStr for RelatedModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Self::User),
            "Property" => Ok(Self::Property),
            "Agreement" => Ok(Self::Agreement),
            "Payment" => Ok(Self::Payment),
            "Inspection" => Ok(Self::Inspection),
            "Ticket" => Ok(Self::Ticket),
            other => Err(format!("unknown related model: {other}")),
        }
    }
}

/// Review state of a stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// Stored document metadata. `public_id` is the media store's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Document {
    pub id: DocumentId,
    pub uploaded_by: UserId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    pub category: Option<String>,
    pub url: String,
    pub public_id: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub related_model: Option<RelatedModel>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub related_id: Option<Uuid>,
    pub is_public: bool,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short form of a document returned alongside an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DocumentSummary {
    pub id: DocumentId,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    pub category: Option<String>,
    pub status: DocumentStatus,
}

impl From<&Document> for DocumentSummary {
    fn from(value: &Document) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            category: value.category.clone(),
            status: value.status,
        }
    }
}
