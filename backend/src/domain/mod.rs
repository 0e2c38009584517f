//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the rental-management entities and the rules that guard
//! them, independent of HTTP and storage. Adapters depend on this module;
//! it depends on none of them.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Entities: User, Property, Agreement, Payment, Inspection, Ticket,
//!   Notification, Document, each with its draft, patch and filter types.
//! - ports: driven and driving port traits.
//! - Services implementing the driving ports.

pub mod agreement;
pub mod auth;
pub mod document;
pub mod error;
pub mod ids;
pub mod inspection;
pub mod media;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod property;
pub mod ticket;
pub mod trace_id;
pub mod user;
pub mod validation;

mod account_service;
mod agreement_service;
mod inspection_service;
mod media_service;
mod notification_service;
mod payment_service;
mod property_service;
mod repository_errors;
mod ticket_service;

pub use self::agreement::{
    Agreement, AgreementDraft, AgreementFilter, AgreementPatch, AgreementSide, AgreementStatus,
    AgreementType, Clause, ClauseCategory, MaintenanceTerms, PoliceVerificationStatus,
    RentEscalation, SignatureRejection, Signatures, SigningParty, Termination,
};
pub use self::auth::{
    AccessToken, AuthSession, AuthenticatedCaller, CredentialsValidationError, FederatedIdentity,
    LoginCredentials, MIN_PASSWORD_LEN, Password, PasswordHash, Registration,
};
pub use self::document::{Document, DocumentStatus, DocumentSummary, DocumentType, RelatedModel};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    AgreementId, DocumentId, InspectionId, InvalidIdError, NotificationId, PaymentId, PropertyId,
    TicketId, UserId,
};
pub use self::inspection::{
    Condition, DEFAULT_PHOTO_ROOM, Inspection, InspectionDraft, InspectionFilter, InspectionIssue,
    InspectionPhoto, InspectionType, ReportedIssue, Severity,
};
pub use self::media::{
    MediaDeletion, MediaFolder, StoredObject, UploadFile, UploadOptions, UploadedFile,
};
pub use self::notification::{
    NOTIFICATION_LIST_LIMIT, Notification, NotificationFilter, NotificationSubject,
    NotificationType,
};
pub use self::payment::{
    Payment, PaymentDraft, PaymentFilter, PaymentMethod, PaymentStatus, PaymentStatusUpdate,
    PaymentType,
};
pub use self::property::{
    Address, Bhk, FurnishingStatus, MediaItem, MediaKind, Property, PropertyDraft, PropertyFilter,
    PropertyPatch, PropertyStatus, PropertyType, Specs,
};
pub use self::ticket::{
    NewMessage, SenderType, Ticket, TicketDraft, TicketFilter, TicketMessage, TicketPriority,
    TicketStatus, TicketStatusChange, TicketType,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Checkpoint, DisplayName, Email, LandlordProfile, ProfileUpdate, Role, TenantProfile, User,
    UserValidationError,
};
pub use self::validation::{FieldViolation, ViolationCode, Violations};

pub use self::account_service::AccountService;
pub use self::agreement_service::AgreementService;
pub use self::inspection_service::InspectionService;
pub use self::media_service::MediaService;
pub use self::notification_service::NotificationService;
pub use self::payment_service::PaymentService;
pub use self::property_service::PropertyService;
pub use self::ticket_service::TicketService;
