//! User accounts, roles, and role-specific profiles.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::PasswordHash;
use super::ids::UserId;

/// Validation errors raised while constructing user values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Email was blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email does not look like `local@domain.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Display name shorter than the minimum.
    #[error("name must be at least {min} characters")]
    NameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Display name longer than the maximum.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Role string outside {landlord, tenant, admin}.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, no whitespace, a dot in the domain.
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Case-insensitive email address, stored trimmed and lowercased.
///
/// # Examples
/// ```
/// use backend::domain::Email;
///
/// let email = Email::new("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = Email)]
pub struct Email(String);

impl Email {
    /// Normalise and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Portion before the `@`, used as a fallback display name.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(self.0.as_str())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Account role. A user may hold any combination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owns properties and issues agreements.
    Landlord,
    /// Rents properties and pays against agreements.
    Tenant,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Stable lowercase label used in tokens and storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landlord => "landlord",
            Self::Tenant => "tenant",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landlord" => Ok(Self::Landlord),
            "tenant" => Ok(Self::Tenant),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Onboarding completion flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// The user has not finished onboarding.
    #[default]
    Onboarding,
    /// Onboarding is complete.
    Complete,
}

impl Checkpoint {
    /// Stable lowercase label used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Complete => "complete",
        }
    }
}

impl std::str::FromStr for Checkpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onboarding" => Ok(Self::Onboarding),
            "complete" => Ok(Self::Complete),
            other => Err(format!("unknown checkpoint: {other}")),
        }
    }
}

/// Review state of submitted identity documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Accepted.
    Verified,
    /// Declined.
    Rejected,
}

/// Bank account used for rent settlement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BankDetails {
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub account_holder_name: Option<String>,
    pub bank_name: Option<String>,
    pub branch_name: Option<String>,
}

/// Uploaded landlord verification documents (media URLs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LandlordDocuments {
    pub pan_document: Option<String>,
    pub aadhaar_document: Option<String>,
    pub bank_statement: Option<String>,
    pub gst_certificate: Option<String>,
}

/// Landlord verification and settlement details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LandlordProfile {
    pub verification_status: VerificationStatus,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub upi_id: Option<String>,
    pub pan_number: Option<String>,
    pub aadhaar_number: Option<String>,
    pub gst_number: Option<String>,
    pub company_name: Option<String>,
    pub company_registration_number: Option<String>,
    pub bank_details: Option<BankDetails>,
    pub documents: Option<LandlordDocuments>,
}

/// Self-reported gender on a tenant profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

/// Tenant employment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    SelfEmployed,
    Unemployed,
    Student,
}

/// A named contact person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Contact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Relationship to the tenant (emergency contacts).
    pub relation: Option<String>,
    /// Job title (employer contacts).
    pub designation: Option<String>,
}

/// Uploaded tenant KYC documents (media URLs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TenantDocuments {
    pub pan_document: Option<String>,
    pub aadhaar_document: Option<String>,
    pub employment_letter_document: Option<String>,
    pub salary_slip: Option<String>,
    pub previous_rent_agreement: Option<String>,
}

/// Tenant KYC and employment details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TenantProfile {
    pub kyc_status: VerificationStatus,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub current_employer: Option<String>,
    pub job_title: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub monthly_income: Option<f64>,
    pub permanent_address: Option<String>,
    pub current_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub pan_number: Option<String>,
    pub aadhaar_number: Option<String>,
    pub emergency_contact: Option<Contact>,
    pub previous_landlord_contact: Option<Contact>,
    pub employer_contact: Option<Contact>,
    pub documents: Option<TenantDocuments>,
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Free,
    Basic,
    Premium,
}

/// Subscription bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Subscription {
    pub plan_type: PlanType,
    pub expires_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
}

/// Stored user account.
///
/// ## Invariants
/// - `email` is unique across all users.
/// - At least one of `password_hash` and `federated_id` is present; see
///   [`User::has_credential`].
/// - `password_hash` is never serialised.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(skip)]
    pub password_hash: Option<PasswordHash>,
    pub federated_id: Option<String>,
    pub image: Option<String>,
    pub roles: BTreeSet<Role>,
    pub checkpoint: Checkpoint,
    pub landlord_profile: Option<LandlordProfile>,
    pub tenant_profile: Option<TenantProfile>,
    pub subscription: Option<Subscription>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a locally registered user.
    pub fn local(
        name: DisplayName,
        email: Email,
        password_hash: PasswordHash,
        roles: BTreeSet<Role>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::random(),
            name: name.into(),
            email,
            password_hash: Some(password_hash),
            federated_id: None,
            image: None,
            roles,
            checkpoint: Checkpoint::Onboarding,
            landlord_profile: None,
            tenant_profile: None,
            subscription: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a user on first federated sign-in: no roles, onboarding pending.
    pub fn federated(
        name: String,
        email: Email,
        federated_id: String,
        image: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::random(),
            name,
            email,
            password_hash: None,
            federated_id: Some(federated_id),
            image,
            roles: BTreeSet::new(),
            checkpoint: Checkpoint::Onboarding,
            landlord_profile: None,
            tenant_profile: None,
            subscription: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the record satisfies the credential invariant.
    pub fn has_credential(&self) -> bool {
        self.password_hash.is_some() || self.federated_id.is_some()
    }

    /// Whether the user holds any of `required`.
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        required.iter().any(|role| self.roles.contains(role))
    }
}

/// Validated display name for newly registered users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Minimum length in characters after trimming.
    pub const MIN: usize = 2;
    /// Maximum length in characters after trimming.
    pub const MAX: usize = 100;

    /// Trim and validate a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if length < Self::MIN {
            return Err(UserValidationError::NameTooShort { min: Self::MIN });
        }
        if length > Self::MAX {
            return Err(UserValidationError::NameTooLong { max: Self::MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

/// Self-service profile changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<DisplayName>,
    pub image: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
    pub checkpoint: Option<Checkpoint>,
    pub landlord_profile: Option<LandlordProfile>,
    pub tenant_profile: Option<TenantProfile>,
}

impl ProfileUpdate {
    /// Apply the update to `user`, stamping `updated_at`.
    pub fn apply_to(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            user.name = name.into();
        }
        if let Some(image) = self.image {
            user.image = Some(image);
        }
        if let Some(roles) = self.roles {
            user.roles = roles;
        }
        if let Some(checkpoint) = self.checkpoint {
            user.checkpoint = checkpoint;
        }
        if let Some(profile) = self.landlord_profile {
            user.landlord_profile = Some(profile);
        }
        if let Some(profile) = self.tenant_profile {
            user.tenant_profile = Some(profile);
        }
        user.updated_at = now;
    }
}
