//! Property listings owned by landlords.
//!
//! Only the owner ever sees or mutates a listing; repositories take the
//! owner as a mandatory argument and fold it into every query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;
use super::ids::{AgreementId, PropertyId, UserId};
use super::validation::{ViolationCode, Violations};

/// Minimum accepted pincode length.
pub const MIN_PINCODE_LEN: usize = 6;

/// Postal address of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    #[serde(default)]
    pub society_name: Option<String>,
    pub street: String,
    #[serde(default)]
    pub locality: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub map_link: Option<String>,
}

/// Room-count category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Bhk {
    #[serde(rename = "1RK")]
    OneRk,
    #[serde(rename = "1BHK")]
    OneBhk,
    #[serde(rename = "2BHK")]
    TwoBhk,
    #[serde(rename = "3BHK")]
    ThreeBhk,
    #[serde(rename = "4BHK+")]
    FourPlusBhk,
}

/// Building category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Studio,
    Penthouse,
    Commercial,
    Other,
}

/// Furnishing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FurnishingStatus {
    FullyFurnished,
    SemiFurnished,
    Unfurnished,
}

/// Structured listing specifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Specs {
    pub bhk: Bhk,
    pub property_type: PropertyType,
    pub bathrooms: u32,
    #[serde(default)]
    pub balconies: u32,
    pub furnishing_status: FurnishingStatus,
    pub size_sq_ft: f64,
    #[serde(default)]
    pub floor_number: Option<i32>,
    #[serde(default)]
    pub total_floors: Option<u32>,
    #[serde(default)]
    pub property_age_years: Option<u32>,
}

/// Kind of uploaded listing media.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// Classify by MIME type: anything under `video/` is a video.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// A photo or video attached to a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Billing cadence for recurring charges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChargeFrequency {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

/// Society maintenance charges for a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceDetails {
    pub amount: f64,
    #[serde(default)]
    pub frequency: ChargeFrequency,
    #[serde(default)]
    pub included_in_rent: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Occupancy status. Transitions are driven outside the signing workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Vacant,
    Occupied,
    Maintenance,
}

impl PropertyStatus {
    /// Stable label used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vacant => "vacant",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::str::FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vacant" => Ok(Self::Vacant),
            "occupied" => Ok(Self::Occupied),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(format!("unknown property status: {other}")),
        }
    }
}

/// Stored property listing. `owner` never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Property {
    pub id: PropertyId,
    pub owner: UserId,
    pub title: String,
    pub address: Address,
    pub specs: Specs,
    pub amenities: Vec<String>,
    pub media: Vec<MediaItem>,
    pub expected_rent: f64,
    pub expected_deposit: f64,
    pub description: Option<String>,
    pub maintenance_details: Option<MaintenanceDetails>,
    pub status: PropertyStatus,
    pub available_from: Option<DateTime<Utc>>,
    pub current_agreement: Option<AgreementId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Whether `caller` owns this listing.
    pub fn is_owned_by(&self, caller: &UserId) -> bool {
        &self.owner == caller
    }
}

/// Caller-supplied listing content for creation.
///
/// Unknown fields such as `owner` or `status` are ignored; the owner is
/// always the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyDraft {
    pub title: String,
    pub address: Address,
    pub specs: Specs,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub expected_rent: f64,
    pub expected_deposit: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub maintenance_details: Option<MaintenanceDetails>,
    #[serde(default)]
    pub available_from: Option<DateTime<Utc>>,
}

fn check_address(violations: &mut Violations, prefix: &str, address: &Address) {
    violations.required(&format!("{prefix}.street"), &address.street);
    violations.required(&format!("{prefix}.city"), &address.city);
    violations.required(&format!("{prefix}.state"), &address.state);
    violations.min_len(&format!("{prefix}.pincode"), &address.pincode, MIN_PINCODE_LEN);
}

fn check_specs(violations: &mut Violations, prefix: &str, specs: &Specs) {
    if !specs.size_sq_ft.is_finite() || specs.size_sq_ft < 1.0 {
        violations.push(
            format!("{prefix}.size_sq_ft"),
            ViolationCode::OutOfRange,
            "size_sq_ft must be at least 1",
        );
    }
}

fn check_maintenance(violations: &mut Violations, details: Option<&MaintenanceDetails>) {
    if let Some(details) = details {
        violations.non_negative("maintenance_details.amount", details.amount);
    }
}

impl PropertyDraft {
    /// Check every field, reporting all violations together.
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        violations.required("title", &self.title);
        check_address(&mut violations, "address", &self.address);
        check_specs(&mut violations, "specs", &self.specs);
        violations.non_negative("expected_rent", self.expected_rent);
        violations.non_negative("expected_deposit", self.expected_deposit);
        check_maintenance(&mut violations, self.maintenance_details.as_ref());
        violations.finish()
    }

    /// Materialise a new vacant listing owned by `owner`.
    pub fn into_property(self, owner: UserId, now: DateTime<Utc>) -> Property {
        Property {
            id: PropertyId::random(),
            owner,
            title: self.title.trim().to_owned(),
            address: self.address,
            specs: self.specs,
            amenities: self.amenities,
            media: Vec::new(),
            expected_rent: self.expected_rent,
            expected_deposit: self.expected_deposit,
            description: self.description,
            maintenance_details: self.maintenance_details,
            status: PropertyStatus::Vacant,
            available_from: self.available_from,
            current_agreement: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial listing update. The owner is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub address: Option<Address>,
    pub specs: Option<Specs>,
    pub amenities: Option<Vec<String>>,
    pub expected_rent: Option<f64>,
    pub expected_deposit: Option<f64>,
    pub description: Option<String>,
    pub maintenance_details: Option<MaintenanceDetails>,
    pub status: Option<PropertyStatus>,
    pub available_from: Option<DateTime<Utc>>,
    pub current_agreement: Option<AgreementId>,
}

impl PropertyPatch {
    /// Check the supplied fields only.
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        if let Some(title) = &self.title {
            violations.required("title", title);
        }
        if let Some(address) = &self.address {
            check_address(&mut violations, "address", address);
        }
        if let Some(specs) = &self.specs {
            check_specs(&mut violations, "specs", specs);
        }
        if let Some(rent) = self.expected_rent {
            violations.non_negative("expected_rent", rent);
        }
        if let Some(deposit) = self.expected_deposit {
            violations.non_negative("expected_deposit", deposit);
        }
        check_maintenance(&mut violations, self.maintenance_details.as_ref());
        violations.finish()
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the patch in place, stamping `updated_at`.
    pub fn apply_to(&self, property: &mut Property, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            property.title.clone_from(title);
        }
        if let Some(address) = &self.address {
            property.address.clone_from(address);
        }
        if let Some(specs) = &self.specs {
            property.specs.clone_from(specs);
        }
        if let Some(amenities) = &self.amenities {
            property.amenities.clone_from(amenities);
        }
        if let Some(rent) = self.expected_rent {
            property.expected_rent = rent;
        }
        if let Some(deposit) = self.expected_deposit {
            property.expected_deposit = deposit;
        }
        if self.description.is_some() {
            property.description.clone_from(&self.description);
        }
        if self.maintenance_details.is_some() {
            property.maintenance_details.clone_from(&self.maintenance_details);
        }
        if let Some(status) = self.status {
            property.status = status;
        }
        if self.available_from.is_some() {
            property.available_from = self.available_from;
        }
        if self.current_agreement.is_some() {
            property.current_agreement = self.current_agreement;
        }
        property.updated_at = now;
    }
}

/// Legal list filters for the owner's listings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct PropertyFilter {
    pub status: Option<PropertyStatus>,
    pub city: Option<String>,
    pub bhk: Option<Bhk>,
}

impl PropertyFilter {
    /// Whether `property` passes the secondary filters (the owner scope is
    /// applied separately).
    pub fn matches(&self, property: &Property) -> bool {
        self.status.is_none_or(|status| property.status == status)
            && self
                .city
                .as_deref()
                .is_none_or(|city| property.address.city.eq_ignore_ascii_case(city))
            && self.bhk.is_none_or(|bhk| property.specs.bhk == bhk)
    }
}
