//! Helpers shared by unit tests and the integration suites under `tests/`.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::agreement::{
    DEFAULT_LOCK_IN_MONTHS, DEFAULT_NOTICE_MONTHS, DEFAULT_RENT_PAYMENT_DATE,
};
use crate::domain::{
    Address, AgreementDraft, AgreementType, AuthenticatedCaller, Bhk, Email, FurnishingStatus,
    PoliceVerificationStatus, PropertyDraft, PropertyId, PropertyType, Role, Specs, UserId,
};

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Frozen at 2025-01-15T09:00:00Z.
    pub fn shared() -> Arc<Self> {
        let now = Utc
            .with_ymd_and_hms(2025, 1, 15, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Arc::new(Self::new(now))
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Caller with a fresh id holding `roles`.
pub fn caller(roles: &[Role]) -> AuthenticatedCaller {
    let user_id = UserId::random();
    AuthenticatedCaller {
        user_id,
        email: Email::new(format!("user-{user_id}@example.com"))
            .unwrap_or_else(|_| unreachable!("generated emails are well formed")),
        roles: roles.iter().copied().collect(),
    }
}

/// Valid two-bedroom listing in Pune.
pub fn property_draft() -> PropertyDraft {
    PropertyDraft {
        title: "Sunny 2BHK near the station".to_owned(),
        address: Address {
            society_name: Some("Green Acres".to_owned()),
            street: "12 MG Road".to_owned(),
            locality: Some("Camp".to_owned()),
            city: "Pune".to_owned(),
            state: "Maharashtra".to_owned(),
            pincode: "411001".to_owned(),
            latitude: None,
            longitude: None,
            map_link: None,
        },
        specs: Specs {
            bhk: Bhk::TwoBhk,
            property_type: PropertyType::Apartment,
            bathrooms: 2,
            balconies: 1,
            furnishing_status: FurnishingStatus::SemiFurnished,
            size_sq_ft: 950.0,
            floor_number: Some(3),
            total_floors: Some(7),
            property_age_years: None,
        },
        amenities: vec!["lift".to_owned(), "parking".to_owned()],
        expected_rent: 22_000.0,
        expected_deposit: 66_000.0,
        description: None,
        maintenance_details: None,
        available_from: None,
    }
}

/// Eleven-month draft for `property`, starting on 2025-02-01.
pub fn agreement_draft(property: PropertyId, tenant: Option<UserId>) -> AgreementDraft {
    let start = Utc
        .with_ymd_and_hms(2025, 2, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    AgreementDraft {
        property,
        tenant,
        agreement_type: AgreementType::ElevenMonths,
        start_date: start,
        end_date: start + Duration::days(334),
        rent_amount: 22_000.0,
        security_deposit: 66_000.0,
        rent_payment_date: DEFAULT_RENT_PAYMENT_DATE,
        late_penalty_percentage: 2.0,
        maintenance_terms: None,
        lock_in_period: DEFAULT_LOCK_IN_MONTHS,
        notice_period: DEFAULT_NOTICE_MONTHS,
        police_verification_status: PoliceVerificationStatus::default(),
        rent_escalation: None,
        clauses: Vec::new(),
        document_url: None,
    }
}
