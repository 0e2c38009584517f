//! Move-in, move-out and periodic inspections of a let property.
//!
//! An inspection copies the agreement's property, landlord and tenant when it
//! is created; visibility is decided from those copies plus the conductor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;
use super::agreement::{Agreement, SigningParty};
use super::ids::{AgreementId, InspectionId, PropertyId, UserId};
use super::validation::Violations;

/// Room recorded for a photo when the uploader names none.
pub const DEFAULT_PHOTO_ROOM: &str = "general";

/// When in the tenancy the inspection happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InspectionType {
    MoveIn,
    MoveOut,
    Periodic,
}

impl InspectionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveIn => "move_in",
            Self::MoveOut => "move_out",
            Self::Periodic => "periodic",
        }
    }
}

impl std::str::FromStr for InspectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move_in" => Ok(Self::MoveIn),
            "move_out" => Ok(Self::MoveOut),
            "periodic" => Ok(Self::Periodic),
            other => Err(format!("unknown inspection type: {other}")),
        }
    }
}

/// Assessed condition of a room or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

/// Photo taken during an inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InspectionPhoto {
    pub url: String,
    pub room: String,
    #[serde(default)]
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Defect found during an inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InspectionIssue {
    pub description: String,
    pub severity: Severity,
    pub room: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub resolved_by: Option<SigningParty>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolution_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InspectionSignatures {
    pub landlord_signed: bool,
    pub landlord_signed_at: Option<DateTime<Utc>>,
    pub tenant_signed: bool,
    pub tenant_signed_at: Option<DateTime<Utc>>,
}

/// Stored inspection record.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Inspection {
    pub id: InspectionId,
    pub agreement: AgreementId,
    pub property: PropertyId,
    pub landlord: UserId,
    pub tenant: Option<UserId>,
    #[serde(rename = "type")]
    pub kind: InspectionType,
    pub inspection_date: DateTime<Utc>,
    pub conducted_by: UserId,
    pub photos: Vec<InspectionPhoto>,
    pub issues: Vec<InspectionIssue>,
    pub overall_condition: Condition,
    pub signatures: InspectionSignatures,
    pub disputed: bool,
    pub dispute_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inspection {
    /// Landlord, tenant or conductor.
    pub fn is_participant(&self, caller: &UserId) -> bool {
        &self.landlord == caller
            || self.tenant.as_ref() == Some(caller)
            || &self.conducted_by == caller
    }
}

/// Issue as reported at creation; resolution fields start empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReportedIssue {
    pub description: String,
    pub severity: Severity,
    pub room: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<ReportedIssue> for InspectionIssue {
    fn from(value: ReportedIssue) -> Self {
        Self {
            description: value.description,
            severity: value.severity,
            room: value.room,
            photo_url: value.photo_url,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
            resolution_cost: None,
        }
    }
}

/// Caller-supplied inspection content. A `property` in the body is ignored;
/// the agreement's property is used instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InspectionDraft {
    pub agreement: AgreementId,
    #[serde(rename = "type")]
    pub kind: InspectionType,
    pub inspection_date: DateTime<Utc>,
    pub overall_condition: Condition,
    #[serde(default)]
    pub issues: Vec<ReportedIssue>,
}

impl InspectionDraft {
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        for (index, issue) in self.issues.iter().enumerate() {
            violations.required(&format!("issues[{index}].description"), &issue.description);
            violations.required(&format!("issues[{index}].room"), &issue.room);
        }
        violations.finish()
    }

    /// Materialise an inspection conducted by `conductor` under `agreement`.
    pub fn into_inspection(
        self,
        conductor: UserId,
        agreement: &Agreement,
        now: DateTime<Utc>,
    ) -> Inspection {
        Inspection {
            id: InspectionId::random(),
            agreement: agreement.id,
            property: agreement.property,
            landlord: agreement.landlord,
            tenant: agreement.tenant,
            kind: self.kind,
            inspection_date: self.inspection_date,
            conducted_by: conductor,
            photos: Vec::new(),
            issues: self.issues.into_iter().map(InspectionIssue::from).collect(),
            overall_condition: self.overall_condition,
            signatures: InspectionSignatures::default(),
            disputed: false,
            dispute_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Legal list filters for inspections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct InspectionFilter {
    pub agreement: Option<AgreementId>,
    #[serde(rename = "type")]
    pub kind: Option<InspectionType>,
}

impl InspectionFilter {
    pub fn matches(&self, inspection: &Inspection) -> bool {
        self.agreement.is_none_or(|id| inspection.agreement == id)
            && self.kind.is_none_or(|kind| inspection.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::agreement::{AgreementDraft, AgreementType, PoliceVerificationStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn agreement(landlord: UserId, tenant: Option<UserId>) -> Agreement {
        AgreementDraft {
            property: PropertyId::random(),
            tenant,
            agreement_type: AgreementType::ElevenMonths,
            start_date: now(),
            end_date: now() + chrono::Duration::days(330),
            rent_amount: 9000.0,
            security_deposit: 18000.0,
            rent_payment_date: 1,
            late_penalty_percentage: 0.0,
            maintenance_terms: None,
            lock_in_period: 3,
            notice_period: 1,
            police_verification_status: PoliceVerificationStatus::Submitted,
            rent_escalation: None,
            clauses: Vec::new(),
            document_url: None,
        }
        .into_agreement(landlord, now())
    }

    fn draft(agreement: &Agreement) -> InspectionDraft {
        InspectionDraft {
            agreement: agreement.id,
            kind: InspectionType::MoveIn,
            inspection_date: now(),
            overall_condition: Condition::Good,
            issues: vec![ReportedIssue {
                description: "Cracked tile".to_owned(),
                severity: Severity::Minor,
                room: "kitchen".to_owned(),
                photo_url: None,
            }],
        }
    }

    #[test]
    fn copies_parties_from_agreement() {
        let landlord = UserId::random();
        let tenant = UserId::random();
        let agreement = agreement(landlord, Some(tenant));
        let inspection = draft(&agreement).into_inspection(tenant, &agreement, now());
        assert_eq!(inspection.property, agreement.property);
        assert_eq!(inspection.landlord, landlord);
        assert_eq!(inspection.tenant, Some(tenant));
        assert!(!inspection.issues[0].resolved);
    }

    #[test]
    fn participants_include_conductor() {
        let landlord = UserId::random();
        let agreement = agreement(landlord, None);
        let inspector = UserId::random();
        let inspection = draft(&agreement).into_inspection(inspector, &agreement, now());
        assert!(inspection.is_participant(&landlord));
        assert!(inspection.is_participant(&inspector));
        assert!(!inspection.is_participant(&UserId::random()));
    }

    #[test]
    fn blank_issue_fields_are_reported() {
        let agreement = agreement(UserId::random(), None);
        let mut payload = draft(&agreement);
        payload.issues[0].room = String::new();
        let error = payload.validate().expect_err("blank room");
        assert_eq!(error.message(), "issues[0].room is required");
    }
}
