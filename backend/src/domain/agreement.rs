//! Rental agreements and the signature-collection lifecycle.
//!
//! An agreement starts as a `draft`. Each party signs independently; the first
//! signature moves it to `pending_signature` and the second to `active`. The
//! remaining states (`renewing`, `terminated`, `dispute`) are entered by
//! workflows outside signing and block further signatures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;
use super::ids::{AgreementId, PropertyId, UserId};
use super::property::ChargeFrequency;
use super::validation::{ViolationCode, Violations};

/// Default day of month rent falls due.
pub const DEFAULT_RENT_PAYMENT_DATE: u8 = 5;
/// Default lock-in period in months.
pub const DEFAULT_LOCK_IN_MONTHS: u32 = 6;
/// Default notice period in months.
pub const DEFAULT_NOTICE_MONTHS: u32 = 1;

/// Contract length category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AgreementType {
    #[default]
    #[serde(rename = "11_months")]
    ElevenMonths,
    #[serde(rename = "long_term")]
    LongTerm,
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    #[default]
    Draft,
    PendingSignature,
    Active,
    Renewing,
    Terminated,
    Dispute,
}

impl AgreementStatus {
    /// Stable label used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingSignature => "pending_signature",
            Self::Active => "active",
            Self::Renewing => "renewing",
            Self::Terminated => "terminated",
            Self::Dispute => "dispute",
        }
    }

    /// Whether signatures may still be collected in this state.
    pub const fn accepts_signatures(self) -> bool {
        matches!(self, Self::Draft | Self::PendingSignature | Self::Active)
    }

    /// Status implied by the signature flags once a signature is recorded.
    pub const fn from_signatures(landlord_signed: bool, tenant_signed: bool) -> Self {
        if landlord_signed && tenant_signed {
            Self::Active
        } else {
            Self::PendingSignature
        }
    }
}

impl std::str::FromStr for AgreementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending_signature" => Ok(Self::PendingSignature),
            "active" => Ok(Self::Active),
            "renewing" => Ok(Self::Renewing),
            "terminated" => Ok(Self::Terminated),
            "dispute" => Ok(Self::Dispute),
            other => Err(format!("unknown agreement status: {other}")),
        }
    }
}

/// Which side of the agreement a signature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SigningParty {
    Landlord,
    Tenant,
}

/// Which side of the agreement a listing should be scoped to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgreementSide {
    Landlord,
    #[default]
    Tenant,
}

/// Who pays recurring maintenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePayer {
    #[default]
    Tenant,
    Landlord,
}

/// Maintenance obligations agreed in the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceTerms {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub frequency: ChargeFrequency,
    #[serde(default)]
    pub included_in_rent: bool,
    #[serde(default)]
    pub paid_by: MaintenancePayer,
}

/// Scheduled rent increases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RentEscalation {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default = "default_escalation_months")]
    pub frequency_months: u32,
}

fn default_escalation_months() -> u32 {
    12
}

/// Progress of the tenant's police verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PoliceVerificationStatus {
    #[default]
    Pending,
    Submitted,
    Verified,
}

/// Grouping used when presenting clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClauseCategory {
    Maintenance,
    Payment,
    Termination,
    Usage,
    #[default]
    Other,
}

/// A contract clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Clause {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_standard: bool,
    #[serde(default)]
    pub ai_explanation: Option<String>,
    #[serde(default)]
    pub category: ClauseCategory,
}

/// Signature flags. Flags only ever move from `false` to `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Signatures {
    pub landlord_signed: bool,
    pub landlord_signed_at: Option<DateTime<Utc>>,
    pub landlord_ip: Option<String>,
    pub tenant_signed: bool,
    pub tenant_signed_at: Option<DateTime<Utc>>,
    pub tenant_ip: Option<String>,
}

/// Outcome of the security deposit at move-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    FullRefund,
    PartialRefund,
    NoRefund,
    Pending,
}

/// Termination bookkeeping, filled in by the termination workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Termination {
    pub initiated_by: Option<SigningParty>,
    pub initiated_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub effective_date: Option<DateTime<Utc>>,
    pub deposit_status: Option<DepositStatus>,
    pub deposit_deduction_amount: Option<f64>,
    pub deposit_deduction_reason: Option<String>,
}

/// Stored rental agreement.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Agreement {
    pub id: AgreementId,
    pub property: PropertyId,
    pub landlord: UserId,
    pub tenant: Option<UserId>,
    pub agreement_type: AgreementType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent_amount: f64,
    pub security_deposit: f64,
    pub rent_payment_date: u8,
    pub late_penalty_percentage: f64,
    pub maintenance_terms: Option<MaintenanceTerms>,
    pub lock_in_period: u32,
    pub notice_period: u32,
    pub police_verification_status: PoliceVerificationStatus,
    pub rent_escalation: Option<RentEscalation>,
    pub clauses: Vec<Clause>,
    pub status: AgreementStatus,
    pub document_url: Option<String>,
    pub signatures: Signatures,
    pub termination: Option<Termination>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a signature attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureRejection {
    /// The caller does not hold the claimed side.
    #[error("caller is not the agreement {0:?}")]
    WrongParty(SigningParty),
    /// The agreement has left the signing lifecycle.
    #[error("agreement in status {0:?} cannot be signed")]
    Closed(AgreementStatus),
}

impl From<SignatureRejection> for Error {
    fn from(value: SignatureRejection) -> Self {
        match value {
            SignatureRejection::WrongParty(_) => Error::forbidden("Unauthorized"),
            SignatureRejection::Closed(status) => Error::conflict(format!(
                "Agreement in status {} cannot be signed",
                status.as_str()
            )),
        }
    }
}

impl Agreement {
    /// Whether `caller` is the landlord or the tenant.
    pub fn is_participant(&self, caller: &UserId) -> bool {
        &self.landlord == caller || self.tenant.as_ref() == Some(caller)
    }

    /// Whether `caller` is on the requested side.
    pub fn is_on_side(&self, caller: &UserId, side: AgreementSide) -> bool {
        match side {
            AgreementSide::Landlord => &self.landlord == caller,
            AgreementSide::Tenant => self.tenant.as_ref() == Some(caller),
        }
    }

    /// Check that `caller` may sign as `party`. An absent tenant never
    /// matches.
    pub fn authorize_signature(
        &self,
        party: SigningParty,
        caller: &UserId,
    ) -> Result<(), SignatureRejection> {
        let holds_side = match party {
            SigningParty::Landlord => &self.landlord == caller,
            SigningParty::Tenant => self.tenant.as_ref() == Some(caller),
        };
        if !holds_side {
            return Err(SignatureRejection::WrongParty(party));
        }
        if !self.status.accepts_signatures() {
            return Err(SignatureRejection::Closed(self.status));
        }
        Ok(())
    }

    /// Record a signature and recompute the status. Re-signing refreshes
    /// the timestamp and IP only.
    pub fn apply_signature(&mut self, party: SigningParty, ip: Option<String>, now: DateTime<Utc>) {
        let signatures = &mut self.signatures;
        match party {
            SigningParty::Landlord => {
                signatures.landlord_signed = true;
                signatures.landlord_signed_at = Some(now);
                signatures.landlord_ip = ip;
            }
            SigningParty::Tenant => {
                signatures.tenant_signed = true;
                signatures.tenant_signed_at = Some(now);
                signatures.tenant_ip = ip;
            }
        }
        self.status =
            AgreementStatus::from_signatures(signatures.landlord_signed, signatures.tenant_signed);
        self.updated_at = now;
    }

    /// Authorize then apply a signature in one step.
    pub fn sign(
        &mut self,
        party: SigningParty,
        caller: &UserId,
        ip: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureRejection> {
        self.authorize_signature(party, caller)?;
        self.apply_signature(party, ip, now);
        Ok(())
    }

    /// Only the landlord may edit, and only while the agreement is a draft.
    pub fn is_editable_by(&self, caller: &UserId) -> bool {
        self.status == AgreementStatus::Draft && &self.landlord == caller
    }

    /// Re-check the invariants a patch may disturb.
    pub fn validate_terms(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        check_terms(
            &mut violations,
            TermsView {
                start_date: Some(self.start_date),
                end_date: Some(self.end_date),
                rent_amount: Some(self.rent_amount),
                security_deposit: Some(self.security_deposit),
                rent_payment_date: Some(self.rent_payment_date),
                late_penalty_percentage: Some(self.late_penalty_percentage),
                clauses: Some(&self.clauses),
            },
        );
        violations.finish()
    }
}

struct TermsView<'a> {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    rent_amount: Option<f64>,
    security_deposit: Option<f64>,
    rent_payment_date: Option<u8>,
    late_penalty_percentage: Option<f64>,
    clauses: Option<&'a [Clause]>,
}

fn check_terms(violations: &mut Violations, terms: TermsView<'_>) {
    let misordered = matches!(
        (terms.start_date, terms.end_date),
        (Some(start), Some(end)) if end <= start
    );
    if misordered {
        violations.push(
            "end_date",
            ViolationCode::InvalidOrder,
            "end_date must be after start_date",
        );
    }
    if let Some(rent) = terms.rent_amount {
        violations.non_negative("rent_amount", rent);
    }
    if let Some(deposit) = terms.security_deposit {
        violations.non_negative("security_deposit", deposit);
    }
    if let Some(day) = terms.rent_payment_date {
        violations.within("rent_payment_date", f64::from(day), 1.0, 31.0);
    }
    if let Some(penalty) = terms.late_penalty_percentage {
        violations.within("late_penalty_percentage", penalty, 0.0, 100.0);
    }
    for (index, clause) in terms.clauses.unwrap_or_default().iter().enumerate() {
        violations.required(&format!("clauses[{index}].title"), &clause.title);
        violations.required(&format!("clauses[{index}].content"), &clause.content);
    }
}

/// Caller-supplied agreement content. The landlord is always the caller;
/// a `landlord`, `status` or `signatures` field in the body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgreementDraft {
    pub property: PropertyId,
    #[serde(default)]
    pub tenant: Option<UserId>,
    #[serde(default)]
    pub agreement_type: AgreementType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent_amount: f64,
    pub security_deposit: f64,
    #[serde(default = "default_rent_payment_date")]
    pub rent_payment_date: u8,
    #[serde(default)]
    pub late_penalty_percentage: f64,
    #[serde(default)]
    pub maintenance_terms: Option<MaintenanceTerms>,
    #[serde(default = "default_lock_in")]
    pub lock_in_period: u32,
    #[serde(default = "default_notice")]
    pub notice_period: u32,
    #[serde(default)]
    pub police_verification_status: PoliceVerificationStatus,
    #[serde(default)]
    pub rent_escalation: Option<RentEscalation>,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub document_url: Option<String>,
}

fn default_rent_payment_date() -> u8 {
    DEFAULT_RENT_PAYMENT_DATE
}

fn default_lock_in() -> u32 {
    DEFAULT_LOCK_IN_MONTHS
}

fn default_notice() -> u32 {
    DEFAULT_NOTICE_MONTHS
}

impl AgreementDraft {
    /// Check every field, reporting all violations together.
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        check_terms(
            &mut violations,
            TermsView {
                start_date: Some(self.start_date),
                end_date: Some(self.end_date),
                rent_amount: Some(self.rent_amount),
                security_deposit: Some(self.security_deposit),
                rent_payment_date: Some(self.rent_payment_date),
                late_penalty_percentage: Some(self.late_penalty_percentage),
                clauses: Some(&self.clauses),
            },
        );
        violations.finish()
    }

    /// Materialise an unsigned draft agreement for `landlord`.
    pub fn into_agreement(self, landlord: UserId, now: DateTime<Utc>) -> Agreement {
        Agreement {
            id: AgreementId::random(),
            property: self.property,
            landlord,
            tenant: self.tenant,
            agreement_type: self.agreement_type,
            start_date: self.start_date,
            end_date: self.end_date,
            rent_amount: self.rent_amount,
            security_deposit: self.security_deposit,
            rent_payment_date: self.rent_payment_date,
            late_penalty_percentage: self.late_penalty_percentage,
            maintenance_terms: self.maintenance_terms,
            lock_in_period: self.lock_in_period,
            notice_period: self.notice_period,
            police_verification_status: self.police_verification_status,
            rent_escalation: self.rent_escalation,
            clauses: self.clauses,
            status: AgreementStatus::Draft,
            document_url: self.document_url,
            signatures: Signatures::default(),
            termination: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a draft agreement. Landlord, property, status and
/// signatures are not representable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AgreementPatch {
    pub tenant: Option<UserId>,
    pub agreement_type: Option<AgreementType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub rent_amount: Option<f64>,
    pub security_deposit: Option<f64>,
    pub rent_payment_date: Option<u8>,
    pub late_penalty_percentage: Option<f64>,
    pub maintenance_terms: Option<MaintenanceTerms>,
    pub lock_in_period: Option<u32>,
    pub notice_period: Option<u32>,
    pub police_verification_status: Option<PoliceVerificationStatus>,
    pub rent_escalation: Option<RentEscalation>,
    pub clauses: Option<Vec<Clause>>,
    pub document_url: Option<String>,
}

impl AgreementPatch {
    /// Check the supplied fields in isolation. Date ordering against stored
    /// values is re-checked after the patch is applied.
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Violations::default();
        check_terms(
            &mut violations,
            TermsView {
                start_date: self.start_date,
                end_date: self.end_date,
                rent_amount: self.rent_amount,
                security_deposit: self.security_deposit,
                rent_payment_date: self.rent_payment_date,
                late_penalty_percentage: self.late_penalty_percentage,
                clauses: self.clauses.as_deref(),
            },
        );
        violations.finish()
    }

    /// Apply the patch in place, stamping `updated_at`.
    pub fn apply_to(&self, agreement: &mut Agreement, now: DateTime<Utc>) {
        if self.tenant.is_some() {
            agreement.tenant = self.tenant;
        }
        if let Some(kind) = self.agreement_type {
            agreement.agreement_type = kind;
        }
        if let Some(start) = self.start_date {
            agreement.start_date = start;
        }
        if let Some(end) = self.end_date {
            agreement.end_date = end;
        }
        if let Some(rent) = self.rent_amount {
            agreement.rent_amount = rent;
        }
        if let Some(deposit) = self.security_deposit {
            agreement.security_deposit = deposit;
        }
        if let Some(day) = self.rent_payment_date {
            agreement.rent_payment_date = day;
        }
        if let Some(penalty) = self.late_penalty_percentage {
            agreement.late_penalty_percentage = penalty;
        }
        if self.maintenance_terms.is_some() {
            agreement.maintenance_terms.clone_from(&self.maintenance_terms);
        }
        if let Some(months) = self.lock_in_period {
            agreement.lock_in_period = months;
        }
        if let Some(months) = self.notice_period {
            agreement.notice_period = months;
        }
        if let Some(status) = self.police_verification_status {
            agreement.police_verification_status = status;
        }
        if self.rent_escalation.is_some() {
            agreement.rent_escalation.clone_from(&self.rent_escalation);
        }
        if let Some(clauses) = &self.clauses {
            agreement.clauses.clone_from(clauses);
        }
        if self.document_url.is_some() {
            agreement.document_url.clone_from(&self.document_url);
        }
        agreement.updated_at = now;
    }
}

/// List filters: which side the caller is on, plus an optional status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementFilter {
    pub side: AgreementSide,
    pub status: Option<AgreementStatus>,
}

impl AgreementFilter {
    /// Whether `agreement` belongs in `caller`'s listing.
    pub fn matches(&self, agreement: &Agreement, caller: &UserId) -> bool {
        agreement.is_on_side(caller, self.side)
            && self.status.is_none_or(|status| agreement.status == status)
    }
}
