//! Field-level validation shared by payload types.
//!
//! Payload checks accumulate every offending field before failing, so a
//! client sees the whole list in one response under `details.fields`.

use serde::Serialize;
use serde_json::json;

use super::Error;

/// Machine-readable reason a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    MissingField,
    TooShort,
    TooLong,
    OutOfRange,
    InvalidFormat,
    InvalidOrder,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: ViolationCode,
    pub message: String,
}

/// Collects violations and converts them into a single domain error.
///
/// # Examples
/// ```
/// use backend::domain::Violations;
///
/// let mut violations = Violations::default();
/// violations.non_negative("rent_amount", -1.0);
/// assert!(violations.finish().is_err());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    /// Record an arbitrary violation.
    pub fn push(
        &mut self,
        field: impl Into<String>,
        code: ViolationCode,
        message: impl Into<String>,
    ) {
        self.0.push(FieldViolation {
            field: field.into(),
            code,
            message: message.into(),
        });
    }

    /// Require a non-blank string.
    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, ViolationCode::MissingField, format!("{field} is required"));
        }
    }

    /// Require at least `min` characters after trimming.
    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.trim().chars().count() < min {
            self.push(
                field,
                ViolationCode::TooShort,
                format!("{field} must be at least {min} characters"),
            );
        }
    }

    /// Require a finite value of at least zero.
    pub fn non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.push(field, ViolationCode::OutOfRange, format!("{field} must not be negative"));
        }
    }

    /// Require `min <= value <= max`.
    pub fn within(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() || value < min || value > max {
            self.push(
                field,
                ViolationCode::OutOfRange,
                format!("{field} must be between {min} and {max}"),
            );
        }
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded violations in insertion order.
    pub fn as_slice(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Succeed when empty, otherwise fail with an `invalid_request` error
    /// listing every field.
    pub fn finish(self) -> Result<(), Error> {
        if self.0.is_empty() {
            return Ok(());
        }
        let message = match self.0.as_slice() {
            [only] => only.message.clone(),
            _ => "Validation failed".to_owned(),
        };
        Err(Error::invalid_request(message).with_details(json!({ "fields": self.0 })))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(0.0, true)]
    #[case(12.5, true)]
    #[case(-0.01, false)]
    #[case(f64::NAN, false)]
    fn non_negative_bounds(#[case] value: f64, #[case] ok: bool) {
        let mut violations = Violations::default();
        violations.non_negative("amount", value);
        assert_eq!(violations.is_empty(), ok);
    }

    #[test]
    fn finish_lists_every_field() {
        let mut violations = Violations::default();
        violations.required("title", "  ");
        violations.within("late_penalty_percentage", 120.0, 0.0, 100.0);
        let error = violations.finish().expect_err("two violations");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Validation failed");
        let fields = error
            .details()
            .and_then(|details| details.get("fields"))
            .and_then(|fields| fields.as_array())
            .expect("fields array");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1]["code"], "out_of_range");
    }

    #[test]
    fn single_violation_uses_its_message() {
        let mut violations = Violations::default();
        violations.min_len("name", "A", 2);
        let error = violations.finish().expect_err("one violation");
        assert_eq!(error.message(), "name must be at least 2 characters");
    }
}
