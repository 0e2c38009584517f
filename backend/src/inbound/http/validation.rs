//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String, value: Option<&str>) -> Error {
    let field = field.as_str();
    let mut detail = json!({ "field": field, "code": code.as_str(), "message": message });
    if let Some(value) = value {
        detail["value"] = json!(value);
    }
    Error::invalid_request(message).with_details(json!({ "fields": [detail] }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("{} is required", field.as_str()),
        None,
    )
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, reason: &str) -> Error {
    field_error(
        field,
        ErrorCode::InvalidValue,
        format!("{} {reason}", field.as_str()),
        Some(value),
    )
}

/// Parse a typed record id from a path segment or form field.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.parse::<T>().map_err(|_| {
        field_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            Some(value),
        )
    })
}

/// Parse `true`/`false`, treating anything else as invalid.
pub(crate) fn parse_flag(value: &str, field: FieldName) -> Result<bool, Error> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(invalid_value_error(field, other, "must be true or false")),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::PropertyId;

    const ID: FieldName = FieldName::new("id");

    #[test]
    fn parse_id_accepts_uuids() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: PropertyId = parse_id(raw, ID).expect("valid uuid");
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn parse_id_reports_the_field() {
        let error = parse_id::<PropertyId>("nope", ID).expect_err("invalid");

        assert_eq!(error.message(), "id must be a valid UUID");
        let field = &error.details().expect("details")["fields"][0];
        assert_eq!(field["code"].as_str(), Some("invalid_uuid"));
        assert_eq!(field["value"].as_str(), Some("nope"));
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case(" false ", Some(false))]
    #[case("yes", None)]
    fn flags(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(raw, FieldName::new("flag")).ok(), expected);
    }

    #[test]
    fn missing_field_lists_one_entry() {
        let error = missing_field_error(FieldName::new("file"));
        let fields = error.details().and_then(|d| d.get("fields")).and_then(Value::as_array);
        assert_eq!(fields.map(Vec::len), Some(1));
    }
}
