//! Shared JSON and label helpers for outbound Diesel adapters.
//!
//! Sub-records are persisted as JSONB through their serde representation.
//! Enums without a `FromStr` use their serde string label in text columns so
//! storage and the wire format agree. Decode failures return a message the
//! caller wraps in its own query error.

use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(super) fn to_json<T: Serialize + ?Sized>(value: &T, field: &str) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|err| format!("encode {field}: {err}"))
}

pub(super) fn to_json_opt<T: Serialize>(
    value: Option<&T>,
    field: &str,
) -> Result<Option<Value>, String> {
    value.map(|inner| to_json(inner, field)).transpose()
}

pub(super) fn from_json<T: DeserializeOwned>(value: Value, field: &str) -> Result<T, String> {
    serde_json::from_value(value).map_err(|err| format!("decode {field}: {err}"))
}

pub(super) fn from_json_opt<T: DeserializeOwned>(
    value: Option<Value>,
    field: &str,
) -> Result<Option<T>, String> {
    value.map(|inner| from_json(inner, field)).transpose()
}

/// Serde label of a unit enum variant, e.g. `"11_months"` or `"2BHK"`.
pub(super) fn to_label<T: Serialize>(value: &T, field: &str) -> Result<String, String> {
    match to_json(value, field)? {
        Value::String(label) => Ok(label),
        other => Err(format!("encode {field}: expected a string label, got {other}")),
    }
}

pub(super) fn from_label<T: DeserializeOwned>(label: String, field: &str) -> Result<T, String> {
    from_json(Value::String(label), field)
}

/// Parse a stored label through the domain's `FromStr`.
pub(super) fn parse_label<T>(label: &str, field: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    label
        .parse()
        .map_err(|err| format!("decode {field}: {err}"))
}

/// Escape `LIKE` wildcards so user input only matches literally.
pub(super) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{AgreementType, Bhk};

    #[test]
    fn labels_follow_serde_names() {
        assert_eq!(
            to_label(&AgreementType::ElevenMonths, "agreement_type").as_deref(),
            Ok("11_months")
        );
        let bhk: Bhk = from_label("4BHK+".to_owned(), "bhk").expect("known label");
        assert_eq!(bhk, Bhk::FourPlusBhk);
    }

    #[test]
    fn unknown_label_names_the_field() {
        let error = from_label::<Bhk>("9BHK".to_owned(), "bhk").expect_err("unknown");
        assert!(error.starts_with("decode bhk"));
    }

    #[rstest]
    #[case("Pune", "Pune")]
    #[case("100%", "100\\%")]
    #[case("a_b\\c", "a\\_b\\\\c")]
    fn like_patterns_are_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_like(raw), expected);
    }
}
