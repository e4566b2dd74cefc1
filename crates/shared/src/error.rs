use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code the backend puts in bodies of rejected (unvalidated) input.
pub const VALIDATION_STATUS_CODE: i64 = 10422;

/// Optional body of a non-2xx reply from the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(detail.into())),
            status_code: None,
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self {
            status_code: Some(VALIDATION_STATUS_CODE),
            ..Self::new(detail)
        }
    }

    /// Reads the `detail` field out of an arbitrary JSON body.
    ///
    /// Strings are returned verbatim, other JSON values as their JSON text.
    /// Falsy values (`null`, `false`, `0`, `""`) count as absent.
    pub fn detail_from(body: &Value) -> Option<String> {
        match body.get("detail")? {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(detail) if detail.is_empty() => None,
            Value::String(detail) => Some(detail.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_is_read_verbatim_from_string_field() {
        let body = json!({ "detail": "internal error" });
        assert_eq!(ErrorBody::detail_from(&body).as_deref(), Some("internal error"));
    }

    #[test]
    fn structured_detail_is_rendered_as_json_text() {
        let body = json!({ "detail": [{ "loc": ["body", "phrases"], "msg": "field required" }] });
        let detail = ErrorBody::detail_from(&body).expect("detail");
        assert!(detail.contains("field required"), "unexpected detail: {detail}");
    }

    #[test]
    fn missing_null_or_empty_detail_counts_as_absent() {
        assert_eq!(ErrorBody::detail_from(&json!({ "error": "x" })), None);
        assert_eq!(ErrorBody::detail_from(&json!({ "detail": null })), None);
        assert_eq!(ErrorBody::detail_from(&json!({ "detail": "" })), None);
        assert_eq!(ErrorBody::detail_from(&json!("plain text body")), None);
    }

    #[test]
    fn falsy_detail_values_count_as_absent() {
        assert_eq!(ErrorBody::detail_from(&json!({ "detail": false })), None);
        assert_eq!(ErrorBody::detail_from(&json!({ "detail": 0 })), None);
        assert_eq!(ErrorBody::detail_from(&json!({ "detail": 0.0 })), None);
        assert_eq!(
            ErrorBody::detail_from(&json!({ "detail": true })).as_deref(),
            Some("true")
        );
        assert_eq!(
            ErrorBody::detail_from(&json!({ "detail": 42 })).as_deref(),
            Some("42")
        );
    }

    #[test]
    fn validation_body_matches_backend_shape() {
        let body = serde_json::to_value(ErrorBody::validation("Incorrect input")).expect("json");
        assert_eq!(
            body,
            json!({ "detail": "Incorrect input", "status_code": 10422 })
        );
        let parsed: ErrorBody = serde_json::from_value(body).expect("parse");
        assert_eq!(parsed.status_code, Some(VALIDATION_STATUS_CODE));
    }
}
