//! Extractors whose rejections render as the tagged JSON error body.

use axum::extract::{FromRequest, FromRequestParts};
use serde_json::Value;

use crate::error::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Reads a loosely-typed request field as text. A missing field or `null` is
/// empty; numbers and other non-strings keep their JSON spelling so the
/// domain parser reports them.
pub(crate) fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&Value::Null), "");
        assert_eq!(field_text(&json!("2099-06-01")), "2099-06-01");
        assert_eq!(field_text(&json!(20990601)), "20990601");
        assert_eq!(field_text(&json!({ "id": 1 })), r#"{"id":1}"#);
    }
}
