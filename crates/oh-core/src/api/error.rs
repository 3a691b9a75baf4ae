use serde_json::Value;

/// Messages reported by the backend for one request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

impl FieldError {
    pub fn render(&self) -> String {
        format!("{}: {}", self.field, self.messages.join(" "))
    }
}

/// Failure of a backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is empty when the body carried nothing usable.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        field_errors: Vec<FieldError>,
    },
    /// The request never produced a response (unreachable, timeout).
    #[error("network error: {0}")]
    Transport(String),
    /// A 2xx response whose body could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds a status error from a raw response body.
    ///
    /// The message is taken from `detail`, then `message`, then the field-keyed
    /// `errors` object, then `error`, then `context`. A body made only of
    /// field keys (a bare serializer error) is read as field errors.
    pub fn from_response(status: u16, body: &str) -> Self {
        let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let field_errors = match value.get("errors") {
            Some(errors) => collect_field_errors(errors),
            None if is_bare_serializer_error(&value) => collect_field_errors(&value),
            None => Vec::new(),
        };

        let message = non_empty_str(&value, "detail")
            .or_else(|| non_empty_str(&value, "message"))
            .or_else(|| {
                (!field_errors.is_empty()).then(|| {
                    field_errors
                        .iter()
                        .map(FieldError::render)
                        .collect::<Vec<_>>()
                        .join("; ")
                })
            })
            .or_else(|| non_empty_str(&value, "error"))
            .or_else(|| non_empty_str(&value, "context"))
            .unwrap_or_default();

        ApiError::Status {
            status,
            message,
            field_errors,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for a notification, or `fallback` when the server gave
    /// nothing usable or no response arrived.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// First message reported for `field`, if any.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        match self {
            ApiError::Status { field_errors, .. } => field_errors
                .iter()
                .find(|e| e.field == field)
                .and_then(|e| e.messages.first())
                .map(String::as_str),
            _ => None,
        }
    }
}

const ENVELOPE_KEYS: [&str; 5] = ["detail", "message", "errors", "error", "context"];

fn is_bare_serializer_error(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| !map.is_empty() && ENVELOPE_KEYS.iter().all(|key| !map.contains_key(*key)))
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn collect_field_errors(errors: &Value) -> Vec<FieldError> {
    let mut out = Vec::new();
    match errors {
        Value::Object(map) => {
            for (field, value) in map {
                flatten_field(field, value, &mut out);
            }
        }
        Value::Array(_) | Value::String(_) => flatten_field("non_field_errors", errors, &mut out),
        _ => {}
    }
    out
}

fn flatten_field(field: &str, value: &Value, out: &mut Vec<FieldError>) {
    match value {
        Value::String(msg) => out.push(FieldError {
            field: field.to_string(),
            messages: vec![msg.clone()],
        }),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            if !messages.is_empty() {
                out.push(FieldError {
                    field: field.to_string(),
                    messages,
                });
            }
        }
        Value::Object(map) => {
            for (child, value) in map {
                flatten_field(&format!("{field}.{child}"), value, out);
            }
        }
        Value::Null => {}
        other => out.push(FieldError {
            field: field.to_string(),
            messages: vec![other.to_string()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_wins_over_other_keys() {
        let err = ApiError::from_response(400, r#"{"detail":"User not found","message":"x"}"#);
        assert_eq!(err.user_message("fallback"), "User not found");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn field_errors_are_rendered_field_by_field() {
        let body = r#"{"errors":{"phone":["This phone is taken.","Try another."]}}"#;
        let err = ApiError::from_response(400, body);
        assert_eq!(
            err.user_message("fallback"),
            "phone: This phone is taken. Try another."
        );
        assert_eq!(err.field_message("phone"), Some("This phone is taken."));
    }

    #[test]
    fn nested_field_errors_are_flattened() {
        let body = r#"{"errors":{"user_profile":{"nid":["Invalid NID"]}},"context":"user profile creation failed"}"#;
        let err = ApiError::from_response(400, body);
        assert_eq!(err.user_message("fallback"), "user_profile.nid: Invalid NID");
    }

    #[test]
    fn otp_field_error_is_addressable() {
        let err = ApiError::from_response(400, r#"{"otp":["Invalid or expired OTP."]}"#);
        assert_eq!(err.field_message("otp"), Some("Invalid or expired OTP."));
        assert_eq!(err.user_message("fallback"), "otp: Invalid or expired OTP.");

        let err = ApiError::from_response(400, r#"{"errors":{"otp":["Invalid or expired OTP."]}}"#);
        assert_eq!(err.field_message("otp"), Some("Invalid or expired OTP."));
    }

    #[test]
    fn error_key_and_context_are_last_resorts() {
        let err = ApiError::from_response(401, r#"{"error":"Not logged in"}"#);
        assert_eq!(err.user_message("fallback"), "Not logged in");

        let err = ApiError::from_response(400, r#"{"context":"user creation failed"}"#);
        assert_eq!(err.user_message("fallback"), "user creation failed");
    }

    #[test]
    fn empty_object_falls_back() {
        let err = ApiError::from_response(500, "{}");
        assert_eq!(err.user_message("fallback"), "fallback");
    }

    #[test]
    fn unparseable_body_falls_back() {
        let err = ApiError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err.user_message("An unknown error occurred."), "An unknown error occurred.");
    }

    #[test]
    fn transport_errors_use_fallback() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.user_message("generic"), "generic");
        assert_eq!(err.status(), None);
    }
}
