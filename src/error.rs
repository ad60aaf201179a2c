// Client-side API error types
use std::collections::HashMap;

use serde_json::Value;

/// Error raised by any REST call, classified by the failure the user has to
/// recover from. Messages supplied by the server are passed through verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, refused connection, timeout.
    #[error("{0}")]
    Network(String),

    // 400 Bad Request without field detail
    #[error("{0}")]
    BadRequest(String),

    // 400/422 with per-field messages
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 401 Unauthorized
    #[error("{0}")]
    Unauthorized(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 5xx
    #[error("{0}")]
    Server(String),
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::Validation { message: message.into(), field_errors }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn server(message: impl Into<String>) -> Self {
        ApiError::Server(message.into())
    }

    /// HTTP status that produced this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Network(_) => None,
            ApiError::BadRequest(_) | ApiError::Validation { .. } => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server(_) => Some(500),
        }
    }

    /// Human-readable message for page-level display.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Server(msg) => msg,
            ApiError::Validation { message, .. } => message,
        }
    }

    /// Per-field messages, present only for validation errors.
    pub fn field_errors(&self) -> Option<&HashMap<String, String>> {
        match self {
            ApiError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Classify a non-2xx response. The body is inspected for the message
    /// keys the backend uses (`detail`, `error`, `message`) and, on 400/422,
    /// for DRF-style `{field: ["msg", ...]}` maps.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = extract_message(body);

        match status {
            400 | 422 => {
                let field_errors = extract_field_errors(body);
                if field_errors.is_empty() {
                    ApiError::BadRequest(message.unwrap_or_else(|| "Invalid request".to_string()))
                } else {
                    ApiError::Validation {
                        message: message.unwrap_or_else(|| "Validation failed".to_string()),
                        field_errors,
                    }
                }
            }
            401 => ApiError::Unauthorized(message.unwrap_or_else(|| "Authentication required".to_string())),
            403 => ApiError::Forbidden(message.unwrap_or_else(|| "Permission denied".to_string())),
            404 => ApiError::NotFound(message.unwrap_or_else(|| "Not found".to_string())),
            s if s >= 500 => ApiError::Server(message.unwrap_or_else(|| "Server error".to_string())),
            _ => ApiError::BadRequest(message.unwrap_or_else(|| format!("Request failed with status {}", status))),
        }
    }
}

/// Pull a top-level message out of an error body.
fn extract_message(body: &Value) -> Option<String> {
    for key in ["detail", "error", "message"] {
        if let Some(msg) = body.get(key).and_then(Value::as_str) {
            if !msg.is_empty() {
                return Some(msg.to_string());
            }
        }
    }
    None
}

/// Interpret the remaining body keys as field errors. DRF serializers report
/// `{"field": ["first problem", ...]}`; a plain string value is accepted too.
/// Only the first message per field is kept.
fn extract_field_errors(body: &Value) -> HashMap<String, String> {
    const MESSAGE_KEYS: &[&str] = &["detail", "error", "message", "code", "non_field_errors"];

    let mut field_errors = HashMap::new();
    let Some(obj) = body.as_object() else {
        return field_errors;
    };

    for (field, value) in obj {
        if MESSAGE_KEYS.contains(&field.as_str()) {
            continue;
        }
        let first = match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        if let Some(msg) = first {
            field_errors.insert(field.clone(), msg);
        }
    }

    field_errors
}
