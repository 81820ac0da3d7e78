// Client-side API error types
use serde_json::{json, Value};
use std::collections::HashMap;

/// Every failure a dashboard operation can surface.
///
/// Server failures keep their HTTP meaning so the shell can pick between a blocking
/// error panel (fetches) and a transient notification (mutations). Client-side
/// variants cover validation, transport and guard failures that never produced a
/// response. Nothing is retried automatically.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),

    // No response: connection refused, timeout, TLS
    Network(String),

    // Response arrived but its body did not have the expected shape
    Decode(String),

    // Client misconfiguration (bad base URL, client builder failure)
    Config(String),

    // A mutation trigger fired again before its previous call settled
    MutationInFlight(String),

    // Destructive action attempted without typing the identifier verbatim
    ConfirmationMismatch { expected: String },
}

impl ApiError {
    /// HTTP status code, if the error came from a server response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest(_) => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::UnprocessableEntity { .. } => Some(422),
            ApiError::TooManyRequests(_) => Some(429),
            ApiError::InternalServerError(_) => Some(500),
            ApiError::BadGateway(_) => Some(502),
            ApiError::ServiceUnavailable(_) => Some(503),
            ApiError::ValidationError { .. }
            | ApiError::Network(_)
            | ApiError::Decode(_)
            | ApiError::Config(_)
            | ApiError::MutationInFlight(_)
            | ApiError::ConfirmationMismatch { .. } => None,
        }
    }

    /// User-facing message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
            ApiError::Network(msg) => msg,
            ApiError::Decode(msg) => msg,
            ApiError::Config(msg) => msg,
            ApiError::MutationInFlight(msg) => msg,
            ApiError::ConfirmationMismatch { .. } => "Confirmation text does not match",
        }
    }

    /// Stable code for shells that branch on error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::MutationInFlight(_) => "MUTATION_IN_FLIGHT",
            ApiError::ConfirmationMismatch { .. } => "CONFIRMATION_MISMATCH",
        }
    }

    /// Field-level errors, when the failure is attributable to form fields
    pub fn field_errors(&self) -> Option<&HashMap<String, String>> {
        match self {
            ApiError::ValidationError { field_errors, .. }
            | ApiError::UnprocessableEntity { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Structured form for error panels and notifications
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code(),
        });

        if let Some(status) = self.status_code() {
            body["status"] = json!(status);
        }
        if let Some(field_errors) = self.field_errors() {
            body["field_errors"] = json!(field_errors);
        }
        if let ApiError::ConfirmationMismatch { expected } = self {
            body["expected"] = json!(expected);
        }

        body
    }

    /// Map a non-success response into an error, preferring the server's own message.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let server_message = parsed.as_ref().and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .or_else(|| v.get("error").and_then(Value::as_str))
                .map(str::to_string)
        });
        let field_errors: HashMap<String, String> = parsed
            .as_ref()
            .and_then(|v| v.get("field_errors").or_else(|| v.get("errors")))
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let message = server_message.unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("Request failed with status {}", status)
            } else {
                trimmed.to_string()
            }
        });

        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            422 => ApiError::UnprocessableEntity { message, field_errors },
            429 => ApiError::TooManyRequests(message),
            502 => ApiError::BadGateway(message),
            503 => ApiError::ServiceUnavailable(message),
            _ => ApiError::InternalServerError(message),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        ApiError::Config(message.into())
    }

    pub fn mutation_in_flight(message: impl Into<String>) -> Self {
        ApiError::MutationInFlight(message.into())
    }

    pub fn confirmation_mismatch(expected: impl Into<String>) -> Self {
        ApiError::ConfirmationMismatch {
            expected: expected.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), &err.to_string())
        } else {
            ApiError::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::decode(err.to_string())
    }
}

impl From<crate::filter::FilterError> for ApiError {
    fn from(err: crate::filter::FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::ConfirmationMismatch { expected } => {
                write!(f, "Type '{}' to confirm", expected)
            }
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}
