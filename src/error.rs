// Request-level error taxonomy. Parsers never fail and malformed records are
// dropped locally, so only whole-request failures end up here.

use serde::Serialize;
use thiserror::Error;

pub const BODY_EXCERPT_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("API error (status {status:?}): {message}")]
    Api {
        status: Option<u16>,
        message: String,
        body_excerpt: Option<String>,
    },

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Unexpected error: {message}")]
    Unknown {
        message: String,
        cause: Option<anyhow::Error>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    ValidationError,
    ApiError,
    TimeoutError,
    UnknownError,
}

// What the caller hands to its own transport layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub user_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation {
            message: message.into(),
        }
    }

    pub fn api(status: Option<u16>, message: impl Into<String>, body: Option<&str>) -> Self {
        BookingError::Api {
            status,
            message: message.into(),
            body_excerpt: body.map(truncate_body),
        }
    }

    pub fn unknown(message: impl Into<String>, cause: Option<anyhow::Error>) -> Self {
        BookingError::Unknown {
            message: message.into(),
            cause,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            BookingError::Validation { .. } => ErrorType::ValidationError,
            BookingError::Api { .. } => ErrorType::ApiError,
            BookingError::Timeout { .. } => ErrorType::TimeoutError,
            BookingError::Unknown { .. } => ErrorType::UnknownError,
        }
    }

    // Text safe to show an end user; technical detail stays in `details()`
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation { message } => message.clone(),
            BookingError::Api {
                status: Some(404 | 410),
                ..
            } => "This fare is no longer available. Please search again.".to_string(),
            BookingError::Api {
                status: Some(401 | 403),
                ..
            } => "We could not reach our flight provider. Please try again later.".to_string(),
            BookingError::Api { .. } => {
                "Our flight provider returned an error. Please try again.".to_string()
            }
            BookingError::Timeout { .. } => {
                "The search is taking longer than expected. Please try again.".to_string()
            }
            BookingError::Unknown { .. } => {
                "Something went wrong, the fare may have expired. Please search again.".to_string()
            }
        }
    }

    pub fn details(&self) -> Option<String> {
        match self {
            BookingError::Validation { .. } => None,
            BookingError::Api {
                message,
                body_excerpt,
                ..
            } => Some(match body_excerpt {
                Some(body) => format!("{}; body: {}", message, body),
                None => message.clone(),
            }),
            BookingError::Timeout {
                operation,
                after_ms,
            } => Some(format!("{} exceeded {}ms", operation, after_ms)),
            BookingError::Unknown { message, cause } => Some(match cause {
                Some(cause) => format!("{}: {:?}", message, cause),
                None => message.clone(),
            }),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BookingError::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BookingError::Timeout { .. })
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            error_type: self.error_type(),
            user_message: self.user_message(),
            status: self.status(),
            details: self.details(),
        }
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return BookingError::Timeout {
                operation: err
                    .url()
                    .map_or("upstream request".to_string(), |u| u.path().to_string()),
                after_ms: 0,
            };
        }
        let status = err.status().map(|s| s.as_u16());
        BookingError::api(status, err.to_string(), None)
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::api(None, format!("invalid response payload: {}", err), None)
    }
}

pub fn truncate_body(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_LIMIT {
        return body.to_string();
    }
    let excerpt: String = body.chars().take(BODY_EXCERPT_LIMIT).collect();
    format!("{}...", excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tags_and_messages() {
        let err = BookingError::validation("Segment id is required");
        assert_eq!(err.error_type(), ErrorType::ValidationError);
        assert_eq!(err.user_message(), "Segment id is required");

        let err = BookingError::Timeout {
            operation: "search".to_string(),
            after_ms: 30_000,
        };
        assert!(err.is_timeout());
        assert_eq!(err.details().unwrap(), "search exceeded 30000ms");
    }

    #[test]
    fn test_unknown_error_keeps_details_out_of_user_message() {
        let err = BookingError::unknown(
            "price check parse failed",
            Some(anyhow::anyhow!("missing field `total` at line 1")),
        );
        assert!(err.user_message().contains("fare may have expired"));
        assert!(!err.user_message().contains("missing field"));
        assert!(err.details().unwrap().contains("missing field"));
    }

    #[test]
    fn test_api_error_truncates_body() {
        let body = "x".repeat(2_000);
        let err = BookingError::api(Some(502), "bad gateway", Some(&body));
        match &err {
            BookingError::Api { body_excerpt, .. } => {
                let excerpt = body_excerpt.as_ref().unwrap();
                assert_eq!(excerpt.len(), BODY_EXCERPT_LIMIT + 3);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_payload_serialization() {
        let payload = BookingError::api(Some(404), "not found", None).to_payload();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "API_ERROR");
        assert_eq!(json["status"], 404);
        assert!(json["userMessage"].as_str().unwrap().contains("no longer available"));
    }
}
