//! Error types and the error translator for SwiftAPI.
//!
//! This module provides the [`SwiftError`] type, which is threaded through
//! every dispatch stage as the error half of a [`SwiftResult`], and the
//! [`ProblemDetails`] payload every failure is rendered as.
//!
//! # Error Kinds
//!
//! Each error carries an [`ErrorKind`], and each kind maps to exactly one
//! status, title and canonical type URI:
//!
//! | `ErrorKind` | Status | Title |
//! |---|---|---|
//! | `InvalidArgument` | 400 | Invalid input |
//! | `Unauthenticated` | 401 | Unauthorized |
//! | `ForbiddenRole` | 401 | Unauthorized |
//! | `ForbiddenPolicy` | 401 | Unauthorized |
//! | `NotFound` | 404 | Resource not found |
//! | `MethodNotAllowed` | 405 | Method not allowed |
//! | `Timeout` | 408 | Request timed out |
//! | `Conflict` | 409 | Operation conflict |
//! | `Validation` | 422 | Validation failed |
//! | `Cancelled` | 499 | Operation cancelled |
//! | `NotImplemented` | 501 | Feature not implemented |
//! | `Internal` | 500 | Unexpected error |
//!
//! Role and policy failures keep their own kinds for logging and matching but
//! share the 401 wire status with unauthenticated callers.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using [`SwiftError`].
pub type SwiftResult<T> = Result<T, SwiftError>;

/// Base of every problem type URI.
pub const PROBLEM_TYPE_BASE: &str = "https://httpstatuses.org";

/// Detail shown for internal errors in place of the real message.
const INTERNAL_DETAIL: &str = "An unexpected error occurred.";

/// Classification of failures for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid argument or malformed input.
    InvalidArgument,
    /// The caller presented no authenticated identity.
    Unauthenticated,
    /// The caller lacks every role the contract accepts.
    ForbiddenRole,
    /// The caller satisfies none of the policies the action accepts.
    ForbiddenPolicy,
    /// Resource or key not found.
    NotFound,
    /// The path exists but not for the requested verb.
    MethodNotAllowed,
    /// Unsupported or not implemented.
    NotImplemented,
    /// Conflicting operation state.
    Conflict,
    /// The operation timed out.
    Timeout,
    /// The operation was cancelled.
    Cancelled,
    /// Validation failure.
    Validation,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Returns the numeric status code for this kind.
    ///
    /// Returned as a plain `u16` because `499` has no [`StatusCode`] constant.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::Unauthenticated | Self::ForbiddenRole | Self::ForbiddenPolicy => 401,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Timeout => 408,
            Self::Conflict => 409,
            Self::Validation => 422,
            Self::Cancelled => 499,
            Self::NotImplemented => 501,
            Self::Internal => 500,
        }
    }

    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the problem title for this kind.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "Invalid input",
            Self::Unauthenticated | Self::ForbiddenRole | Self::ForbiddenPolicy => "Unauthorized",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::NotImplemented => "Feature not implemented",
            Self::Conflict => "Operation conflict",
            Self::Timeout => "Request timed out",
            Self::Cancelled => "Operation cancelled",
            Self::Validation => "Validation failed",
            Self::Internal => "Unexpected error",
        }
    }

    /// Returns the canonical type URI for this kind.
    #[must_use]
    pub fn type_uri(&self) -> String {
        format!("{PROBLEM_TYPE_BASE}/{}", self.status())
    }
}

/// Standard error type for SwiftAPI.
///
/// The display text of every variant is the human-readable detail that ends
/// up in the problem payload, except for [`SwiftError::Internal`], whose
/// message is only logged.
///
/// # Example
///
/// ```
/// use swiftapi_core::{ErrorKind, SwiftError};
///
/// let error = SwiftError::not_found("Order 42 does not exist");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// assert_eq!(error.kind().status(), 404);
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SwiftError {
    /// An argument could not be read or converted.
    #[error("{message}")]
    InvalidArgument {
        /// Human-readable error message.
        message: String,
        /// The parameter that failed, if known.
        parameter: Option<String>,
    },

    /// No authenticated identity.
    #[error("{message}")]
    Unauthenticated {
        /// Human-readable error message.
        message: String,
    },

    /// None of the required roles is held.
    #[error("User does not have the required role: {roles}.")]
    ForbiddenRole {
        /// The accepted roles, comma separated.
        roles: String,
    },

    /// None of the required policies is satisfied.
    #[error("User does not meet the required policy: {policies}.")]
    ForbiddenPolicy {
        /// The accepted policies, comma separated.
        policies: String,
    },

    /// Resource not found.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Verb not bound for an existing path.
    #[error("Method {method} is not allowed for this route")]
    MethodNotAllowed {
        /// The requested method.
        method: String,
        /// The methods the path accepts.
        allowed: Vec<String>,
    },

    /// Not implemented.
    #[error("{message}")]
    NotImplemented {
        /// Human-readable error message.
        message: String,
    },

    /// Conflicting state.
    #[error("{message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Timed out.
    #[error("{message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Cancelled.
    #[error("{message}")]
    Cancelled {
        /// Human-readable error message.
        message: String,
    },

    /// Validation failure.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// Internal error.
    #[error("{message}")]
    Internal {
        /// Message for logs, never sent to callers.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl SwiftError {
    /// Creates an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            parameter: None,
        }
    }

    /// Creates an invalid-argument error naming the parameter.
    #[must_use]
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    /// Creates an unauthenticated error with the standard message.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated {
            message: "User is not authenticated.".to_string(),
        }
    }

    /// Creates a forbidden-role error.
    #[must_use]
    pub fn forbidden_role(roles: &[String]) -> Self {
        Self::ForbiddenRole {
            roles: roles.join(","),
        }
    }

    /// Creates a forbidden-policy error.
    #[must_use]
    pub fn forbidden_policy(policies: &[String]) -> Self {
        Self::ForbiddenPolicy {
            policies: policies.join(","),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a method-not-allowed error.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>, allowed: Vec<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
            allowed,
        }
    }

    /// Creates a not-implemented error.
    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Self::ForbiddenRole { .. } => ErrorKind::ForbiddenRole,
            Self::ForbiddenPolicy { .. } => ErrorKind::ForbiddenPolicy,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            Self::NotImplemented { .. } => ErrorKind::NotImplemented,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Converts this error into its problem payload.
    #[must_use]
    pub fn to_problem(&self) -> ProblemDetails {
        ProblemDetails::from_error(self)
    }
}

impl From<anyhow::Error> for SwiftError {
    fn from(source: anyhow::Error) -> Self {
        Self::Internal {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

impl From<serde_json::Error> for SwiftError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_with_source("JSON serialization failed", err)
    }
}

/// Field-specific validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Error)]
#[error("Field validation errors")]
pub struct FieldErrors {
    /// Map of field path to list of error messages.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Structured failure payload sent to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// HTTP status code.
    pub status: u16,
    /// Short title for the failure kind.
    pub title: String,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Canonical type URI.
    #[serde(rename = "type")]
    pub type_uri: String,
    /// Per-field messages of a validation failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ProblemDetails {
    /// Media type of the serialized payload.
    pub const CONTENT_TYPE: &'static str = "application/problem+json";

    /// Translates an error into a problem payload.
    ///
    /// Never fails; internal errors get a generic detail.
    #[must_use]
    pub fn from_error(error: &SwiftError) -> Self {
        let kind = error.kind();
        let detail = match kind {
            ErrorKind::Internal => INTERNAL_DETAIL.to_string(),
            _ => error.to_string(),
        };
        Self {
            status: kind.status(),
            title: kind.title().to_string(),
            detail: Some(detail),
            type_uri: kind.type_uri(),
            errors: match error {
                SwiftError::Validation {
                    field_errors: Some(fields),
                    ..
                } if !fields.is_empty() => Some(fields.fields.clone()),
                _ => None,
            },
        }
    }

    /// Serializes the payload.
    #[must_use]
    pub fn to_json_bytes(&self) -> bytes::Bytes {
        serde_json::to_vec(self)
            .map(bytes::Bytes::from)
            .unwrap_or_else(|_| bytes::Bytes::from_static(b"{}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let table = [
            (SwiftError::invalid_argument("x"), 400, "Invalid input"),
            (SwiftError::unauthenticated(), 401, "Unauthorized"),
            (SwiftError::not_found("x"), 404, "Resource not found"),
            (SwiftError::not_implemented("x"), 501, "Feature not implemented"),
            (SwiftError::conflict("x"), 409, "Operation conflict"),
            (SwiftError::timeout("x"), 408, "Request timed out"),
            (SwiftError::cancelled("x"), 499, "Operation cancelled"),
            (SwiftError::validation("x"), 422, "Validation failed"),
            (SwiftError::internal("x"), 500, "Unexpected error"),
        ];

        for (error, status, title) in table {
            let problem = error.to_problem();
            assert_eq!(problem.status, status);
            assert_eq!(problem.title, title);
            assert_eq!(problem.type_uri, format!("https://httpstatuses.org/{status}"));
        }
    }

    #[test]
    fn test_forbidden_kinds_render_as_unauthorized() {
        let role = SwiftError::forbidden_role(&["admin".to_string(), "ops".to_string()]);
        assert_eq!(role.kind(), ErrorKind::ForbiddenRole);
        assert_eq!(role.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            role.to_string(),
            "User does not have the required role: admin,ops."
        );

        let policy = SwiftError::forbidden_policy(&["CanRead".to_string()]);
        assert_eq!(policy.kind(), ErrorKind::ForbiddenPolicy);
        assert_eq!(policy.to_problem().status, 401);
    }

    #[test]
    fn test_cancelled_status_code() {
        let error = SwiftError::cancelled("caller went away");
        assert_eq!(error.status_code().as_u16(), 499);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let error = SwiftError::internal("connection to 10.0.0.7 refused");
        let problem = error.to_problem();
        assert_eq!(problem.detail.as_deref(), Some("An unexpected error occurred."));
    }

    #[test]
    fn test_anyhow_conversion() {
        let error: SwiftError = anyhow::anyhow!("boom").into();
        assert_eq!(error.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_problem_serialization() {
        let problem = SwiftError::not_found("Order 7 does not exist").to_problem();
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["title"], "Resource not found");
        assert_eq!(json["detail"], "Order 7 does not exist");
        assert_eq!(json["type"], "https://httpstatuses.org/404");
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("email", "Invalid format");
        errors.add("email", "Required");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.fields["email"].len(), 2);

        let error = SwiftError::validation_with_fields("Validation failed", errors);
        assert_eq!(error.kind(), ErrorKind::Validation);

        let json = serde_json::to_value(error.to_problem()).unwrap();
        assert_eq!(json["status"], 422);
        assert_eq!(json["errors"]["email"][1], "Required");
    }

    #[test]
    fn test_errors_omitted_without_field_errors() {
        let json = serde_json::to_value(SwiftError::validation("bad").to_problem()).unwrap();
        assert!(json.get("errors").is_none());
    }
}
