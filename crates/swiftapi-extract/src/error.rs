//! Extraction error types.
//!
//! This module provides error types for extraction failures,
//! including information about the source of the error.

use std::fmt;
use swiftapi_core::SwiftError;

/// Source of extraction (where data was being extracted from).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Path parameters (e.g., `/orders/{id}`)
    Path,
    /// Query string parameters
    Query,
    /// Request body (JSON, form, multipart)
    Body,
    /// HTTP headers
    Header,
    /// Content-Type header specifically
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::Header => write!(f, "header"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// Error that occurs during extraction.
///
/// Every extraction failure is a caller mistake, so all of them surface as
/// invalid-argument errors once converted into [`SwiftError`].
///
/// # Example
///
/// ```rust
/// use swiftapi_extract::{ExtractionError, ExtractionSource};
/// use swiftapi_core::{ErrorKind, SwiftError};
///
/// let err = ExtractionError::missing(ExtractionSource::Path, "page");
/// assert_eq!(err.extraction_source(), ExtractionSource::Path);
/// assert!(err.to_string().contains("page"));
///
/// let swift: SwiftError = err.into();
/// assert_eq!(swift.kind(), ErrorKind::InvalidArgument);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Required field or parameter is missing
    Missing,
    /// Value has invalid type or format
    InvalidType,
    /// Deserialization failed
    DeserializationFailed,
    /// Body is too large
    PayloadTooLarge,
    /// Content-Type is unusable
    InvalidContentType,
}

impl ExtractionError {
    /// Creates an error for a missing field or parameter.
    #[must_use]
    pub fn missing(source: ExtractionSource, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Missing,
            message: format!("missing required {source} parameter: {field}"),
            field: Some(field),
        }
    }

    /// Creates an error for an invalid type or format.
    #[must_use]
    pub fn invalid_type(
        source: ExtractionSource,
        field: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let details = details.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::InvalidType,
            message: format!("invalid {source} parameter '{field}': {details}"),
            field: Some(field),
        }
    }

    /// Creates an error for deserialization failure.
    #[must_use]
    pub fn deserialization_failed(source: ExtractionSource, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to deserialize {source}: {error}"),
            field: None,
        }
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!(
                "payload too large: max {max_size} bytes, got {actual_size} bytes"
            ),
            field: None,
        }
    }

    /// Creates an error for a malformed Content-Type header.
    #[must_use]
    pub fn invalid_content_type(details: impl Into<String>) -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::InvalidContentType,
            message: format!("invalid content type: {}", details.into()),
            field: None,
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the field name if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the error code suitable for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "MISSING_PARAMETER",
            ExtractionErrorKind::InvalidType => "INVALID_PARAMETER",
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::InvalidContentType => "INVALID_CONTENT_TYPE",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for SwiftError {
    fn from(err: ExtractionError) -> Self {
        match err.field {
            Some(field) => SwiftError::invalid_parameter(field, err.message),
            None => SwiftError::invalid_argument(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftapi_core::ErrorKind;

    #[test]
    fn test_missing_error() {
        let err = ExtractionError::missing(ExtractionSource::Path, "user_id");

        assert_eq!(err.extraction_source(), ExtractionSource::Path);
        assert_eq!(err.field(), Some("user_id"));
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
        assert!(err.to_string().contains("user_id"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_invalid_type_error() {
        let err = ExtractionError::invalid_type(
            ExtractionSource::Query,
            "limit",
            "expected integer",
        );

        assert_eq!(err.extraction_source(), ExtractionSource::Query);
        assert_eq!(err.field(), Some("limit"));
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
        assert!(err.to_string().contains("limit"));
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn test_payload_too_large_error() {
        let err = ExtractionError::payload_too_large(1024, 2048);

        assert_eq!(err.extraction_source(), ExtractionSource::Body);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(err.to_string().contains("1024"));
        assert!(err.to_string().contains("2048"));
    }

    #[test]
    fn test_converts_to_invalid_argument() {
        let err: SwiftError =
            ExtractionError::invalid_type(ExtractionSource::Query, "page", "not a number").into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(matches!(
            err,
            SwiftError::InvalidArgument { parameter: Some(ref p), .. } if p == "page"
        ));

        let err: SwiftError = ExtractionError::invalid_content_type("no boundary").into();
        assert_eq!(err.kind().status(), 400);
    }

    #[test]
    fn test_extraction_source_display() {
        assert_eq!(ExtractionSource::Path.to_string(), "path");
        assert_eq!(ExtractionSource::Query.to_string(), "query");
        assert_eq!(ExtractionSource::Body.to_string(), "body");
        assert_eq!(ExtractionSource::Header.to_string(), "header");
        assert_eq!(ExtractionSource::ContentType.to_string(), "content-type");
    }
}
