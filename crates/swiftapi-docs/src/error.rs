//! Error types for the documentation crate.
//!
//! Documentation is emitted once, when the application is built, so these
//! errors surface as build failures.

use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The configured security scheme is missing a required setting.
    #[error("Security scheme {scheme} requires {field}")]
    MissingSecuritySetting {
        /// The scheme being documented.
        scheme: &'static str,
        /// The missing setting.
        field: &'static str,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
