//! Router errors.

use swiftapi_core::HttpVerb;
use thiserror::Error;

/// Errors raised while building the routing table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
    /// Two routes share the same verb and path shape.
    #[error("duplicate route: {verb} {path}")]
    DuplicateRoute {
        /// The conflicting verb.
        verb: HttpVerb,
        /// The conflicting path template.
        path: String,
    },
}

impl RouterError {
    /// Creates a duplicate route error.
    #[must_use]
    pub fn duplicate_route(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self::DuplicateRoute {
            verb,
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_route_display() {
        let err = RouterError::duplicate_route(HttpVerb::Post, "api/orders/create");
        assert_eq!(err.to_string(), "duplicate route: POST api/orders/create");
    }
}
