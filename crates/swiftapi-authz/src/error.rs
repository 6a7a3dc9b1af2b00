//! Error types for the authorization crate.

use swiftapi_core::SwiftError;
use thiserror::Error;

/// Result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Reasons a caller is refused, and provider setup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthzError {
    /// No authenticated identity was presented.
    #[error("User is not authenticated.")]
    Unauthenticated,

    /// The caller holds none of the accepted roles.
    #[error("User does not have the required role: {}.", roles.join(","))]
    ForbiddenRole {
        /// Accepted roles.
        roles: Vec<String>,
    },

    /// The caller satisfies none of the accepted policies.
    #[error("User does not meet the required policy: {}.", policies.join(","))]
    ForbiddenPolicy {
        /// Accepted policies.
        policies: Vec<String>,
    },

    /// An identity provider was configured with an unusable header name.
    #[error("invalid credential header name: {name}")]
    InvalidHeaderName {
        /// The rejected name.
        name: String,
    },
}

impl AuthzError {
    /// Create a forbidden-role error.
    pub fn forbidden_role(roles: &[String]) -> Self {
        Self::ForbiddenRole {
            roles: roles.to_vec(),
        }
    }

    /// Create a forbidden-policy error.
    pub fn forbidden_policy(policies: &[String]) -> Self {
        Self::ForbiddenPolicy {
            policies: policies.to_vec(),
        }
    }

    /// Check if the caller was authenticated but lacked a grant.
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::ForbiddenRole { .. } | Self::ForbiddenPolicy { .. })
    }
}

impl From<AuthzError> for SwiftError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => SwiftError::unauthenticated(),
            AuthzError::ForbiddenRole { roles } => SwiftError::forbidden_role(&roles),
            AuthzError::ForbiddenPolicy { policies } => SwiftError::forbidden_policy(&policies),
            err @ AuthzError::InvalidHeaderName { .. } => SwiftError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftapi_core::ErrorKind;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthzError::Unauthenticated.to_string(), "User is not authenticated.");

        let err = AuthzError::forbidden_role(&["admin".to_string(), "ops".to_string()]);
        assert_eq!(err.to_string(), "User does not have the required role: admin,ops.");

        let err = AuthzError::forbidden_policy(&["CanRead".to_string()]);
        assert_eq!(err.to_string(), "User does not meet the required policy: CanRead.");
    }

    #[test]
    fn test_is_forbidden() {
        assert!(!AuthzError::Unauthenticated.is_forbidden());
        assert!(AuthzError::forbidden_role(&[]).is_forbidden());
    }

    #[test]
    fn test_conversion_keeps_kind_and_detail() {
        let err: SwiftError = AuthzError::forbidden_role(&["admin".to_string()]).into();
        assert_eq!(err.kind(), ErrorKind::ForbiddenRole);
        assert_eq!(err.status_code().as_u16(), 401);
        assert_eq!(err.to_string(), "User does not have the required role: admin.");

        let err: SwiftError = AuthzError::Unauthenticated.into();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }
}
