//! Caller identity.
//!
//! A [`Principal`] is what an identity provider hands the dispatcher: a name,
//! a set of roles and a list of claims. Policies are satisfied by claims of
//! type [`POLICY_CLAIM_TYPE`].

use serde::{Deserialize, Serialize};

/// Claim type that grants a named policy.
pub const POLICY_CLAIM_TYPE: &str = "AuthorizationDecision";

/// Claim type carrying the caller's display name.
pub const NAME_CLAIM_TYPE: &str = "name";

/// Claim type carrying a role.
pub const ROLE_CLAIM_TYPE: &str = "role";

/// A single claim about the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// The identity behind a request.
///
/// # Example
///
/// ```
/// use swiftapi_core::Principal;
///
/// let principal = Principal::authenticated("alice")
///     .with_role("ops")
///     .with_policy("CanRead");
///
/// assert!(principal.has_role("ops"));
/// assert!(principal.satisfies_policy("CanRead"));
/// assert_eq!(principal.log_id(), "user:alice");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    name: Option<String>,
    authenticated: bool,
    roles: Vec<String>,
    claims: Vec<Claim>,
}

impl Principal {
    /// An unauthenticated caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated caller with the given name.
    #[must_use]
    pub fn authenticated(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            claims: vec![Claim::new(NAME_CLAIM_TYPE, name.clone())],
            name: Some(name),
            authenticated: true,
            roles: Vec::new(),
        }
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        self.claims.push(Claim::new(ROLE_CLAIM_TYPE, role.clone()));
        self.roles.push(role);
        self
    }

    /// Adds a claim.
    #[must_use]
    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Grants a policy.
    #[must_use]
    pub fn with_policy(self, policy: impl Into<String>) -> Self {
        self.with_claim(Claim::new(POLICY_CLAIM_TYPE, policy))
    }

    /// The caller's name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the caller is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Roles held.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// All claims.
    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Returns `true` if the caller holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns `true` if a claim with this type and value exists.
    #[must_use]
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type == claim_type && c.value == value)
    }

    /// Returns `true` if the caller carries the policy claim.
    #[must_use]
    pub fn satisfies_policy(&self, policy: &str) -> bool {
        self.has_claim(POLICY_CLAIM_TYPE, policy)
    }

    /// A string identifier suitable for logging.
    #[must_use]
    pub fn log_id(&self) -> String {
        match (&self.name, self.authenticated) {
            (Some(name), true) => format!("user:{name}"),
            (None, true) => "user:unnamed".to_string(),
            _ => "anonymous".to_string(),
        }
    }
}
