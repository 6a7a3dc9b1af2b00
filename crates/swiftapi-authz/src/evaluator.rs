//! Access rule evaluation.
//!
//! Security metadata on a contract and its actions is compiled once, when
//! routes are built, into an [`AccessRule`]. Per request the rule is checked
//! against the caller's [`Principal`].
//!
//! Compilation:
//!
//! 1. An open marker on the contract or the action makes the rule
//!    [`AccessRule::Public`], whatever else is declared.
//! 2. With no requirement on either level the rule is also public.
//! 3. Otherwise the caller must be authenticated. Roles come from the
//!    contract and policies from the action; each non-empty set must be met
//!    by at least one entry. Roles declared on an action and policies
//!    declared on a contract only mark the action as protected.

use swiftapi_core::{Action, Contract, Principal};
use tracing::{debug, instrument};

use crate::error::{AuthzError, AuthzResult};

/// Compiled authorization rule for one action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessRule {
    /// Anyone may call.
    #[default]
    Public,
    /// An authenticated caller holding one of `roles` and satisfying one of
    /// `policies`. Empty sets are not checked.
    Protected {
        /// Roles accepted by the contract.
        roles: Vec<String>,
        /// Policies accepted by the action.
        policies: Vec<String>,
    },
}

impl AccessRule {
    /// Compiles the rule for `action` declared on `contract`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use swiftapi_authz::AccessRule;
    /// use swiftapi_core::{Action, Contract, SecurityRequirement};
    ///
    /// let contract = Contract::builder("Reports")
    ///     .secure(SecurityRequirement::roles(["admin"]))
    ///     .action(Action::get("Daily"))
    ///     .action(Action::get("Health").open())
    ///     .build();
    ///
    /// let daily = AccessRule::compile(&contract, &contract.actions()[0]);
    /// let health = AccessRule::compile(&contract, &contract.actions()[1]);
    /// assert!(daily.requires_authorization());
    /// assert!(!health.requires_authorization());
    /// ```
    #[must_use]
    pub fn compile(contract: &Contract, action: &Action) -> Self {
        if contract.is_open() || action.is_open() {
            return Self::Public;
        }

        match (contract.security(), action.security()) {
            (None, None) => Self::Public,
            (on_contract, on_action) => Self::Protected {
                roles: on_contract.map(|r| r.roles.clone()).unwrap_or_default(),
                policies: on_action.map(|r| r.policies.clone()).unwrap_or_default(),
            },
        }
    }

    /// Returns `true` if callers must authenticate.
    #[must_use]
    pub const fn requires_authorization(&self) -> bool {
        matches!(self, Self::Protected { .. })
    }

    /// Roles checked by the rule, for documentation.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        match self {
            Self::Public => &[],
            Self::Protected { roles, .. } => roles,
        }
    }

    /// Policies checked by the rule, for documentation.
    #[must_use]
    pub fn policies(&self) -> &[String] {
        match self {
            Self::Public => &[],
            Self::Protected { policies, .. } => policies,
        }
    }

    /// Checks `principal` against the rule.
    ///
    /// Pass [`Principal::anonymous`] when no identity was presented.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthenticated`] for anonymous callers of a
    /// protected action, otherwise the role or policy set the caller fails
    /// to satisfy, roles first.
    #[instrument(level = "debug", skip_all, fields(caller = %principal.log_id()))]
    pub fn authorize(&self, principal: &Principal) -> AuthzResult<()> {
        let Self::Protected { roles, policies } = self else {
            return Ok(());
        };

        if !principal.is_authenticated() {
            debug!("rejected anonymous caller");
            return Err(AuthzError::Unauthenticated);
        }

        if !roles.is_empty() && !roles.iter().any(|role| principal.has_role(role)) {
            debug!(required = ?roles, held = ?principal.roles(), "no matching role");
            return Err(AuthzError::forbidden_role(roles));
        }

        if !policies.is_empty() && !policies.iter().any(|policy| principal.satisfies_policy(policy)) {
            debug!(required = ?policies, "no matching policy claim");
            return Err(AuthzError::forbidden_policy(policies));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftapi_core::SecurityRequirement as Req;

    fn rule(contract: Option<Req>, action: Option<Req>) -> AccessRule {
        let mut builder = Contract::builder("Things");
        if let Some(req) = contract {
            builder = builder.secure(req);
        }
        let mut act = Action::get("List");
        if let Some(req) = action {
            act = act.secure(req);
        }
        let contract = builder.action(act).build();
        AccessRule::compile(&contract, &contract.actions()[0])
    }

    #[test]
    fn test_no_metadata_is_public() {
        let rule = rule(None, None);
        assert_eq!(rule, AccessRule::Public);
        assert!(rule.authorize(&Principal::anonymous()).is_ok());
    }

    #[test]
    fn test_open_marker_overrides_requirements() {
        let contract = Contract::builder("Things")
            .secure(Req::roles(["admin"]))
            .open()
            .action(Action::get("List").secure(Req::policies(["CanList"])))
            .build();
        let rule = AccessRule::compile(&contract, &contract.actions()[0]);
        assert!(!rule.requires_authorization());
    }

    #[test]
    fn test_anonymous_rejected() {
        let rule = rule(Some(Req::authenticated()), None);
        assert_eq!(rule.authorize(&Principal::anonymous()), Err(AuthzError::Unauthenticated));
        assert!(rule.authorize(&Principal::authenticated("amy")).is_ok());
    }

    #[test]
    fn test_any_role_suffices() {
        let rule = rule(Some(Req::roles(["admin", "ops"])), None);

        let ops = Principal::authenticated("oz").with_role("ops");
        assert!(rule.authorize(&ops).is_ok());

        let user = Principal::authenticated("ursula").with_role("user");
        assert!(matches!(rule.authorize(&user), Err(AuthzError::ForbiddenRole { .. })));
    }

    #[test]
    fn test_any_policy_suffices() {
        let rule = rule(None, Some(Req::policies(["CanRead", "CanWrite"])));

        let writer = Principal::authenticated("wim").with_policy("CanWrite");
        assert!(rule.authorize(&writer).is_ok());

        let nobody = Principal::authenticated("nia");
        assert!(matches!(rule.authorize(&nobody), Err(AuthzError::ForbiddenPolicy { .. })));
    }

    #[test]
    fn test_role_and_policy_both_apply() {
        let rule = rule(Some(Req::roles(["admin"])), Some(Req::policies(["CanDelete"])));

        let admin = Principal::authenticated("ada").with_role("admin");
        assert!(matches!(rule.authorize(&admin), Err(AuthzError::ForbiddenPolicy { .. })));

        let granted = admin.with_policy("CanDelete");
        assert!(rule.authorize(&granted).is_ok());

        let policy_only = Principal::authenticated("pat").with_policy("CanDelete");
        assert!(matches!(rule.authorize(&policy_only), Err(AuthzError::ForbiddenRole { .. })));
    }

    #[test]
    fn test_action_roles_only_require_authentication() {
        let rule = rule(None, Some(Req::roles(["manager"])));
        assert!(rule.requires_authorization());
        assert!(rule.roles().is_empty());

        assert_eq!(rule.authorize(&Principal::anonymous()), Err(AuthzError::Unauthenticated));
        assert!(rule.authorize(&Principal::authenticated("amy")).is_ok());
    }

    #[test]
    fn test_contract_policies_only_require_authentication() {
        let rule = rule(Some(Req::policies(["CanAudit"])), None);
        assert!(rule.policies().is_empty());
        assert!(rule.authorize(&Principal::authenticated("amy")).is_ok());
    }

    #[test]
    fn test_roles_taken_from_contract_only() {
        let rule = rule(Some(Req::roles(["staff"])), Some(Req::roles(["manager"])));
        assert_eq!(rule.roles(), ["staff".to_string()]);

        let staff = Principal::authenticated("sam").with_role("staff");
        assert!(rule.authorize(&staff).is_ok());

        let manager = Principal::authenticated("max").with_role("manager");
        assert!(matches!(rule.authorize(&manager), Err(AuthzError::ForbiddenRole { .. })));
    }
}
