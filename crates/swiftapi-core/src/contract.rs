//! Contract metadata.
//!
//! A [`Contract`] is a service boundary made of [`Action`]s. Each action has
//! an HTTP verb, ordered [`Parameter`]s with a binding source, a return type,
//! and optional security and cache metadata. Contracts are declared with
//! builders and compiled into the registry at startup.
//!
//! # Example
//!
//! ```
//! use swiftapi_core::contract::{Action, Contract, Parameter, SecurityRequirement};
//! use swiftapi_core::TypeDescriptor;
//!
//! let contract = Contract::builder("Orders")
//!     .secure(SecurityRequirement::roles(["admin", "ops"]))
//!     .action(
//!         Action::get("GetUserOrders")
//!             .param(Parameter::query("userId", TypeDescriptor::int32()))
//!             .param(Parameter::route("page", TypeDescriptor::int32()))
//!             .returns(TypeDescriptor::array(TypeDescriptor::named("Order"))),
//!     )
//!     .build();
//!
//! assert_eq!(contract.route_name(), "orders");
//! assert_eq!(contract.actions()[0].route_name(), "get_user_orders");
//! ```

use crate::naming::normalize;
use crate::types::TypeDescriptor;
use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The HTTP verb an action is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    /// GET, the default.
    #[default]
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl HttpVerb {
    /// Returns the matching [`Method`].
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }

    /// Returns the verb for a method, if it is one of the four supported.
    #[must_use]
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the upper-case verb name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BindingSource {
    /// Query string, the default.
    #[default]
    Query,
    /// Path segment.
    Route,
    /// Request header.
    Header,
    /// Request body or form payload.
    Body,
}

/// One input of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name as declared.
    pub name: String,
    /// Semantic type.
    pub ty: TypeDescriptor,
    /// Binding source.
    pub source: BindingSource,
    /// Whether callers may omit it.
    pub optional: bool,
}

impl Parameter {
    /// Creates a parameter with the default (query) binding.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            source: BindingSource::default(),
            optional: false,
        }
    }

    /// Creates a query-bound parameter.
    #[must_use]
    pub fn query(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, ty).from_source(BindingSource::Query)
    }

    /// Creates a route-bound parameter.
    #[must_use]
    pub fn route(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, ty).from_source(BindingSource::Route)
    }

    /// Creates a header-bound parameter.
    #[must_use]
    pub fn header(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, ty).from_source(BindingSource::Header)
    }

    /// Creates a body-bound parameter.
    #[must_use]
    pub fn body(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, ty).from_source(BindingSource::Body)
    }

    /// Sets the binding source.
    #[must_use]
    pub fn from_source(mut self, source: BindingSource) -> Self {
        self.source = source;
        self
    }

    /// Marks the parameter optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Role and policy constraint on a contract or action.
///
/// Within each set any single match suffices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRequirement {
    /// Accepted roles.
    pub roles: Vec<String>,
    /// Accepted policies.
    pub policies: Vec<String>,
}

impl SecurityRequirement {
    /// Requires an authenticated caller and nothing else.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requires one of the given roles.
    #[must_use]
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            policies: Vec::new(),
        }
    }

    /// Requires one of the given policies.
    #[must_use]
    pub fn policies<I, S>(policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: Vec::new(),
            policies: policies.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses comma-separated role and policy lists.
    ///
    /// Blank entries are dropped and the rest trimmed.
    #[must_use]
    pub fn parse(roles: Option<&str>, policies: Option<&str>) -> Self {
        fn split(list: Option<&str>) -> Vec<String> {
            list.map(|l| {
                l.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
        }
        Self {
            roles: split(roles),
            policies: split(policies),
        }
    }

    /// Adds accepted policies.
    #[must_use]
    pub fn with_policies<I, S>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies.extend(policies.into_iter().map(Into::into));
        self
    }
}

/// Output cache settings for a GET action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a stored response stays valid.
    pub duration: Duration,
    /// Whether the query string is part of the cache key.
    pub vary_by_query: bool,
    /// Whether request headers are part of the cache key.
    pub vary_by_header: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            vary_by_query: true,
            vary_by_header: true,
        }
    }
}

impl CachePolicy {
    /// A policy caching for the given number of minutes.
    #[must_use]
    pub fn minutes(minutes: u64) -> Self {
        Self {
            duration: Duration::from_secs(minutes.saturating_mul(60)),
            ..Self::default()
        }
    }
}

/// One operation on a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    method_name: String,
    explicit_name: Option<String>,
    verb: HttpVerb,
    params: Vec<Parameter>,
    returns: TypeDescriptor,
    cache: Option<CachePolicy>,
    security: Option<SecurityRequirement>,
    open: bool,
    content_type: Option<String>,
}

impl Action {
    /// Creates an action bound to `verb`.
    #[must_use]
    pub fn new(verb: HttpVerb, method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            explicit_name: None,
            verb,
            params: Vec::new(),
            returns: TypeDescriptor::Unit,
            cache: None,
            security: None,
            open: false,
            content_type: None,
        }
    }

    /// Creates a GET action.
    #[must_use]
    pub fn get(method_name: impl Into<String>) -> Self {
        Self::new(HttpVerb::Get, method_name)
    }

    /// Creates a POST action.
    #[must_use]
    pub fn post(method_name: impl Into<String>) -> Self {
        Self::new(HttpVerb::Post, method_name)
    }

    /// Creates a PUT action.
    #[must_use]
    pub fn put(method_name: impl Into<String>) -> Self {
        Self::new(HttpVerb::Put, method_name)
    }

    /// Creates a DELETE action.
    #[must_use]
    pub fn delete(method_name: impl Into<String>) -> Self {
        Self::new(HttpVerb::Delete, method_name)
    }

    /// Overrides the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn returns(mut self, ty: TypeDescriptor) -> Self {
        self.returns = ty;
        self
    }

    /// Enables output caching.
    #[must_use]
    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.cache = Some(policy);
        self
    }

    /// Attaches a security requirement.
    #[must_use]
    pub fn secure(mut self, requirement: SecurityRequirement) -> Self {
        self.security = Some(requirement);
        self
    }

    /// Marks the action public regardless of any requirement.
    #[must_use]
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    /// Sets the request content type used in documentation.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The declared method name, used to invoke the service.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The route segment for this action.
    #[must_use]
    pub fn route_name(&self) -> String {
        self.explicit_name
            .clone()
            .unwrap_or_else(|| normalize(&self.method_name))
    }

    /// The HTTP verb.
    #[must_use]
    pub const fn verb(&self) -> HttpVerb {
        self.verb
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// The return type; [`TypeDescriptor::Unit`] for none.
    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.returns
    }

    /// Output cache policy. Only GET actions are cached.
    #[must_use]
    pub fn cache_policy(&self) -> Option<&CachePolicy> {
        match self.verb {
            HttpVerb::Get => self.cache.as_ref(),
            _ => None,
        }
    }

    /// The action's own security requirement.
    #[must_use]
    pub fn security(&self) -> Option<&SecurityRequirement> {
        self.security.as_ref()
    }

    /// Whether the action carries the open marker.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Request content type for documentation.
    #[must_use]
    pub fn request_content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or("application/json")
    }
}

/// Binding of a model-shaped endpoint to an interface contract and the
/// implementation that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    /// The interface contract whose actions are exposed.
    pub interface: String,
    /// The service name the implementation is registered under.
    pub implementation: String,
}

/// A service boundary exposed over the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    type_name: String,
    explicit_name: Option<String>,
    actions: Vec<Action>,
    security: Option<SecurityRequirement>,
    open: bool,
    parents: Vec<String>,
    model_endpoint: Option<ModelEndpoint>,
}

impl Contract {
    /// Creates a contract builder.
    #[must_use]
    pub fn builder(type_name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(type_name)
    }

    /// The declared type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The route segment for this contract.
    #[must_use]
    pub fn route_name(&self) -> String {
        self.explicit_name
            .clone()
            .unwrap_or_else(|| normalize(&self.type_name))
    }

    /// Declared actions.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The contract-level security requirement.
    #[must_use]
    pub fn security(&self) -> Option<&SecurityRequirement> {
        self.security.as_ref()
    }

    /// Whether the contract carries the open marker.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Names of parent contracts whose actions are inherited.
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Model-endpoint binding, if any.
    #[must_use]
    pub fn model_endpoint(&self) -> Option<&ModelEndpoint> {
        self.model_endpoint.as_ref()
    }

    /// The service name resolved per request.
    #[must_use]
    pub fn service_name(&self) -> &str {
        self.model_endpoint
            .as_ref()
            .map_or(&self.type_name, |m| &m.implementation)
    }

    /// Returns a copy with `actions` replacing the declared ones.
    #[must_use]
    pub fn with_actions(&self, actions: Vec<Action>) -> Self {
        Self {
            actions,
            ..self.clone()
        }
    }
}

/// Builder for [`Contract`].
#[derive(Debug)]
pub struct ContractBuilder {
    contract: Contract,
}

impl ContractBuilder {
    /// Creates a builder for `type_name`.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            contract: Contract {
                type_name: type_name.into(),
                explicit_name: None,
                actions: Vec::new(),
                security: None,
                open: false,
                parents: Vec::new(),
                model_endpoint: None,
            },
        }
    }

    /// Overrides the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.contract.explicit_name = Some(name.into());
        self
    }

    /// Adds an action.
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.contract.actions.push(action);
        self
    }

    /// Adds several actions.
    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.contract.actions.extend(actions);
        self
    }

    /// Attaches a security requirement.
    #[must_use]
    pub fn secure(mut self, requirement: SecurityRequirement) -> Self {
        self.contract.security = Some(requirement);
        self
    }

    /// Marks every action public.
    #[must_use]
    pub fn open(mut self) -> Self {
        self.contract.open = true;
        self
    }

    /// Inherits actions from another registered contract.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.contract.parents.push(parent.into());
        self
    }

    /// Exposes the actions of `interface`, served by `implementation`.
    #[must_use]
    pub fn model_endpoint(
        mut self,
        interface: impl Into<String>,
        implementation: impl Into<String>,
    ) -> Self {
        self.contract.model_endpoint = Some(ModelEndpoint {
            interface: interface.into(),
            implementation: implementation.into(),
        });
        self
    }

    /// Builds the contract.
    #[must_use]
    pub fn build(self) -> Contract {
        self.contract
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_names() {
        let contract = Contract::builder("UserAccounts")
            .action(Action::get("GetById"))
            .action(Action::post("Create").name("new"))
            .build();

        assert_eq!(contract.route_name(), "user_accounts");
        assert_eq!(contract.actions()[0].route_name(), "get_by_id");
        assert_eq!(contract.actions()[1].route_name(), "new");
    }

    #[test]
    fn test_explicit_contract_name() {
        let contract = Contract::builder("IOrderService").name("orders").build();
        assert_eq!(contract.route_name(), "orders");
        assert_eq!(contract.service_name(), "IOrderService");
    }

    #[test]
    fn test_default_binding_is_query() {
        let param = Parameter::new("userId", TypeDescriptor::int32());
        assert_eq!(param.source, BindingSource::Query);
        assert!(!param.optional);
    }

    #[test]
    fn test_cache_policy_only_for_get() {
        let get = Action::get("List").cache(CachePolicy::default());
        let post = Action::post("Save").cache(CachePolicy::default());
        assert!(get.cache_policy().is_some());
        assert!(post.cache_policy().is_none());
        assert_eq!(CachePolicy::default().duration, Duration::from_secs(60));
    }

    #[test]
    fn test_cache_policy_minutes_saturates() {
        assert_eq!(CachePolicy::minutes(5).duration, Duration::from_secs(300));
        assert_eq!(CachePolicy::minutes(u64::MAX).duration, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_security_parse() {
        let requirement = SecurityRequirement::parse(Some("admin, ops,,"), Some("CanRead"));
        assert_eq!(requirement.roles, vec!["admin", "ops"]);
        assert_eq!(requirement.policies, vec!["CanRead"]);
    }

    #[test]
    fn test_model_endpoint_service_name() {
        let contract = Contract::builder("User")
            .model_endpoint("IUserService", "UserService")
            .build();
        assert_eq!(contract.service_name(), "UserService");
        assert_eq!(contract.route_name(), "user");
    }

    #[test]
    fn test_verb_method_mapping() {
        assert_eq!(HttpVerb::default(), HttpVerb::Get);
        assert_eq!(HttpVerb::from_method(&Method::PUT), Some(HttpVerb::Put));
        assert_eq!(HttpVerb::from_method(&Method::PATCH), None);
        assert_eq!(HttpVerb::Delete.method(), Method::DELETE);
    }

    #[test]
    fn test_default_content_type() {
        assert_eq!(Action::post("Save").request_content_type(), "application/json");
        assert_eq!(
            Action::post("Upload")
                .content_type("multipart/form-data")
                .request_content_type(),
            "multipart/form-data"
        );
    }
}
