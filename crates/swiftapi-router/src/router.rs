//! High-level router API.
//!
//! This module provides the main [`Router`] struct which is the primary
//! interface for building and matching routes.

use http::Method;
use swiftapi_core::HttpVerb;

use crate::error::RouterError;
use crate::method_router::{Endpoint, MethodRouter};
use crate::node::Node;
use crate::params::Params;
use crate::synth::RouteTemplate;
use crate::RouteMatch;

/// Outcome of looking up a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    /// A route is bound to this verb and path.
    Matched(RouteMatch),
    /// The path exists but not for this verb; carries the bound verbs.
    MethodNotAllowed(Vec<HttpVerb>),
    /// No route has this path shape.
    NotFound,
}

/// A radix tree router over synthesized route templates.
///
/// Routes are matched in O(k) time where k is the number of path segments.
/// Literal segments match case-insensitively and take priority over
/// parameter segments; a dead literal branch falls back to the parameter
/// branch at the same depth.
///
/// # Example
///
/// ```rust
/// use swiftapi_core::{Action, Contract, Parameter, TypeDescriptor};
/// use swiftapi_router::{synthesize, Router};
/// use http::Method;
///
/// let action = Action::get("GetOrder").param(Parameter::route("id", TypeDescriptor::int32()));
/// let contract = Contract::builder("Orders").action(action.clone()).build();
///
/// let mut router = Router::new();
/// router.insert(&synthesize(&contract, &action), 0).unwrap();
///
/// let found = router.match_route(&Method::GET, "/api/orders/get_order/17").unwrap();
/// assert_eq!(found.route_id, 0);
/// assert_eq!(found.params.get("id"), Some("17"));
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    /// Root node of the radix tree
    root: Node,
    /// Number of routes registered
    route_count: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Inserts a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateRoute`] if another route already binds
    /// the same verb to the same path shape. Parameter names do not
    /// distinguish shapes: `a/{x}` and `a/{y}` collide.
    pub fn insert(&mut self, template: &RouteTemplate, route_id: usize) -> Result<(), RouterError> {
        let endpoint = Endpoint::new(route_id, template.param_names());
        let node = self.root.descend_or_create(template.segments());
        let methods = MethodRouter::new().with(template.verb(), endpoint);

        match &mut node.methods {
            Some(existing) => existing
                .try_merge(methods)
                .map_err(|verb| RouterError::duplicate_route(verb, template.path()))?,
            None => node.methods = Some(methods),
        }
        self.route_count += 1;
        Ok(())
    }

    /// Looks up a request, distinguishing unknown paths from unbound verbs.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup {
        let Some((methods, values)) = self.root.match_path(path) else {
            return RouteLookup::NotFound;
        };
        match methods.endpoint_for(method) {
            Some(endpoint) => RouteLookup::Matched(RouteMatch::new(
                endpoint.route_id,
                bind_params(endpoint, &values),
            )),
            None => RouteLookup::MethodNotAllowed(methods.allowed_verbs()),
        }
    }

    /// Matches a path and method, ignoring why a miss happened.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        match self.lookup(method, path) {
            RouteLookup::Matched(found) => Some(found),
            RouteLookup::MethodNotAllowed(_) | RouteLookup::NotFound => None,
        }
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

/// Pairs raw segment values with the endpoint's parameter names, decoding
/// percent escapes. Undecodable values are kept verbatim.
fn bind_params(endpoint: &Endpoint, values: &[&str]) -> Params {
    endpoint
        .param_names
        .iter()
        .zip(values)
        .map(|(name, raw)| {
            let value = urlencoding::decode(raw).map_or_else(|_| (*raw).to_string(), |v| v.into_owned());
            (name.clone(), value)
        })
        .collect()
}
