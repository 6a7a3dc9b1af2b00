//! Route synthesis.
//!
//! Every action gets exactly one route:
//!
//! ```text
//! api/{contract-route-name}/{action-route-name}[/{route-param}]*
//! ```
//!
//! Route-bound parameters are appended in declaration order, so the n-th
//! parameter segment of a matched path always belongs to the n-th
//! route-bound parameter.

use std::fmt;

use swiftapi_core::{Action, BindingSource, Contract, HttpVerb};

/// Fixed first segment of every synthesized route.
pub const ROUTE_PREFIX: &str = "api";

/// One segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal segment, matched case-insensitively.
    Static(String),
    /// A path parameter bound to the named action parameter.
    Param(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(s) => f.write_str(s),
            Self::Param(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// The compiled (verb, path template) for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    verb: HttpVerb,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Creates a template from explicit segments.
    #[must_use]
    pub fn new(verb: HttpVerb, segments: Vec<Segment>) -> Self {
        Self { verb, segments }
    }

    /// The HTTP verb.
    #[must_use]
    pub const fn verb(&self) -> HttpVerb {
        self.verb
    }

    /// The path segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Path parameter names, in path order.
    #[must_use]
    pub fn param_names(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.clone()),
                Segment::Static(_) => None,
            })
            .collect()
    }

    /// The template without a leading slash, e.g. `api/orders/get/{id}`.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The template as documented, with a leading slash.
    #[must_use]
    pub fn documented_path(&self) -> String {
        format!("/{}", self.path())
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path())
    }
}

/// Synthesizes the route for `action` on `contract`.
///
/// # Example
///
/// ```rust
/// use swiftapi_core::{Action, Contract, Parameter, TypeDescriptor};
/// use swiftapi_router::synthesize;
///
/// let action = Action::get("GetUserOrders")
///     .param(Parameter::query("userId", TypeDescriptor::int32()))
///     .param(Parameter::route("page", TypeDescriptor::int32()));
/// let contract = Contract::builder("Orders").action(action.clone()).build();
///
/// let route = synthesize(&contract, &action);
/// assert_eq!(route.path(), "api/orders/get_user_orders/{page}");
/// ```
#[must_use]
pub fn synthesize(contract: &Contract, action: &Action) -> RouteTemplate {
    let mut segments = vec![
        Segment::Static(ROUTE_PREFIX.to_string()),
        Segment::Static(contract.route_name()),
        Segment::Static(action.route_name()),
    ];
    segments.extend(
        action
            .params()
            .iter()
            .filter(|p| p.source == BindingSource::Route)
            .map(|p| Segment::Param(p.name.clone())),
    );
    RouteTemplate::new(action.verb(), segments)
}
