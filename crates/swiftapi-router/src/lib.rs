//! Route synthesis and radix tree routing for SwiftAPI.
//!
//! Every action of every contract is compiled into one [`RouteTemplate`] by
//! [`synthesize`], then inserted into a [`Router`] keyed by the action's
//! registry index.
//!
//! # Features
//!
//! - **Route Synthesis**: `api/{contract}/{action}` plus one segment per
//!   route-bound parameter, in declaration order
//! - **Radix Tree Matching**: O(k) path lookup vs O(n) linear scan
//! - **Case-Insensitive Literals**: `/API/Orders/list` matches `api/orders/list`
//! - **405 Detection**: unknown paths and unbound verbs are told apart
//! - **Duplicate Detection**: a second route with the same verb and path
//!   shape is rejected at insert time
//!
//! # Example
//!
//! ```rust
//! use swiftapi_core::{Action, Contract, Parameter, TypeDescriptor};
//! use swiftapi_router::{synthesize, RouteLookup, Router};
//! use http::Method;
//!
//! let list = Action::get("ListOrders");
//! let get = Action::get("GetOrder").param(Parameter::route("id", TypeDescriptor::int32()));
//! let contract = Contract::builder("Orders")
//!     .action(list.clone())
//!     .action(get.clone())
//!     .build();
//!
//! let mut router = Router::new();
//! router.insert(&synthesize(&contract, &list), 0).unwrap();
//! router.insert(&synthesize(&contract, &get), 1).unwrap();
//!
//! let route_match = router.match_route(&Method::GET, "/api/orders/get_order/5").unwrap();
//! assert_eq!(route_match.route_id, 1);
//! assert_eq!(route_match.params.get("id"), Some("5"));
//!
//! assert!(matches!(
//!     router.lookup(&Method::POST, "/api/orders/list_orders"),
//!     RouteLookup::MethodNotAllowed(_)
//! ));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!                    "api"
//!                      │
//!                   "orders"
//!              ┌───────┴────────┐
//!              │                │
//!        "list_orders"     "get_order"
//!           [GET]               │
//!                             {param}
//!                              [GET]
//! ```

#![doc(html_root_url = "https://docs.rs/swiftapi-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;
mod synth;

pub use error::RouterError;
pub use method_router::{Endpoint, MethodRouter};
pub use params::Params;
pub use router::{RouteLookup, Router};
pub use synth::{synthesize, RouteTemplate, Segment, ROUTE_PREFIX};

/// A matched route with its registry index and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Registry index of the matched action
    pub route_id: usize,
    /// Extracted path parameters, named after the action's route parameters
    pub params: Params,
}

impl RouteMatch {
    /// Creates a new route match.
    #[must_use]
    pub fn new(route_id: usize, params: Params) -> Self {
        Self { route_id, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use swiftapi_core::{Action, Contract, Parameter, TypeDescriptor};

    #[test]
    fn test_get_user_orders_scenario() {
        let action = Action::get("GetUserOrders")
            .param(Parameter::query("userId", TypeDescriptor::int32()))
            .param(Parameter::route("page", TypeDescriptor::int32()));
        let contract = Contract::builder("Orders").action(action.clone()).build();
        let template = synthesize(&contract, &action);
        assert_eq!(template.path(), "api/orders/get_user_orders/{page}");

        let mut router = Router::new();
        router.insert(&template, 0).unwrap();

        let m = router
            .match_route(&Method::GET, "/api/orders/get_user_orders/2")
            .unwrap();
        assert_eq!(m.route_id, 0);
        assert_eq!(m.params.get("page"), Some("2"));
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn test_contract_routes_share_prefix() {
        let a = Action::get("First");
        let b = Action::post("Second");
        let contract = Contract::builder("Things").action(a.clone()).action(b.clone()).build();

        let mut router = Router::new();
        router.insert(&synthesize(&contract, &a), 0).unwrap();
        router.insert(&synthesize(&contract, &b), 1).unwrap();

        assert_eq!(
            router.match_route(&Method::POST, "/api/things/second").map(|m| m.route_id),
            Some(1)
        );
        assert_eq!(
            router.match_route(&Method::GET, "/api/things/first").map(|m| m.route_id),
            Some(0)
        );
    }
}
