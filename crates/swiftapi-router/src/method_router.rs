//! Per-verb endpoint table for one path.

use http::Method;
use swiftapi_core::HttpVerb;

/// A compiled route bound to one verb at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Registry index of the action this route dispatches to.
    pub route_id: usize,
    /// Names for the path parameters, in path order.
    pub param_names: Vec<String>,
}

impl Endpoint {
    /// Creates an endpoint.
    #[must_use]
    pub fn new(route_id: usize, param_names: Vec<String>) -> Self {
        Self {
            route_id,
            param_names,
        }
    }
}

/// Maps each supported verb to at most one endpoint.
///
/// # Example
///
/// ```rust
/// use swiftapi_router::{Endpoint, MethodRouter};
/// use swiftapi_core::HttpVerb;
///
/// let methods = MethodRouter::new()
///     .with(HttpVerb::Get, Endpoint::new(0, vec![]))
///     .with(HttpVerb::Delete, Endpoint::new(1, vec![]));
///
/// assert_eq!(methods.allowed_verbs(), vec![HttpVerb::Get, HttpVerb::Delete]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodRouter {
    get: Option<Endpoint>,
    post: Option<Endpoint>,
    put: Option<Endpoint>,
    delete: Option<Endpoint>,
}

impl MethodRouter {
    /// Creates an empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, verb: HttpVerb) -> &Option<Endpoint> {
        match verb {
            HttpVerb::Get => &self.get,
            HttpVerb::Post => &self.post,
            HttpVerb::Put => &self.put,
            HttpVerb::Delete => &self.delete,
        }
    }

    fn slot_mut(&mut self, verb: HttpVerb) -> &mut Option<Endpoint> {
        match verb {
            HttpVerb::Get => &mut self.get,
            HttpVerb::Post => &mut self.post,
            HttpVerb::Put => &mut self.put,
            HttpVerb::Delete => &mut self.delete,
        }
    }

    /// Binds `verb` to `endpoint`, replacing any previous binding.
    #[must_use]
    pub fn with(mut self, verb: HttpVerb, endpoint: Endpoint) -> Self {
        *self.slot_mut(verb) = Some(endpoint);
        self
    }

    /// Returns the endpoint bound to `verb`.
    #[must_use]
    pub fn endpoint(&self, verb: HttpVerb) -> Option<&Endpoint> {
        self.slot(verb).as_ref()
    }

    /// Returns the endpoint bound to an HTTP method.
    ///
    /// Methods outside GET/POST/PUT/DELETE never match.
    #[must_use]
    pub fn endpoint_for(&self, method: &Method) -> Option<&Endpoint> {
        HttpVerb::from_method(method).and_then(|verb| self.endpoint(verb))
    }

    /// Adds the bindings of `other`.
    ///
    /// Existing bindings are never overwritten; the first conflicting verb is
    /// returned as an error and `self` is left unchanged.
    pub fn try_merge(&mut self, other: MethodRouter) -> Result<(), HttpVerb> {
        const VERBS: [HttpVerb; 4] = [
            HttpVerb::Get,
            HttpVerb::Post,
            HttpVerb::Put,
            HttpVerb::Delete,
        ];
        if let Some(conflict) = VERBS
            .into_iter()
            .find(|v| self.slot(*v).is_some() && other.slot(*v).is_some())
        {
            return Err(conflict);
        }
        for verb in VERBS {
            if let Some(endpoint) = other.slot(verb).clone() {
                *self.slot_mut(verb) = Some(endpoint);
            }
        }
        Ok(())
    }

    /// Returns true if any verb is bound.
    #[must_use]
    pub fn has_any_verb(&self) -> bool {
        !self.allowed_verbs().is_empty()
    }

    /// Returns the bound verbs in GET, POST, PUT, DELETE order.
    #[must_use]
    pub fn allowed_verbs(&self) -> Vec<HttpVerb> {
        [
            HttpVerb::Get,
            HttpVerb::Post,
            HttpVerb::Put,
            HttpVerb::Delete,
        ]
        .into_iter()
        .filter(|v| self.slot(*v).is_some())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(id: usize) -> Endpoint {
        Endpoint::new(id, Vec::new())
    }

    #[test]
    fn test_endpoint_lookup() {
        let methods = MethodRouter::new().with(HttpVerb::Post, endpoint(3));
        assert_eq!(methods.endpoint(HttpVerb::Post).map(|e| e.route_id), Some(3));
        assert!(methods.endpoint(HttpVerb::Get).is_none());
        assert_eq!(methods.endpoint_for(&Method::POST).map(|e| e.route_id), Some(3));
        assert!(methods.endpoint_for(&Method::PATCH).is_none());
    }

    #[test]
    fn test_merge_disjoint() {
        let mut methods = MethodRouter::new().with(HttpVerb::Get, endpoint(0));
        methods
            .try_merge(MethodRouter::new().with(HttpVerb::Put, endpoint(1)))
            .unwrap();
        assert_eq!(methods.allowed_verbs(), vec![HttpVerb::Get, HttpVerb::Put]);
    }

    #[test]
    fn test_merge_conflict_keeps_original() {
        let mut methods = MethodRouter::new().with(HttpVerb::Get, endpoint(0));
        let conflict = methods.try_merge(
            MethodRouter::new()
                .with(HttpVerb::Get, endpoint(1))
                .with(HttpVerb::Post, endpoint(2)),
        );
        assert_eq!(conflict, Err(HttpVerb::Get));
        assert_eq!(methods.endpoint(HttpVerb::Get).map(|e| e.route_id), Some(0));
        assert!(methods.endpoint(HttpVerb::Post).is_none());
    }

    #[test]
    fn test_empty() {
        assert!(!MethodRouter::new().has_any_verb());
    }
}
