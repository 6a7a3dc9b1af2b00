//! Radix tree node implementation.
//!
//! Each node is one path segment. Static children are keyed by their
//! lowercased literal so matching ignores ASCII case; a node has at most one
//! parameter child, which accepts any single segment. Parameter names live on
//! the endpoint, not the node, so routes with differently named parameters
//! at the same position share the tree.

use crate::method_router::MethodRouter;
use crate::synth::Segment;

/// A node in the radix tree.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Lowercased literal for static nodes; empty for the root and params.
    pub segment: String,

    /// Method table if a route ends here.
    pub methods: Option<MethodRouter>,

    /// Static children, sorted by segment for binary search.
    pub static_children: Vec<Node>,

    /// Parameter child (at most one per node).
    pub param_child: Option<Box<Node>>,
}

impl Node {
    /// Creates a new static node.
    #[must_use]
    pub fn new_static(segment: &str) -> Self {
        Self {
            segment: segment.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns the node at the end of `segments`, creating nodes as needed.
    pub fn descend_or_create(&mut self, segments: &[Segment]) -> &mut Node {
        let Some((first, rest)) = segments.split_first() else {
            return self;
        };

        let child = match first {
            Segment::Static(literal) => {
                let key = literal.to_ascii_lowercase();
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(&key))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children.insert(index, Node::new_static(&key));
                        index
                    }
                };
                &mut self.static_children[index]
            }
            Segment::Param(_) => self.param_child.get_or_insert_with(Box::default).as_mut(),
        };
        child.descend_or_create(rest)
    }

    /// Matches a request path against the tree.
    ///
    /// Returns the method table and the raw parameter values in path order.
    #[must_use]
    pub fn match_path<'a>(&'a self, path: &'a str) -> Option<(&'a MethodRouter, Vec<&'a str>)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut values = Vec::new();
        self.match_segments(&segments, &mut values)
            .map(|methods| (methods, values))
    }

    /// Matches segments recursively, static children first.
    fn match_segments<'a, 'p>(
        &'a self,
        segments: &[&'p str],
        values: &mut Vec<&'p str>,
    ) -> Option<&'a MethodRouter> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(methods) = child.match_segments(remaining, values) {
                return Some(methods);
            }
        }

        if let Some(child) = &self.param_child {
            values.push(*segment);
            if let Some(methods) = child.match_segments(remaining, values) {
                return Some(methods);
            }
            values.pop();
        }

        None
    }

    /// Finds a static child by segment, ignoring ASCII case.
    fn find_static_child(&self, segment: &str) -> Option<&Node> {
        let key = segment.to_ascii_lowercase();
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(&key))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method_router::Endpoint;
    use swiftapi_core::HttpVerb;

    fn stat(s: &str) -> Segment {
        Segment::Static(s.to_string())
    }

    fn param(s: &str) -> Segment {
        Segment::Param(s.to_string())
    }

    fn insert(root: &mut Node, segments: &[Segment], id: usize) {
        let node = root.descend_or_create(segments);
        node.methods = Some(MethodRouter::new().with(HttpVerb::Get, Endpoint::new(id, vec![])));
    }

    fn matched_id(root: &Node, path: &str) -> Option<(usize, Vec<String>)> {
        root.match_path(path).map(|(methods, values)| {
            (
                methods.endpoint(HttpVerb::Get).map_or(usize::MAX, |e| e.route_id),
                values.into_iter().map(String::from).collect(),
            )
        })
    }

    #[test]
    fn test_node_new_static_lowercases() {
        let node = Node::new_static("Orders");
        assert_eq!(node.segment, "orders");
    }

    #[test]
    fn test_insert_and_match_static() {
        let mut root = Node::root();
        insert(&mut root, &[stat("api"), stat("orders")], 1);

        assert_eq!(matched_id(&root, "/api/orders"), Some((1, vec![])));
        assert_eq!(matched_id(&root, "api/orders/"), Some((1, vec![])));
    }

    #[test]
    fn test_static_match_ignores_case() {
        let mut root = Node::root();
        insert(&mut root, &[stat("api"), stat("Sales")], 1);

        assert_eq!(matched_id(&root, "/API/sales"), Some((1, vec![])));
    }

    #[test]
    fn test_insert_and_match_param() {
        let mut root = Node::root();
        insert(&mut root, &[stat("orders"), param("id")], 1);

        assert_eq!(
            matched_id(&root, "/orders/42"),
            Some((1, vec!["42".to_string()]))
        );
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        insert(&mut root, &[stat("users"), stat("me")], 1);
        insert(&mut root, &[stat("users"), param("id")], 2);

        assert_eq!(matched_id(&root, "/users/me"), Some((1, vec![])));
        assert_eq!(
            matched_id(&root, "/users/7"),
            Some((2, vec!["7".to_string()]))
        );
    }

    #[test]
    fn test_backtracks_out_of_dead_static_branch() {
        let mut root = Node::root();
        insert(&mut root, &[stat("a"), stat("b"), stat("c")], 1);
        insert(&mut root, &[stat("a"), param("x"), stat("d")], 2);

        assert_eq!(
            matched_id(&root, "/a/b/d"),
            Some((2, vec!["b".to_string()]))
        );
    }

    #[test]
    fn test_backtracking_discards_param_values() {
        let mut root = Node::root();
        insert(&mut root, &[param("x"), stat("only")], 1);
        insert(&mut root, &[stat("fixed"), stat("end")], 2);

        assert_eq!(matched_id(&root, "/fixed/end"), Some((2, vec![])));
        assert_eq!(matched_id(&root, "/fixed/nope"), None);
    }

    #[test]
    fn test_intermediate_node_without_methods() {
        let mut root = Node::root();
        insert(&mut root, &[stat("api"), stat("orders"), stat("list")], 1);

        assert!(root.match_path("/api/orders").is_none());
    }
}
