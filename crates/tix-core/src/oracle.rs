//! Uniqueness oracle
//!
//! Evaluates candidate selectors against the live tree. Malformed
//! selectors count as zero matches so synthesis can move on.

use tix_css::parse_selector_list;
use tix_dom::{DomTree, NodeId};

/// Number of elements under `scope` matching `selector`; 0 when it does not parse
pub fn match_count(tree: &DomTree, scope: NodeId, selector: &str) -> usize {
    matches(tree, scope, selector).len()
}

/// Elements under `scope` matching `selector`; empty when it does not parse
pub fn matches(tree: &DomTree, scope: NodeId, selector: &str) -> Vec<NodeId> {
    match parse_selector_list(selector) {
        Ok(list) => list.query_all(tree, scope),
        Err(err) => {
            tracing::debug!("candidate {:?} rejected: {}", selector, err);
            Vec::new()
        }
    }
}

/// True iff exactly one element under `scope` matches
pub fn is_unique(tree: &DomTree, scope: NodeId, selector: &str) -> bool {
    match_count(tree, scope, selector) == 1
}

/// True iff `selector` matches exactly `target` under `scope`
pub fn resolves_to(tree: &DomTree, scope: NodeId, selector: &str, target: NodeId) -> bool {
    matches(tree, scope, selector) == [target]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        tree.append_child(tree.root(), body);
        let a = tree.create_element("button");
        let b = tree.create_element("button");
        tree.append_child(body, a);
        tree.append_child(body, b);
        tree.set_attribute(a, "class", "primary");
        (tree, body, a, b)
    }

    #[test]
    fn test_unique_and_not_unique() {
        let (tree, body, a, _) = tree();
        assert!(is_unique(&tree, body, ".primary"));
        assert!(!is_unique(&tree, body, "button"));
        assert!(!is_unique(&tree, body, ".missing"));
        assert!(resolves_to(&tree, body, ".primary", a));
    }

    #[test]
    fn test_invalid_selector_is_zero_matches() {
        let (tree, body, _, _) = tree();
        assert_eq!(match_count(&tree, body, "button["), 0);
        assert!(!is_unique(&tree, body, ""));
        assert!(!is_unique(&tree, body, "::before"));
    }

    #[test]
    fn test_scope_limits_matches() {
        let (tree, body, a, b) = tree();
        assert_eq!(match_count(&tree, body, "button"), 2);
        assert_eq!(match_count(&tree, a, "button"), 0);
        assert!(!resolves_to(&tree, body, ".primary", b));
    }

    #[test]
    fn test_stale_scope_is_zero_matches() {
        let (mut tree, body, _, _) = tree();
        tree.detach(body);
        assert_eq!(match_count(&tree, body, "button"), 0);
    }
}
