//! Mutation relevance filter
//!
//! Decides whether a batch of tree mutations can change the tab sequence
//! and so warrants re-applying the active configuration.

use tix_dom::{DomTree, MutationRecord};

use crate::focus::{FOCUSABLE_ATTRIBUTES, has_focusable};

/// Why a batch was considered relevant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The document URL changed without a reload
    UrlChanged(String),
    /// A focus-related attribute changed on a focusable subtree
    Attribute(String),
    /// Focusable content was inserted
    NodesAdded,
}

/// Tracks the last seen URL across batches
#[derive(Debug, Clone)]
pub struct MutationWatcher {
    last_url: String,
}

impl MutationWatcher {
    pub fn new(url: &str) -> Self {
        Self {
            last_url: url.to_string(),
        }
    }

    pub fn last_url(&self) -> &str {
        &self.last_url
    }

    /// Inspect one batch. A URL change short-circuits the record scan.
    pub fn observe(&mut self, tree: &DomTree, url: &str, records: &[MutationRecord]) -> Option<Trigger> {
        if url != self.last_url {
            self.last_url = url.to_string();
            return Some(Trigger::UrlChanged(url.to_string()));
        }

        records.iter().find_map(|record| match record {
            MutationRecord::Attributes {
                target,
                attribute_name,
                ..
            } => (FOCUSABLE_ATTRIBUTES.contains(&attribute_name.as_str()) && has_focusable(tree, *target))
                .then(|| Trigger::Attribute(attribute_name.clone())),
            MutationRecord::ChildList { added_nodes, .. } => added_nodes
                .iter()
                .any(|&n| has_focusable(tree, n))
                .then_some(Trigger::NodesAdded),
            MutationRecord::CharacterData { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tix_dom::NodeId;

    fn setup() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let button = tree.create_element("button");
        tree.append_child(tree.root(), div);
        tree.append_child(div, button);
        (tree, div, button)
    }

    #[test]
    fn test_url_change() {
        let (tree, _, _) = setup();
        let mut w = MutationWatcher::new("https://a.test/x");
        assert_eq!(
            w.observe(&tree, "https://a.test/y", &[]),
            Some(Trigger::UrlChanged("https://a.test/y".into()))
        );
        assert_eq!(w.observe(&tree, "https://a.test/y", &[]), None);
        assert_eq!(w.last_url(), "https://a.test/y");
    }

    #[test]
    fn test_attribute_filter() {
        let (tree, div, _) = setup();
        let mut w = MutationWatcher::new("u");
        let rec = |name: &str| MutationRecord::Attributes {
            target: div,
            attribute_name: name.to_string(),
            old_value: None,
        };
        assert_eq!(w.observe(&tree, "u", &[rec("title")]), None);
        assert_eq!(w.observe(&tree, "u", &[rec("disabled")]), Some(Trigger::Attribute("disabled".into())));
    }

    #[test]
    fn test_added_nodes() {
        let (mut tree, div, button) = setup();
        let mut w = MutationWatcher::new("u");
        let plain = tree.create_element("p");
        tree.append_child(div, plain);
        let added = |n: NodeId| MutationRecord::ChildList {
            target: div,
            added_nodes: vec![n],
            removed_nodes: vec![],
        };
        assert_eq!(w.observe(&tree, "u", &[added(plain)]), None);
        assert_eq!(w.observe(&tree, "u", &[added(plain), added(button)]), Some(Trigger::NodesAdded));
        assert_eq!(w.observe(&tree, "u", &[MutationRecord::CharacterData { target: plain }]), None);
    }
}
