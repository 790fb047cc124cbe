//! Focusability
//!
//! Selectors describing what the browser would put in the tab sequence.

use std::sync::LazyLock;

use tix_css::{SelectorList, parse_selector_list};
use tix_dom::{DomTree, NodeId};

/// Elements that already carry an explicit, reachable tab position
pub const TAB_INDEX_SELECTOR: &str = "[tabindex]:not([tabindex='-1'])";

/// Everything that can receive keyboard focus
pub const FOCUSABLE_SELECTOR: &str = "[tabindex]:not([tabindex='-1']), button, \
    input:not([disabled]), select:not([disabled]), textarea:not([disabled]), a[href], \
    [contenteditable]:not([contenteditable='false']), iframe, details summary, \
    audio[controls], video[controls]";

/// Attribute names whose changes can alter focusability
pub const FOCUSABLE_ATTRIBUTES: &[&str] = &["disabled", "contenteditable", "href", "controls"];

static FOCUSABLE: LazyLock<SelectorList> =
    LazyLock::new(|| parse_selector_list(FOCUSABLE_SELECTOR).unwrap_or(SelectorList(Vec::new())));

/// Parsed focusable selector list
pub fn focusable_selector() -> &'static SelectorList {
    &FOCUSABLE
}

/// True when `node` or one of its descendants can take focus
pub fn has_focusable(tree: &DomTree, node: NodeId) -> bool {
    if !tree.is_element(node) {
        return false;
    }
    FOCUSABLE.matches(tree, node) || !FOCUSABLE.query_all(tree, node).is_empty()
}

/// Every focusable element under `scope`, in document order
pub fn focusable_elements(tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
    FOCUSABLE.query_all(tree, scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_parse() {
        assert_eq!(focusable_selector().len(), 11);
        assert!(parse_selector_list(TAB_INDEX_SELECTOR).is_ok());
    }

    #[test]
    fn test_has_focusable() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let input = tree.create_element("input");
        tree.append_child(tree.root(), div);
        tree.append_child(div, input);

        assert!(has_focusable(&tree, input));
        assert!(has_focusable(&tree, div));

        tree.set_attribute(input, "disabled", "");
        assert!(!has_focusable(&tree, input));
        assert!(!has_focusable(&tree, div));

        tree.set_attribute(div, "tabindex", "0");
        assert!(has_focusable(&tree, div));
        tree.set_attribute(div, "tabindex", "-1");
        assert!(!has_focusable(&tree, div));
    }

    #[test]
    fn test_links_need_href() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        tree.append_child(tree.root(), a);
        assert!(!has_focusable(&tree, a));
        tree.set_attribute(a, "href", "#top");
        assert!(has_focusable(&tree, a));
        assert_eq!(focusable_elements(&tree, tree.root()), vec![a]);
    }
}
