//! Selector Matching
//!
//! Right-to-left matching of complex selectors against the arena tree.
//! Queries are evaluated against the whole document and then filtered to the
//! scope's descendants, so ancestors outside the scope still take part in
//! descendant and child combinators.

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorComponent, SelectorList,
};
use tix_dom::{DomTree, NodeId};

const FORM_CONTROLS: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// Matching context: the tree and the scope element of the query
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub tree: &'a DomTree,
    pub scope: NodeId,
}

impl<'a> MatchContext<'a> {
    pub fn new(tree: &'a DomTree, scope: NodeId) -> Self {
        Self { tree, scope }
    }

    /// Check a node against any selector in the list
    pub fn matches_list(&self, node: NodeId, list: &SelectorList) -> bool {
        list.0.iter().any(|sel| self.matches_complex(node, sel))
    }

    /// Check a node against one complex selector
    pub fn matches_complex(&self, node: NodeId, selector: &ComplexSelector) -> bool {
        match selector.compounds.len() {
            0 => false,
            n => self.match_at(node, selector, n - 1),
        }
    }

    fn match_at(&self, node: NodeId, selector: &ComplexSelector, idx: usize) -> bool {
        if !self.matches_compound(node, &selector.compounds[idx]) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        let tree = self.tree;
        match selector.combinators[idx - 1] {
            Combinator::Child => tree
                .parent_element(node)
                .is_some_and(|p| self.match_at(p, selector, idx - 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .filter(|&a| tree.is_element(a))
                .any(|a| self.match_at(a, selector, idx - 1)),
            Combinator::NextSibling => self
                .previous_element_siblings(node)
                .next()
                .is_some_and(|s| self.match_at(s, selector, idx - 1)),
            Combinator::SubsequentSibling => self
                .previous_element_siblings(node)
                .any(|s| self.match_at(s, selector, idx - 1)),
        }
    }

    fn previous_element_siblings(&self, node: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        let tree = self.tree;
        let prev = move |id: NodeId| tree.get(id).map(|n| n.prev_sibling).filter(|p| p.is_valid());
        std::iter::successors(prev(node), move |&id| prev(id)).filter(move |&id| tree.is_element(id))
    }

    fn matches_compound(&self, node: NodeId, compound: &CompoundSelector) -> bool {
        self.tree.is_element(node) && compound.0.iter().all(|c| self.matches_component(node, c))
    }

    fn matches_component(&self, node: NodeId, component: &SelectorComponent) -> bool {
        let tree = self.tree;
        let Some(elem) = tree.element(node) else {
            return false;
        };

        match component {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(tag) => tree.resolve(elem.name).eq_ignore_ascii_case(tag),
            SelectorComponent::Id(id) => elem.id.as_deref() == Some(id.as_str()),
            SelectorComponent::Class(class) => elem.has_class(class),
            SelectorComponent::Attribute(attr) => attr.matches(tree.get_attribute(node, &attr.name)),
            SelectorComponent::PseudoClass(pseudo) => self.matches_pseudo_class(node, pseudo),
        }
    }

    fn matches_pseudo_class(&self, node: NodeId, pseudo: &PseudoClass) -> bool {
        let tree = self.tree;
        let tag = tree.tag_name(node).unwrap_or("");

        match pseudo {
            PseudoClass::Link => matches!(tag, "a" | "area") && tree.has_attribute(node, "href"),

            // No interaction state on a static tree
            PseudoClass::Visited
            | PseudoClass::Hover
            | PseudoClass::Active
            | PseudoClass::Focus
            | PseudoClass::FocusVisible
            | PseudoClass::FocusWithin
            | PseudoClass::Target => false,

            PseudoClass::Enabled => FORM_CONTROLS.contains(&tag) && !tree.has_attribute(node, "disabled"),
            PseudoClass::Disabled => FORM_CONTROLS.contains(&tag) && tree.has_attribute(node, "disabled"),
            PseudoClass::Checked => match tag {
                "input" => tree.has_attribute(node, "checked"),
                "option" => tree.has_attribute(node, "selected"),
                _ => false,
            },
            PseudoClass::Required => tree.has_attribute(node, "required"),
            PseudoClass::Optional => {
                matches!(tag, "input" | "select" | "textarea") && !tree.has_attribute(node, "required")
            }

            PseudoClass::Root => tree.parent(node) == Some(tree.root()),
            PseudoClass::Empty => tree
                .children(node)
                .all(|(_, child)| !child.is_element() && !child.is_text()),
            PseudoClass::FirstChild => self.position(node, false, false) == Some(1),
            PseudoClass::LastChild => self.position(node, false, true) == Some(1),
            PseudoClass::OnlyChild => self.sibling_count(node, false) == Some(1),
            PseudoClass::FirstOfType => self.position(node, true, false) == Some(1),
            PseudoClass::LastOfType => self.position(node, true, true) == Some(1),
            PseudoClass::OnlyOfType => self.sibling_count(node, true) == Some(1),
            PseudoClass::NthChild(expr) => self.position(node, false, false).is_some_and(|n| expr.matches(n as i32)),
            PseudoClass::NthLastChild(expr) => self.position(node, false, true).is_some_and(|n| expr.matches(n as i32)),
            PseudoClass::NthOfType(expr) => self.position(node, true, false).is_some_and(|n| expr.matches(n as i32)),
            PseudoClass::NthLastOfType(expr) => self.position(node, true, true).is_some_and(|n| expr.matches(n as i32)),

            PseudoClass::Not(list) => !self.matches_list(node, list),
            PseudoClass::Is(list) | PseudoClass::Where(list) => self.matches_list(node, list),

            PseudoClass::Scope => {
                if self.scope == tree.root() {
                    tree.parent(node) == Some(tree.root())
                } else {
                    node == self.scope
                }
            }

            PseudoClass::Lang(lang) => std::iter::once(node)
                .chain(tree.ancestors(node))
                .find_map(|n| tree.get_attribute(n, "lang"))
                .is_some_and(|l| {
                    let l = l.to_ascii_lowercase();
                    let lang = lang.to_ascii_lowercase();
                    l == lang || l.starts_with(&format!("{}-", lang))
                }),
        }
    }

    /// Element siblings sharing the parent, optionally restricted to the same tag
    fn siblings(&self, node: NodeId, same_type: bool) -> Option<Vec<NodeId>> {
        let tree = self.tree;
        let parent = tree.parent(node)?;
        let name = tree.element(node)?.name;
        Some(
            tree.element_children(parent)
                .filter(|&c| !same_type || tree.element(c).is_some_and(|e| e.name == name))
                .collect(),
        )
    }

    /// 1-based position among siblings, from the start or the end
    fn position(&self, node: NodeId, same_type: bool, from_end: bool) -> Option<usize> {
        let siblings = self.siblings(node, same_type)?;
        let idx = siblings.iter().position(|&s| s == node)?;
        Some(if from_end { siblings.len() - idx } else { idx + 1 })
    }

    fn sibling_count(&self, node: NodeId, same_type: bool) -> Option<usize> {
        self.siblings(node, same_type).map(|s| s.len())
    }
}

/// All elements under `scope` (exclusive) matching the list, in document order.
///
/// A scope that is no longer attached to the document yields nothing.
pub fn select_all(tree: &DomTree, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
    if !tree.is_connected(scope) {
        tracing::debug!("query scope {} is detached", scope);
        return Vec::new();
    }

    let ctx = MatchContext::new(tree, scope);
    tree.element_descendants(scope)
        .into_iter()
        .filter(|&n| ctx.matches_list(n, list))
        .collect()
}
