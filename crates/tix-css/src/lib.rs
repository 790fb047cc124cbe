//! tix CSS - Selectors
//!
//! Selector parsing, identifier escaping and matching against the
//! `tix_dom` tree.

mod escape;
mod matching;
mod parser;
mod selectors;

pub use escape::{css_escape, css_string};
pub use matching::{MatchContext, select_all};
pub use parser::parse_selector_list;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};

use tix_dom::{DomTree, NodeId};

/// Selector syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected '{found}' at position {position}")]
    UnexpectedToken { position: usize, found: char },
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),
    #[error("invalid nth expression '{0}'")]
    InvalidNth(String),
    #[error("combinator without a following selector")]
    DanglingCombinator,
    #[error("pseudo-elements are not supported")]
    UnsupportedPseudoElement,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        parse_selector_list(input)
    }

    /// Elements under `scope` matching this list, in document order
    pub fn query_all(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        select_all(tree, scope, self)
    }

    /// Check one element against the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        MatchContext::new(tree, tree.root()).matches_list(node, self)
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector_list(s)
    }
}

/// Element query trait
pub trait ElementQuery {
    /// First element under `scope` matching the selector
    fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// All elements under `scope` matching the selector, in document order
    fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// Closest inclusive ancestor matching the selector
    fn closest(&self, element: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &str) -> Result<bool, SelectorError>;
}

impl ElementQuery for DomTree {
    fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_selector_all(scope, selector)?.into_iter().next())
    }

    fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(select_all(self, scope, &list))
    }

    fn closest(&self, element: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = parse_selector_list(selector)?;
        let ctx = MatchContext::new(self, self.root());
        Ok(std::iter::once(element)
            .chain(self.ancestors(element))
            .filter(|&n| self.is_element(n))
            .find(|&n| ctx.matches_list(n, &list)))
    }

    fn matches(&self, element: NodeId, selector: &str) -> Result<bool, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(list.matches(self, element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = parse_selector_list("a:bogus").unwrap_err();
        assert_eq!(err.to_string(), "unknown pseudo-class ':bogus'");
        let err = parse_selector_list("a!").unwrap_err();
        assert_eq!(err.to_string(), "unexpected '!' at position 1");
    }

    #[test]
    fn test_element_query_on_tree() {
        let mut tree = DomTree::new();
        let nav = tree.create_element("nav");
        tree.append_child(tree.root(), nav);
        let a = tree.create_element("a");
        tree.append_child(nav, a);
        tree.set_attribute(a, "href", "/home");

        assert_eq!(tree.query_selector(tree.root(), "a[href]").unwrap(), Some(a));
        assert_eq!(tree.closest(a, "nav").unwrap(), Some(nav));
        assert!(tree.matches(a, "nav > a").unwrap());
        assert!(tree.query_selector_all(tree.root(), "a[").is_err());
    }
}
