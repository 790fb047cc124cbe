//! Selector synthesis
//!
//! Runs the candidate tiers in priority order and returns the first
//! selector the oracle confirms as unique. Every candidate is checked
//! against the tree as it is at call time; nothing is cached between calls.

use std::fmt;

use tix_css::{css_escape, css_string};
use tix_dom::{Document, DomTree, NodeId};

use crate::classifier::StabilityClassifier;
use crate::config::EngineConfig;
use crate::oracle;

/// The strategy that produced a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Id,
    Class,
    Attribute,
    Text,
    StructuralPath,
    FallbackAttribute,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::Class => "class",
            Self::Attribute => "attribute",
            Self::Text => "text",
            Self::StructuralPath => "structural path",
            Self::FallbackAttribute => "fallback attribute",
        })
    }
}

/// A verified selector and the tier it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub selector: String,
    pub tier: Tier,
}

/// Builds durable, unique selectors for single elements
pub struct SelectorSynthesizer {
    config: EngineConfig,
    classifier: StabilityClassifier,
}

impl SelectorSynthesizer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            classifier: StabilityClassifier::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &StabilityClassifier {
        &self.classifier
    }

    /// Selector for `target`, or `None` when no tier yields a unique match
    pub fn synthesize(&self, doc: &Document, target: NodeId) -> Option<String> {
        self.synthesize_with_tier(doc, target).map(|s| s.selector)
    }

    /// Like [`synthesize`](Self::synthesize), also reporting the winning tier
    pub fn synthesize_with_tier(&self, doc: &Document, target: NodeId) -> Option<Synthesis> {
        let tree = doc.tree();
        if !tree.is_element(target) || !tree.is_connected(target) {
            tracing::debug!("target {} is not a connected element", target);
            return None;
        }

        // Queries never return their scope, so targets outside the body
        // (or the body itself) are checked document-wide
        let body = doc.scope_root();
        let scope = if target != body && tree.contains(body, target) {
            body
        } else {
            tree.root()
        };
        let cx = Candidates {
            synth: self,
            tree,
            scope,
            boundary: doc.body(),
            target,
        };

        let found = cx
            .by_id()
            .map(|s| (Tier::Id, s))
            .or_else(|| cx.by_class().map(|s| (Tier::Class, s)))
            .or_else(|| cx.by_attribute().map(|s| (Tier::Attribute, s)))
            .or_else(|| cx.by_text().map(|s| (Tier::Text, s)))
            .or_else(|| cx.by_path().map(|s| (Tier::StructuralPath, s)))
            .or_else(|| cx.by_fallback_attribute().map(|s| (Tier::FallbackAttribute, s)));

        match found {
            Some((tier, selector)) => {
                tracing::debug!("{} tier produced {:?} for {}", tier, selector, target);
                Some(Synthesis { selector, tier })
            }
            None => {
                tracing::debug!("no reliable selector for {}", target);
                None
            }
        }
    }

    /// Class tokens usable in selectors: not internal, not unstable
    pub fn clean_classes<'t>(&self, tree: &'t DomTree, node: NodeId) -> Vec<&'t str> {
        tree.element(node)
            .map(|e| {
                e.classes
                    .iter()
                    .map(String::as_str)
                    .filter(|c| !self.config.is_internal_class(c) && !self.classifier.is_unstable(c))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for SelectorSynthesizer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn class_chain(classes: &[&str]) -> String {
    classes.iter().map(|c| format!(".{}", css_escape(c))).collect()
}

/// One synthesis run over a fixed target
struct Candidates<'a> {
    synth: &'a SelectorSynthesizer,
    tree: &'a DomTree,
    scope: NodeId,
    boundary: NodeId,
    target: NodeId,
}

impl Candidates<'_> {
    fn unique(&self, selector: &str) -> bool {
        let unique = oracle::is_unique(self.tree, self.scope, selector);
        tracing::trace!("candidate {:?} unique={}", selector, unique);
        unique
    }

    fn tag(&self) -> &str {
        self.tree.tag_name(self.target).unwrap_or("*")
    }

    fn by_id(&self) -> Option<String> {
        let id = self.tree.element(self.target)?.id.as_deref()?;
        if id.is_empty() || self.synth.classifier.is_unstable_id(id) {
            return None;
        }
        let selector = format!("#{}", css_escape(id));
        // Duplicate ids exist in the wild
        self.unique(&selector).then_some(selector)
    }

    fn by_class(&self) -> Option<String> {
        let classes = self.synth.clean_classes(self.tree, self.target);
        if classes.is_empty() {
            return None;
        }

        classes
            .iter()
            .map(|c| format!(".{}", css_escape(c)))
            .find(|s| self.unique(s))
            .or_else(|| Some(class_chain(&classes)).filter(|s| self.unique(s)))
    }

    fn by_attribute(&self) -> Option<String> {
        self.synth.config.unique_attributes.iter().find_map(|attr| {
            let value = self.tree.get_attribute(self.target, attr)?;
            if value.is_empty() {
                return None;
            }
            let selector = format!("[{}={}]", css_escape(attr), css_string(value));
            self.unique(&selector).then_some(selector)
        })
    }

    fn by_text(&self) -> Option<String> {
        let text = self.tree.text_content(self.target);
        let text = text.trim();
        let len = text.chars().count();
        if len == 0 || len >= self.synth.config.max_text_length {
            return None;
        }

        let tree = self.tree;
        let name = tree.element(self.target)?.name;
        let same_text = tree
            .element_descendants(tree.root())
            .into_iter()
            .filter(|&n| tree.element(n).is_some_and(|e| e.name == name))
            .filter(|&n| tree.text_content(n).trim() == text)
            .count();
        if same_text != 1 {
            return None;
        }

        let index = tree.type_index(self.target)?;
        let selector = format!("{}:nth-of-type({})", self.tag(), index);
        self.unique(&selector).then_some(selector)
    }

    fn by_path(&self) -> Option<String> {
        let tree = self.tree;
        let mut path = Vec::new();
        let mut current = Some(self.target);
        let mut depth = 0;

        while let Some(node) = current {
            if node == self.boundary || depth >= self.synth.config.max_path_depth {
                break;
            }
            let parent = tree.parent_element(node);
            if let Some(parent) = parent {
                path.push(self.path_fragment(node, parent)?);
            }
            current = parent;
            depth += 1;
        }

        if path.is_empty() {
            return None;
        }
        path.reverse();
        let selector = path.join(" > ");
        self.unique(&selector).then_some(selector)
    }

    /// `tag.classes` if that picks `node` out of its siblings, else `tag:nth-child(i)`
    fn path_fragment(&self, node: NodeId, parent: NodeId) -> Option<String> {
        let tree = self.tree;
        let tag = tree.tag_name(node)?;
        let classes = self.synth.clean_classes(tree, node);
        if !classes.is_empty() {
            let fragment = format!("{}{}", tag, class_chain(&classes));
            if oracle::is_unique(tree, parent, &format!(":scope > {}", fragment)) {
                return Some(fragment);
            }
        }
        let index = tree.element_index(node)?;
        Some(format!("{}:nth-child({})", tag, index))
    }

    fn by_fallback_attribute(&self) -> Option<String> {
        let excluded = &self.synth.config.excluded_attributes;
        self.tree
            .attributes(self.target)
            .into_iter()
            .filter(|(name, value)| !value.is_empty() && !excluded.iter().any(|e| e == name))
            .map(|(name, value)| format!("{}[{}={}]", self.tag(), css_escape(name), css_string(value)))
            .find(|s| self.unique(s))
    }
}
