//! Stability classification for ids and class names
//!
//! Decides whether a token looks generated (hashed, framework-injected or
//! state-dependent) and is therefore unsafe to put in a durable selector.
//! Rules run in priority order and stop at the first hit.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use regex::Regex;

/// Words that describe transient UI state rather than identity
const STATE_TOKENS: &[&str] = &[
    "active", "checked", "collapsed", "current", "disabled", "expanded", "focus", "focused",
    "hidden", "hover", "loading", "open", "pressed", "selected", "show", "visible", "visited",
];

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instability {
    /// `is-`, `has-`, `js-`...
    StatePrefix,
    /// `ng-`, `v-`, `svelte-`, `sc-`, `css-`, `tw-`, `tailwind-`
    FrameworkPrefix,
    /// Enter/leave/animation/transition names
    Transition,
    /// Hash or counter shaped
    HashLike,
    /// A state keyword among the word parts
    StateKeyword,
    /// Ids ending in a number
    NumericSuffix,
}

impl fmt::Display for Instability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StatePrefix => "state prefix",
            Self::FrameworkPrefix => "framework prefix",
            Self::Transition => "transition/animation name",
            Self::HashLike => "hash-like",
            Self::StateKeyword => "state keyword",
            Self::NumericSuffix => "numeric suffix",
        })
    }
}

/// Classification result for one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Stable,
    Unstable(Instability),
}

impl Verdict {
    pub fn is_unstable(self) -> bool {
        matches!(self, Self::Unstable(_))
    }
}

/// Memoizing token classifier.
///
/// Verdicts are pure functions of the token, so the cache never needs
/// invalidation.
pub struct StabilityClassifier {
    state_prefix: Regex,
    framework_prefix: Regex,
    transition: Regex,
    short_counter: Regex,
    hex_run: Regex,
    hashed_suffix: Regex,
    split: Regex,
    numeric_suffix: Regex,
    tokens: RefCell<HashMap<String, Verdict>>,
    ids: RefCell<HashMap<String, Verdict>>,
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("classifier pattern is valid")
}

impl StabilityClassifier {
    pub fn new() -> Self {
        Self {
            state_prefix: pattern(r"(?i)^(is|has|js)-"),
            framework_prefix: pattern(r"(?i)^(ng|v|svelte|sc|css|tw|tailwind)-"),
            transition: pattern(r"(?i)(enter|leave|animat|transition|fade|slide)"),
            short_counter: pattern(r"(?i)[a-z]\d{3,}"),
            hex_run: pattern(r"(?i)[0-9a-f]{5,}"),
            hashed_suffix: pattern(r"[-_]([A-Za-z0-9]{5,})$"),
            split: pattern(r"[^A-Za-z0-9]+"),
            numeric_suffix: pattern(r"(\d+$)|(^:r[0-9a-z]+:$)"),
            tokens: RefCell::new(HashMap::new()),
            ids: RefCell::new(HashMap::new()),
        }
    }

    /// Class or id token check. Empty tokens are not applicable and report stable.
    pub fn is_unstable(&self, token: &str) -> bool {
        self.classify(token).is_unstable()
    }

    /// Id check: the token rules plus the numeric-suffix rule
    pub fn is_unstable_id(&self, id: &str) -> bool {
        self.classify_id(id).is_unstable()
    }

    /// Token verdict with the rule that fired
    pub fn classify(&self, token: &str) -> Verdict {
        if token.is_empty() {
            return Verdict::Stable;
        }
        if let Some(&verdict) = self.tokens.borrow().get(token) {
            return verdict;
        }

        let verdict = self.evaluate(token);
        self.tokens.borrow_mut().insert(token.to_string(), verdict);
        verdict
    }

    /// Id verdict with the rule that fired
    pub fn classify_id(&self, id: &str) -> Verdict {
        if id.is_empty() {
            return Verdict::Stable;
        }
        if let Some(&verdict) = self.ids.borrow().get(id) {
            return verdict;
        }

        let verdict = if self.numeric_suffix.is_match(id) {
            Verdict::Unstable(Instability::NumericSuffix)
        } else {
            self.classify(id)
        };
        self.ids.borrow_mut().insert(id.to_string(), verdict);
        verdict
    }

    /// Number of memoized verdicts
    pub fn cached(&self) -> usize {
        self.tokens.borrow().len() + self.ids.borrow().len()
    }

    fn evaluate(&self, token: &str) -> Verdict {
        let reason = if self.state_prefix.is_match(token) {
            Some(Instability::StatePrefix)
        } else if self.framework_prefix.is_match(token) {
            Some(Instability::FrameworkPrefix)
        } else if self.transition.is_match(token) {
            Some(Instability::Transition)
        } else if self.is_hash_like(token) {
            Some(Instability::HashLike)
        } else if self.has_state_keyword(token) {
            Some(Instability::StateKeyword)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                tracing::trace!("token {:?} unstable: {}", token, reason);
                Verdict::Unstable(reason)
            }
            None => Verdict::Stable,
        }
    }

    /// Counter glued to a letter, a hex run with digits in it, or a
    /// mixed letter/digit tail after a separator
    fn is_hash_like(&self, token: &str) -> bool {
        if self.short_counter.is_match(token) {
            return true;
        }
        if self
            .hex_run
            .find_iter(token)
            .any(|m| m.as_str().bytes().any(|b| b.is_ascii_digit()))
        {
            return true;
        }
        self.hashed_suffix
            .captures(token)
            .and_then(|c| c.get(1))
            .is_some_and(|tail| {
                let tail = tail.as_str();
                tail.bytes().any(|b| b.is_ascii_digit()) && tail.bytes().any(|b| b.is_ascii_alphabetic())
            })
    }

    fn has_state_keyword(&self, token: &str) -> bool {
        self.split
            .split(token)
            .filter(|part| !part.is_empty())
            .any(|part| STATE_TOKENS.contains(&part.to_ascii_lowercase().as_str()))
    }
}

impl Default for StabilityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(token: &str) -> Option<Instability> {
        match StabilityClassifier::new().classify(token) {
            Verdict::Unstable(r) => Some(r),
            Verdict::Stable => None,
        }
    }

    #[test]
    fn test_rule_priority() {
        assert_eq!(reason("is-active"), Some(Instability::StatePrefix));
        assert_eq!(reason("js-toggle"), Some(Instability::StatePrefix));
        assert_eq!(reason("ng-star-inserted"), Some(Instability::FrameworkPrefix));
        assert_eq!(reason("svelte-1x2y3z"), Some(Instability::FrameworkPrefix));
        assert_eq!(reason("modal-fade"), Some(Instability::Transition));
        assert_eq!(reason("slide-in"), Some(Instability::Transition));
        assert_eq!(reason("btn-a1b2c3"), Some(Instability::HashLike));
        assert_eq!(reason("x1234"), Some(Instability::HashLike));
        assert_eq!(reason("post1234"), Some(Instability::HashLike));
        assert_eq!(reason("item9876"), Some(Instability::HashLike));
        assert_eq!(reason("col-123"), None);
        assert_eq!(reason("menu-open"), Some(Instability::StateKeyword));
        assert_eq!(reason("Tab_Selected"), Some(Instability::StateKeyword));
    }

    #[test]
    fn test_stable_tokens() {
        for token in ["submit-button", "nav", "sidebar", "primary", "feedback-form", "card_title", "main-nav"] {
            assert_eq!(reason(token), None, "{token} should be stable");
        }
    }

    #[test]
    fn test_hashed_suffix_needs_digits_and_letters() {
        assert_eq!(reason("header_3kd9x"), Some(Instability::HashLike));
        assert_eq!(reason("header-button"), None);
    }

    #[test]
    fn test_state_keyword_needs_whole_word() {
        assert_eq!(reason("slideshow"), Some(Instability::Transition));
        assert_eq!(reason("showcase"), None);
        assert_eq!(reason("opener"), None);
    }

    #[test]
    fn test_numeric_suffix_only_for_ids() {
        let c = StabilityClassifier::new();
        assert!(!c.is_unstable("section2"));
        assert!(c.is_unstable_id("section2"));
        assert!(c.is_unstable_id(":r3:"));
        assert!(!c.is_unstable_id("main-content"));
        assert_eq!(c.classify_id("item-42"), Verdict::Unstable(Instability::NumericSuffix));
    }

    #[test]
    fn test_empty_is_not_applicable() {
        let c = StabilityClassifier::new();
        assert!(!c.is_unstable(""));
        assert!(!c.is_unstable_id(""));
        assert_eq!(c.cached(), 0);
    }

    #[test]
    fn test_cache_does_not_change_verdicts() {
        let c = StabilityClassifier::new();
        let tokens = ["is-active", "submit-button", "css-1a2b3c", "menu-open"];
        let first: Vec<bool> = tokens.iter().map(|t| c.is_unstable(t)).collect();
        let second: Vec<bool> = tokens.iter().rev().map(|t| c.is_unstable(t)).collect();
        assert_eq!(first, second.into_iter().rev().collect::<Vec<_>>());
        assert_eq!(c.cached(), tokens.len());

        let fresh = StabilityClassifier::new();
        for t in tokens {
            assert_eq!(fresh.is_unstable(t), c.is_unstable(t));
        }
    }
}
