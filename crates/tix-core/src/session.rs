//! Interactive element selection
//!
//! A session highlights hovered elements and turns a click into a
//! synthesized selector. Each session is identified by a generation token;
//! starting a new one or cancelling revokes the previous token, so events
//! still in flight for an old session are dropped.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tix_dom::{Document, NodeId};

use crate::synthesize::SelectorSynthesizer;

/// Storage key of the pending/completed selection record
pub const SELECTION_KEY: &str = "completed-selection";

/// Message shown when no tier produced a selector
pub const NO_SELECTOR_MESSAGE: &str = "Unable to generate a reliable selector for this element";

/// Generation counter identifying one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u32);

impl SessionToken {
    pub const INITIAL: Self = SessionToken(0);

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[inline]
    const fn next(self) -> Self {
        SessionToken(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active(SessionToken),
    Completed(String),
    Cancelled,
}

/// Input forwarded by the host while a session may be live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Hover(NodeId),
    HoverOut(NodeId),
    Click(NodeId),
    Escape,
}

/// What the host should do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Stale token, no session, or a click on the overlay
    Ignored,
    Highlighted(NodeId),
    HighlightsCleared,
    /// Selection finished; persist the record
    Selected(CompletedSelection),
    /// Session stays active; show the message
    Failed(&'static str),
    /// Session ended by the user; drop the stored record
    Cancelled,
}

/// Record handed to the configuration UI through storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSelection {
    /// True while the user is still picking
    #[serde(rename = "flag")]
    pub pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Unix milliseconds
    pub timestamp: u64,
}

impl CompletedSelection {
    pub fn pending(timestamp: u64) -> Self {
        Self {
            pending: true,
            selector: None,
            timestamp,
        }
    }

    pub fn completed(selector: String, timestamp: u64) -> Self {
        Self {
            pending: false,
            selector: Some(selector),
            timestamp,
        }
    }

    /// Whether the record is recent enough to act on
    pub fn is_fresh(&self, now_ms: u64, validity: Duration) -> bool {
        now_ms.saturating_sub(self.timestamp) <= validity.as_millis() as u64
    }
}

/// Selection session state machine
#[derive(Debug)]
pub struct SelectionSession {
    generation: SessionToken,
    state: SessionState,
    overlay: Option<NodeId>,
    highlight_class: String,
    overlay_class: String,
}

impl SelectionSession {
    pub fn new(highlight_class: &str, overlay_class: &str) -> Self {
        Self {
            generation: SessionToken::INITIAL,
            state: SessionState::Idle,
            overlay: None,
            highlight_class: highlight_class.to_string(),
            overlay_class: overlay_class.to_string(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// Token of the live session, if any
    pub fn token(&self) -> Option<SessionToken> {
        match self.state {
            SessionState::Active(token) => Some(token),
            _ => None,
        }
    }

    pub fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    /// Begin a session, ending any live one first
    pub fn start(&mut self, doc: &mut Document, now_ms: u64) -> (SessionToken, CompletedSelection) {
        if self.is_active() {
            self.stop(doc);
        }

        self.generation = self.generation.next();
        self.state = SessionState::Active(self.generation);

        let body = doc.scope_root();
        let tree = doc.tree_mut();
        let overlay = tree.create_element("div");
        tree.set_attribute(overlay, "class", &self.overlay_class);
        tree.append_child(body, overlay);
        self.overlay = Some(overlay);

        tracing::debug!("selection session {} started", self.generation.value());
        (self.generation, CompletedSelection::pending(now_ms))
    }

    /// Route an event. Events for any token but the live one are ignored.
    pub fn handle(
        &mut self,
        token: SessionToken,
        event: SelectionEvent,
        doc: &mut Document,
        synth: &SelectorSynthesizer,
        now_ms: u64,
    ) -> SessionOutcome {
        if self.token() != Some(token) {
            return SessionOutcome::Ignored;
        }

        match event {
            SelectionEvent::Escape => {
                self.stop(doc);
                self.state = SessionState::Cancelled;
                SessionOutcome::Cancelled
            }
            SelectionEvent::Hover(node) => {
                if self.is_overlay_target(doc, node) {
                    return SessionOutcome::Ignored;
                }
                doc.tree_mut().add_class(node, &self.highlight_class);
                SessionOutcome::Highlighted(node)
            }
            SelectionEvent::HoverOut(node) => {
                if self.is_overlay_target(doc, node) {
                    return SessionOutcome::Ignored;
                }
                self.clear_highlights(doc);
                SessionOutcome::HighlightsCleared
            }
            SelectionEvent::Click(node) => {
                if self.is_overlay_target(doc, node) {
                    return SessionOutcome::Ignored;
                }
                match synth.synthesize(doc, node) {
                    Some(selector) => {
                        tracing::info!("Selected: {}", selector);
                        self.stop(doc);
                        self.state = SessionState::Completed(selector.clone());
                        SessionOutcome::Selected(CompletedSelection::completed(selector, now_ms))
                    }
                    None => SessionOutcome::Failed(NO_SELECTOR_MESSAGE),
                }
            }
        }
    }

    /// Cancel from outside the event stream (navigation, unload)
    pub fn cancel(&mut self, doc: &mut Document) {
        if self.is_active() {
            self.stop(doc);
            self.state = SessionState::Cancelled;
        }
    }

    fn stop(&mut self, doc: &mut Document) {
        if let Some(overlay) = self.overlay.take() {
            doc.tree_mut().detach(overlay);
        }
        self.clear_highlights(doc);
        self.state = SessionState::Idle;
    }

    fn clear_highlights(&self, doc: &mut Document) {
        let tree = doc.tree_mut();
        let highlighted: Vec<NodeId> = tree
            .element_descendants(tree.root())
            .into_iter()
            .filter(|&n| tree.element(n).is_some_and(|e| e.has_class(&self.highlight_class)))
            .collect();
        for node in highlighted {
            tree.remove_class(node, &self.highlight_class);
        }
    }

    /// The overlay itself or anything inside an element with the overlay class
    fn is_overlay_target(&self, doc: &Document, node: NodeId) -> bool {
        let tree = doc.tree();
        if self.overlay == Some(node) {
            return true;
        }
        std::iter::once(node)
            .chain(tree.ancestors(node))
            .any(|n| tree.element(n).is_some_and(|e| e.has_class(&self.overlay_class)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Document, NodeId, NodeId, SelectorSynthesizer, SelectionSession) {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body();
        let tree = doc.tree_mut();
        let save = tree.create_element("button");
        tree.set_attribute(save, "id", "save");
        tree.append_child(body, save);
        let blank = tree.create_element("span");
        tree.append_child(body, blank);
        let blank2 = tree.create_element("span");
        tree.append_child(body, blank2);
        let synth = SelectorSynthesizer::default();
        let session = SelectionSession::new("tix-highlight", "tix-overlay");
        (doc, save, blank, synth, session)
    }

    #[test]
    fn test_click_completes() {
        let (mut doc, save, _, synth, mut session) = setup();
        let (token, pending) = session.start(&mut doc, 1_000);
        assert!(pending.pending);
        assert!(session.overlay().is_some());

        let outcome = session.handle(token, SelectionEvent::Click(save), &mut doc, &synth, 2_000);
        assert_eq!(
            outcome,
            SessionOutcome::Selected(CompletedSelection::completed("#save".into(), 2_000))
        );
        assert_eq!(session.state(), &SessionState::Completed("#save".into()));
        assert_eq!(doc.tree().element_children(doc.body()).count(), 3);
    }

    #[test]
    fn test_failed_click_keeps_session() {
        let (mut doc, _, _, _, mut session) = setup();
        let (token, _) = session.start(&mut doc, 0);
        let spans: Vec<NodeId> = doc
            .tree()
            .element_children(doc.body())
            .filter(|&n| doc.tree().tag_name(n) == Some("span"))
            .collect();
        let shallow = SelectorSynthesizer::new(crate::EngineConfig {
            max_path_depth: 0,
            ..Default::default()
        });
        let outcome = session.handle(token, SelectionEvent::Click(spans[0]), &mut doc, &shallow, 0);
        assert_eq!(outcome, SessionOutcome::Failed(NO_SELECTOR_MESSAGE));
        assert!(session.is_active());
    }

    #[test]
    fn test_restart_invalidates_old_token() {
        let (mut doc, save, _, synth, mut session) = setup();
        let (first, _) = session.start(&mut doc, 0);
        let (second, _) = session.start(&mut doc, 0);
        assert_ne!(first, second);

        let stale = session.handle(first, SelectionEvent::Click(save), &mut doc, &synth, 0);
        assert_eq!(stale, SessionOutcome::Ignored);
        assert!(session.is_active());
        // Only one overlay in the tree
        let overlays = crate::oracle::match_count(doc.tree(), doc.body(), ".tix-overlay");
        assert_eq!(overlays, 1);
    }

    #[test]
    fn test_hover_and_escape() {
        let (mut doc, save, blank, synth, mut session) = setup();
        let (token, _) = session.start(&mut doc, 0);

        session.handle(token, SelectionEvent::Hover(save), &mut doc, &synth, 0);
        session.handle(token, SelectionEvent::Hover(blank), &mut doc, &synth, 0);
        assert_eq!(crate::oracle::match_count(doc.tree(), doc.body(), ".tix-highlight"), 2);

        session.handle(token, SelectionEvent::HoverOut(blank), &mut doc, &synth, 0);
        assert_eq!(crate::oracle::match_count(doc.tree(), doc.body(), ".tix-highlight"), 0);

        session.handle(token, SelectionEvent::Hover(save), &mut doc, &synth, 0);
        let outcome = session.handle(token, SelectionEvent::Escape, &mut doc, &synth, 0);
        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert_eq!(session.state(), &SessionState::Cancelled);
        assert_eq!(crate::oracle::match_count(doc.tree(), doc.body(), ".tix-highlight"), 0);
        assert_eq!(crate::oracle::match_count(doc.tree(), doc.body(), ".tix-overlay"), 0);

        let after = session.handle(token, SelectionEvent::Click(save), &mut doc, &synth, 0);
        assert_eq!(after, SessionOutcome::Ignored);
    }

    #[test]
    fn test_overlay_clicks_ignored() {
        let (mut doc, _, _, synth, mut session) = setup();
        let (token, _) = session.start(&mut doc, 0);
        let overlay = session.overlay().unwrap();
        let outcome = session.handle(token, SelectionEvent::Click(overlay), &mut doc, &synth, 0);
        assert_eq!(outcome, SessionOutcome::Ignored);
        assert!(session.is_active());
    }

    #[test]
    fn test_selection_record_serde() {
        let record = CompletedSelection::completed("#save".into(), 42);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"flag": false, "selector": "#save", "timestamp": 42}));

        let pending: CompletedSelection = serde_json::from_str(r#"{"flag":true,"timestamp":7}"#).unwrap();
        assert_eq!(pending, CompletedSelection::pending(7));
    }

    #[test]
    fn test_freshness() {
        let record = CompletedSelection::pending(0);
        let validity = Duration::from_secs(300);
        assert!(record.is_fresh(300_000, validity));
        assert!(!record.is_fresh(300_001, validity));
    }
}
