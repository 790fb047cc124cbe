//! Page host
//!
//! Wires the core onto one document: applies the matching profile, keeps
//! it applied across storage and tree changes with a debounce, runs the
//! selection session and answers UI messages. The embedding environment
//! feeds it events and calls [`PageHost::tick`] from its event loop.

use std::time::Instant;

use serde_json::Value;
use tix_dom::{Document, MutationRecord};

use crate::applier::TabOrderApplier;
use crate::config::EngineConfig;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::messaging::{Request, Response};
use crate::profile::STORAGE_KEY;
use crate::session::{
    CompletedSelection, SELECTION_KEY, SelectionEvent, SelectionSession, SessionOutcome, SessionToken,
};
use crate::storage::{self, Storage, StorageScope, Subscription};
use crate::synthesize::SelectorSynthesizer;
use crate::watch::MutationWatcher;

/// Deferred work keyed in the debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    ApplyConfig,
}

/// A key press as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Physical key code, e.g. `Escape` or `KeyA`
    pub code: String,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl_shift(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ctrl: true,
            shift: true,
        }
    }
}

/// Effect of a handled key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    SelectionCancelled,
    Enabled,
    Disabled,
}

pub struct PageHost<S: Storage> {
    config: EngineConfig,
    doc: Document,
    storage: S,
    subscription: Option<Subscription>,
    applier: TabOrderApplier,
    synth: SelectorSynthesizer,
    session: SelectionSession,
    debouncer: Debouncer<Task>,
    watcher: MutationWatcher,
}

impl<S: Storage> PageHost<S> {
    pub fn new(doc: Document, mut storage: S, config: EngineConfig) -> Self {
        let subscription = Some(storage.subscribe());
        Self {
            applier: TabOrderApplier::new(&config),
            synth: SelectorSynthesizer::new(config.clone()),
            session: SelectionSession::new(&config.highlight_class, &config.overlay_class),
            debouncer: Debouncer::new(config.debounce_window()),
            watcher: MutationWatcher::new(doc.url()),
            config,
            doc,
            storage,
            subscription,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for the embedding environment; report the changes
    /// through [`on_mutations`](Self::on_mutations)
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn applier(&self) -> &TabOrderApplier {
        &self.applier
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn synthesizer(&self) -> &SelectorSynthesizer {
        &self.synth
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending(&Task::ApplyConfig)
    }

    /// Apply the profile for the current URL, or restore when disabled or
    /// nothing matches. Returns the number of elements ordered.
    pub fn apply_config_if_exists(&mut self) -> Result<usize> {
        let profiles = storage::load_profiles(&self.storage)?;
        if !profiles.is_enabled {
            self.applier.restore(&mut self.doc);
            return Ok(0);
        }

        match profiles.matching(self.doc.url()) {
            Some(profile) => {
                tracing::debug!("profile {} matches {}", profile.id, self.doc.url());
                Ok(self.applier.apply(&mut self.doc, &profile.selectors))
            }
            None => {
                self.applier.restore(&mut self.doc);
                Ok(0)
            }
        }
    }

    /// Feed a batch of tree mutations; relevant ones schedule a re-apply
    pub fn on_mutations(&mut self, records: &[MutationRecord], now: Instant) {
        if let Some(trigger) = self.watcher.observe(self.doc.tree(), self.doc.url(), records) {
            tracing::debug!("re-apply scheduled: {:?}", trigger);
            self.debouncer.schedule(Task::ApplyConfig, now);
        }
    }

    /// Same-document navigation
    pub fn navigate(&mut self, url: &str, now: Instant) {
        self.doc.set_url(url);
        self.on_mutations(&[], now);
    }

    /// Drain storage notifications and run whatever is due
    pub fn tick(&mut self, now: Instant) -> Result<Option<usize>> {
        // Counted rather than `any` so the whole queue is drained
        let profile_changed = self.subscription.as_ref().is_some_and(|sub| {
            sub.changes
                .try_iter()
                .filter(|c| c.key == STORAGE_KEY && c.scope == StorageScope::Durable)
                .count()
                > 0
        });
        if profile_changed {
            self.debouncer.schedule(Task::ApplyConfig, now);
        }

        let mut applied = None;
        for task in self.debouncer.due(now) {
            match task {
                Task::ApplyConfig => applied = Some(self.apply_config_if_exists()?),
            }
        }
        Ok(applied)
    }

    /// Answer a message from the configuration UI
    pub fn handle_message(&mut self, message: &Value, now_ms: u64) -> Response {
        match Request::from_message(message) {
            Some(Request::StartElementSelection) => match self.start_selection(now_ms) {
                Ok(_) => Response::ok(),
                Err(err) => {
                    tracing::warn!("could not start selection: {}", err);
                    Response::failed()
                }
            },
            None => Response::unknown_action(),
        }
    }

    /// Store a pending record and open a new selection session
    pub fn start_selection(&mut self, now_ms: u64) -> Result<SessionToken> {
        storage::set_item(
            &mut self.storage,
            SELECTION_KEY,
            &CompletedSelection::pending(now_ms),
            StorageScope::Durable,
        )?;
        let (token, _) = self.session.start(&mut self.doc, now_ms);
        Ok(token)
    }

    /// Route a pointer event captured for session `token`
    pub fn handle_pointer(&mut self, token: SessionToken, event: SelectionEvent, now_ms: u64) -> Result<SessionOutcome> {
        let outcome = self.session.handle(token, event, &mut self.doc, &self.synth, now_ms);
        match &outcome {
            SessionOutcome::Selected(record) => {
                storage::set_item(&mut self.storage, SELECTION_KEY, record, StorageScope::Durable)?;
            }
            SessionOutcome::Cancelled => {
                storage::remove_item(&mut self.storage, SELECTION_KEY, StorageScope::Durable)?;
            }
            SessionOutcome::Failed(message) => tracing::warn!("{}", message),
            _ => {}
        }
        Ok(outcome)
    }

    /// Keyboard shortcuts: Escape cancels a session, Ctrl+Shift+A/D toggle
    pub fn handle_key(&mut self, key: &KeyPress, now_ms: u64) -> Result<KeyAction> {
        if key.code == "Escape" {
            let Some(token) = self.session.token() else {
                return Ok(KeyAction::None);
            };
            self.handle_pointer(token, SelectionEvent::Escape, now_ms)?;
            return Ok(KeyAction::SelectionCancelled);
        }

        if !(key.ctrl && key.shift) {
            return Ok(KeyAction::None);
        }
        let enabled = match key.code.as_str() {
            "KeyA" => true,
            "KeyD" => false,
            _ => return Ok(KeyAction::None),
        };

        let mut profiles = storage::load_profiles(&self.storage)?;
        profiles.set_enabled(enabled);
        storage::save_profiles(&mut self.storage, &profiles)?;
        tracing::info!("tab ordering {}", if enabled { "enabled" } else { "disabled" });
        Ok(if enabled { KeyAction::Enabled } else { KeyAction::Disabled })
    }

    /// The stored selection if it is complete and still fresh
    pub fn completed_selection(&self, now_ms: u64) -> Result<Option<CompletedSelection>> {
        let record: Option<CompletedSelection> =
            storage::get_item(&self.storage, SELECTION_KEY, None, StorageScope::Durable)?;
        Ok(record.filter(|r| !r.pending && r.is_fresh(now_ms, self.config.selection_validity())))
    }

    /// Page unload: stop timers, end the session, drop the subscription
    pub fn shutdown(&mut self) {
        self.debouncer.cancel_all();
        self.session.cancel(&mut self.doc);
        if let Some(sub) = self.subscription.take() {
            self.storage.unsubscribe(sub.id);
        }
        tracing::debug!("page host shut down");
    }
}
