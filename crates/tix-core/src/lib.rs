//! tix core
//!
//! Durable selector synthesis and reversible tab-order application.
//!
//! The pieces, leaf first:
//! - [`StabilityClassifier`]: rejects generated-looking ids and classes
//! - [`oracle`]: "does this selector match exactly one element?"
//! - [`SelectorSynthesizer`]: tiered search for a unique, durable selector
//! - [`TabOrderApplier`]: assigns tab indices from ordered selector lists
//!   and restores the original attributes exactly
//!
//! [`PageHost`] composes them with the profile store, the selection
//! session and a debounced mutation watcher.

pub mod applier;
pub mod classifier;
pub mod config;
pub mod debounce;
pub mod error;
pub mod focus;
pub mod host;
pub mod messaging;
pub mod oracle;
pub mod profile;
pub mod session;
pub mod storage;
pub mod synthesize;
pub mod watch;

pub use applier::{ApplyReport, MarkerEntry, OriginalMarkerRecord, TabOrderApplier};
pub use classifier::{Instability, StabilityClassifier, Verdict};
pub use config::EngineConfig;
pub use debounce::Debouncer;
pub use error::{Result, TixError};
pub use focus::{FOCUSABLE_SELECTOR, TAB_INDEX_SELECTOR, has_focusable};
pub use host::{KeyAction, KeyPress, PageHost};
pub use messaging::{Request, Response};
pub use profile::{ConfigStorage, TabConfig, clean_url, find_matching_config};
pub use session::{CompletedSelection, SelectionEvent, SelectionSession, SessionOutcome, SessionState, SessionToken};
pub use storage::{MemoryStorage, Storage, StorageChange, StorageScope};
pub use synthesize::{SelectorSynthesizer, Synthesis, Tier};
pub use watch::{MutationWatcher, Trigger};

/// Milliseconds since the Unix epoch, the timestamp unit of stored records
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
