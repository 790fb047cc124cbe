//! Engine configuration
//!
//! Every constant used by synthesis, the applier and the page host. The
//! defaults are the production values; a TOML file may override any subset.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for selector synthesis and tab-order application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Text tier only considers trimmed text shorter than this
    pub max_text_length: usize,
    /// Ancestor levels walked by the structural path tier
    pub max_path_depth: usize,
    /// Trailing-edge debounce window for re-application
    pub debounce_ms: u64,
    /// How long a completed selection stays valid for pickup
    pub selection_validity_minutes: u64,
    /// Attribute tier candidates, in priority order
    pub unique_attributes: Vec<String>,
    /// Attributes the fallback tier never uses
    pub excluded_attributes: Vec<String>,
    /// Class added to hovered nodes during a selection session
    pub highlight_class: String,
    /// Class of the selection overlay
    pub overlay_class: String,
    /// Attribute carrying the ordinal
    pub marker_attribute: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_text_length: 50,
            max_path_depth: 6,
            debounce_ms: 250,
            selection_validity_minutes: 5,
            unique_attributes: ["data-testid", "aria-label", "name", "href", "data-id"]
                .map(String::from)
                .to_vec(),
            excluded_attributes: ["class", "style"].map(String::from).to_vec(),
            highlight_class: "tix-highlight".to_string(),
            overlay_class: "tix-overlay".to_string(),
            marker_attribute: "tabindex".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml(&source)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn selection_validity(&self) -> Duration {
        Duration::from_secs(self.selection_validity_minutes * 60)
    }

    /// Classes that belong to the tool itself and never appear in selectors
    pub fn is_internal_class(&self, class: &str) -> bool {
        class == self.highlight_class || class == self.overlay_class
    }
}
