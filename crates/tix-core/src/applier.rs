//! Tab-order application and exact restoration
//!
//! `apply` normalizes existing positive tab positions to 0, then assigns
//! `index + 1` to every element matched by the selector at `index`. The
//! first selector to claim an element keeps it, and elements the normalization
//! pass already recorded keep their 0. Every touched element's
//! original marker is recorded once per cycle so `restore` can put the
//! tree back exactly, including attributes that were absent.

use std::collections::HashMap;

use tix_css::{SelectorError, parse_selector_list};
use tix_dom::{Document, NodeId};

use crate::config::EngineConfig;

/// Original state of one touched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerEntry {
    /// Marker value before the cycle; `None` when the attribute was absent
    pub original: Option<String>,
    /// Ordinal assigned by a selector; `None` for baseline-only entries
    pub ordinal: Option<usize>,
}

/// Per-cycle record of original marker values, in first-touch order
#[derive(Debug, Default, Clone)]
pub struct OriginalMarkerRecord {
    order: Vec<NodeId>,
    entries: HashMap<NodeId, MarkerEntry>,
}

impl OriginalMarkerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `original` unless `node` is already present. Returns true if inserted.
    pub fn record(&mut self, node: NodeId, original: Option<String>) -> bool {
        if self.entries.contains_key(&node) {
            return false;
        }
        self.order.push(node);
        self.entries.insert(node, MarkerEntry { original, ordinal: None });
        true
    }

    pub fn get(&self, node: NodeId) -> Option<&MarkerEntry> {
        self.entries.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    /// Ordinal claimed by a selector this cycle
    pub fn ordinal(&self, node: NodeId) -> Option<usize> {
        self.entries.get(&node).and_then(|e| e.ordinal)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in first-touch order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MarkerEntry)> {
        self.order
            .iter()
            .filter_map(move |&n| self.entries.get(&n).map(|e| (n, e)))
    }

    fn claim(&mut self, node: NodeId, ordinal: usize) {
        if let Some(entry) = self.entries.get_mut(&node) {
            entry.ordinal = Some(ordinal);
        }
    }

    fn drain(&mut self) -> Vec<(NodeId, MarkerEntry)> {
        let mut entries = std::mem::take(&mut self.entries);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|n| entries.remove(&n).map(|e| (n, e)))
            .collect()
    }
}

/// Outcome of one apply pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Elements that received an ordinal from a selector
    pub applied: usize,
    /// Pre-existing positive markers reset to 0
    pub normalized: usize,
    /// Selectors that failed to parse, with the reason
    pub skipped: Vec<(String, SelectorError)>,
}

/// Applies ordered selector lists to a document's tab order
#[derive(Debug)]
pub struct TabOrderApplier {
    marker: String,
    record: OriginalMarkerRecord,
}

impl TabOrderApplier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            marker: config.marker_attribute.clone(),
            record: OriginalMarkerRecord::new(),
        }
    }

    pub fn marker_attribute(&self) -> &str {
        &self.marker
    }

    /// Record of the current cycle
    pub fn record(&self) -> &OriginalMarkerRecord {
        &self.record
    }

    /// Apply `selectors` in order; returns how many elements got an ordinal
    pub fn apply<S: AsRef<str>>(&mut self, doc: &mut Document, selectors: &[S]) -> usize {
        self.apply_with_report(doc, selectors).applied
    }

    pub fn apply_with_report<S: AsRef<str>>(&mut self, doc: &mut Document, selectors: &[S]) -> ApplyReport {
        if !self.record.is_empty() {
            self.restore(doc);
        }

        let mut report = ApplyReport {
            normalized: self.normalize(doc),
            ..ApplyReport::default()
        };

        for (index, selector) in selectors.iter().enumerate() {
            let selector = selector.as_ref();
            let list = match parse_selector_list(selector) {
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!("Invalid selector: {:?} ({})", selector, err);
                    report.skipped.push((selector.to_string(), err));
                    continue;
                }
            };

            let ordinal = index + 1;
            let value = ordinal.to_string();
            let tree = doc.tree_mut();
            for node in list.query_all(tree, tree.root()) {
                let original = tree.get_attribute(node, &self.marker).map(str::to_string);
                if !self.record.record(node, original) {
                    continue;
                }
                self.record.claim(node, ordinal);
                tree.set_attribute(node, &self.marker, &value);
                report.applied += 1;
            }
        }

        tracing::info!("Applied configuration to {} elements", report.applied);
        report
    }

    /// Put every touched element back the way it was and clear the record
    pub fn restore(&mut self, doc: &mut Document) {
        let tree = doc.tree_mut();
        let entries = self.record.drain();
        let count = entries.len();
        for (node, entry) in entries {
            match entry.original {
                Some(value) => {
                    tree.set_attribute(node, &self.marker, &value);
                }
                None => {
                    tree.remove_attribute(node, &self.marker);
                }
            }
        }
        tracing::info!("Reset tab indices on {} elements", count);
    }

    /// Reset explicit positive tab positions to 0 so configured order wins
    fn normalize(&mut self, doc: &mut Document) -> usize {
        let selector = format!("[{m}]:not([{m}='-1'])", m = self.marker);
        let list = match parse_selector_list(&selector) {
            Ok(list) => list,
            Err(err) => {
                tracing::error!("Error resetting existing {} elements: {}", self.marker, err);
                return 0;
            }
        };

        let tree = doc.tree_mut();
        let mut count = 0;
        for node in list.query_all(tree, tree.root()) {
            let original = tree.get_attribute(node, &self.marker).map(str::to_string);
            if self.record.record(node, original) {
                tree.set_attribute(node, &self.marker, "0");
                count += 1;
            }
        }
        count
    }
}

impl Default for TabOrderApplier {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
