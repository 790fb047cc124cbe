//! Per-site configuration profiles
//!
//! A profile binds an ordered selector list to a URL prefix. The layout is
//! the JSON stored under [`STORAGE_KEY`], so field names stay camelCase.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Storage key holding the [`ConfigStorage`] document
pub const STORAGE_KEY: &str = "tab-indexer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabConfig {
    pub id: u64,
    /// URL prefix this profile applies to
    pub url: String,
    /// Desired tab order, first entry gets tab index 1
    pub selectors: Vec<String>,
    /// Unix milliseconds
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub updated: u64,
}

impl TabConfig {
    /// New profile for the page at `page_url`, keyed by its origin and path
    pub fn for_page(id: u64, page_url: &str, selectors: Vec<String>) -> Result<Self> {
        let url = Url::parse(page_url)?;
        Ok(Self {
            id,
            url: clean_parsed(&url),
            selectors,
            created: 0,
            updated: 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStorage {
    #[serde(default)]
    pub configs: Vec<TabConfig>,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for ConfigStorage {
    fn default() -> Self {
        Self {
            configs: Vec::new(),
            is_enabled: true,
        }
    }
}

impl ConfigStorage {
    /// Insert a new profile or replace the one with the same id
    pub fn upsert_config(&mut self, mut config: TabConfig, now_ms: u64) {
        match self.configs.iter_mut().find(|c| c.id == config.id) {
            Some(existing) => {
                config.created = existing.created;
                config.updated = now_ms;
                *existing = config;
            }
            None => {
                config.created = now_ms;
                config.updated = now_ms;
                self.configs.push(config);
            }
        }
    }

    /// Remove the profile with `id`; returns whether one existed
    pub fn delete_config(&mut self, id: u64) -> bool {
        let before = self.configs.len();
        self.configs.retain(|c| c.id != id);
        self.configs.len() != before
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    /// Profile for `current_url`; see [`find_matching_config`]
    pub fn matching(&self, current_url: &str) -> Option<&TabConfig> {
        find_matching_config(&self.configs, current_url)
    }

    /// Next free profile id
    pub fn next_id(&self) -> u64 {
        self.configs.iter().map(|c| c.id).max().map_or(1, |m| m + 1)
    }
}

/// The profile whose URL is the longest prefix of `current_url`.
/// Ties keep the earlier profile.
pub fn find_matching_config<'a>(configs: &'a [TabConfig], current_url: &str) -> Option<&'a TabConfig> {
    if current_url.is_empty() {
        return None;
    }
    configs
        .iter()
        .filter(|c| current_url.starts_with(&c.url))
        .fold(None, |best: Option<&TabConfig>, c| match best {
            Some(b) if b.url.len() >= c.url.len() => Some(b),
            _ => Some(c),
        })
}

/// Origin plus path for http(s) URLs, empty for anything else
pub fn clean_url(url: &str) -> String {
    Url::parse(url).map(|u| clean_parsed(&u)).unwrap_or_default()
}

fn clean_parsed(url: &Url) -> String {
    match url.scheme() {
        "http" | "https" => format!("{}{}", url.origin().ascii_serialization(), url.path()),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(id: u64, url: &str) -> TabConfig {
        TabConfig {
            id,
            url: url.to_string(),
            selectors: vec![format!("#s{id}")],
            created: 0,
            updated: 0,
        }
    }

    #[test]
    fn test_longest_prefix_wins() {
        let configs = vec![
            cfg(1, "https://example.com/"),
            cfg(2, "https://example.com/app/"),
            cfg(3, "https://other.com/"),
        ];
        assert_eq!(find_matching_config(&configs, "https://example.com/app/inbox").unwrap().id, 2);
        assert_eq!(find_matching_config(&configs, "https://example.com/about").unwrap().id, 1);
        assert!(find_matching_config(&configs, "https://nowhere.test/").is_none());
        assert!(find_matching_config(&configs, "").is_none());
    }

    #[test]
    fn test_tie_keeps_first() {
        let configs = vec![cfg(1, "https://a.test/"), cfg(2, "https://a.test/")];
        assert_eq!(find_matching_config(&configs, "https://a.test/x").unwrap().id, 1);
    }

    #[test]
    fn test_clean_url() {
        assert_eq!(clean_url("https://example.com/a/b?q=1#frag"), "https://example.com/a/b");
        assert_eq!(clean_url("http://localhost:8080/"), "http://localhost:8080/");
        assert_eq!(clean_url("chrome://extensions"), "");
        assert_eq!(clean_url("not a url"), "");
    }

    #[test]
    fn test_for_page() {
        let config = TabConfig::for_page(1, "https://example.com/app?x=1", vec![]).unwrap();
        assert_eq!(config.url, "https://example.com/app");
        assert!(matches!(
            TabConfig::for_page(1, "::", vec![]),
            Err(crate::TixError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_upsert_and_delete() {
        let mut storage = ConfigStorage::default();
        storage.upsert_config(cfg(1, "https://a.test/"), 100);
        assert_eq!(storage.configs[0].created, 100);

        let mut edited = cfg(1, "https://a.test/");
        edited.selectors = vec![".x".into()];
        storage.upsert_config(edited, 200);
        assert_eq!(storage.configs.len(), 1);
        assert_eq!(storage.configs[0].created, 100);
        assert_eq!(storage.configs[0].updated, 200);
        assert_eq!(storage.configs[0].selectors, vec![".x".to_string()]);

        assert_eq!(storage.next_id(), 2);
        assert!(storage.delete_config(1));
        assert!(!storage.delete_config(1));
    }

    #[test]
    fn test_json_layout() {
        let mut storage = ConfigStorage::default();
        storage.upsert_config(cfg(7, "https://a.test/"), 5);
        storage.set_enabled(false);
        let json = serde_json::to_value(&storage).unwrap();
        assert_eq!(json["isEnabled"], serde_json::json!(false));
        assert_eq!(json["configs"][0]["selectors"][0], "#s7");

        let parsed: ConfigStorage = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_enabled);
        assert!(parsed.configs.is_empty());
    }
}
