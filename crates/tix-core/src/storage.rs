//! Key/value storage seam
//!
//! The host environment owns persistence. This module defines the
//! capability the page host needs from it, an in-memory implementation,
//! and typed helpers over JSON values.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, TixError};
use crate::profile::{ConfigStorage, STORAGE_KEY};

/// Which area a key lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Survives restarts
    Durable,
    /// Cleared with the browsing session
    Ephemeral,
}

/// A change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub scope: StorageScope,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

pub type SubscriptionId = u64;

/// Receiving end of a subscription
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub changes: Receiver<StorageChange>,
}

/// Storage capability provided by the host
pub trait Storage {
    fn get(&self, key: &str, scope: StorageScope) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value, scope: StorageScope) -> Result<()>;
    fn remove(&mut self, key: &str, scope: StorageScope) -> Result<()>;
    fn subscribe(&mut self) -> Subscription;
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Read `key` as `T`, or `fallback` when it is missing
pub fn get_item<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
    fallback: T,
    scope: StorageScope,
) -> Result<T> {
    match storage.get(key, scope) {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(fallback),
    }
}

pub fn set_item<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T, scope: StorageScope) -> Result<()> {
    storage.set(key, serde_json::to_value(value)?, scope)
}

pub fn remove_item(storage: &mut dyn Storage, key: &str, scope: StorageScope) -> Result<()> {
    storage.remove(key, scope)
}

/// Load the profile document, defaulting to an empty, enabled one
pub fn load_profiles(storage: &dyn Storage) -> Result<ConfigStorage> {
    get_item(storage, STORAGE_KEY, ConfigStorage::default(), StorageScope::Durable)
}

pub fn save_profiles(storage: &mut dyn Storage, profiles: &ConfigStorage) -> Result<()> {
    set_item(storage, STORAGE_KEY, profiles, StorageScope::Durable)
}

/// In-process storage with change notification over channels
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<(StorageScope, String), Value>,
    subscribers: Vec<(SubscriptionId, Sender<StorageChange>)>,
    next_id: SubscriptionId,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose serialized size would exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn notify(&mut self, change: StorageChange) {
        // Dropped receivers unsubscribe implicitly
        self.subscribers.retain(|(_, tx)| tx.send(change.clone()).is_ok());
    }

    fn used_bytes(&self) -> usize {
        self.values.values().map(|v| v.to_string().len()).sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str, scope: StorageScope) -> Option<Value> {
        self.values.get(&(scope, key.to_string())).cloned()
    }

    fn set(&mut self, key: &str, value: Value, scope: StorageScope) -> Result<()> {
        let slot = (scope, key.to_string());
        if let Some(quota) = self.quota {
            let replaced = self.values.get(&slot).map_or(0, |v| v.to_string().len());
            let needed = self.used_bytes() - replaced + value.to_string().len();
            if needed > quota {
                return Err(TixError::Storage(format!(
                    "quota exceeded writing {key:?}: {needed} > {quota} bytes"
                )));
            }
        }

        let old_value = self.values.insert(slot, value.clone());
        self.notify(StorageChange {
            key: key.to_string(),
            scope,
            old_value,
            new_value: Some(value),
        });
        Ok(())
    }

    fn remove(&mut self, key: &str, scope: StorageScope) -> Result<()> {
        if let Some(old) = self.values.remove(&(scope, key.to_string())) {
            self.notify(StorageChange {
                key: key.to_string(),
                scope,
                old_value: Some(old),
                new_value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.next_id += 1;
        self.subscribers.push((self.next_id, tx));
        Subscription {
            id: self.next_id,
            changes: rx,
        }
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}
