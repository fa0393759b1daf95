use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::backend::{next_context_id, ContextId, StorageBackend, SubscriptionId};

/// Every key this layer owns lives under this prefix; unrelated data in the same
/// substrate is never touched.
pub const KEY_PREFIX: &str = "leadpilot:";

/// Namespaced view of a shared [`StorageBackend`], one per logical tab.
///
/// All operations are infallible from the caller's point of view: codec and
/// substrate failures are logged and absorbed to the supplied fallback.
pub struct StorageAdapter {
    backend: Arc<dyn StorageBackend>,
    context: ContextId,
}

impl StorageAdapter {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            context: next_context_id(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.backend.read(&self.namespaced(key)) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Failed to decode stored value for '{}': {}", key, e);
                    fallback
                }
            },
            None => fallback,
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.backend.write(&self.namespaced(key), &raw, self.context),
            Err(e) => log::error!("Failed to encode value for '{}': {}", key, e),
        }
    }

    pub fn remove(&self, key: &str) {
        self.backend.delete(&self.namespaced(key), self.context);
    }

    /// Removes every key under the prefix, leaving unrelated keys alone.
    pub fn clear(&self) {
        for key in self.backend.keys() {
            if key.starts_with(KEY_PREFIX) {
                self.backend.delete(&key, self.context);
            }
        }
    }

    /// Observes peer-context mutations of one namespaced key. The callback gets
    /// the new raw value, or `None` when the key was removed. Writes made
    /// through this adapter do not trigger it.
    pub fn watch<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(Option<&str>) + Send + Sync + 'static,
    {
        let watched = self.namespaced(key);
        let id = self.backend.subscribe(
            self.context,
            Box::new(move |changed, value| {
                if changed == watched {
                    callback(value);
                }
            }),
        );
        Subscription {
            backend: self.backend.clone(),
            id,
        }
    }
}

/// Unsubscribes when dropped.
pub struct Subscription {
    backend: Arc<dyn StorageBackend>,
    id: SubscriptionId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.backend.unsubscribe(self.id);
    }
}
