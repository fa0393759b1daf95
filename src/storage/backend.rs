use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use parking_lot::Mutex;

/// Identifies one logical "tab" sharing the substrate. Writes carry the writer's
/// context id so the writer's own subscribers are skipped — the same visibility
/// rule as the browser `storage` event.
pub type ContextId = u64;

pub type SubscriptionId = u64;

/// Invoked with the affected key and the new raw value (`None` on delete).
pub type ChangeListener = Box<dyn Fn(&str, Option<&str>) + Send + Sync>;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_context_id() -> ContextId {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Raw key/value substrate shared by every adapter ("tab") in the process.
///
/// Implementations must notify subscribers after the mutation is visible, and
/// must skip subscribers registered under the writing context.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str, source: ContextId);
    fn delete(&self, key: &str, source: ContextId);
    fn keys(&self) -> Vec<String>;
    fn subscribe(&self, source: ContextId, listener: ChangeListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

struct ListenerEntry {
    id: SubscriptionId,
    source: ContextId,
    listener: ChangeListener,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: SubscriptionId,
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    fn add(&mut self, source: ContextId, listener: ChangeListener) -> SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(ListenerEntry {
            id,
            source,
            listener,
        });
        id
    }

    fn remove(&mut self, id: SubscriptionId) {
        self.entries.retain(|e| e.id != id);
    }

    fn notify(&self, key: &str, value: Option<&str>, source: ContextId) {
        for entry in &self.entries {
            if entry.source != source {
                (entry.listener)(key, value);
            }
        }
    }
}

/// In-memory substrate. Used by tests and wherever persistence is not wanted;
/// two adapters sharing one `MemoryBackend` behave like two tabs sharing
/// localStorage.
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<HashMap<String, String>>,
    listeners: Mutex<ListenerRegistry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str, source: ContextId) {
        self.data.lock().insert(key.to_string(), value.to_string());
        self.listeners.lock().notify(key, Some(value), source);
    }

    fn delete(&self, key: &str, source: ContextId) {
        let removed = self.data.lock().remove(key).is_some();
        if removed {
            self.listeners.lock().notify(key, None, source);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.data.lock().keys().cloned().collect()
    }

    fn subscribe(&self, source: ContextId, listener: ChangeListener) -> SubscriptionId {
        self.listeners.lock().add(source, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().remove(id);
    }
}

/// File-backed substrate: one JSON object mapping keys to raw values, loaded on
/// open and rewritten on every mutation. A corrupt file is absorbed to an empty
/// map rather than surfaced. Change notifications are in-process only.
pub struct JsonFileBackend {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
    listeners: Mutex<ListenerRegistry>,
}

impl JsonFileBackend {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir {}", parent.display()))?;
        }

        let data = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("Corrupt storage file {}: {}. Starting empty.", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
            listeners: Mutex::new(ListenerRegistry::default()),
        })
    }

    fn persist(&self, snapshot: &HashMap<String, String>) {
        match serde_json::to_string_pretty(snapshot) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    log::error!("Failed to write storage file {}: {}", self.path.display(), e);
                }
            }
            Err(e) => log::error!("Failed to encode storage file: {}", e),
        }
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str, source: ContextId) {
        {
            let mut data = self.data.lock();
            data.insert(key.to_string(), value.to_string());
            self.persist(&data);
        }
        self.listeners.lock().notify(key, Some(value), source);
    }

    fn delete(&self, key: &str, source: ContextId) {
        let removed = {
            let mut data = self.data.lock();
            let removed = data.remove(key).is_some();
            if removed {
                self.persist(&data);
            }
            removed
        };
        if removed {
            self.listeners.lock().notify(key, None, source);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.data.lock().keys().cloned().collect()
    }

    fn subscribe(&self, source: ContextId, listener: ChangeListener) -> SubscriptionId {
        self.listeners.lock().add(source, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().remove(id);
    }
}
