pub mod adapter;
pub mod backend;

pub use adapter::{StorageAdapter, Subscription, KEY_PREFIX};
pub use backend::{ContextId, JsonFileBackend, MemoryBackend, StorageBackend, SubscriptionId};
