use std::sync::Arc;

use parking_lot::Mutex;

use crate::storage::Subscription;

use super::state::{StateStore, STATE_KEY};
use super::AppState;

/// Keeps an in-memory projection of the persisted document in sync with writes
/// made by peer contexts sharing the same substrate.
///
/// A malformed peer update is logged and ignored, retaining the previous
/// projection. A peer delete resets the projection to the caller-supplied
/// initial value. Dropping the reconciler unsubscribes.
pub struct Reconciler {
    state: Arc<Mutex<AppState>>,
    _subscription: Subscription,
}

impl Reconciler {
    pub fn attach(store: &StateStore, initial: AppState) -> Self {
        let state = Arc::new(Mutex::new(initial.clone()));
        let shared = state.clone();
        let subscription = store.adapter().watch(STATE_KEY, move |raw| match raw {
            Some(raw) => match serde_json::from_str::<AppState>(raw) {
                Ok(next) => *shared.lock() = next,
                Err(e) => log::warn!("Ignoring malformed peer state update: {}", e),
            },
            None => *shared.lock() = initial.clone(),
        });

        Self {
            state,
            _subscription: subscription,
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.state.lock().clone()
    }
}
