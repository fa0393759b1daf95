//! Local-first persistence, caching, and record-reconciliation layer for an
//! AI sales-outreach dashboard.
//!
//! The dashboard's UI talks to this crate for everything stateful: the single
//! persisted app-state document ([`store::StateStore`]), cross-tab
//! reconciliation ([`store::Reconciler`]), lead import with normalization and
//! deduplication ([`import`]), and memoized AI operations with a degraded-mode
//! fallback when the backend is offline ([`ai::AiService`]).

pub mod ai;
pub mod config;
pub mod import;
pub mod storage;
pub mod store;

pub use ai::{AiService, ResponseCache};
pub use config::AppConfig;
pub use import::ImportReport;
pub use storage::{JsonFileBackend, MemoryBackend, StorageAdapter, StorageBackend};
pub use store::{AppState, Campaign, Lead, LeadStatus, Reconciler, StateStore};
