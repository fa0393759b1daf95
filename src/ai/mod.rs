pub mod cache;
pub mod fallback;
pub mod remote;
pub mod service;

pub use cache::{cache_key, ResponseCache};
pub use service::AiService;

use serde::{Deserialize, Serialize};

use crate::store::LeadStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadScore {
    pub score: u8,
    pub tier: LeadStatus,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Request-level accounting for one cache-missing AI call. Token counts come
/// from [`estimate_tokens`], an approximation rather than a real tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub operation: String,
    pub prompt_tokens: u32,
    pub response_tokens: u32,
    pub total_time_ms: u64,
}

/// `max(1, ceil(len / 4))` — the usual rough chars-per-token heuristic.
pub fn estimate_tokens(text: &str) -> u32 {
    std::cmp::max(1, (text.len() as u32 + 3) / 4)
}
