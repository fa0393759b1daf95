use std::time::Instant;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::store::{AiMessage, Lead};

use super::cache::{cache_key, ResponseCache};
use super::remote::RemoteClient;
use super::{estimate_tokens, fallback, ChatReply, EmailDraft, LeadScore, UsageStats};

/// Orchestrates every AI operation: cache lookup, remote attempt, degraded-mode
/// fallback, and usage accounting.
///
/// The cache instance is owned here, injected at construction so tests can use
/// isolated caches. Read-style operations (chat, lead scoring) cache by
/// default; email generation does not, because callers usually want fresh
/// generative output for identical inputs — `generate_email_cached` opts in.
/// Degraded-mode results are never cached, so the next call retries the
/// backend.
pub struct AiService {
    remote: RemoteClient,
    cache: Mutex<ResponseCache>,
    usage: Mutex<Vec<UsageStats>>,
}

impl AiService {
    pub fn new(config: &AppConfig, cache: ResponseCache) -> Self {
        Self {
            remote: RemoteClient::new(config),
            cache: Mutex::new(cache),
            usage: Mutex::new(Vec::new()),
        }
    }

    pub async fn chat(&self, prompt: &str, history: &[AiMessage]) -> ChatReply {
        let key = cache_key("chat", &json!({ "prompt": prompt, "history": history }));
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let started = Instant::now();
        match self.remote.chat(prompt, history).await {
            Ok(reply) => {
                self.record("chat", prompt, &reply.reply, started);
                self.remember(&key, &reply);
                reply
            }
            Err(e) => {
                log::warn!("Chat backend unavailable, using local reply: {}", e);
                let reply = fallback::chat_reply(prompt, history);
                self.record("chat", prompt, &reply.reply, started);
                reply
            }
        }
    }

    pub async fn score_lead(&self, lead: &Lead) -> LeadScore {
        let key = cache_key("score-lead", lead);
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let prompt_text = serde_json::to_string(lead).unwrap_or_default();
        let started = Instant::now();
        match self.remote.score_lead(lead).await {
            Ok(result) => {
                self.record("score-lead", &prompt_text, &result.rationale, started);
                self.remember(&key, &result);
                result
            }
            Err(e) => {
                log::warn!("Scoring backend unavailable, using heuristic: {}", e);
                let result = fallback::score_lead(lead);
                self.record("score-lead", &prompt_text, &result.rationale, started);
                result
            }
        }
    }

    pub async fn generate_email(&self, lead: &Lead, tone: &str, length: &str) -> EmailDraft {
        self.email_inner(lead, tone, length, false).await
    }

    /// Opt-in cached variant for callers that do want identical inputs to
    /// reuse a draft.
    pub async fn generate_email_cached(&self, lead: &Lead, tone: &str, length: &str) -> EmailDraft {
        self.email_inner(lead, tone, length, true).await
    }

    async fn email_inner(
        &self,
        lead: &Lead,
        tone: &str,
        length: &str,
        use_cache: bool,
    ) -> EmailDraft {
        let key = cache_key(
            "generate-email",
            &json!({ "lead": lead, "tone": tone, "length": length }),
        );
        if use_cache {
            if let Some(hit) = self.cached(&key) {
                return hit;
            }
        }

        let prompt_text = format!("{} {} {}", lead.name, tone, length);
        let started = Instant::now();
        match self.remote.generate_email(lead, tone, length).await {
            Ok(draft) => {
                self.record("generate-email", &prompt_text, &draft.body, started);
                if use_cache {
                    self.remember(&key, &draft);
                }
                draft
            }
            Err(e) => {
                log::warn!("Email backend unavailable, using template: {}", e);
                let draft = fallback::email_draft(lead, tone, length);
                self.record("generate-email", &prompt_text, &draft.body, started);
                draft
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn usage_log(&self) -> Vec<UsageStats> {
        self.usage.lock().clone()
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache
            .lock()
            .get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    fn remember<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.cache.lock().set(key, value),
            Err(e) => log::error!("Failed to encode cache entry: {}", e),
        }
    }

    fn record(&self, operation: &str, prompt_text: &str, response_text: &str, started: Instant) {
        let stats = UsageStats {
            operation: operation.to_string(),
            prompt_tokens: estimate_tokens(prompt_text),
            response_tokens: estimate_tokens(response_text),
            total_time_ms: started.elapsed().as_millis() as u64,
        };
        log::debug!(
            "{}: ~{} prompt + ~{} response tokens in {}ms",
            stats.operation,
            stats.prompt_tokens,
            stats.response_tokens,
            stats.total_time_ms
        );
        self.usage.lock().push(stats);
    }
}
