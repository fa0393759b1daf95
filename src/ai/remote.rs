use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::store::{AiMessage, Lead};

use super::{ChatReply, EmailDraft, LeadScore};

/// Thin JSON client for the AI backend's three endpoints. The backend is
/// opaque and may be offline; every failure surfaces as `Err` for the service
/// layer to absorb into a degraded-mode result.
pub struct RemoteClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
    history: &'a [AiMessage],
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    lead: &'a Lead,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    lead: &'a Lead,
    tone: &'a str,
    length: &'a str,
}

impl RemoteClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub async fn chat(&self, prompt: &str, history: &[AiMessage]) -> Result<ChatReply, String> {
        self.post("api/chat", &ChatRequest { prompt, history }).await
    }

    pub async fn score_lead(&self, lead: &Lead) -> Result<LeadScore, String> {
        self.post("api/score-lead", &ScoreRequest { lead }).await
    }

    pub async fn generate_email(
        &self,
        lead: &Lead,
        tone: &str,
        length: &str,
    ) -> Result<EmailDraft, String> {
        self.post("api/generate-email", &EmailRequest { lead, tone, length })
            .await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, String> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| format!("AI request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("AI API error ({}): {}", status, body));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse AI response: {}", e))
    }
}
