pub mod reconciler;
pub mod state;

pub use reconciler::Reconciler;
pub use state::{ExportBlob, StateStore, STATE_KEY};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Hot,
    Warm,
    Cold,
}

impl LeadStatus {
    /// Tier thresholds: 90+ hot, 75+ warm, below that cold.
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            LeadStatus::Hot
        } else if score >= 75 {
            LeadStatus::Warm
        } else {
            LeadStatus::Cold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Hot => "hot",
            LeadStatus::Warm => "warm",
            LeadStatus::Cold => "cold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enrichment {
    pub company_size: String,
    pub revenue: String,
    pub tech_stack: Vec<String>,
    pub recent_news: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub time: String,
}

impl ActivityEntry {
    pub fn now(kind: &str, message: &str) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.to_string(),
            time: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A prospect record in the canonical schema. Absent descriptive fields
/// normalize to the defaults below; `email` is only authoritative during
/// import-time deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lead {
    pub id: String,
    pub email: String,
    pub name: String,
    pub title: String,
    pub company: String,
    pub industry: String,
    pub location: String,
    pub phone: String,
    pub linkedin: String,
    pub avatar: String,
    pub last_contact: String,
    pub score: u8,
    pub status: LeadStatus,
    pub verified: bool,
    pub source: String,
    pub enrichment: Enrichment,
    pub activity: Vec<ActivityEntry>,
}

impl Default for Lead {
    fn default() -> Self {
        Self {
            id: String::new(),
            email: String::new(),
            name: "Unknown".to_string(),
            title: "Prospect".to_string(),
            company: "Unknown".to_string(),
            industry: "Technology".to_string(),
            location: "Remote".to_string(),
            phone: String::new(),
            linkedin: String::new(),
            avatar: String::new(),
            last_contact: "Never".to_string(),
            score: 75,
            status: LeadStatus::Warm,
            verified: false,
            source: String::new(),
            enrichment: Enrichment::default(),
            activity: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SequenceStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "delay")]
    pub delay_days: u32,
    pub subject: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: String,
    pub leads: u32,
    pub sent: u32,
    pub replies: u32,
    pub reply_rate: f32,
    pub steps: Vec<SequenceStep>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedPrompt {
    pub id: String,
    pub title: String,
    pub prompt: String,
}

/// The single persisted document. Every field defaults, so a stored document
/// from an older schema deserializes with the missing pieces bootstrapped —
/// there is no version field or migration step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub active_crm: Option<String>,
    pub integrations_connected: BTreeSet<String>,
    pub saved_prompts: Vec<SavedPrompt>,
    pub leads: Vec<Lead>,
    pub campaigns: Vec<Campaign>,
    pub ai_messages: Vec<AiMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tiers_follow_thresholds() {
        assert_eq!(LeadStatus::from_score(95), LeadStatus::Hot);
        assert_eq!(LeadStatus::from_score(90), LeadStatus::Hot);
        assert_eq!(LeadStatus::from_score(80), LeadStatus::Warm);
        assert_eq!(LeadStatus::from_score(75), LeadStatus::Warm);
        assert_eq!(LeadStatus::from_score(40), LeadStatus::Cold);
        assert_eq!(LeadStatus::from_score(0), LeadStatus::Cold);
    }

    #[test]
    fn older_document_gains_missing_fields_on_decode() {
        let state: AppState = serde_json::from_str(r#"{"leads": []}"#).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn lead_decodes_with_defaults_for_absent_fields() {
        let lead: Lead = serde_json::from_str(r#"{"id": "x", "email": "a@b.c"}"#).unwrap();
        assert_eq!(lead.name, "Unknown");
        assert_eq!(lead.title, "Prospect");
        assert_eq!(lead.location, "Remote");
        assert_eq!(lead.score, 75);
        assert_eq!(lead.status, LeadStatus::Warm);
    }

    #[test]
    fn lead_serializes_camel_case() {
        let raw = serde_json::to_value(Lead::default()).unwrap();
        assert!(raw.get("lastContact").is_some());
        assert!(raw.get("last_contact").is_none());
    }
}
