use std::sync::Arc;

use crate::storage::{StorageAdapter, StorageBackend};

use super::{ActivityEntry, AiMessage, AppState, Campaign, Lead, LeadStatus, SavedPrompt};

/// Name of the single namespaced key holding the persisted document.
pub const STATE_KEY: &str = "app-state";

/// A downloadable export of the current lead collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBlob {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

/// Owns the persisted app-state document.
///
/// Every higher-level operation is an uninterrupted load → mutate → save
/// sequence. Those sequences cannot interleave within one context, but a peer
/// context writing between our load and save gets clobbered: whole-document
/// last-write-wins, no cross-context conflict resolution.
pub struct StateStore {
    adapter: StorageAdapter,
}

impl StateStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            adapter: StorageAdapter::new(backend),
        }
    }

    pub(crate) fn adapter(&self) -> &StorageAdapter {
        &self.adapter
    }

    /// Returns the stored document, or a fresh bootstrap default when the key
    /// is absent or the stored value does not decode.
    pub fn load(&self) -> AppState {
        self.adapter.get(STATE_KEY, AppState::default())
    }

    pub fn save(&self, state: &AppState) {
        self.adapter.set(STATE_KEY, state);
    }

    // ─── Leads ───────────────────────────────────────────────────────────────

    pub fn get_leads(&self) -> Vec<Lead> {
        self.load().leads
    }

    /// Direct CRUD create. Assigns an id when the caller left it empty; the
    /// email is not deduplicated here — that only happens at import time.
    pub fn add_lead(&self, mut lead: Lead) -> Lead {
        if lead.id.is_empty() {
            lead.id = uuid::Uuid::new_v4().to_string();
        }
        let mut state = self.load();
        state.leads.insert(0, lead.clone());
        self.save(&state);
        lead
    }

    /// Replaces the status of the matching lead; an unknown id is a no-op and
    /// the list comes back unchanged.
    pub fn update_lead_status(&self, id: &str, status: LeadStatus) -> Vec<Lead> {
        let mut state = self.load();
        for lead in &mut state.leads {
            if lead.id == id {
                lead.status = status;
            }
        }
        self.save(&state);
        state.leads
    }

    /// Prepends an activity entry to the matching lead and returns that lead.
    /// Unknown id returns `None` without touching the document.
    pub fn add_lead_activity(&self, id: &str, entry: ActivityEntry) -> Option<Lead> {
        let mut state = self.load();
        let mut updated = None;
        for lead in &mut state.leads {
            if lead.id == id {
                lead.activity.insert(0, entry);
                updated = Some(lead.clone());
                break;
            }
        }
        if updated.is_some() {
            self.save(&state);
        }
        updated
    }

    /// Pure projection: the current lead collection as a downloadable JSON blob.
    pub fn export_leads(&self) -> ExportBlob {
        let leads = self.get_leads();
        let content = serde_json::to_string_pretty(&leads).unwrap_or_else(|_| "[]".to_string());
        ExportBlob {
            file_name: "leads-export.json".to_string(),
            mime_type: "application/json".to_string(),
            content,
        }
    }

    // ─── Campaigns ───────────────────────────────────────────────────────────

    pub fn get_campaigns(&self) -> Vec<Campaign> {
        self.load().campaigns
    }

    /// Upsert by id: replaces the existing record when found, else appends.
    pub fn save_campaign(&self, campaign: Campaign) -> Vec<Campaign> {
        let mut state = self.load();
        match state.campaigns.iter_mut().find(|c| c.id == campaign.id) {
            Some(existing) => *existing = campaign,
            None => state.campaigns.push(campaign),
        }
        self.save(&state);
        state.campaigns
    }

    /// The in-progress draft campaign, if one exists.
    pub fn get_campaign_draft(&self) -> Option<Campaign> {
        self.load()
            .campaigns
            .into_iter()
            .find(|c| c.status == "draft")
    }

    // ─── AI transcript ───────────────────────────────────────────────────────

    pub fn get_ai_messages(&self) -> Vec<AiMessage> {
        self.load().ai_messages
    }

    /// Appends to the transcript; messages are never mutated in place.
    pub fn add_ai_message(&self, message: AiMessage) -> Vec<AiMessage> {
        let mut state = self.load();
        state.ai_messages.push(message);
        self.save(&state);
        state.ai_messages
    }

    // ─── Saved prompts ───────────────────────────────────────────────────────

    pub fn get_saved_prompts(&self) -> Vec<SavedPrompt> {
        self.load().saved_prompts
    }

    pub fn save_prompt(&self, title: &str, prompt: &str) -> SavedPrompt {
        let saved = SavedPrompt {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            prompt: prompt.to_string(),
        };
        let mut state = self.load();
        state.saved_prompts.push(saved.clone());
        self.save(&state);
        saved
    }

    pub fn delete_prompt(&self, id: &str) {
        let mut state = self.load();
        state.saved_prompts.retain(|p| p.id != id);
        self.save(&state);
    }

    // ─── CRM / integrations ──────────────────────────────────────────────────

    pub fn get_active_crm(&self) -> Option<String> {
        self.load().active_crm
    }

    pub fn set_active_crm(&self, crm: &str) {
        let mut state = self.load();
        state.active_crm = Some(crm.to_string());
        self.save(&state);
    }

    pub fn connect_integration(&self, name: &str) {
        let mut state = self.load();
        state.integrations_connected.insert(name.to_string());
        self.save(&state);
    }

    pub fn disconnect_integration(&self, name: &str) {
        let mut state = self.load();
        state.integrations_connected.remove(name);
        self.save(&state);
    }

    pub fn is_integration_connected(&self, name: &str) -> bool {
        self.load().integrations_connected.contains(name)
    }

    /// Wholesale reset: drops every key this layer owns. The next `load`
    /// bootstraps a fresh default document.
    pub fn clear(&self) {
        self.adapter.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn store() -> StateStore {
        StateStore::new(Arc::new(MemoryBackend::new()))
    }

    fn lead(id: &str, email: &str) -> Lead {
        Lead {
            id: id.to_string(),
            email: email.to_string(),
            ..Lead::default()
        }
    }

    #[test]
    fn bootstrap_is_idempotent_and_independent() {
        let store = store();
        let mut first = store.load();
        assert_eq!(first, AppState::default());

        // Mutating the returned value must not poison later bootstraps.
        first.leads.push(lead("x", "x@example.com"));
        first.active_crm = Some("salesforce".to_string());
        assert_eq!(store.load(), AppState::default());
    }

    #[test]
    fn add_lead_assigns_id_and_prepends() {
        let store = store();
        store.add_lead(lead("first", "a@example.com"));
        let created = store.add_lead(Lead {
            email: "b@example.com".to_string(),
            ..Lead::default()
        });
        assert!(!created.id.is_empty());

        let leads = store.get_leads();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].email, "b@example.com");
    }

    #[test]
    fn update_status_on_unknown_id_is_a_noop() {
        let store = store();
        store.add_lead(lead("a", "a@example.com"));
        let before = store.get_leads();

        let after = store.update_lead_status("nope", LeadStatus::Hot);
        assert_eq!(after, before);
        assert_eq!(store.get_leads(), before);
    }

    #[test]
    fn update_status_replaces_only_the_match() {
        let store = store();
        store.add_lead(lead("a", "a@example.com"));
        store.add_lead(lead("b", "b@example.com"));

        let leads = store.update_lead_status("a", LeadStatus::Hot);
        let a = leads.iter().find(|l| l.id == "a").unwrap();
        let b = leads.iter().find(|l| l.id == "b").unwrap();
        assert_eq!(a.status, LeadStatus::Hot);
        assert_eq!(b.status, LeadStatus::Warm);
    }

    #[test]
    fn add_activity_prepends_and_returns_the_lead() {
        let store = store();
        store.add_lead(lead("a", "a@example.com"));
        store.add_lead_activity("a", ActivityEntry::now("email", "Sent intro"));
        let updated = store
            .add_lead_activity("a", ActivityEntry::now("call", "Follow-up call"))
            .unwrap();

        assert_eq!(updated.activity.len(), 2);
        assert_eq!(updated.activity[0].kind, "call");
        assert_eq!(store.add_lead_activity("nope", ActivityEntry::now("x", "y")), None);
    }

    #[test]
    fn save_campaign_upserts_by_id() {
        let store = store();
        let mut campaign = Campaign {
            id: "c1".to_string(),
            name: "Q3 Outreach".to_string(),
            status: "draft".to_string(),
            ..Campaign::default()
        };
        store.save_campaign(campaign.clone());

        campaign.status = "active".to_string();
        campaign.sent = 12;
        let campaigns = store.save_campaign(campaign);

        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].status, "active");
        assert_eq!(campaigns[0].sent, 12);
    }

    #[test]
    fn campaign_draft_is_the_draft_status_campaign() {
        let store = store();
        assert_eq!(store.get_campaign_draft(), None);
        store.save_campaign(Campaign {
            id: "c1".to_string(),
            status: "active".to_string(),
            ..Campaign::default()
        });
        store.save_campaign(Campaign {
            id: "c2".to_string(),
            status: "draft".to_string(),
            ..Campaign::default()
        });
        assert_eq!(store.get_campaign_draft().unwrap().id, "c2");
    }

    #[test]
    fn ai_messages_are_append_only() {
        let store = store();
        store.add_ai_message(AiMessage {
            role: "user".to_string(),
            content: "Score my leads".to_string(),
            suggestions: None,
        });
        let transcript = store.add_ai_message(AiMessage {
            role: "assistant".to_string(),
            content: "Done".to_string(),
            suggestions: Some(vec!["Export them".to_string()]),
        });
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, "assistant");
    }

    #[test]
    fn saved_prompt_crud() {
        let store = store();
        let saved = store.save_prompt("Cold open", "Write a cold open for {{name}}");
        assert_eq!(store.get_saved_prompts().len(), 1);
        store.delete_prompt(&saved.id);
        assert!(store.get_saved_prompts().is_empty());
    }

    #[test]
    fn crm_and_integration_flags() {
        let store = store();
        assert_eq!(store.get_active_crm(), None);
        store.set_active_crm("hubspot");
        assert_eq!(store.get_active_crm(), Some("hubspot".to_string()));

        assert!(!store.is_integration_connected("slack"));
        store.connect_integration("slack");
        assert!(store.is_integration_connected("slack"));
        store.disconnect_integration("slack");
        assert!(!store.is_integration_connected("slack"));
    }

    #[test]
    fn export_is_a_pure_projection() {
        let store = store();
        store.add_lead(lead("a", "a@example.com"));
        let before = store.load();

        let blob = store.export_leads();
        assert_eq!(blob.mime_type, "application/json");
        let exported: Vec<Lead> = serde_json::from_str(&blob.content).unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(store.load(), before);
    }

    #[test]
    fn clear_resets_to_bootstrap() {
        let store = store();
        store.add_lead(lead("a", "a@example.com"));
        store.clear();
        assert_eq!(store.load(), AppState::default());
    }

    #[test]
    fn peer_contexts_are_last_write_wins() {
        let backend = Arc::new(MemoryBackend::new());
        let tab_a = StateStore::new(backend.clone());
        let tab_b = StateStore::new(backend);

        tab_a.add_lead(lead("a", "a@example.com"));
        tab_b.add_lead(lead("b", "b@example.com"));

        // tab_b loaded after tab_a's save, so both leads survive ...
        assert_eq!(tab_a.get_leads().len(), 2);

        // ... but a stale whole-document save clobbers peer writes.
        let stale = AppState::default();
        tab_a.save(&stale);
        assert_eq!(tab_b.load(), AppState::default());
    }
}
