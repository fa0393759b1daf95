pub mod normalize;
pub mod parse;

pub use normalize::{is_trusted_source, normalize_lead_record};
pub use parse::{parse_delimited, parse_json};

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::store::{Lead, StateStore};

/// Batch-level outcome: how many records were submitted versus actually added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub submitted: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub missing_email: usize,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Deduplicating merge into the store. A candidate without a non-empty email
/// is dropped; a candidate whose email already exists in the store (or earlier
/// in the batch) is dropped. Survivors are prepended in a single save. The
/// merge never updates or removes existing leads, so re-importing the same
/// batch is a no-op.
pub fn import_records(store: &StateStore, candidates: Vec<Lead>) -> ImportReport {
    let mut report = ImportReport {
        submitted: candidates.len(),
        ..ImportReport::default()
    };

    let mut state = store.load();
    let mut seen: HashSet<String> = state.leads.iter().map(|l| email_key(&l.email)).collect();

    let mut fresh = Vec::new();
    for lead in candidates {
        let key = email_key(&lead.email);
        if key.is_empty() {
            report.missing_email += 1;
            log::debug!("Dropping import candidate without email (source: {})", lead.source);
            continue;
        }
        if seen.contains(&key) {
            report.duplicates += 1;
            continue;
        }
        seen.insert(key);
        fresh.push(lead);
    }

    report.imported = fresh.len();
    if report.imported > 0 {
        fresh.append(&mut state.leads);
        state.leads = fresh;
        store.save(&state);
    }

    log::info!(
        "Import: {} of {} records added ({} duplicates, {} missing email)",
        report.imported,
        report.submitted,
        report.duplicates,
        report.missing_email
    );
    report
}

/// Imports delimited text with a header row.
pub fn import_delimited(
    store: &StateStore,
    text: &str,
    delimiter: char,
    source: &str,
) -> ImportReport {
    let candidates = parse_delimited(text, delimiter)
        .iter()
        .map(|raw| normalize_lead_record(raw, source))
        .collect();
    import_records(store, candidates)
}

/// Imports a JSON array or `{"rows": [...]}` envelope.
pub fn import_json(store: &StateStore, text: &str, source: &str) -> Result<ImportReport, String> {
    let candidates = parse_json(text)?
        .iter()
        .map(|raw| normalize_lead_record(raw, source))
        .collect();
    Ok(import_records(store, candidates))
}

/// Imports an integration-specific payload array keyed by its provenance name.
/// Non-object entries are dropped.
pub fn import_integration(store: &StateStore, records: &[Value], source: &str) -> ImportReport {
    let candidates = records
        .iter()
        .filter_map(|record| record.as_object())
        .map(|raw| normalize_lead_record(raw, source))
        .collect();
    import_records(store, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use crate::store::LeadStatus;
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> StateStore {
        StateStore::new(Arc::new(MemoryBackend::new()))
    }

    fn lead(email: &str) -> Lead {
        Lead {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            ..Lead::default()
        }
    }

    #[test]
    fn duplicate_emails_are_dropped_and_reimport_adds_nothing() {
        let store = store();
        store.add_lead(lead("existing@acme.io"));

        let batch = vec![lead("existing@acme.io"), lead("new@acme.io")];
        let report = import_records(&store, batch.clone());
        assert_eq!(report.submitted, 2);
        assert_eq!(report.imported, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(store.get_leads().len(), 2);

        let report = import_records(&store, batch);
        assert_eq!(report.imported, 0);
        assert_eq!(report.duplicates, 2);
        assert_eq!(store.get_leads().len(), 2);
    }

    #[test]
    fn email_comparison_ignores_case_and_whitespace() {
        let store = store();
        store.add_lead(lead("Jane@Acme.io"));
        let report = import_records(&store, vec![lead("  jane@acme.io ")]);
        assert_eq!(report.imported, 0);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn records_without_email_are_dropped_but_counted() {
        let store = store();
        let report = import_records(&store, vec![lead(""), lead("a@b.c")]);
        assert_eq!(report.submitted, 2);
        assert_eq!(report.imported, 1);
        assert_eq!(report.missing_email, 1);
    }

    #[test]
    fn survivors_are_prepended() {
        let store = store();
        store.add_lead(lead("old@acme.io"));
        import_records(&store, vec![lead("new@acme.io")]);

        let leads = store.get_leads();
        assert_eq!(leads[0].email, "new@acme.io");
        assert_eq!(leads[1].email, "old@acme.io");
    }

    #[test]
    fn import_never_touches_existing_leads() {
        let store = store();
        let mut existing = lead("existing@acme.io");
        existing.name = "Original Name".to_string();
        store.add_lead(existing);

        let mut candidate = lead("existing@acme.io");
        candidate.name = "Imported Name".to_string();
        import_records(&store, vec![candidate]);

        assert_eq!(store.get_leads()[0].name, "Original Name");
    }

    #[test]
    fn delimited_import_end_to_end() {
        let store = store();
        let csv = "Email,Name,Score\njane@acme.io,Jane Doe,95\njoe@acme.io,Joe Bloggs,40\n";
        let report = import_delimited(&store, csv, ',', "csv");
        assert_eq!(report.imported, 2);

        let leads = store.get_leads();
        let jane = leads.iter().find(|l| l.email == "jane@acme.io").unwrap();
        assert_eq!(jane.name, "Jane Doe");
        assert_eq!(jane.status, LeadStatus::Hot);
        let joe = leads.iter().find(|l| l.email == "joe@acme.io").unwrap();
        assert_eq!(joe.status, LeadStatus::Cold);
    }

    #[test]
    fn json_import_accepts_envelope() {
        let store = store();
        let text = r#"{"rows": [{"email": "a@b.c", "first_name": "Ann", "last_name": "Lee"}]}"#;
        let report = import_json(&store, text, "export.json").unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(store.get_leads()[0].name, "Ann Lee");
    }

    #[test]
    fn integration_import_is_verified_for_trusted_sources() {
        let store = store();
        let records = vec![
            json!({"email": "a@b.c", "company": "Acme"}),
            json!("not a record"),
        ];
        let report = import_integration(&store, &records, "salesforce");
        assert_eq!(report.submitted, 1);
        assert_eq!(report.imported, 1);
        assert!(store.get_leads()[0].verified);
        assert_eq!(store.get_leads()[0].source, "salesforce");
    }
}
