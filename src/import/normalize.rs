use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::store::{ActivityEntry, Lead, LeadStatus};

/// Provenance tags whose records are auto-verified. Matching is
/// case/whitespace-insensitive.
static TRUSTED_SOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "postgres",
        "mysql",
        "mongodb",
        "snowflake",
        "bigquery",
        "salesforce",
        "hubspot",
        "pipedrive",
        "zoho",
    ]
    .into_iter()
    .collect()
});

/// Ordered alias table: each canonical field with the raw keys that may carry
/// it. Raw keys are matched after normalization (lowercased, separators
/// stripped), so "First Name", "first_name" and "firstName" all collapse to
/// "firstname".
static FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("email", &["email", "emailaddress", "workemail", "mail"]),
    ("name", &["name", "fullname", "contactname", "leadname"]),
    ("title", &["title", "jobtitle", "position", "role"]),
    ("company", &["company", "companyname", "organization", "org", "account", "employer"]),
    ("industry", &["industry", "sector", "vertical"]),
    ("location", &["location", "city", "region", "country"]),
    ("phone", &["phone", "phonenumber", "mobile", "telephone"]),
    ("linkedin", &["linkedin", "linkedinurl", "profileurl"]),
    ("avatar", &["avatar", "avatarurl", "photo", "image"]),
    ("lastContact", &["lastcontact", "lastcontacted", "lasttouch"]),
];

static FIRST_NAME_ALIASES: &[&str] = &["firstname", "givenname"];
static LAST_NAME_ALIASES: &[&str] = &["lastname", "surname", "familyname"];
static SCORE_ALIASES: &[&str] = &["score", "leadscore", "rating"];
static STATUS_ALIASES: &[&str] = &["status", "tier", "stage"];
static VERIFIED_ALIASES: &[&str] = &["verified", "isverified", "validated"];

pub fn is_trusted_source(source: &str) -> bool {
    let normalized: String = source
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    TRUSTED_SOURCES.contains(normalized.as_str())
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn key_index(raw: &Map<String, Value>) -> HashMap<String, &Value> {
    raw.iter()
        .map(|(k, v)| (normalize_key(k), v))
        .collect()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn resolve(index: &HashMap<String, &Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| index.get(*alias).and_then(|v| value_to_string(v)))
}

fn resolve_score(index: &HashMap<String, &Value>) -> Option<u8> {
    for alias in SCORE_ALIASES {
        if let Some(value) = index.get(*alias) {
            let parsed = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            if let Some(score) = parsed {
                return Some(score.clamp(0.0, 100.0).round() as u8);
            }
        }
    }
    None
}

fn resolve_status(index: &HashMap<String, &Value>) -> Option<LeadStatus> {
    resolve(index, STATUS_ALIASES).and_then(|s| match s.trim().to_lowercase().as_str() {
        "hot" => Some(LeadStatus::Hot),
        "warm" => Some(LeadStatus::Warm),
        "cold" => Some(LeadStatus::Cold),
        _ => None,
    })
}

fn resolve_verified(index: &HashMap<String, &Value>) -> bool {
    for alias in VERIFIED_ALIASES {
        if let Some(value) = index.get(*alias) {
            return match value {
                Value::Bool(b) => *b,
                Value::String(s) => matches!(
                    s.trim().to_lowercase().as_str(),
                    "true" | "yes" | "1"
                ),
                Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
                _ => false,
            };
        }
    }
    false
}

/// Maps one heterogeneous raw record into the canonical schema: alias-aware
/// field resolution, fresh id, score coercion with status derivation, trust
/// verification, and a synthetic activity entry recording the provenance.
pub fn normalize_lead_record(raw: &Map<String, Value>, source: &str) -> Lead {
    let index = key_index(raw);
    let mut lead = Lead {
        id: uuid::Uuid::new_v4().to_string(),
        source: source.to_string(),
        ..Lead::default()
    };

    for (canonical, aliases) in FIELD_ALIASES {
        let Some(value) = resolve(&index, aliases) else {
            continue;
        };
        match *canonical {
            "email" => lead.email = value,
            "name" => lead.name = value,
            "title" => lead.title = value,
            "company" => lead.company = value,
            "industry" => lead.industry = value,
            "location" => lead.location = value,
            "phone" => lead.phone = value,
            "linkedin" => lead.linkedin = value,
            "avatar" => lead.avatar = value,
            "lastContact" => lead.last_contact = value,
            _ => {}
        }
    }

    // Split-name records: fall back to firstName + lastName.
    if lead.name == "Unknown" {
        let first = resolve(&index, FIRST_NAME_ALIASES);
        let last = resolve(&index, LAST_NAME_ALIASES);
        let joined = [first, last]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.trim().is_empty() {
            lead.name = joined.trim().to_string();
        }
    }

    lead.score = resolve_score(&index).unwrap_or(75);
    lead.status = resolve_status(&index).unwrap_or_else(|| LeadStatus::from_score(lead.score));
    lead.verified = resolve_verified(&index) || is_trusted_source(source);
    lead.activity = vec![ActivityEntry::now(
        "import",
        &format!("Imported from {}", source),
    )];

    lead
}
