//! Degraded-mode synthesizers: pure local heuristics that preserve each AI
//! operation's result shape when the backend is unreachable.

use crate::store::{AiMessage, Lead, LeadStatus};

use super::{ChatReply, EmailDraft, LeadScore};

static SENIOR_TITLE_MARKERS: &[&str] = &[
    "chief", "ceo", "cto", "cfo", "coo", "vp", "vice president", "head of", "director",
    "founder", "owner", "president",
];

pub fn chat_reply(prompt: &str, history: &[AiMessage]) -> ChatReply {
    let opener = if history.is_empty() {
        "Here's a starting point while the AI backend is busy"
    } else {
        "Continuing from where we left off"
    };
    ChatReply {
        reply: format!(
            "{}: for \"{}\", focus on the prospect's pain points, lead with a concrete \
             outcome, and close with a single clear ask.",
            opener,
            prompt.trim()
        ),
        suggestions: vec![
            "Score my hottest leads".to_string(),
            "Draft a follow-up email".to_string(),
            "Summarize this campaign".to_string(),
        ],
    }
}

pub fn score_lead(lead: &Lead) -> LeadScore {
    let mut score: i32 = 50;
    let mut factors = Vec::new();

    let title = lead.title.to_lowercase();
    if SENIOR_TITLE_MARKERS.iter().any(|m| title.contains(m)) {
        score += 20;
        factors.push("senior title");
    }
    if lead.verified {
        score += 10;
        factors.push("verified source");
    }
    if !lead.enrichment.tech_stack.is_empty() {
        score += 10;
        factors.push("known tech stack");
    }
    if lead.activity.len() > 1 {
        score += 10;
        factors.push("prior engagement");
    }

    let score = score.clamp(0, 100) as u8;
    let rationale = if factors.is_empty() {
        "Baseline estimate from profile completeness".to_string()
    } else {
        format!("Estimate based on: {}", factors.join(", "))
    };

    LeadScore {
        score,
        tier: LeadStatus::from_score(score),
        rationale,
    }
}

pub fn email_draft(lead: &Lead, tone: &str, length: &str) -> EmailDraft {
    let subject = format!("Quick idea for {}", lead.company);
    let greeting = format!("Hi {},", lead.name);
    let pitch = match tone.to_lowercase().as_str() {
        "formal" => format!(
            "I've been following {}'s work in {} and believe there is a concrete \
             opportunity to improve your outbound results.",
            lead.company, lead.industry
        ),
        _ => format!(
            "I noticed what {} is doing in {} and had an idea I think you'll like.",
            lead.company, lead.industry
        ),
    };

    let body = if length.to_lowercase() == "short" {
        format!("{}\n\n{}\n\nWorth a quick call this week?", greeting, pitch)
    } else {
        format!(
            "{}\n\n{}\n\nTeams like yours typically see replies double once outreach is \
             personalized at this level, and setup takes under a week.\n\nWould you be open \
             to a 15-minute call this week?",
            greeting, pitch
        )
    };

    EmailDraft { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_bounded_and_tier_matches() {
        let lead = Lead {
            title: "Chief Revenue Officer".to_string(),
            verified: true,
            ..Lead::default()
        };
        let result = score_lead(&lead);
        assert!(result.score <= 100);
        assert_eq!(result.tier, LeadStatus::from_score(result.score));
        assert!(result.rationale.contains("senior title"));
    }

    #[test]
    fn draft_uses_lead_fields() {
        let lead = Lead {
            name: "Jane Doe".to_string(),
            company: "Acme".to_string(),
            ..Lead::default()
        };
        let draft = email_draft(&lead, "casual", "short");
        assert!(draft.subject.contains("Acme"));
        assert!(draft.body.contains("Jane Doe"));

        let long = email_draft(&lead, "formal", "long");
        assert!(long.body.len() > draft.body.len());
    }
}
