//! LLM-drafted outreach: warm-introduction emails and suggested contacts.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::LlmCache;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill, system_prompt};
use crate::llm_client::LlmClient;
use crate::models::contact::ContactRow;
use crate::outreach::dedup::SuggestedContact;
use crate::outreach::prompts::{
    degree_label, OUTREACH_ROLE, SUGGEST_CONTACTS_PROMPT, WARM_INTRO_PROMPT,
};

/// Used when the model reply cannot be parsed. `{name}`, `{company}`, `{role}` are filled in.
pub const FALLBACK_SUBJECT: &str = "Quick question about {company}";
pub const FALLBACK_BODY: &str = "Hi {name},\n\n\
I'm applying for the {role} role at {company} and would value 10 minutes of your \
perspective on the team. If you're open to it, I'd also appreciate an introduction to \
the hiring manager. Happy to send my resume and a short blurb.\n\nThanks!";

const DEFAULT_ROLE: &str = "open";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutreachDraft {
    pub subject: String,
    pub body: String,
}

impl OutreachDraft {
    pub fn fallback(contact_name: &str, company: &str, role: &str) -> Self {
        let vars = [("name", contact_name), ("company", company), ("role", role)];
        Self {
            subject: fill(FALLBACK_SUBJECT, &vars),
            body: fill(FALLBACK_BODY, &vars),
        }
    }

    fn is_usable(&self) -> bool {
        !self.subject.trim().is_empty() && !self.body.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionList {
    #[serde(default)]
    pub contacts: Vec<SuggestedContact>,
}

pub fn build_warm_intro_prompt(contact: &ContactRow, target_company: &str, role: &str) -> String {
    fill(
        WARM_INTRO_PROMPT,
        &[
            ("contact_name", contact.name.as_str()),
            ("contact_title", contact.title.as_deref().unwrap_or("unknown")),
            ("contact_company", contact.company.as_deref().unwrap_or("unknown")),
            ("degree_label", degree_label(contact.connection_degree)),
            ("relationship_note", contact.notes.as_deref().unwrap_or("none")),
            ("target_company", target_company),
            ("target_role", role),
        ],
    )
}

pub async fn draft_warm_intro(
    llm: &LlmClient,
    contact: &ContactRow,
    target_company: &str,
    role: Option<&str>,
) -> Result<OutreachDraft, AppError> {
    let role = role.unwrap_or(DEFAULT_ROLE);
    let prompt = build_warm_intro_prompt(contact, target_company, role);

    let draft = llm
        .call_outcome::<OutreachDraft>(&prompt, &system_prompt(OUTREACH_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Outreach drafting failed: {e}")))?
        .or_fallback("outreach draft", || {
            OutreachDraft::fallback(&contact.name, target_company, role)
        });

    if draft.is_usable() {
        Ok(draft)
    } else {
        Ok(OutreachDraft::fallback(&contact.name, target_company, role))
    }
}

pub async fn suggest_contacts(
    llm: &LlmClient,
    cache: &LlmCache,
    target_company: &str,
    role: Option<&str>,
) -> Result<Vec<SuggestedContact>, AppError> {
    let prompt = fill(
        SUGGEST_CONTACTS_PROMPT,
        &[
            ("target_company", target_company),
            ("target_role", role.unwrap_or(DEFAULT_ROLE)),
        ],
    );

    let list = llm
        .call_cached::<SuggestionList>(
            cache,
            "suggest_contacts",
            &prompt,
            &system_prompt(OUTREACH_ROLE),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Contact suggestion failed: {e}")))?
        .or_fallback("suggested contacts", SuggestionList::default);

    info!(
        "LLM suggested {} contacts at {target_company}",
        list.contacts.len()
    );
    Ok(list.contacts)
}
