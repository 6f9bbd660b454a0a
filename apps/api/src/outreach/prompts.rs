// Outreach LLM prompt templates.

pub const OUTREACH_ROLE: &str = "You are a career coach who writes short, genuine \
networking messages. You never exaggerate the relationship between sender and recipient.";

/// Placeholders: {contact_name}, {contact_title}, {contact_company}, {degree_label},
/// {target_company}, {target_role}, {relationship_note}
pub const WARM_INTRO_PROMPT: &str = r#"Draft a warm-introduction email asking a contact for a referral or an introduction.

CONTACT:
- Name: {contact_name}
- Title: {contact_title}
- Works at: {contact_company}
- Connection: {degree_label}
- Relationship notes: {relationship_note}

GOAL: an introduction or referral for the role "{target_role}" at {target_company}.

OUTPUT SCHEMA:
{
  "subject": "string, under 80 characters",
  "body": "string, 90-160 words, plain text, no placeholders in square brackets"
}

RULES:
1. If the connection is 2nd or 3rd degree, do not pretend to know the contact well.
2. Make one specific, low-effort ask.
3. Close by offering to share a resume or a short blurb."#;

/// Placeholders: {target_company}, {target_role}
pub const SUGGEST_CONTACTS_PROMPT: &str = r#"Suggest up to 8 kinds of people at {target_company} who would be useful contacts for someone applying to the role "{target_role}".

OUTPUT SCHEMA:
{
  "contacts": [
    {
      "name": "string (a role-based placeholder such as 'Hiring manager, Platform team' if no public name is known)",
      "email": null,
      "company": "{target_company}",
      "title": "string",
      "connection_degree": 3,
      "reason": "one sentence on why this person is worth contacting"
    }
  ]
}

RULES:
1. Never invent email addresses. Use null unless the address is public and certain.
2. connection_degree is 3 unless the input says otherwise."#;

pub fn degree_label(degree: crate::models::contact::ConnectionDegree) -> &'static str {
    use crate::models::contact::ConnectionDegree;
    match degree {
        ConnectionDegree::First => "1st degree (direct connection)",
        ConnectionDegree::Second => "2nd degree (mutual connection)",
        ConnectionDegree::Third => "3rd degree or further (weak tie)",
    }
}
