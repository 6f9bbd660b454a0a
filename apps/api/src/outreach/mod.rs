// Reverse-recruiting outreach: contacts, referral scoring and ranking,
// suggested-lead import, warm-introduction drafting.
// All LLM calls go through llm_client.

pub mod contacts;
pub mod dedup;
pub mod drafting;
pub mod handlers;
pub mod prompts;
pub mod ranking;
pub mod scoring;
