use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{COVER_LETTER_PROMPT, COVER_LETTER_ROLE};
use crate::analysis::resume_text::{truncate_for_prompt, MAX_PROMPT_CHARS};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill, system_prompt, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::LlmClient;

/// Returned when the model reply is unusable. `{company}` is filled in.
pub const FALLBACK_COVER_LETTER: &str = "Dear Hiring Team at {company},\n\n\
I am excited to apply for this role. My experience, summarized in the attached resume, \
lines up closely with what you are looking for, and I would welcome the chance to \
discuss how I can contribute to your team.\n\n\
Thank you for your time and consideration.\n\nSincerely,";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverLetterTone {
    #[default]
    Professional,
    Enthusiastic,
    Concise,
}

impl CoverLetterTone {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverLetterTone::Professional => "professional",
            CoverLetterTone::Enthusiastic => "enthusiastic",
            CoverLetterTone::Concise => "concise",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            CoverLetterTone::Professional => {
                "Formal and confident. Three or four paragraphs, 250-350 words."
            }
            CoverLetterTone::Enthusiastic => {
                "Warm and energetic without exclamation-mark overload. 250-350 words."
            }
            CoverLetterTone::Concise => "Direct and brief. Two short paragraphs, under 150 words.",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CoverLetterReply {
    #[serde(default)]
    body: String,
}

pub fn fallback_cover_letter(company_name: &str) -> String {
    fill(FALLBACK_COVER_LETTER, &[("company", company_name)])
}

pub fn build_cover_letter_prompt(
    resume_text: &str,
    job_description: &str,
    company_name: &str,
    tone: CoverLetterTone,
) -> String {
    let prompt = fill(
        COVER_LETTER_PROMPT,
        &[
            ("resume_text", truncate_for_prompt(resume_text, MAX_PROMPT_CHARS)),
            ("job_description", truncate_for_prompt(job_description, MAX_PROMPT_CHARS)),
            ("company_name", company_name),
            ("tone_instruction", tone.instruction()),
        ],
    );
    format!("{prompt}\n\n{NO_FABRICATION_INSTRUCTION}")
}

pub async fn generate_cover_letter(
    llm: &LlmClient,
    resume_text: &str,
    job_description: &str,
    company_name: &str,
    tone: CoverLetterTone,
) -> Result<String, AppError> {
    let prompt = build_cover_letter_prompt(resume_text, job_description, company_name, tone);

    let body = llm
        .call_outcome::<CoverLetterReply>(&prompt, &system_prompt(COVER_LETTER_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))?
        .map(|reply| reply.body.trim().to_string())
        .or_fallback("cover letter", || fallback_cover_letter(company_name));

    if body.is_empty() {
        return Ok(fallback_cover_letter(company_name));
    }
    Ok(body)
}
