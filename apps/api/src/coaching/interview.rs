//! Interview question generation.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::analyzer::clean_list;
use crate::analysis::resume_text::{truncate_for_prompt, MAX_PROMPT_CHARS};
use crate::cache::LlmCache;
use crate::coaching::prompts::{INTERVIEW_PROMPT, INTERVIEW_ROLE, RESUME_SECTION};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill, system_prompt, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::LlmClient;

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_QUESTION_COUNT: usize = 15;

/// Served when the model reply is unusable: (category, question, guidance).
pub const FALLBACK_QUESTIONS: &[(&str, &str, &str)] = &[
    (
        "behavioral",
        "Tell me about a project you are proud of and your role in it.",
        "Describe the problem, your specific contribution and the measurable result.",
    ),
    (
        "behavioral",
        "Describe a time you disagreed with a teammate. How did you resolve it?",
        "Show that you listened, used evidence and kept the relationship intact.",
    ),
    (
        "technical",
        "Walk me through how you would design the core system this role owns.",
        "State assumptions, sketch components and discuss trade-offs you would revisit.",
    ),
    (
        "situational",
        "A deadline is at risk a week before launch. What do you do?",
        "Cover early communication, scope negotiation and how you protect quality.",
    ),
    (
        "culture",
        "Why this company, and why now?",
        "Connect something specific about the company to your own goals.",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub guidance: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QuestionList {
    #[serde(default)]
    questions: Vec<InterviewQuestion>,
}

pub fn fallback_questions(count: usize) -> Vec<InterviewQuestion> {
    FALLBACK_QUESTIONS
        .iter()
        .cycle()
        .take(count)
        .map(|(category, question, guidance)| InterviewQuestion {
            category: category.to_string(),
            question: question.to_string(),
            guidance: guidance.to_string(),
        })
        .collect()
}

/// Clamps a requested question count into `1..=MAX_QUESTION_COUNT`.
pub fn resolve_count(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT)
}

/// Drops blank and repeated questions, lowercases categories, caps the list.
fn clean_questions(questions: Vec<InterviewQuestion>, count: usize) -> Vec<InterviewQuestion> {
    let texts = clean_list(
        questions.iter().map(|q| q.question.clone()).collect(),
        usize::MAX,
    );
    let mut out = Vec::with_capacity(count);
    for text in texts {
        if let Some(q) = questions.iter().find(|q| q.question.trim() == text) {
            let category = q.category.trim().to_lowercase();
            out.push(InterviewQuestion {
                category: if category.is_empty() {
                    "general".to_string()
                } else {
                    category
                },
                question: text,
                guidance: q.guidance.trim().to_string(),
            });
        }
        if out.len() == count {
            break;
        }
    }
    out
}

pub fn build_interview_prompt(
    job_description: &str,
    resume_text: Option<&str>,
    count: usize,
) -> String {
    let resume_section = resume_text
        .map(|text| {
            fill(
                RESUME_SECTION,
                &[("resume_text", truncate_for_prompt(text, MAX_PROMPT_CHARS))],
            )
        })
        .unwrap_or_default();
    let count = count.to_string();
    let prompt = fill(
        INTERVIEW_PROMPT,
        &[
            ("count", count.as_str()),
            ("job_description", truncate_for_prompt(job_description, MAX_PROMPT_CHARS)),
            ("resume_section", resume_section.as_str()),
        ],
    );
    if resume_text.is_some() {
        format!("{prompt}\n\n{NO_FABRICATION_INSTRUCTION}")
    } else {
        prompt
    }
}

pub async fn generate_interview_questions(
    llm: &LlmClient,
    cache: &LlmCache,
    job_description: &str,
    resume_text: Option<&str>,
    count: usize,
) -> Result<Vec<InterviewQuestion>, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    let prompt = build_interview_prompt(job_description, resume_text, count);

    let questions = llm
        .call_cached::<QuestionList>(
            cache,
            "interview",
            &prompt,
            &system_prompt(INTERVIEW_ROLE),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Interview question generation failed: {e}")))?
        .map(|list| clean_questions(list.questions, count))
        .or_fallback("interview questions", || fallback_questions(count));

    if questions.is_empty() {
        return Ok(fallback_questions(count));
    }
    info!("Generated {} interview questions", questions.len());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(category: &str, question: &str) -> InterviewQuestion {
        InterviewQuestion {
            category: category.to_string(),
            question: question.to_string(),
            guidance: "g".to_string(),
        }
    }

    #[test]
    fn test_resolve_count() {
        assert_eq!(resolve_count(None), DEFAULT_QUESTION_COUNT);
        assert_eq!(resolve_count(Some(0)), 1);
        assert_eq!(resolve_count(Some(99)), MAX_QUESTION_COUNT);
        assert_eq!(resolve_count(Some(7)), 7);
    }

    #[test]
    fn test_fallback_cycles_to_requested_count() {
        let questions = fallback_questions(7);
        assert_eq!(questions.len(), 7);
        assert_eq!(questions[0].question, questions[5].question);
    }

    #[test]
    fn test_clean_questions_dedups_and_caps() {
        let cleaned = clean_questions(
            vec![
                q("Technical", "What is ownership?"),
                q("technical", "what is ownership?"),
                q("", "  "),
                q("", "Why us?"),
                q("behavioral", "Tell me about a failure."),
            ],
            2,
        );
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].category, "technical");
        assert_eq!(cleaned[1].question, "Why us?");
        assert_eq!(cleaned[1].category, "general");
    }

    #[test]
    fn test_prompt_without_resume_omits_section() {
        let prompt = build_interview_prompt("Rust backend role", None, 3);
        assert!(prompt.contains("Write 3 interview questions"));
        assert!(!prompt.contains("CANDIDATE RESUME"));
        assert!(!prompt.contains("{resume_section}"));
    }

    #[test]
    fn test_prompt_with_resume_adds_guardrail() {
        let prompt = build_interview_prompt("Rust backend role", Some("Built a queue"), 3);
        assert!(prompt.contains("CANDIDATE RESUME:\nBuilt a queue"));
        assert!(prompt.contains("Do NOT invent"));
    }
}
