//! Resume vs job-description analysis.
//!
//! `AppState` carries an `Arc<dyn ResumeAnalyzer>`; the Groq-backed
//! `LlmResumeAnalyzer` is the production backend.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{ANALYSIS_PROMPT, ANALYSIS_ROLE};
use crate::analysis::resume_text::{truncate_for_prompt, MAX_PROMPT_CHARS};
use crate::cache::LlmCache;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill, system_prompt, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::LlmClient;

pub const MAX_KEYWORDS: usize = 20;
pub const MAX_LIST_ITEMS: usize = 10;

/// Stored and returned when the model reply is unusable.
pub const FALLBACK_MATCH_SCORE: u8 = 0;
pub const FALLBACK_SUMMARY: &str =
    "We could not analyze this resume right now. Please try again in a few minutes.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// The model's reply as it arrives. Every field is optional and unvalidated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAnalysis {
    pub match_score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggested_keywords: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub match_score: u8,
    pub summary: String,
    pub strengths: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggested_keywords: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: ResumeAnalysis,
    /// false when `analysis` is the fallback
    pub llm_parsed: bool,
}

impl ResumeAnalysis {
    pub fn fallback() -> Self {
        Self {
            match_score: FALLBACK_MATCH_SCORE,
            summary: FALLBACK_SUMMARY.to_string(),
            strengths: Vec::new(),
            missing_keywords: Vec::new(),
            suggested_keywords: Vec::new(),
            improvements: Vec::new(),
        }
    }

    /// Clamps the score and cleans up the lists the model returned.
    pub fn from_raw(raw: RawAnalysis) -> Self {
        let match_score = if raw.match_score.is_finite() {
            raw.match_score.clamp(0.0, 100.0).round() as u8
        } else {
            FALLBACK_MATCH_SCORE
        };
        let summary = raw.summary.trim().to_string();
        Self {
            match_score,
            summary: if summary.is_empty() {
                FALLBACK_SUMMARY.to_string()
            } else {
                summary
            },
            strengths: clean_list(raw.strengths, MAX_LIST_ITEMS),
            missing_keywords: clean_list(raw.missing_keywords, MAX_KEYWORDS),
            suggested_keywords: clean_list(raw.suggested_keywords, MAX_KEYWORDS),
            improvements: clean_list(raw.improvements, MAX_LIST_ITEMS),
        }
    }
}

/// Trims items, drops blanks and case-insensitive duplicates (first wins), caps length.
pub fn clean_list(items: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(max)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisOutcome, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResumeAnalyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResumeAnalyzer {
    llm: LlmClient,
    cache: LlmCache,
}

impl LlmResumeAnalyzer {
    pub fn new(llm: LlmClient, cache: LlmCache) -> Self {
        Self { llm, cache }
    }
}

pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    let prompt = fill(
        ANALYSIS_PROMPT,
        &[
            ("resume_text", truncate_for_prompt(resume_text, MAX_PROMPT_CHARS)),
            ("job_description", truncate_for_prompt(job_description, MAX_PROMPT_CHARS)),
        ],
    );
    format!("{prompt}\n\n{NO_FABRICATION_INSTRUCTION}")
}

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisOutcome, AppError> {
        let prompt = build_analysis_prompt(resume_text, job_description);
        let outcome = self
            .llm
            .call_cached::<RawAnalysis>(
                &self.cache,
                "analysis",
                &prompt,
                &system_prompt(ANALYSIS_ROLE),
            )
            .await
            .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

        let llm_parsed = outcome.is_parsed();
        let analysis = outcome
            .map(ResumeAnalysis::from_raw)
            .or_fallback("resume analysis", ResumeAnalysis::fallback);

        Ok(AnalysisOutcome {
            analysis,
            llm_parsed,
        })
    }
}

/// Validates inputs, then delegates to the configured analyzer.
pub async fn run_analysis(
    analyzer: &dyn ResumeAnalyzer,
    resume_text: &str,
    job_description: &str,
) -> Result<AnalysisOutcome, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if resume_text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "resume has no extractable text".to_string(),
        ));
    }
    analyzer.analyze(resume_text, job_description.trim()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAnalyzer(u8);

    #[async_trait]
    impl ResumeAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _: &str, _: &str) -> Result<AnalysisOutcome, AppError> {
            Ok(AnalysisOutcome {
                analysis: ResumeAnalysis {
                    match_score: self.0,
                    ..ResumeAnalysis::fallback()
                },
                llm_parsed: true,
            })
        }
    }

    #[test]
    fn test_from_raw_clamps_score() {
        let high = RawAnalysis {
            match_score: 140.0,
            ..Default::default()
        };
        assert_eq!(ResumeAnalysis::from_raw(high).match_score, 100);
        let low = RawAnalysis {
            match_score: -3.0,
            ..Default::default()
        };
        assert_eq!(ResumeAnalysis::from_raw(low).match_score, 0);
        let frac = RawAnalysis {
            match_score: 72.5,
            ..Default::default()
        };
        assert_eq!(ResumeAnalysis::from_raw(frac).match_score, 73);
    }

    #[test]
    fn test_from_raw_blank_summary_uses_fallback_text() {
        let analysis = ResumeAnalysis::from_raw(RawAnalysis::default());
        assert_eq!(analysis.summary, FALLBACK_SUMMARY);
    }

    #[test]
    fn test_clean_list_dedups_case_insensitively() {
        let items = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "Kubernetes".to_string(),
        ];
        assert_eq!(clean_list(items, 10), vec!["Rust", "Kubernetes"]);
    }

    #[test]
    fn test_clean_list_caps_length() {
        let items: Vec<String> = (0..30).map(|i| format!("kw{i}")).collect();
        assert_eq!(clean_list(items, MAX_KEYWORDS).len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_raw_analysis_tolerates_partial_json() {
        let raw: RawAnalysis = serde_json::from_str(r#"{"match_score": 64}"#).unwrap();
        let analysis = ResumeAnalysis::from_raw(raw);
        assert_eq!(analysis.match_score, 64);
        assert!(analysis.strengths.is_empty());
    }

    #[test]
    fn test_fallback_uses_named_constants() {
        let fallback = ResumeAnalysis::fallback();
        assert_eq!(fallback.match_score, FALLBACK_MATCH_SCORE);
        assert_eq!(fallback.summary, FALLBACK_SUMMARY);
    }

    #[test]
    fn test_prompt_contains_both_texts() {
        let prompt = build_analysis_prompt("Rust engineer, 6 years", "Senior Rust role");
        assert!(prompt.contains("Rust engineer, 6 years"));
        assert!(prompt.contains("Senior Rust role"));
        assert!(prompt.contains("Do NOT invent"));
    }

    #[tokio::test]
    async fn test_run_analysis_rejects_blank_jd() {
        let result = run_analysis(&FixedAnalyzer(80), "resume", "  ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_run_analysis_rejects_blank_resume() {
        let result = run_analysis(&FixedAnalyzer(80), " ", "jd").await;
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }

    #[tokio::test]
    async fn test_run_analysis_delegates() {
        let outcome = run_analysis(&FixedAnalyzer(77), "resume", "jd").await.unwrap();
        assert_eq!(outcome.analysis.match_score, 77);
        assert!(outcome.llm_parsed);
    }
}
