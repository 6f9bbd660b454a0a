use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::cache::LlmCache;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    /// Redis-backed cache for deterministic LLM calls.
    pub cache: LlmCache,
    /// Default: LlmResumeAnalyzer.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub config: Config,
}
