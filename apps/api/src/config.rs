use anyhow::{Context, Result};

use crate::outreach::scoring::ReferralWeights;

const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub llm_cache_ttl_secs: u64,
    pub upload_url_ttl_secs: u64,
    pub referral_weights: ReferralWeights,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let referral_weights = match std::env::var("REFERRAL_WEIGHTS") {
            Ok(raw) => parse_referral_weights(&raw)?,
            Err(_) => ReferralWeights::default(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            groq_api_key: require_env("GROQ_API_KEY")?,
            groq_model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string()),
            llm_cache_ttl_secs: parse_env_or("LLM_CACHE_TTL_SECS", 86_400)?,
            upload_url_ttl_secs: parse_env_or("UPLOAD_URL_TTL_SECS", 900)?,
            referral_weights,
            port: parse_env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}

/// Parses a (possibly partial) JSON override of the referral weights.
/// Fields left out keep their default values.
pub fn parse_referral_weights(raw: &str) -> Result<ReferralWeights> {
    let weights: ReferralWeights =
        serde_json::from_str(raw).context("REFERRAL_WEIGHTS must be a JSON object")?;
    weights
        .validate()
        .map_err(|e| anyhow::anyhow!("REFERRAL_WEIGHTS rejected: {e}"))?;
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let weights = parse_referral_weights(r#"{"company_match": 0.4}"#).unwrap();
        assert!((weights.company_match - 0.4).abs() < f64::EPSILON);
        assert!((weights.base_first_degree - 0.80).abs() < f64::EPSILON);
        assert_eq!(weights.recency_tiers.len(), 3);
    }

    #[test]
    fn test_empty_object_is_default() {
        let weights = parse_referral_weights("{}").unwrap();
        assert_eq!(weights, ReferralWeights::default());
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(parse_referral_weights(r#"{"max_strength_bonus": -0.1}"#).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(parse_referral_weights("company_match=0.4").is_err());
    }
}
