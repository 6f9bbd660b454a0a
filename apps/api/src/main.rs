mod analysis;
mod cache;
mod coaching;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod outreach;
mod routes;
mod state;
mod storage;
mod tracker;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::LlmResumeAnalyzer;
use crate::cache::LlmCache;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireFlow API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    // Redis only backs the LLM response cache; the service runs without it.
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = LlmCache::connect(redis, config.llm_cache_ttl_secs).await;
    if cache.is_enabled() {
        info!(
            "LLM cache connected (ttl: {}s)",
            config.llm_cache_ttl_secs
        );
    }

    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    let llm = LlmClient::new(config.groq_api_key.clone(), config.groq_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let analyzer = Arc::new(LlmResumeAnalyzer::new(llm.clone(), cache.clone()));

    let state = AppState {
        db,
        s3,
        llm,
        cache,
        analyzer,
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "hireflow-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
