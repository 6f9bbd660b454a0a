//! Redis-backed cache for parsed LLM replies.
//!
//! The cache is best-effort: connection or command failures are logged and
//! treated as a miss, never surfaced to the caller.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const COMMAND_TIMEOUT: Duration = Duration::from_millis(500);

/// One shared, self-reconnecting connection. `None` means the cache is off.
#[derive(Clone)]
pub struct LlmCache {
    conn: Option<ConnectionManager>,
    ttl_secs: u64,
}

impl LlmCache {
    /// Connects once at startup. If Redis is unreachable the service runs uncached.
    pub async fn connect(client: redis::Client, ttl_secs: u64) -> Self {
        if ttl_secs == 0 {
            info!("LLM cache disabled (ttl 0)");
            return Self::disabled();
        }
        let conn = match tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client)).await
        {
            Ok(Ok(conn)) => Some(conn),
            Ok(Err(e)) => {
                warn!("Redis unavailable, running without LLM cache: {e}");
                None
            }
            Err(_) => {
                warn!("Redis connect timed out after {CONNECT_TIMEOUT:?}, running without LLM cache");
                None
            }
        };
        Self { conn, ttl_secs }
    }

    pub fn disabled() -> Self {
        Self {
            conn: None,
            ttl_secs: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some() && self.ttl_secs > 0
    }

    /// Cache key: `llm:<kind>:<sha256 hex of model, system and prompt>`.
    ///
    /// Each part is length-prefixed so that moving text between parts changes the key.
    pub fn key(kind: &str, model: &str, system: &str, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        for part in [model, system, prompt] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        }
        format!("llm:{kind}:{:x}", hasher.finalize())
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let mut conn = self.conn.clone()?;
        match tokio::time::timeout(COMMAND_TIMEOUT, conn.get::<_, Option<String>>(key)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                warn!("Redis GET {key} failed: {e}");
                None
            }
            Err(_) => {
                warn!("Redis GET {key} timed out");
                None
            }
        }
    }

    pub async fn put(&self, key: &str, value: &str) {
        if !self.is_enabled() {
            return;
        }
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let write = conn.set_ex::<_, _, ()>(key, value, self.ttl_secs);
        match tokio::time::timeout(COMMAND_TIMEOUT, write).await {
            Ok(Ok(())) => debug!("Cached LLM reply under {key} for {}s", self.ttl_secs),
            Ok(Err(e)) => warn!("Redis SETEX {key} failed: {e}"),
            Err(_) => warn!("Redis SETEX {key} timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = LlmCache::key("analysis", "m", "sys", "prompt");
        let b = LlmCache::key("analysis", "m", "sys", "prompt");
        assert_eq!(a, b);
        let digest = a.strip_prefix("llm:analysis:").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_changes_with_prompt_and_model() {
        let base = LlmCache::key("analysis", "m", "sys", "prompt");
        assert_ne!(base, LlmCache::key("analysis", "m", "sys", "prompt 2"));
        assert_ne!(base, LlmCache::key("analysis", "m2", "sys", "prompt"));
        assert_ne!(base, LlmCache::key("cover_letter", "m", "sys", "prompt"));
    }

    #[test]
    fn test_key_separates_parts() {
        assert_ne!(
            LlmCache::key("analysis", "m", "sysprompt", ""),
            LlmCache::key("analysis", "m", "sys", "prompt")
        );
    }

    #[tokio::test]
    async fn test_zero_ttl_never_connects() {
        // Port 1 is closed; a zero TTL must return before any connect attempt.
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let cache = LlmCache::connect(client, 0).await;
        assert!(!cache.is_enabled());
        cache.put("k", "v").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_is_a_miss() {
        let cache = LlmCache::disabled();
        cache.put("k", "v").await;
        assert_eq!(cache.get("k").await, None);
    }
}
