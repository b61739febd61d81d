use std::sync::Arc;

use discover_config::{FeatureState, FeatureToggles};
use parking_lot::RwLock;

use crate::services::llm_client::LlmClient;
use crate::services::query_digest::normalize;
use crate::services::query_digest_cache::QueryDigestCache;
use crate::services::token_governor::{TokenDecision, TokenGovernor};

const EXPANSION_TOKEN_ESTIMATE: u32 = 300;
const EXPANSION_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct QueryExpansion {
    pub normalized: String,
    pub queries: Vec<String>,
    pub count: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Fans a raw genre phrase out into LLM-generated search queries under the
/// token governor, with a deterministic fallback on any failure or
/// degradation (spec §4.5).
pub struct QueryExpansionService {
    cache: Arc<QueryDigestCache>,
    governor: Arc<TokenGovernor>,
    llm: Arc<dyn LlmClient>,
    has_credentials: bool,
    toggles: Arc<RwLock<FeatureToggles>>,
}

impl QueryExpansionService {
    pub fn new(
        cache: Arc<QueryDigestCache>,
        governor: Arc<TokenGovernor>,
        llm: Arc<dyn LlmClient>,
        has_credentials: bool,
        toggles: Arc<RwLock<FeatureToggles>>,
    ) -> Self {
        Self { cache, governor, llm, has_credentials, toggles }
    }

    pub async fn generate(&self, raw: &str) -> QueryExpansion {
        let normalized = normalize(raw);

        if let Some(cached) = self.cache.get(raw).await {
            return QueryExpansion {
                normalized: cached.normalized,
                count: cached.queries.len(),
                queries: cached.queries,
                timestamp: cached.created_at,
            };
        }

        let feature_state = self.toggles.read().resolve("llm_query_expansion", self.has_credentials);
        if feature_state != FeatureState::Enabled {
            return self.fallback(raw, &normalized).await;
        }

        let decision = self.governor.check_budget(EXPANSION_TOKEN_ESTIMATE);
        if decision != TokenDecision::Allow {
            return self.fallback(raw, &normalized).await;
        }

        match self.call_llm(&normalized).await {
            Some((queries, tokens)) => {
                let entry = self.cache.put(raw, queries, tokens).await;
                self.governor.record_usage(tokens);
                QueryExpansion {
                    normalized: entry.normalized,
                    count: entry.queries.len(),
                    queries: entry.queries,
                    timestamp: entry.created_at,
                }
            }
            None => self.fallback(raw, &normalized).await,
        }
    }

    async fn fallback(&self, raw: &str, normalized: &str) -> QueryExpansion {
        let queries = deterministic_fallback(normalized);
        let entry = self.cache.put(raw, queries, 0).await;
        QueryExpansion {
            normalized: entry.normalized,
            count: entry.queries.len(),
            queries: entry.queries,
            timestamp: entry.created_at,
        }
    }

    async fn call_llm(&self, normalized: &str) -> Option<(Vec<String>, u32)> {
        let prompt = format!(
            "Suggest 6 to 8 short, high-signal video platform search queries for the creator genre \"{}\". One query per line.",
            normalized
        );

        let completion = self.llm.complete(&prompt, EXPANSION_TEMPERATURE).await.ok()?;
        let llm_queries = parse_llm_lines(&completion.text);

        let mut queries = priority_variants(normalized);
        for q in llm_queries {
            if !queries.iter().any(|existing| existing.eq_ignore_ascii_case(&q)) {
                queries.push(q);
            }
        }

        let tokens = completion.tokens_used.unwrap_or(EXPANSION_TOKEN_ESTIMATE);
        Some((queries, tokens))
    }
}

fn priority_variants(normalized: &str) -> Vec<String> {
    vec![
        normalized.to_string(),
        format!("{} official", normalized),
        format!("{} channel", normalized),
    ]
}

fn deterministic_fallback(normalized: &str) -> Vec<String> {
    let mut queries = priority_variants(normalized);
    queries.push(format!("{} youtuber", normalized));
    queries.push(format!("{} creator", normalized));
    queries.push(format!("{} best", normalized));
    queries
}

/// Strip leading list markers (`-`, `*`, `1.`) and dedupe case-insensitively,
/// preserving first-occurrence order (spec §4.5, step 4).
fn parse_llm_lines(text: &str) -> Vec<String> {
    let mut seen = Vec::new();

    for line in text.lines() {
        let stripped = strip_list_marker(line.trim());
        if stripped.is_empty() {
            continue;
        }
        if !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(&stripped)) {
            seen.push(stripped);
        }
    }

    seen
}

fn strip_list_marker(line: &str) -> String {
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c == '-' || c == '*' || c.is_ascii_digit() || c == '.' {
            chars.next();
        } else {
            break;
        }
    }
    chars.collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::services::llm_client::LlmClientError;
    use crate::services::llm_client::LlmCompletion;
    use crate::services::query_digest_cache::QueryDigestCache;
    use crate::services::token_governor::TokenGovernor;

    struct FakeLlmClient {
        response: Result<LlmCompletion, ()>,
        calls: AtomicUsize,
    }

    impl FakeLlmClient {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(LlmCompletion { text: text.to_string(), tokens_used: Some(42) }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self { response: Err(()), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for FakeLlmClient {
        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<LlmCompletion, LlmClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().map_err(|_| LlmClientError::Status(500))
        }
    }

    fn toggles(enabled: bool) -> Arc<RwLock<FeatureToggles>> {
        let mut flags = HashMap::new();
        flags.insert("llm_query_expansion".to_string(), enabled);
        Arc::new(RwLock::new(FeatureToggles { flags }))
    }

    fn service(llm: Arc<dyn LlmClient>, has_credentials: bool, flag_enabled: bool) -> QueryExpansionService {
        QueryExpansionService::new(
            Arc::new(QueryDigestCache::new(None, 1)),
            Arc::new(TokenGovernor::new(1_000_000, 2_000, 0.9)),
            llm,
            has_credentials,
            toggles(flag_enabled),
        )
    }

    #[tokio::test]
    async fn generate_uses_llm_when_enabled_and_merges_with_priority_variants() {
        let llm = Arc::new(FakeLlmClient::ok("1. Animeedits Highlights\n- animeedits highlights"));
        let svc = service(llm.clone(), true, true);

        let expansion = svc.generate("animeedits").await;

        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert!(expansion.queries.contains(&"animeedits".to_string()));
        assert!(expansion.queries.iter().any(|q| q == "Animeedits Highlights"));
    }

    #[tokio::test]
    async fn generate_falls_back_when_llm_call_fails() {
        let llm = Arc::new(FakeLlmClient::failing());
        let svc = service(llm.clone(), true, true);

        let expansion = svc.generate("gamingunique").await;

        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert_eq!(expansion.queries, deterministic_fallback("gamingunique"));
    }

    #[tokio::test]
    async fn generate_short_circuits_to_fallback_when_feature_disabled() {
        let llm = Arc::new(FakeLlmClient::ok("should never be used"));
        let svc = service(llm.clone(), true, false);

        let expansion = svc.generate("musicunique").await;

        assert_eq!(llm.calls.load(Ordering::SeqCst), 0, "LLM must not be called while the feature is not enabled");
        assert_eq!(expansion.queries, deterministic_fallback("musicunique"));
    }

    #[tokio::test]
    async fn generate_short_circuits_to_fallback_without_credentials() {
        let llm = Arc::new(FakeLlmClient::ok("should never be used"));
        let svc = service(llm.clone(), false, true);

        let expansion = svc.generate("podcastsunique").await;

        assert_eq!(llm.calls.load(Ordering::SeqCst), 0, "CONFIGURED state (flag on, no credentials) must not call out");
        assert_eq!(expansion.queries, deterministic_fallback("podcastsunique"));
    }

    #[test]
    fn priority_variants_are_first() {
        let variants = priority_variants("anime edits");
        assert_eq!(variants, vec!["anime edits", "anime edits official", "anime edits channel"]);
    }

    #[test]
    fn fallback_adds_the_three_secondary_variants() {
        let fallback = deterministic_fallback("gaming");
        assert_eq!(
            fallback,
            vec![
                "gaming",
                "gaming official",
                "gaming channel",
                "gaming youtuber",
                "gaming creator",
                "gaming best",
            ]
        );
    }

    #[test]
    fn parse_lines_strips_markers_and_dedupes() {
        let text = "1. Gaming Channels\n- gaming channels\n* Gaming Highlights";
        let parsed = parse_llm_lines(text);
        assert_eq!(parsed, vec!["Gaming Channels", "Gaming Highlights"]);
    }
}
