use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    // Server
    pub backend_port: u16,
    pub env_mode: String,

    // Database
    pub database_url: Option<String>,
    pub redis_url: Option<String>,

    // External collaborators (§6 of the design: idealized RPC clients)
    pub llm_provider_url: String,
    pub llm_api_keys: Vec<String>,
    pub platform_provider_url: String,
    pub platform_api_keys: Vec<String>,
    pub embedding_service_url: String,
    pub embedding_request_timeout_ms: u64,
    pub embedding_request_retries: usize,
    pub embedding_max_inflight: usize,

    // Session materialization (§6.2)
    pub session_ttl_minutes: i64,
    pub session_sliding_expiration: bool,

    // Quota governor (§4.3, §6.2)
    pub youtube_max_queries_per_search: usize,
    pub youtube_max_results_per_query: usize,
    pub youtube_daily_quota: u64,
    pub youtube_downgrade_threshold: f64,

    // Token governor (§4.2, §6.2)
    pub llm_daily_token_budget: u64,
    pub llm_per_request_budget: u32,
    pub llm_fallback_threshold: f64,

    // Query-digest cache (§4.4, §6.2)
    pub cache_l2_ttl_hours: i64,

    // Feature toggles (§6.3)
    pub feature_toggles_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            backend_port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .expect("BACKEND_PORT must be a valid port number"),
            env_mode: env::var("ENV_MODE").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL").ok(),
            redis_url: env::var("REDIS_URL").ok(),

            llm_provider_url: env::var("LLM_PROVIDER_URL")
                .unwrap_or_else(|_| "http://localhost:8090".to_string()),
            llm_api_keys: Self::csv_list("LLM_API_KEYS"),
            platform_provider_url: env::var("PLATFORM_PROVIDER_URL")
                .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string()),
            platform_api_keys: Self::csv_list("YOUTUBE_API_KEYS"),
            embedding_service_url: env::var("EMBEDDING_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".to_string()),
            embedding_request_timeout_ms: Self::parse_env("EMBEDDING_REQUEST_TIMEOUT_MS", 5000),
            embedding_request_retries: Self::parse_env("EMBEDDING_REQUEST_RETRIES", 2),
            embedding_max_inflight: Self::parse_env("EMBEDDING_MAX_INFLIGHT", 64),

            session_ttl_minutes: Self::parse_env("SESSION_TTL_MINUTES", 30),
            session_sliding_expiration: env::var("SESSION_SLIDING_EXPIRATION")
                .map(|v| v != "false")
                .unwrap_or(true),

            youtube_max_queries_per_search: Self::parse_env("YOUTUBE_MAX_QUERIES_PER_SEARCH", 5),
            youtube_max_results_per_query: Self::parse_env("YOUTUBE_MAX_RESULTS_PER_QUERY", 50),
            youtube_daily_quota: Self::parse_env("YOUTUBE_DAILY_QUOTA", 10_000),
            youtube_downgrade_threshold: Self::parse_env_f64("YOUTUBE_DOWNGRADE_THRESHOLD", 0.8),

            llm_daily_token_budget: Self::parse_env("LLM_DAILY_TOKEN_BUDGET", 1_000_000),
            llm_per_request_budget: Self::parse_env("LLM_PER_REQUEST_BUDGET", 2_000),
            llm_fallback_threshold: Self::parse_env_f64("LLM_FALLBACK_THRESHOLD", 0.9),

            cache_l2_ttl_hours: Self::parse_env("CACHE_L2_TTL_HOURS", 24),

            feature_toggles_path: env::var("FEATURE_TOGGLES_PATH")
                .unwrap_or_else(|_| "./feature-toggles.json".to_string()),
        }
    }

    fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
        env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    fn parse_env_f64(key: &str, default: f64) -> f64 {
        env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    fn csv_list(key: &str) -> Vec<String> {
        env::var(key)
            .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}
