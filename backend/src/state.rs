use std::sync::Arc;

use discover_config::FeatureToggles;
use parking_lot::RwLock;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::creator_ingestion::CreatorIngestionService;
use crate::services::embedding_client::HttpEmbeddingClient;
use crate::services::llm_client::HttpLlmClient;
use crate::services::platform_client::HttpPlatformClient;
use crate::services::platform_search::PlatformSearchAdapter;
use crate::services::query_digest_cache::QueryDigestCache;
use crate::services::query_expansion::QueryExpansionService;
use crate::services::quota_governor::QuotaGovernor;
use crate::services::read_view::ReadView;
use crate::services::search_core::SearchCore;
use crate::services::session_materializer::SessionMaterializer;
use crate::services::token_governor::TokenGovernor;

/// Shared application state, wired once at startup and handed to every
/// handler via `web::Data`. Groups the query-execution core (`search_core`,
/// `read_view`) the way the teacher's `AppState` groups its own service
/// instances, but built from governors/caches/adapters instead of
/// auth/billing/data services.
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: PgPool,
    pub redis_client: Option<redis::Client>,

    pub search_core: Arc<SearchCore>,
    pub read_view: Arc<ReadView>,

    pub token_governor: Arc<TokenGovernor>,
    pub quota_governor: Arc<QuotaGovernor>,
    pub query_cache: Arc<QueryDigestCache>,
    pub materializer: Arc<SessionMaterializer>,

    pub feature_toggles: Arc<RwLock<FeatureToggles>>,
}

impl AppState {
    pub async fn new(
        db_pool: PgPool,
        redis_client: Option<redis::Client>,
        config: AppConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let token_governor = Arc::new(TokenGovernor::new(
            config.llm_daily_token_budget,
            config.llm_per_request_budget,
            config.llm_fallback_threshold,
        ));

        let quota_governor = Arc::new(QuotaGovernor::new(
            config.youtube_daily_quota,
            config.youtube_downgrade_threshold,
            config.platform_api_keys.len().max(1),
        ));

        let query_cache = Arc::new(QueryDigestCache::new(
            config.redis_url.as_deref(),
            config.cache_l2_ttl_hours,
        ));

        let feature_toggles = Arc::new(RwLock::new(FeatureToggles::from_path(Some(
            config.feature_toggles_path.clone(),
        ))));

        let llm_client = Arc::new(HttpLlmClient::new(
            config.llm_provider_url.clone(),
            config.llm_api_keys.first().cloned(),
        ));

        let expansion = Arc::new(QueryExpansionService::new(
            query_cache.clone(),
            token_governor.clone(),
            llm_client,
            !config.llm_api_keys.is_empty(),
            feature_toggles.clone(),
        ));

        let platform_client = Arc::new(HttpPlatformClient::new(config.platform_provider_url.clone()));
        let platform_search = Arc::new(PlatformSearchAdapter::new(
            platform_client,
            quota_governor.clone(),
            config.platform_api_keys.clone(),
            feature_toggles.clone(),
        ));

        let materializer = Arc::new(SessionMaterializer::new(
            db_pool.clone(),
            config.session_ttl_minutes,
            config.session_sliding_expiration,
        ));
        materializer.init_schema().await?;

        let embedding_client = Arc::new(HttpEmbeddingClient::new(
            config.embedding_service_url.clone(),
            config.embedding_request_timeout_ms,
        ));
        let ingestion = Arc::new(CreatorIngestionService::new(
            db_pool.clone(),
            embedding_client,
            token_governor.clone(),
            feature_toggles.clone(),
        ));
        ingestion.init_schema().await?;

        let search_core = Arc::new(SearchCore {
            expansion,
            platform_search,
            materializer: materializer.clone(),
            ingestion,
        });

        let read_view = Arc::new(ReadView::new(db_pool.clone()));

        Ok(Self {
            config,
            db_pool,
            redis_client,
            search_core,
            read_view,
            token_governor,
            quota_governor,
            query_cache,
            materializer,
            feature_toggles,
        })
    }
}
