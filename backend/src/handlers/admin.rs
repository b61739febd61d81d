use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::dto::{AdminFeatures, AdminStats, CacheClearResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// `GET /admin/stats` (spec §6.1): governor usage counters and L1 cache
/// hit rate, for operational visibility.
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let cache_stats = state.query_cache.l1_stats();
    let total_lookups = cache_stats.hits + cache_stats.misses;
    let hit_rate = if total_lookups == 0 { 0.0 } else { cache_stats.hits as f64 / total_lookups as f64 };

    HttpResponse::Ok().json(AdminStats {
        llm_tokens_used: state.token_governor.tokens_used(),
        llm_daily_budget: state.token_governor.daily_budget(),
        llm_usage_ratio: state.token_governor.usage_ratio(),
        platform_units_used: state.quota_governor.units_used(),
        platform_daily_quota: state.quota_governor.daily_quota(),
        platform_usage_ratio: state.quota_governor.usage_ratio(),
        cache_hits: cache_stats.hits,
        cache_misses: cache_stats.misses,
        cache_hit_rate: hit_rate,
    })
}

/// `GET /admin/features` (spec §6.3): resolved DISABLED/CONFIGURED/ENABLED
/// state of the three external collaborators.
pub async fn features(state: web::Data<AppState>) -> HttpResponse {
    let toggles = state.feature_toggles.read();

    let llm_present = !state.config.llm_api_keys.is_empty();
    let platform_present = !state.config.platform_api_keys.is_empty();
    let embedding_present = true;

    HttpResponse::Ok().json(AdminFeatures {
        llm: feature_state_label(toggles.resolve("llm_query_expansion", llm_present)),
        platform: feature_state_label(toggles.resolve("platform_search", platform_present)),
        embedding: feature_state_label(toggles.resolve("creator_embedding", embedding_present)),
    })
}

/// `POST /admin/cache/clear` (spec §6.1): drop the channel-metadata L1
/// cache and sweep already-expired sessions. Never clears the session
/// lookup cache directly, since storage-side expiry is the source of
/// truth there.
pub async fn clear_cache(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let channel_cache = discover_utils::cache_manager::get_channel_metadata_cache();
    channel_cache.clear();

    let swept = state.materializer.sweep_expired(Utc::now()).await?;

    Ok(HttpResponse::Ok().json(CacheClearResponse {
        channel_cache_cleared: true,
        sessions_swept: swept,
    }))
}

fn feature_state_label(state: discover_config::FeatureState) -> &'static str {
    match state {
        discover_config::FeatureState::Disabled => "DISABLED",
        discover_config::FeatureState::Configured => "CONFIGURED",
        discover_config::FeatureState::Enabled => "ENABLED",
    }
}
