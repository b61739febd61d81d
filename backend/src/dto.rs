use discover_models::{SearchSessionResult, SortKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub platform: String,
    pub genre: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

pub fn default_page() -> u32 {
    1
}

pub fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub session_id: uuid::Uuid,
    pub results: Vec<SearchSessionResult>,
    pub total_results: i64,
    pub current_page: u32,
    pub total_pages: u32,
    pub from_cache: bool,
    pub external_units_used: i64,
    pub query_info: QueryInfo,
}

#[derive(Debug, Serialize)]
pub struct QueryInfo {
    pub normalized_query: String,
    pub platform: String,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub sort_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilteredPaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub engagement: Option<String>,
    #[serde(default)]
    pub competitiveness: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub genres: Option<String>,
}

pub fn parse_sort_key(sort_by: &Option<String>) -> SortKey {
    sort_by.as_deref().map(SortKey::from_str_lenient).unwrap_or(SortKey::FinalScore)
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub session_id: uuid::Uuid,
    pub results: Vec<SearchSessionResult>,
    pub total_results: i64,
    pub current_page: u32,
    pub total_pages: u32,
    pub expired: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub llm_tokens_used: u64,
    pub llm_daily_budget: u64,
    pub llm_usage_ratio: f64,
    pub platform_units_used: u64,
    pub platform_daily_quota: u64,
    pub platform_usage_ratio: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct AdminFeatures {
    pub llm: &'static str,
    pub platform: &'static str,
    pub embedding: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub channel_cache_cleared: bool,
    pub sessions_swept: u64,
}
