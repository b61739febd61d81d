use actix_web::{web, HttpResponse};
use discover_models::{
    ActivityBucket, AudienceBucket, CompetitivenessBucket, EngagementBucket, ResultFilters, SortKey,
};
use uuid::Uuid;

use crate::dto::{
    parse_sort_key, FilteredPaginationQuery, PageResponse, PaginationQuery, QueryInfo,
    SearchRequest, SearchResponse,
};
use crate::errors::AppError;
use crate::state::AppState;

/// `POST /search` (spec §6.1): find-or-execute over the query-execution
/// core, a thin mapping over `SearchCore`/`ReadView`.
pub async fn search(
    state: web::Data<AppState>,
    body: web::Json<SearchRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();

    let (session, from_cache) = match state.search_core.find_cached_session(&req.genre, &req.platform).await {
        Some(session) => (session, true),
        None => {
            let max_results = state.config.youtube_max_results_per_query;
            let session = state
                .search_core
                .execute_fresh_search(&req.genre, &req.platform, max_results)
                .await?;
            (session, false)
        }
    };

    let sort_key = SortKey::FinalScore;
    let filters = build_filters(&req.filters);
    let page = state
        .read_view
        .paginate_filtered(session.id, req.page, req.page_size, sort_key, &filters)
        .await?;

    let total_pages = total_pages(page.total, req.page_size);

    Ok(HttpResponse::Ok().json(SearchResponse {
        session_id: session.id,
        results: page.rows,
        total_results: page.total,
        current_page: req.page,
        total_pages,
        from_cache,
        external_units_used: session.external_units_used,
        query_info: QueryInfo {
            normalized_query: session.normalized_query,
            platform: session.platform,
        },
    }))
}

/// `GET /search/session/{sessionId}` (spec §6.1): zero-external-call
/// pagination over an already-materialized session.
pub async fn get_session_page(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let sort_key = parse_sort_key(&query.sort_by);

    let page = state
        .read_view
        .paginate(session_id, query.page, query.page_size, sort_key)
        .await?;

    let total_pages = total_pages(page.total, query.page_size);
    let expired = page.total == 0 && page.rows.is_empty();

    Ok(HttpResponse::Ok().json(PageResponse {
        session_id,
        results: page.rows,
        total_results: page.total,
        current_page: query.page,
        total_pages,
        expired,
    }))
}

/// `GET /search/session/{sessionId}/filtered` (spec §6.1, §4.10): same
/// zero-external-call contract with bucketed filters applied.
pub async fn get_session_page_filtered(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<FilteredPaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let sort_key = parse_sort_key(&query.sort_by);

    let filters = ResultFilters {
        audience: split_buckets(query.audience.as_deref(), AudienceBucket::from_str),
        engagement: split_buckets(query.engagement.as_deref(), EngagementBucket::from_str),
        competitiveness: split_buckets(query.competitiveness.as_deref(), CompetitivenessBucket::from_str),
        activity: split_buckets(query.activity.as_deref(), ActivityBucket::from_str),
        genres: query
            .genres
            .as_deref()
            .map(|g| g.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default(),
    };

    let page = state
        .read_view
        .paginate_filtered(session_id, query.page, query.page_size, sort_key, &filters)
        .await?;

    let total_pages = total_pages(page.total, query.page_size);
    let expired = page.total == 0 && page.rows.is_empty();

    Ok(HttpResponse::Ok().json(PageResponse {
        session_id,
        results: page.rows,
        total_results: page.total,
        current_page: query.page,
        total_pages,
        expired,
    }))
}

fn build_filters(raw: &std::collections::HashMap<String, String>) -> ResultFilters {
    ResultFilters {
        audience: split_buckets(raw.get("audience").map(String::as_str), AudienceBucket::from_str),
        engagement: split_buckets(raw.get("engagement").map(String::as_str), EngagementBucket::from_str),
        competitiveness: split_buckets(raw.get("competitiveness").map(String::as_str), CompetitivenessBucket::from_str),
        activity: split_buckets(raw.get("activity").map(String::as_str), ActivityBucket::from_str),
        genres: raw
            .get("genres")
            .map(|g| g.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default(),
    }
}

/// Splits a comma-separated bucket param into tokens and parses each one,
/// so `audience=small,large` filters on both buckets instead of silently
/// failing to parse as a single value (spec §4.10).
fn split_buckets<T>(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    raw.map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).filter_map(parse).collect())
        .unwrap_or_default()
}

fn total_pages(total: i64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    ((total as f64) / (page_size as f64)).ceil() as u32
}
