use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use discover_models::{CreatorProfile, SearchSession};

use crate::services::creator_ingestion::CreatorIngestionService;
use crate::services::platform_search::PlatformSearchAdapter;
use crate::services::query_expansion::QueryExpansionService;
use crate::services::ranking::{merge_dedupe_rank, ScoredCreator};
use crate::services::scoring::{labels, score_profile};
use crate::services::session_materializer::SessionMaterializer;

/// Orchestrates the query-execution core's data flow (spec §2): C1 → C4
/// (miss) → C2 gate → C5 → C3 gate → C6 → C7 → C8 → C9 (materialize).
/// A thin mapping over this lives in the HTTP handler layer; this is
/// where the actual pipeline sequencing happens, the way the teacher's
/// `universal_search` sequences its own fan-out. The quota actually spent
/// by a search comes back from `platform_search.search_channels` itself,
/// not the governor's cumulative daily counter.
pub struct SearchCore {
    pub expansion: Arc<QueryExpansionService>,
    pub platform_search: Arc<PlatformSearchAdapter>,
    pub materializer: Arc<SessionMaterializer>,
    pub ingestion: Arc<CreatorIngestionService>,
}

impl SearchCore {
    /// `findValidSession` hit path: zero external calls (C1 → C9 only).
    pub async fn find_cached_session(&self, genre: &str, platform: &str) -> Option<SearchSession> {
        self.materializer.find_valid_session(genre, platform, Utc::now()).await
    }

    /// Fresh-query path: expand, search, score, rank, materialize, then
    /// kick off best-effort ingestion in the background.
    pub async fn execute_fresh_search(
        &self,
        genre: &str,
        platform: &str,
        max_results_per_query: usize,
    ) -> Result<SearchSession, sqlx::Error> {
        let expansion = self.expansion.generate(genre).await;

        let (results, quota_used): (HashMap<String, Vec<CreatorProfile>>, u64) = self
            .platform_search
            .search_channels(&expansion.queries, max_results_per_query)
            .await;

        let now = Utc::now();
        let per_query: Vec<(String, Vec<ScoredCreator>)> = expansion
            .queries
            .iter()
            .map(|q| {
                let profiles = results.get(q).cloned().unwrap_or_default();
                let scored = profiles
                    .into_iter()
                    .map(|profile| {
                        let score = score_profile(&profile, q, &expansion.normalized, now);
                        let tier = crate::services::ranking::competitiveness_tier_for(&score);
                        ScoredCreator { labels: labels(&score, tier), profile, score }
                    })
                    .collect();
                (q.clone(), scored)
            })
            .collect();

        let ranked = merge_dedupe_rank(&per_query);

        let session = self
            .materializer
            .create_session(genre, platform, &ranked, quota_used, now)
            .await?;

        let profiles: Vec<CreatorProfile> = ranked.into_iter().map(|c| c.profile).collect();
        let ingestion = self.ingestion.clone();
        let genre_owned = genre.to_string();
        let platform_owned = platform.to_string();
        tokio::spawn(async move {
            ingestion.ingest_batch(&platform_owned, &genre_owned, &genre_owned, &profiles).await;
        });

        Ok(session)
    }
}
