use discover_models::{ResultFilters, SearchSessionResult, SortKey};
use sqlx::PgPool;
use uuid::Uuid;

/// A single page of materialized results plus the total row count, for
/// pagination metadata.
#[derive(Debug, Clone)]
pub struct Page {
    pub rows: Vec<SearchSessionResult>,
    pub total: i64,
}

/// Pure read-time view over materialized session rows (spec §4.10).
///
/// Hard invariant: no LLM call, no platform call, no score or ranking
/// recomputation, no background work beyond the caller's own
/// sliding-touch. Every method here is a read-only storage query, following
/// `social_integration_service`'s query style.
pub struct ReadView {
    db: PgPool,
}

impl ReadView {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// `paginate(sessionId, page, pageSize, sortKey)` (spec §4.10).
    pub async fn paginate(
        &self,
        session_id: Uuid,
        page: u32,
        page_size: u32,
        sort_key: SortKey,
    ) -> Result<Page, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * page_size as i64;
        let column = sort_key.column();

        let query = format!(
            "SELECT * FROM search_session_results WHERE session_id = $1 ORDER BY {} DESC NULLS LAST, rank ASC OFFSET $2 LIMIT $3",
            column
        );

        let rows = sqlx::query_as::<_, SearchSessionResult>(&query)
            .bind(session_id)
            .bind(offset)
            .bind(page_size as i64)
            .fetch_all(&self.db)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_session_results WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.db)
            .await?;

        Ok(Page { rows, total })
    }

    /// `paginateFiltered(sessionId, page, pageSize, sortKey, filters)` (spec
    /// §4.10). Filtering executes in memory over the full materialized set
    /// since the bucket predicates are not single-column range checks the
    /// storage layer can express cheaply here; behaviorally identical to a
    /// storage-side predicate per spec §4.10 step 3.
    pub async fn paginate_filtered(
        &self,
        session_id: Uuid,
        page: u32,
        page_size: u32,
        sort_key: SortKey,
        filters: &ResultFilters,
    ) -> Result<Page, sqlx::Error> {
        if filters.is_empty() {
            return self.paginate(session_id, page, page_size, sort_key).await;
        }

        let all: Vec<SearchSessionResult> = sqlx::query_as::<_, SearchSessionResult>(
            "SELECT * FROM search_session_results WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        let matching: Vec<SearchSessionResult> = all.into_iter().filter(|row| filters.matches(row)).collect();
        let total = matching.len() as i64;
        let sorted = sort_rows(matching, sort_key);

        let offset = (page.saturating_sub(1) as usize) * page_size as usize;
        let rows = sorted.into_iter().skip(offset).take(page_size as usize).collect();

        Ok(Page { rows, total })
    }
}

fn sort_rows(mut rows: Vec<SearchSessionResult>, sort_key: SortKey) -> Vec<SearchSessionResult> {
    rows.sort_by(|a, b| {
        let primary = match sort_key {
            SortKey::FinalScore => b.final_score.partial_cmp(&a.final_score),
            SortKey::Relevance => b.genre_relevance.partial_cmp(&a.genre_relevance),
            SortKey::Subscribers => b.subscriber_count.partial_cmp(&a.subscriber_count),
            SortKey::Engagement => b.engagement_quality.partial_cmp(&a.engagement_quality),
            SortKey::Activity => match (b.last_video_date, a.last_video_date) {
                (Some(bd), Some(ad)) => bd.partial_cmp(&ad),
                (Some(_), None) => Some(std::cmp::Ordering::Less),
                (None, Some(_)) => Some(std::cmp::Ordering::Greater),
                (None, None) => Some(std::cmp::Ordering::Equal),
            },
            SortKey::Competitiveness => b.competitiveness_score.partial_cmp(&a.competitiveness_score),
        };
        primary.unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.rank.cmp(&b.rank))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(rank: i32, final_score: f64, last_video_date: Option<chrono::DateTime<Utc>>) -> SearchSessionResult {
        SearchSessionResult {
            session_id: Uuid::new_v4(),
            rank,
            channel_id: format!("c{}", rank),
            channel_name: format!("Channel {}", rank),
            description: None,
            image_url: None,
            final_score,
            genre_relevance: 0.5,
            audience_fit: 0.5,
            engagement_quality: 0.5,
            activity_consistency: 0.5,
            freshness: 0.5,
            competitiveness_score: 0.5,
            subscriber_count: 1000,
            last_video_date,
            labels: vec![],
        }
    }

    #[test]
    fn sort_by_final_score_descending() {
        let rows = vec![row(1, 0.2, None), row(2, 0.9, None)];
        let sorted = sort_rows(rows, SortKey::FinalScore);
        assert_eq!(sorted[0].rank, 2);
    }

    #[test]
    fn activity_sort_puts_nulls_last() {
        let now = Utc::now();
        let rows = vec![row(1, 0.5, None), row(2, 0.5, Some(now))];
        let sorted = sort_rows(rows, SortKey::Activity);
        assert_eq!(sorted[0].rank, 2);
        assert_eq!(sorted[1].rank, 1);
    }
}
