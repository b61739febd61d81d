use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A materialized result set for a unique `(queryDigest, platform)` pair.
///
/// Uniqueness constraint on `(query_digest, platform)`. Invariants: valid
/// iff `now < expires_at`; `last_accessed_at >= created_at`; sliding-touch
/// advances `expires_at` to `now + ttl`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchSession {
    pub id: uuid::Uuid,
    pub query_digest: String,
    pub platform: String,
    pub normalized_query: String,
    pub total_results: i32,
    pub external_units_used: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl SearchSession {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Composite key `(session_id, rank)`. `rank` starts at 1 and is contiguous
/// over `1..=total_results`. A point-in-time denormalized snapshot — does
/// not reference the `Creator` row, so later `Creator` mutations never
/// retroactively alter ranking (spec §3, Ownership).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchSessionResult {
    pub session_id: uuid::Uuid,
    pub rank: i32,
    pub channel_id: String,
    pub channel_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub final_score: f64,
    pub genre_relevance: f64,
    pub audience_fit: f64,
    pub engagement_quality: f64,
    pub activity_consistency: f64,
    pub freshness: f64,
    pub competitiveness_score: f64,
    pub subscriber_count: i64,
    pub last_video_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

/// Closed set of sortable columns for C10 pagination. Each maps to exactly
/// one stored column (spec §4.10).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortKey {
    FinalScore,
    Relevance,
    Subscribers,
    Engagement,
    Activity,
    Competitiveness,
}

impl SortKey {
    /// Case-insensitive with `-`/`_` interchangeable; invalid input silently
    /// maps to `FINAL_SCORE` (spec §4.10).
    pub fn from_str_lenient(s: &str) -> Self {
        let normalized = s.to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "final_score" => Self::FinalScore,
            "relevance" => Self::Relevance,
            "subscribers" => Self::Subscribers,
            "engagement" => Self::Engagement,
            "activity" => Self::Activity,
            "competitiveness" => Self::Competitiveness,
            _ => Self::FinalScore,
        }
    }

    /// Stored column this sort key resolves to.
    pub fn column(self) -> &'static str {
        match self {
            Self::FinalScore => "final_score",
            Self::Relevance => "genre_relevance",
            Self::Subscribers => "subscriber_count",
            Self::Engagement => "engagement_quality",
            Self::Activity => "last_video_date",
            Self::Competitiveness => "competitiveness_score",
        }
    }
}

/// Half-open range over a sub-score, mapping a continuous value to a
/// discrete filter selector (spec §4.10).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudienceBucket {
    Small,
    Medium,
    Large,
}

impl AudienceBucket {
    pub fn contains(self, audience_fit: f64) -> bool {
        match self {
            Self::Small => (0.0..0.4).contains(&audience_fit),
            Self::Medium => (0.4..0.7).contains(&audience_fit),
            Self::Large => (0.7..1.01).contains(&audience_fit),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngagementBucket {
    Low,
    Medium,
    High,
}

impl EngagementBucket {
    pub fn contains(self, engagement_quality: f64) -> bool {
        match self {
            Self::Low => (0.0..0.4).contains(&engagement_quality),
            Self::Medium => (0.4..0.7).contains(&engagement_quality),
            Self::High => (0.7..1.01).contains(&engagement_quality),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Filter-side activity bucket over `activityConsistency` ("how often do
/// they upload?") — deliberately distinct from the `ACTIVITY` sort key,
/// which orders by `lastVideoDate` ("who uploaded most recently?"). See
/// spec §9, ACTIVITY ambiguity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityBucket {
    Occasional,
    Consistent,
    VeryActive,
}

impl ActivityBucket {
    pub fn contains(self, activity_consistency: f64) -> bool {
        match self {
            Self::Occasional => (0.0..0.4).contains(&activity_consistency),
            Self::Consistent => (0.4..0.7).contains(&activity_consistency),
            Self::VeryActive => (0.7..1.01).contains(&activity_consistency),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "occasional" => Some(Self::Occasional),
            "consistent" => Some(Self::Consistent),
            "very_active" | "very-active" => Some(Self::VeryActive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompetitivenessBucket {
    Nascent,
    Emerging,
    Growing,
    Established,
    Dominant,
}

impl CompetitivenessBucket {
    pub fn contains(self, competitiveness_score: f64) -> bool {
        match self {
            Self::Nascent => (0.0..0.20).contains(&competitiveness_score),
            Self::Emerging => (0.20..0.40).contains(&competitiveness_score),
            Self::Growing => (0.40..0.60).contains(&competitiveness_score),
            Self::Established => (0.60..0.80).contains(&competitiveness_score),
            Self::Dominant => (0.80..1.01).contains(&competitiveness_score),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nascent" => Some(Self::Nascent),
            "emerging" => Some(Self::Emerging),
            "growing" => Some(Self::Growing),
            "established" => Some(Self::Established),
            "dominant" => Some(Self::Dominant),
            _ => None,
        }
    }
}

/// Conjunction-of-disjunctions filter set built from `paginateFiltered`
/// query params: AND across categories, OR within a category (spec §4.10).
#[derive(Debug, Clone, Default)]
pub struct ResultFilters {
    pub audience: Vec<AudienceBucket>,
    pub engagement: Vec<EngagementBucket>,
    pub competitiveness: Vec<CompetitivenessBucket>,
    pub activity: Vec<ActivityBucket>,
    /// Case-insensitive label-set intersection test (any overlap).
    pub genres: Vec<String>,
}

impl ResultFilters {
    pub fn is_empty(&self) -> bool {
        self.audience.is_empty()
            && self.engagement.is_empty()
            && self.competitiveness.is_empty()
            && self.activity.is_empty()
            && self.genres.is_empty()
    }

    pub fn matches(&self, row: &SearchSessionResult) -> bool {
        let audience_ok = self.audience.is_empty()
            || self.audience.iter().any(|b| b.contains(row.audience_fit));
        let engagement_ok = self.engagement.is_empty()
            || self.engagement.iter().any(|b| b.contains(row.engagement_quality));
        let competitiveness_ok = self.competitiveness.is_empty()
            || self
                .competitiveness
                .iter()
                .any(|b| b.contains(row.competitiveness_score));
        let activity_ok = self.activity.is_empty()
            || self.activity.iter().any(|b| b.contains(row.activity_consistency));
        let genres_ok = self.genres.is_empty()
            || self.genres.iter().any(|g| {
                row.labels
                    .iter()
                    .any(|label| label.eq_ignore_ascii_case(g))
            });

        audience_ok && engagement_ok && competitiveness_ok && activity_ok && genres_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_parsing_is_lenient_and_defaults() {
        assert_eq!(SortKey::from_str_lenient("final-score"), SortKey::FinalScore);
        assert_eq!(SortKey::from_str_lenient("SUBSCRIBERS"), SortKey::Subscribers);
        assert_eq!(SortKey::from_str_lenient("not_a_key"), SortKey::FinalScore);
    }

    #[test]
    fn buckets_are_half_open() {
        assert!(AudienceBucket::Small.contains(0.0));
        assert!(!AudienceBucket::Small.contains(0.4));
        assert!(AudienceBucket::Medium.contains(0.4));
        assert!(AudienceBucket::Large.contains(1.0));
    }
}
