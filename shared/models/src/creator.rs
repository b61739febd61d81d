use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a persisted `Creator` row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CreatorStatus {
    Active,
    Inactive,
    Hidden,
}

/// How a `Creator` row first entered storage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CreatorSource {
    Api,
    Manual,
    Imported,
}

/// Progress of C11 creator ingestion for a given row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IngestionStatus {
    Pending,
    Deferred,
    Complete,
    Failed,
}

/// Persistent creator record. Identity is `(platform, channel_id)`.
///
/// Lifecycle: created on first platform discovery; `last_seen_at` updated on
/// every subsequent occurrence in results; the embedding fields are
/// populated exactly once, on successful ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Creator {
    pub id: uuid::Uuid,
    pub platform: String,
    pub channel_id: String,
    pub display_name: String,
    pub description: Option<String>,
    pub profile_image_url: Option<String>,
    pub base_genre: String,
    pub origin_query: String,
    pub country: Option<String>,
    pub discovered_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub status: CreatorStatus,
    pub source: CreatorSource,
    pub profile_embedding: Option<Vec<f32>>,
    pub embedding_model: Option<String>,
    pub embedding_created_at: Option<DateTime<Utc>>,
    pub compressed_bio: Option<String>,
    pub content_tags: Option<Vec<String>>,
    pub ingestion_status: IngestionStatus,
}

/// Recent-video behavioral signal used by the engagement scorer when
/// available; absent profiles fall back to the aggregate
/// `views_per_subscriber` form (spec §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStatistics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// In-memory creator profile as returned by the platform adapter (C6).
/// Immutable within a single search; never persisted directly — materialized
/// results are a point-in-time denormalized snapshot (spec §3, Ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorProfile {
    pub channel_id: String,
    pub handle: Option<String>,
    pub display_name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub subscribers: u64,
    pub videos: u64,
    pub views: u64,
    pub country: Option<String>,
    pub last_video_date: Option<DateTime<Utc>>,
    /// Channel creation date, used to derive `channelAgeMonths` for the
    /// activity-consistency scorer.
    pub created_at: Option<DateTime<Utc>>,
    /// Present only when the adapter could batch-fetch recent video stats.
    pub recent_videos: Vec<VideoStatistics>,
}
