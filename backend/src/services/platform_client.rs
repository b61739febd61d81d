use async_trait::async_trait;
use chrono::{DateTime, Utc};
use discover_models::{CreatorProfile, VideoStatistics};

/// A single channel returned by `search.list`, before the `channels.list`
/// batch hydration fills in statistics (spec §4.6).
#[derive(Debug, Clone)]
pub struct ChannelRef {
    pub channel_id: String,
}

/// The idealized video-platform RPC collaborator (spec §1, §6.1). Mirrors
/// the two-call shape of `search.list` / `channels.list` the adapter (C6)
/// depends on, generalized from the teacher's `AIAgentConnector` trait
/// pattern in `ai_service.rs`.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn search_list(
        &self,
        query: &str,
        max_results: usize,
        credential: &str,
    ) -> Result<Vec<ChannelRef>, PlatformClientError>;

    async fn channels_list(
        &self,
        channel_ids: &[String],
        credential: &str,
    ) -> Result<Vec<CreatorProfile>, PlatformClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformClientError {
    #[error("platform request timed out")]
    Timeout,
    #[error("platform transport error: {0}")]
    Transport(String),
    #[error("quota exceeded (status {status}): {body}")]
    QuotaExceeded { status: u16, body: String },
    #[error("platform returned status {0}")]
    Status(u16),
}

pub struct HttpPlatformClient {
    client: reqwest::Client,
    provider_url: String,
}

impl HttpPlatformClient {
    pub fn new(provider_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            provider_url,
        }
    }

    async fn classify(&self, response: reqwest::Response) -> Result<reqwest::Response, PlatformClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        if crate::services::quota_governor::is_quota_shaped_failure(status_code, &body) {
            Err(PlatformClientError::QuotaExceeded { status: status_code, body })
        } else {
            Err(PlatformClientError::Status(status_code))
        }
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn search_list(
        &self,
        query: &str,
        max_results: usize,
        credential: &str,
    ) -> Result<Vec<ChannelRef>, PlatformClientError> {
        let response = self
            .client
            .get(format!("{}/search", self.provider_url))
            .query(&[
                ("part", "snippet"),
                ("type", "channel"),
                ("q", query),
                ("maxResults", &max_results.to_string()),
                ("key", credential),
            ])
            .send()
            .await
            .map_err(|e| if e.is_timeout() { PlatformClientError::Timeout } else { PlatformClientError::Transport(e.to_string()) })?;

        let response = self.classify(response).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformClientError::Transport(e.to_string()))?;

        let channel_ids = body
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        item.pointer("/snippet/channelId")
                            .or_else(|| item.pointer("/id/channelId"))
                            .and_then(|v| v.as_str())
                            .map(|s| ChannelRef { channel_id: s.to_string() })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(channel_ids)
    }

    async fn channels_list(
        &self,
        channel_ids: &[String],
        credential: &str,
    ) -> Result<Vec<CreatorProfile>, PlatformClientError> {
        if channel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(format!("{}/channels", self.provider_url))
            .query(&[
                ("part", "snippet,statistics"),
                ("id", &channel_ids.join(",")),
                ("key", &credential.to_string()),
            ])
            .send()
            .await
            .map_err(|e| if e.is_timeout() { PlatformClientError::Timeout } else { PlatformClientError::Transport(e.to_string()) })?;

        let response = self.classify(response).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformClientError::Transport(e.to_string()))?;

        let mut profiles: Vec<CreatorProfile> = body
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(parse_channel).collect())
            .unwrap_or_default();

        for profile in &mut profiles {
            if let Ok((last_video_date, recent_videos)) =
                self.recent_videos(&profile.channel_id, credential).await
            {
                profile.last_video_date = last_video_date;
                profile.recent_videos = recent_videos;
            }
        }

        Ok(profiles)
    }
}

impl HttpPlatformClient {
    /// Fetches the channel's most recent uploads (`search.list` ordered by
    /// date) and their per-video statistics (`videos.list`), feeding the
    /// freshness scorer's real recency signal and the engagement scorer's
    /// preferred per-video form (spec §4.7). Best-effort: any failure
    /// degrades to `(None, vec![])`, handled by the caller.
    async fn recent_videos(
        &self,
        channel_id: &str,
        credential: &str,
    ) -> Result<(Option<DateTime<Utc>>, Vec<VideoStatistics>), PlatformClientError> {
        let response = self
            .client
            .get(format!("{}/search", self.provider_url))
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", "5"),
                ("key", credential),
            ])
            .send()
            .await
            .map_err(|e| if e.is_timeout() { PlatformClientError::Timeout } else { PlatformClientError::Transport(e.to_string()) })?;

        let response = self.classify(response).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformClientError::Transport(e.to_string()))?;

        let mut video_ids = Vec::new();
        let mut last_video_date = None;
        if let Some(items) = body.get("items").and_then(|v| v.as_array()) {
            for item in items {
                if let Some(id) = item.pointer("/id/videoId").and_then(|v| v.as_str()) {
                    video_ids.push(id.to_string());
                }
                if last_video_date.is_none() {
                    last_video_date = item
                        .pointer("/snippet/publishedAt")
                        .and_then(|v| v.as_str())
                        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                        .map(|dt| dt.with_timezone(&Utc));
                }
            }
        }

        if video_ids.is_empty() {
            return Ok((last_video_date, Vec::new()));
        }

        let stats_response = self
            .client
            .get(format!("{}/videos", self.provider_url))
            .query(&[
                ("part", "statistics"),
                ("id", &video_ids.join(",")),
                ("key", &credential.to_string()),
            ])
            .send()
            .await
            .map_err(|e| if e.is_timeout() { PlatformClientError::Timeout } else { PlatformClientError::Transport(e.to_string()) })?;

        let stats_response = self.classify(stats_response).await?;
        let stats_body: serde_json::Value = stats_response
            .json()
            .await
            .map_err(|e| PlatformClientError::Transport(e.to_string()))?;

        let recent_videos = stats_body
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let stats = item.get("statistics")?;
                        Some(VideoStatistics {
                            views: stats.get("viewCount").and_then(|v| v.as_str()).and_then(|s| s.parse().ok()).unwrap_or(0),
                            likes: stats.get("likeCount").and_then(|v| v.as_str()).and_then(|s| s.parse().ok()).unwrap_or(0),
                            comments: stats.get("commentCount").and_then(|v| v.as_str()).and_then(|s| s.parse().ok()).unwrap_or(0),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok((last_video_date, recent_videos))
    }
}

fn parse_channel(item: &serde_json::Value) -> Option<CreatorProfile> {
    let channel_id = item.get("id")?.as_str()?.to_string();
    let snippet = item.get("snippet")?;
    let statistics = item.get("statistics");

    let display_name = snippet.get("title")?.as_str().unwrap_or_default().to_string();
    let bio = snippet.get("description").and_then(|v| v.as_str()).map(str::to_string);
    let country = snippet.get("country").and_then(|v| v.as_str()).map(str::to_string);
    let created_at = snippet
        .get("publishedAt")
        .and_then(|v| v.as_str())
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc));

    let image_url = preferred_thumbnail(snippet.get("thumbnails"));

    let subscribers = statistics
        .and_then(|s| s.get("subscriberCount"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let videos = statistics
        .and_then(|s| s.get("videoCount"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let views = statistics
        .and_then(|s| s.get("viewCount"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    Some(CreatorProfile {
        channel_id,
        handle: None,
        display_name,
        bio,
        image_url,
        subscribers,
        videos,
        views,
        country,
        last_video_date: None,
        created_at,
        recent_videos: Vec::new(),
    })
}

/// Prefer the highest available thumbnail resolution
/// `maxres > high > medium > default` (spec §4.6e).
fn preferred_thumbnail(thumbnails: Option<&serde_json::Value>) -> Option<String> {
    let thumbnails = thumbnails?;
    for key in ["maxres", "high", "medium", "default"] {
        if let Some(url) = thumbnails.pointer(&format!("/{}/url", key)).and_then(|v| v.as_str()) {
            return Some(url.to_string());
        }
    }
    None
}
