use chrono::{DateTime, Utc};
use discover_models::{clamp01, CreatorProfile};

/// Pure, deterministic, side-effect-free scorer set (spec §4.7). Mirrors
/// the teacher's style of small, independently-testable pure functions
/// (e.g. `TokenBucket::refill`, `CacheStats::hit_rate`) rather than a
/// single monolithic scoring function.

/// Subscriber-count bucket a user can request a preference for (spec §4.7,
/// audience fit).
#[derive(Debug, Clone, Copy)]
pub struct AudiencePreference {
    pub min: u64,
    pub max: u64,
}

pub fn genre_relevance(base_genre: &str, display_name: &str, bio: Option<&str>) -> f64 {
    let genre_tokens: Vec<String> = base_genre
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 2)
        .collect();

    if genre_tokens.is_empty() {
        return 0.4;
    }

    let combined = format!("{} {}", display_name, bio.unwrap_or_default());
    let normalized_combined: String = combined
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let matches = genre_tokens
        .iter()
        .filter(|token| normalized_combined.contains(token.as_str()))
        .count();
    let mut score = matches as f64 / genre_tokens.len() as f64;

    let normalized_genre: String = base_genre
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let normalized_name: String = display_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    if !normalized_genre.is_empty() && normalized_name.contains(normalized_genre.as_str()) {
        score += 0.3;
    }

    clamp01(score)
}

/// "Name relevance" variant that boosts exact/near matches of the raw
/// query against the channel name (spec §4.7).
pub fn name_relevance(query: &str, display_name: &str) -> f64 {
    let normalized_query = query.to_lowercase();
    let normalized_name = display_name.to_lowercase();

    if normalized_name == normalized_query {
        return 1.0;
    }
    if normalized_name.starts_with(&normalized_query) {
        return 0.95;
    }
    if normalized_name.contains(&normalized_query) {
        return 0.8;
    }
    if display_name.to_lowercase().contains(&query.to_lowercase()) {
        return 0.7;
    }

    let query_words: Vec<&str> = normalized_query.split_whitespace().collect();
    if query_words.is_empty() {
        return 0.3;
    }
    let word_hits = query_words.iter().filter(|w| normalized_name.contains(*w)).count();
    (0.4 + 0.3 * (word_hits as f64 / query_words.len() as f64)).max(0.3)
}

pub fn audience_fit(subscribers: u64, preference: Option<AudiencePreference>) -> f64 {
    match preference {
        None => match subscribers {
            s if s >= 10_000_000 => 1.0,
            s if s >= 1_000_000 => 0.9,
            s if s >= 100_000 => 0.7,
            s if s >= 10_000 => 0.5,
            s if s >= 1_000 => 0.3,
            _ => 0.2,
        },
        Some(pref) => {
            if subscribers >= pref.min && subscribers < pref.max {
                1.0
            } else if subscribers >= pref.max {
                0.8
            } else {
                let distance = (pref.min.saturating_sub(subscribers)) as f64;
                let span = pref.min.max(1) as f64;
                (0.7 - (distance / span).min(0.7)).max(0.0)
            }
        }
    }
}

/// Per-video statistics used by the behavior-based engagement form (spec
/// §4.7). Separate from `discover_models::VideoStatistics` field shape for
/// scorer-local clarity; field names match 1:1.
pub type VideoStats = discover_models::VideoStatistics;

const ENGAGEMENT_RECENCY_WEIGHTS: [f64; 10] =
    [1.00, 0.85, 0.70, 0.55, 0.40, 0.40, 0.40, 0.40, 0.40, 0.40];

pub fn engagement_quality(subscribers: u64, views: u64, recent_videos: &[VideoStats]) -> f64 {
    let eligible: Vec<&VideoStats> = recent_videos.iter().filter(|v| v.views >= 100).take(10).collect();

    if !eligible.is_empty() {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (i, video) in eligible.iter().enumerate() {
            let rate = (video.likes as f64 + 2.0 * video.comments as f64) / video.views as f64;
            let weight = ENGAGEMENT_RECENCY_WEIGHTS[i.min(9)];
            weighted_sum += rate * weight;
            weight_total += weight;
        }
        let mean_rate = weighted_sum / weight_total;
        return 1.0 / (1.0 + (-3.0 * (mean_rate - 0.15)).exp());
    }

    let ratio = if subscribers == 0 { 0.5 } else { views as f64 / subscribers as f64 };
    1.0 / (1.0 + (-0.05 * (ratio - 50.0)).exp())
}

pub fn activity_consistency(video_count: u64, channel_age_months: f64) -> f64 {
    let uploads_per_month = video_count as f64 / channel_age_months.max(1.0);
    let r = uploads_per_month;

    if r <= 0.0 {
        0.0
    } else if r <= 1.0 {
        r * 0.3
    } else if r <= 4.0 {
        0.3 + (r - 1.0) / 3.0 * 0.4
    } else if r <= 8.0 {
        0.7 + (r - 4.0) / 4.0 * 0.2
    } else {
        0.9 + ((r - 8.0) / 20.0 * 0.1).min(0.1)
    }
}

pub fn freshness(last_seen_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(last_seen) = last_seen_at else { return 0.5 };
    let days = (now - last_seen).num_seconds() as f64 / 86_400.0;

    if days <= 7.0 {
        1.0
    } else if days <= 30.0 {
        1.0 - (days - 7.0) / (30.0 - 7.0) * (1.0 - 0.8)
    } else if days <= 90.0 {
        0.8 - (days - 30.0) / (90.0 - 30.0) * (0.8 - 0.5)
    } else if days <= 180.0 {
        0.5 - (days - 90.0) / (180.0 - 90.0) * (0.5 - 0.2)
    } else {
        0.1
    }
}

/// Deterministic threshold-based labels over the sub-scores (spec §4.7).
pub fn labels(score: &discover_models::CreatorScore, competitiveness_tier: discover_models::CompetitivenessTier) -> Vec<String> {
    let mut out = Vec::new();

    if score.engagement_quality >= 0.75 {
        out.push("High engagement".to_string());
    }
    if score.audience_fit >= 0.9 {
        out.push("Large audience".to_string());
    }
    if score.activity_consistency >= 0.7 {
        out.push("Very active".to_string());
    }
    if score.freshness >= 0.9 {
        out.push("Recently active".to_string());
    }
    if score.genre_relevance >= 0.9 {
        out.push("Strong genre match".to_string());
    }

    out.push(match competitiveness_tier {
        discover_models::CompetitivenessTier::Nascent => "Nascent".to_string(),
        discover_models::CompetitivenessTier::Emerging => "Emerging".to_string(),
        discover_models::CompetitivenessTier::Growing => "Growing".to_string(),
        discover_models::CompetitivenessTier::Established => "Established".to_string(),
        discover_models::CompetitivenessTier::Dominant => "Dominant".to_string(),
    });

    out
}

/// Score a freshly-fetched profile against a genre/raw query pair (spec
/// §4.7 materialization path). Genre relevance takes the better of the
/// text-overlap scorer and the name-relevance variant, since either can
/// be the stronger signal depending on whether the query matches the
/// channel's stated genre or its literal name.
pub fn score_profile(profile: &CreatorProfile, base_genre: &str, raw_query: &str, now: DateTime<Utc>) -> discover_models::CreatorScore {
    let genre_from_text = genre_relevance(base_genre, &profile.display_name, profile.bio.as_deref());
    let name_match = name_relevance(raw_query, &profile.display_name);

    let channel_age_months = profile
        .created_at
        .map(|created| (now - created).num_days() as f64 / 30.0)
        .unwrap_or(1.0);

    discover_models::CreatorScore {
        genre_relevance: clamp01(genre_from_text.max(name_match)),
        audience_fit: audience_fit(profile.subscribers, None),
        engagement_quality: clamp01(engagement_quality(profile.subscribers, profile.views, &profile.recent_videos)),
        activity_consistency: clamp01(activity_consistency(profile.videos, channel_age_months)),
        freshness: clamp01(freshness(profile.last_video_date, now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_fit_matches_subscriber_tiers() {
        assert_eq!(audience_fit(20_000_000, None), 1.0);
        assert_eq!(audience_fit(2_000_000, None), 0.9);
        assert_eq!(audience_fit(500_000, None), 0.7);
        assert_eq!(audience_fit(50_000, None), 0.5);
        assert_eq!(audience_fit(5_000, None), 0.3);
        assert_eq!(audience_fit(500, None), 0.2);
    }

    #[test]
    fn engagement_defaults_to_point_five_ratio_when_zero_subs() {
        let q = engagement_quality(0, 0, &[]);
        let expected = 1.0 / (1.0 + (-0.05_f64 * (0.5 - 50.0)).exp());
        assert!((q - expected).abs() < 1e-9);
    }

    #[test]
    fn freshness_is_point_five_when_unknown() {
        assert_eq!(freshness(None, Utc::now()), 0.5);
    }

    #[test]
    fn freshness_is_full_within_a_week() {
        let now = Utc::now();
        assert_eq!(freshness(Some(now - chrono::Duration::days(3)), now), 1.0);
    }

    #[test]
    fn name_relevance_exact_match_is_one() {
        assert_eq!(name_relevance("mkbhd", "MKBHD"), 1.0);
    }
}
