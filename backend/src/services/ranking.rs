use std::collections::HashMap;

use discover_models::{CompetitivenessTier, CreatorProfile, CreatorScore};

/// A scored creator prior to ranking: the raw profile, its sub-scores, and
/// the labels produced at scoring time.
#[derive(Debug, Clone)]
pub struct ScoredCreator {
    pub profile: CreatorProfile,
    pub score: CreatorScore,
    pub labels: Vec<String>,
}

/// Merge per-query results, dedupe by channel, rank (spec §4.8). Pure,
/// deterministic, no I/O — generalized from the merge/dedupe idiom in
/// `universal_search`.
pub fn merge_dedupe_rank(
    per_query: &[(String, Vec<ScoredCreator>)],
) -> Vec<ScoredCreator> {
    let merged = merge(per_query);
    let deduped = dedupe_by_channel(merged);
    rank(deduped)
}

fn merge(per_query: &[(String, Vec<ScoredCreator>)]) -> Vec<ScoredCreator> {
    per_query.iter().flat_map(|(_, creators)| creators.iter().cloned()).collect()
}

fn dedupe_by_channel(creators: Vec<ScoredCreator>) -> Vec<ScoredCreator> {
    let mut best: HashMap<String, ScoredCreator> = HashMap::new();
    let mut label_union: HashMap<String, Vec<String>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for creator in creators {
        let id = creator.profile.channel_id.clone();
        if !order.contains(&id) {
            order.push(id.clone());
        }

        let labels = label_union.entry(id.clone()).or_default();
        for l in &creator.labels {
            if !labels.contains(l) {
                labels.push(l.clone());
            }
        }

        match best.get(&id) {
            Some(existing) if existing.score.final_score() >= creator.score.final_score() => {}
            _ => {
                best.insert(id, creator);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| {
            let mut creator = best.remove(&id)?;
            creator.labels = label_union.remove(&id).unwrap_or_default();
            Some(creator)
        })
        .collect()
}

fn rank(mut creators: Vec<ScoredCreator>) -> Vec<ScoredCreator> {
    creators.sort_by(|a, b| {
        b.score
            .final_score()
            .partial_cmp(&a.score.final_score())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.profile
                    .display_name
                    .to_lowercase()
                    .cmp(&b.profile.display_name.to_lowercase())
            })
    });
    creators
}

pub fn competitiveness_tier_for(score: &CreatorScore) -> CompetitivenessTier {
    CompetitivenessTier::from_score(score.competitiveness_score())
}

#[cfg(test)]
mod tests {
    use super::*;
    use discover_models::CreatorScore;

    fn profile(id: &str, name: &str) -> CreatorProfile {
        CreatorProfile {
            channel_id: id.to_string(),
            handle: None,
            display_name: name.to_string(),
            bio: None,
            image_url: None,
            subscribers: 0,
            videos: 0,
            views: 0,
            country: None,
            last_video_date: None,
            created_at: None,
            recent_videos: Vec::new(),
        }
    }

    fn score(v: f64) -> CreatorScore {
        CreatorScore {
            genre_relevance: v,
            audience_fit: v,
            engagement_quality: v,
            activity_consistency: v,
            freshness: v,
        }
    }

    #[test]
    fn dedupe_keeps_the_higher_scoring_instance_and_unions_labels() {
        let per_query = vec![
            (
                "q1".to_string(),
                vec![ScoredCreator { profile: profile("a", "Alpha"), score: score(0.5), labels: vec!["x".into()] }],
            ),
            (
                "q2".to_string(),
                vec![ScoredCreator { profile: profile("a", "Alpha"), score: score(0.9), labels: vec!["y".into()] }],
            ),
        ];

        let ranked = merge_dedupe_rank(&per_query);
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].score.final_score() - score(0.9).final_score()).abs() < 1e-9);
        assert_eq!(ranked[0].labels, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn rank_breaks_ties_by_name_ascending_case_insensitive() {
        let per_query = vec![(
            "q".to_string(),
            vec![
                ScoredCreator { profile: profile("b", "beta"), score: score(0.5), labels: vec![] },
                ScoredCreator { profile: profile("a", "Alpha"), score: score(0.5), labels: vec![] },
            ],
        )];

        let ranked = merge_dedupe_rank(&per_query);
        assert_eq!(ranked[0].profile.channel_id, "a");
        assert_eq!(ranked[1].profile.channel_id, "b");
    }
}
