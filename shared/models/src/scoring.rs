use serde::{Deserialize, Serialize};

/// Fixed weights for `CreatorScore::final_score` (spec §3).
pub const FINAL_SCORE_WEIGHTS: (f64, f64, f64, f64, f64) = (0.35, 0.20, 0.20, 0.15, 0.10);

/// Fixed weights for `SearchSessionResult::competitiveness_score` (spec §4.9).
pub const COMPETITIVENESS_WEIGHTS: (f64, f64, f64) = (0.40, 0.35, 0.25);

pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Five sub-scores produced by the C7 scorer set, each in `[0, 1]`.
///
/// Invariant: `final_score` is a pure function of the five sub-scores;
/// changing a sub-score MUST change `final_score` iff its weight is nonzero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CreatorScore {
    pub genre_relevance: f64,
    pub audience_fit: f64,
    pub engagement_quality: f64,
    pub activity_consistency: f64,
    pub freshness: f64,
}

impl CreatorScore {
    pub fn final_score(&self) -> f64 {
        let (wg, wa, we, wc, wf) = FINAL_SCORE_WEIGHTS;
        clamp01(
            wg * self.genre_relevance
                + wa * self.audience_fit
                + we * self.engagement_quality
                + wc * self.activity_consistency
                + wf * self.freshness,
        )
    }

    /// `0.40·audienceFit + 0.35·engagementQuality + 0.25·activityConsistency`,
    /// computed once at materialization and frozen for the session's
    /// lifetime (spec §3, §4.9, §9).
    pub fn competitiveness_score(&self) -> f64 {
        let (wa, we, wc) = COMPETITIVENESS_WEIGHTS;
        clamp01(wa * self.audience_fit + we * self.engagement_quality + wc * self.activity_consistency)
    }
}

/// Competitiveness tier derived from a stored `competitiveness_score` at
/// read/label-generation time; never recomputed from sub-scores (spec §4.7).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompetitivenessTier {
    Nascent,
    Emerging,
    Growing,
    Established,
    Dominant,
}

impl CompetitivenessTier {
    pub fn from_score(score: f64) -> Self {
        if score < 0.20 {
            Self::Nascent
        } else if score < 0.40 {
            Self::Emerging
        } else if score < 0.60 {
            Self::Growing
        } else if score < 0.80 {
            Self::Established
        } else {
            Self::Dominant
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_score_matches_weighted_sum() {
        let s = CreatorScore {
            genre_relevance: 0.8,
            audience_fit: 0.6,
            engagement_quality: 0.5,
            activity_consistency: 0.4,
            freshness: 1.0,
        };
        let expected = 0.35 * 0.8 + 0.20 * 0.6 + 0.20 * 0.5 + 0.15 * 0.4 + 0.10 * 1.0;
        assert!((s.final_score() - expected).abs() <= 1e-9);
    }

    #[test]
    fn competitiveness_tiers_follow_thresholds() {
        assert_eq!(CompetitivenessTier::from_score(0.0), CompetitivenessTier::Nascent);
        assert_eq!(CompetitivenessTier::from_score(0.19), CompetitivenessTier::Nascent);
        assert_eq!(CompetitivenessTier::from_score(0.20), CompetitivenessTier::Emerging);
        assert_eq!(CompetitivenessTier::from_score(0.79), CompetitivenessTier::Established);
        assert_eq!(CompetitivenessTier::from_score(0.80), CompetitivenessTier::Dominant);
    }
}
