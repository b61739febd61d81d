use chrono::{Datelike, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Tiered degradation outcomes for an LLM call (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDecision {
    Allow,
    EmbeddingsOnly,
    FallbackOnly,
    Downgrade,
    Reject,
}

/// Daily LLM-token budget gate with tiered degradation, generalized from
/// the teacher's `TokenBucket`/`RateLimitConfig` pair into a single
/// atomic-counter daily governor (no sub-window refill; the budget resets
/// once per calendar day).
pub struct TokenGovernor {
    daily_budget: u64,
    per_request_budget: u32,
    fallback_threshold: f64,
    tokens_used: AtomicU64,
    current_date_ordinal: AtomicI64,
}

impl TokenGovernor {
    pub fn new(daily_budget: u64, per_request_budget: u32, fallback_threshold: f64) -> Self {
        Self {
            daily_budget,
            per_request_budget,
            fallback_threshold,
            tokens_used: AtomicU64::new(0),
            current_date_ordinal: AtomicI64::new(Utc::now().date_naive().num_days_from_ce() as i64),
        }
    }

    fn maybe_reset(&self) {
        let today = Utc::now().date_naive().num_days_from_ce() as i64;
        let prev = self.current_date_ordinal.load(Ordering::Acquire);
        if today != prev
            && self
                .current_date_ordinal
                .compare_exchange(prev, today, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            self.tokens_used.store(0, Ordering::Release);
        }
    }

    pub fn check_budget(&self, estimated: u32) -> TokenDecision {
        self.maybe_reset();

        if estimated > self.per_request_budget {
            return TokenDecision::Downgrade;
        }

        let used = self.tokens_used.load(Ordering::Acquire);
        if used + estimated as u64 > self.daily_budget {
            return TokenDecision::Reject;
        }

        let ratio = used as f64 / self.daily_budget as f64;
        if ratio >= self.fallback_threshold {
            TokenDecision::FallbackOnly
        } else if ratio >= 0.5 {
            TokenDecision::EmbeddingsOnly
        } else {
            TokenDecision::Allow
        }
    }

    pub fn record_usage(&self, tokens: u32) {
        self.tokens_used.fetch_add(tokens as u64, Ordering::AcqRel);
    }

    pub fn tokens_used(&self) -> u64 {
        self.tokens_used.load(Ordering::Acquire)
    }

    pub fn daily_budget(&self) -> u64 {
        self.daily_budget
    }

    pub fn usage_ratio(&self) -> f64 {
        self.tokens_used.load(Ordering::Acquire) as f64 / self.daily_budget as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_request_downgrades() {
        let gov = TokenGovernor::new(1_000_000, 2_000, 0.9);
        assert_eq!(gov.check_budget(2_001), TokenDecision::Downgrade);
    }

    #[test]
    fn exact_budget_boundary_rejects() {
        let gov = TokenGovernor::new(1_000, 2_000, 0.9);
        gov.record_usage(1_000);
        assert_eq!(gov.check_budget(1), TokenDecision::Reject);
    }

    #[test]
    fn fallback_threshold_triggers_above_ratio() {
        let gov = TokenGovernor::new(1_000, 2_000, 0.9);
        gov.record_usage(950);
        assert_eq!(gov.check_budget(10), TokenDecision::FallbackOnly);
    }

    #[test]
    fn mid_usage_triggers_embeddings_only() {
        let gov = TokenGovernor::new(1_000, 2_000, 0.9);
        gov.record_usage(600);
        assert_eq!(gov.check_budget(10), TokenDecision::EmbeddingsOnly);
    }

    #[test]
    fn low_usage_allows() {
        let gov = TokenGovernor::new(1_000, 2_000, 0.9);
        assert_eq!(gov.check_budget(10), TokenDecision::Allow);
    }
}
