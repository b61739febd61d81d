use chrono::{Datelike, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

const SEARCH_LIST_COST: u64 = 100;
const CHANNELS_LIST_BATCH: u64 = 50;

/// Tiered degradation outcomes for a platform-search call (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allow,
    ReduceQueries,
    ReduceResults,
    Reject,
}

/// Caps a `QuotaDecision` applies to an outbound search (spec §4.3).
#[derive(Debug, Clone, Copy)]
pub struct QuotaCaps {
    pub max_queries: usize,
    pub max_results_per_query: usize,
}

impl QuotaDecision {
    pub fn caps(self) -> QuotaCaps {
        match self {
            QuotaDecision::Allow => QuotaCaps { max_queries: 5, max_results_per_query: 50 },
            QuotaDecision::ReduceQueries => QuotaCaps { max_queries: 3, max_results_per_query: 50 },
            QuotaDecision::ReduceResults => QuotaCaps { max_queries: 2, max_results_per_query: 20 },
            QuotaDecision::Reject => QuotaCaps { max_queries: 0, max_results_per_query: 0 },
        }
    }
}

/// Daily video-platform unit budget with degradation and credential
/// rotation, generalized from the teacher's per-source `RateLimitConfig`
/// registry (`rate_limiter.rs`) into a single atomic daily governor plus a
/// round-robin credential index.
pub struct QuotaGovernor {
    daily_quota: u64,
    downgrade_threshold: f64,
    units_used: AtomicU64,
    current_date_ordinal: AtomicI64,
    credential_index: AtomicUsize,
    credential_count: usize,
}

impl QuotaGovernor {
    pub fn new(daily_quota: u64, downgrade_threshold: f64, credential_count: usize) -> Self {
        Self {
            daily_quota,
            downgrade_threshold,
            units_used: AtomicU64::new(0),
            current_date_ordinal: AtomicI64::new(Utc::now().date_naive().num_days_from_ce() as i64),
            credential_index: AtomicUsize::new(0),
            credential_count: credential_count.max(1),
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
            self.units_used.store(0, Ordering::Release);
        }
    }

    /// `100·queryCount + ceil((queryCount·maxResultsPerQuery)/50)` (spec §4.3).
    pub fn estimate_cost(query_count: usize, max_results_per_query: usize) -> u64 {
        let search_cost = SEARCH_LIST_COST * query_count as u64;
        let channel_batches =
            ((query_count * max_results_per_query) as u64 + CHANNELS_LIST_BATCH - 1) / CHANNELS_LIST_BATCH;
        search_cost + channel_batches
    }

    pub fn check_quota(&self, estimated: u64) -> QuotaDecision {
        self.maybe_reset();

        let used = self.units_used.load(Ordering::Acquire);
        if used + estimated > self.daily_quota {
            return QuotaDecision::Reject;
        }

        let ratio = used as f64 / self.daily_quota as f64;
        if ratio >= 0.9 {
            QuotaDecision::ReduceResults
        } else if ratio >= self.downgrade_threshold {
            QuotaDecision::ReduceQueries
        } else {
            QuotaDecision::Allow
        }
    }

    pub fn record_usage(&self, units: u64) {
        self.units_used.fetch_add(units, Ordering::AcqRel);
    }

    pub fn units_used(&self) -> u64 {
        self.units_used.load(Ordering::Acquire)
    }

    pub fn daily_quota(&self) -> u64 {
        self.daily_quota
    }

    pub fn usage_ratio(&self) -> f64 {
        self.units_used.load(Ordering::Acquire) as f64 / self.daily_quota as f64
    }

    /// Current credential index in the round-robin cycle.
    pub fn current_credential_index(&self) -> usize {
        self.credential_index.load(Ordering::Acquire) % self.credential_count
    }

    /// Advance to the next credential on a quota-shaped failure (spec
    /// §4.3). Returns `true` if the rotation completed a full cycle back
    /// to index 0 (caller should give up after this many rotations equal
    /// the credential count).
    pub fn rotate_credential(&self) -> usize {
        let next = self.credential_index.fetch_add(1, Ordering::AcqRel) + 1;
        next % self.credential_count
    }
}

/// Is this a quota-shaped provider failure (spec §4.3)?
pub fn is_quota_shaped_failure(status: u16, body: &str) -> bool {
    status == 403
        && (body.contains("quotaExceeded")
            || body.contains("dailyLimitExceeded")
            || body.contains("rateLimitExceeded"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_cost_matches_formula() {
        assert_eq!(QuotaGovernor::estimate_cost(5, 50), 100 * 5 + 5);
        assert_eq!(QuotaGovernor::estimate_cost(1, 10), 100 + 1);
    }

    #[test]
    fn reject_at_exact_boundary() {
        let gov = QuotaGovernor::new(1_000, 0.8, 1);
        gov.record_usage(1_000);
        assert_eq!(gov.check_quota(1), QuotaDecision::Reject);
    }

    #[test]
    fn reduce_results_above_ninety_percent() {
        let gov = QuotaGovernor::new(1_000, 0.8, 1);
        gov.record_usage(950);
        assert_eq!(gov.check_quota(10), QuotaDecision::ReduceResults);
    }

    #[test]
    fn reduce_queries_above_downgrade_threshold() {
        let gov = QuotaGovernor::new(1_000, 0.8, 1);
        gov.record_usage(850);
        assert_eq!(gov.check_quota(10), QuotaDecision::ReduceQueries);
    }

    #[test]
    fn credential_rotation_wraps_round_robin() {
        let gov = QuotaGovernor::new(10_000, 0.8, 3);
        assert_eq!(gov.current_credential_index(), 0);
        assert_eq!(gov.rotate_credential(), 1);
        assert_eq!(gov.rotate_credential(), 2);
        assert_eq!(gov.rotate_credential(), 0);
    }

    #[test]
    fn quota_shaped_failure_detection() {
        assert!(is_quota_shaped_failure(403, r#"{"error":"quotaExceeded"}"#));
        assert!(!is_quota_shaped_failure(403, r#"{"error":"forbidden"}"#));
        assert!(!is_quota_shaped_failure(500, "quotaExceeded"));
    }
}
