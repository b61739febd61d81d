use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of C1 normalization: `(original, normalized, digestKey)`.
///
/// Invariant: two inputs with identical `normalized` form MUST produce
/// identical `digest_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedQuery {
    pub original: String,
    pub normalized: String,
    pub digest_key: String,
}

/// A cached LLM query expansion (C4/C5), keyed by `digest_key`.
///
/// Invariants: `queries` is non-empty and, when produced by the LLM path,
/// contains the three priority variants at positions 0..2; `expires_at >
/// created_at`; `hit_count` is monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedQueryExpansion {
    pub digest_key: String,
    pub normalized: String,
    pub queries: Vec<String>,
    pub token_cost: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u64,
}

impl CachedQueryExpansion {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
