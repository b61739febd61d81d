pub mod creator;
pub mod query;
pub mod scoring;
pub mod session;

pub use creator::{Creator, CreatorProfile, CreatorSource, CreatorStatus, IngestionStatus, VideoStatistics};
pub use query::{CachedQueryExpansion, NormalizedQuery};
pub use scoring::{CompetitivenessTier, CreatorScore, COMPETITIVENESS_WEIGHTS, FINAL_SCORE_WEIGHTS};
pub use session::{
    ActivityBucket, AudienceBucket, CompetitivenessBucket, EngagementBucket, ResultFilters,
    SearchSession, SearchSessionResult, SortKey,
};
