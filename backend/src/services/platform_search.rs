use std::collections::HashMap;
use std::sync::Arc;

use discover_models::CreatorProfile;
use discover_utils::cache_manager::{get_channel_metadata_cache, CacheManager};

use crate::services::platform_client::{PlatformClient, PlatformClientError};
use crate::services::quota_governor::{QuotaDecision, QuotaGovernor};
use discover_config::FeatureState;

/// Fans queries out against the video platform, dedupes channel ids, and
/// caches channel metadata, preserving per-query quota accounting (spec
/// §4.6). Generalized from the teacher's `universal_search` multi-provider
/// fan-out (`services/search.rs`), with credential rotation on quota-shaped
/// failures folded in via `QuotaGovernor`.
pub struct PlatformSearchAdapter {
    client: Arc<dyn PlatformClient>,
    governor: Arc<QuotaGovernor>,
    channel_cache: CacheManager,
    credentials: Vec<String>,
    toggles: Arc<parking_lot::RwLock<discover_config::FeatureToggles>>,
}

impl PlatformSearchAdapter {
    pub fn new(
        client: Arc<dyn PlatformClient>,
        governor: Arc<QuotaGovernor>,
        credentials: Vec<String>,
        toggles: Arc<parking_lot::RwLock<discover_config::FeatureToggles>>,
    ) -> Self {
        Self {
            client,
            governor,
            channel_cache: get_channel_metadata_cache(),
            credentials,
            toggles,
        }
    }

    /// `searchChannels(queries, maxResultsPerQuery) -> (map{query -> ordered CreatorProfile list}, quotaUsed)`
    /// (spec §4.6, §4.9 step 2). `quotaUsed` is this call's own spend, not
    /// the governor's cumulative daily total.
    pub async fn search_channels(
        &self,
        queries: &[String],
        max_results_per_query: usize,
    ) -> (HashMap<String, Vec<CreatorProfile>>, u64) {
        if queries.is_empty() {
            return (HashMap::new(), 0);
        }

        let feature_state = self.toggles.read().resolve("platform_search", !self.credentials.is_empty());
        if feature_state != FeatureState::Enabled {
            return (HashMap::new(), 0);
        }

        let estimated = QuotaGovernor::estimate_cost(queries.len(), max_results_per_query);
        let decision = self.governor.check_quota(estimated);
        if decision == QuotaDecision::Reject {
            return (HashMap::new(), 0);
        }

        let caps = decision.caps();
        let deduped = dedupe_preserving_order(queries);
        let capped_queries: Vec<String> = deduped.into_iter().take(caps.max_queries).collect();
        let capped_results = max_results_per_query.min(caps.max_results_per_query).min(50);

        let mut results = HashMap::new();
        let mut total_quota_spent: u64 = 0;

        for query in &capped_queries {
            let (profiles, quota_spent) = self.search_one_query(query, capped_results).await;
            total_quota_spent += quota_spent;
            results.insert(query.clone(), profiles);
        }

        self.governor.record_usage(total_quota_spent);
        (results, total_quota_spent)
    }

    async fn search_one_query(&self, query: &str, max_results: usize) -> (Vec<CreatorProfile>, u64) {
        let mut quota_spent: u64 = 100;
        let cycle_limit = self.credentials.len().max(1);
        let mut credential_index = self.governor.current_credential_index() % cycle_limit;
        let mut attempts = 0;

        let channel_refs = 'search: loop {
            let Some(credential) = self.credentials.get(credential_index) else {
                return (Vec::new(), quota_spent);
            };

            match self.client.search_list(query, max_results, credential).await {
                Ok(refs) => break 'search refs,
                Err(PlatformClientError::QuotaExceeded { .. }) => {
                    attempts += 1;
                    if attempts >= cycle_limit {
                        return (Vec::new(), quota_spent);
                    }
                    credential_index = self.governor.rotate_credential() % cycle_limit;
                    continue;
                }
                Err(_) => return (Vec::new(), quota_spent),
            }
        };

        let mut ids_in_order = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for ch in channel_refs {
            if seen.insert(ch.channel_id.clone()) {
                ids_in_order.push(ch.channel_id);
            }
        }

        let mut hits = Vec::new();
        let mut misses = Vec::new();
        for id in &ids_in_order {
            match self.channel_cache.get::<CreatorProfile>(id) {
                Some(profile) => hits.push(profile),
                None => misses.push(id.clone()),
            }
        }

        if !misses.is_empty() {
            let credential = self.credentials.get(credential_index % cycle_limit).cloned().unwrap_or_default();
            if let Ok(fetched) = self.client.channels_list(&misses, &credential).await {
                for profile in &fetched {
                    let _ = self.channel_cache.set(&profile.channel_id, profile, None);
                }
                hits.extend(fetched);
                quota_spent += 1;
            }
        }

        let by_id: HashMap<String, CreatorProfile> =
            hits.into_iter().map(|p| (p.channel_id.clone(), p)).collect();
        let ordered = ids_in_order.into_iter().filter_map(|id| by_id.get(&id).cloned()).collect();

        (ordered, quota_spent)
    }
}

fn dedupe_preserving_order(queries: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for q in queries {
        if !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(q)) {
            seen.push(q.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex;

    use crate::services::platform_client::ChannelRef;

    #[test]
    fn dedupe_is_case_insensitive_and_preserves_order() {
        let queries = vec!["Gaming".to_string(), "gaming".to_string(), "Music".to_string()];
        assert_eq!(dedupe_preserving_order(&queries), vec!["Gaming".to_string(), "Music".to_string()]);
    }

    struct AlwaysQuotaExceededClient {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl PlatformClient for AlwaysQuotaExceededClient {
        async fn search_list(
            &self,
            _query: &str,
            _max_results: usize,
            credential: &str,
        ) -> Result<Vec<ChannelRef>, PlatformClientError> {
            self.calls.lock().unwrap().push(credential.to_string());
            Err(PlatformClientError::QuotaExceeded { status: 403, body: "quotaExceeded".to_string() })
        }

        async fn channels_list(
            &self,
            _channel_ids: &[String],
            _credential: &str,
        ) -> Result<Vec<CreatorProfile>, PlatformClientError> {
            Ok(Vec::new())
        }
    }

    struct SucceedingClient {
        channel_refs: Vec<ChannelRef>,
        profiles: Vec<CreatorProfile>,
    }

    #[async_trait::async_trait]
    impl PlatformClient for SucceedingClient {
        async fn search_list(
            &self,
            _query: &str,
            _max_results: usize,
            _credential: &str,
        ) -> Result<Vec<ChannelRef>, PlatformClientError> {
            Ok(self.channel_refs.clone())
        }

        async fn channels_list(
            &self,
            _channel_ids: &[String],
            _credential: &str,
        ) -> Result<Vec<CreatorProfile>, PlatformClientError> {
            Ok(self.profiles.clone())
        }
    }

    fn toggles(enabled: bool, name: &str) -> Arc<parking_lot::RwLock<discover_config::FeatureToggles>> {
        let mut flags = StdHashMap::new();
        flags.insert(name.to_string(), enabled);
        Arc::new(parking_lot::RwLock::new(discover_config::FeatureToggles { flags }))
    }

    fn profile(channel_id: &str) -> CreatorProfile {
        CreatorProfile {
            channel_id: channel_id.to_string(),
            handle: None,
            display_name: format!("Channel {}", channel_id),
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

    #[tokio::test]
    async fn search_channels_short_circuits_when_feature_disabled() {
        let client = Arc::new(AlwaysQuotaExceededClient { calls: Mutex::new(Vec::new()) });
        let governor = Arc::new(QuotaGovernor::new(1_000_000, 0.8, 3));
        let adapter = PlatformSearchAdapter::new(
            client.clone(),
            governor,
            vec!["key-a".into(), "key-b".into(), "key-c".into()],
            toggles(false, "platform_search"),
        );

        let (results, quota_used) = adapter.search_channels(&["anything".to_string()], 10).await;

        assert!(results.is_empty());
        assert_eq!(quota_used, 0);
        assert!(client.calls.lock().unwrap().is_empty(), "no platform call should happen while the feature is disabled");
    }

    #[tokio::test]
    async fn search_one_query_exhausts_exactly_one_cycle_regardless_of_governor_start_offset() {
        let client = Arc::new(AlwaysQuotaExceededClient { calls: Mutex::new(Vec::new()) });
        let credentials = vec!["key-a".to_string(), "key-b".to_string(), "key-c".to_string()];
        let governor = Arc::new(QuotaGovernor::new(1_000_000, 0.8, credentials.len()));
        // Advance the governor's global rotation away from index 0 before this
        // query ever runs, as a concurrent query sharing the governor would.
        governor.rotate_credential();
        governor.rotate_credential();

        let adapter = PlatformSearchAdapter::new(
            client.clone(),
            governor,
            credentials.clone(),
            toggles(true, "platform_search"),
        );

        let (results, _) = adapter.search_channels(&["query-one".to_string()], 10).await;

        assert!(results.get("query-one").unwrap().is_empty());
        assert_eq!(
            client.calls.lock().unwrap().len(),
            credentials.len(),
            "must try exactly one full cycle of distinct credentials, not fewer or more"
        );
    }

    #[tokio::test]
    async fn search_channels_surfaces_this_calls_own_quota_spend() {
        let channel_refs = vec![ChannelRef { channel_id: "chan_unique_quota_1".to_string() }];
        let profiles = vec![profile("chan_unique_quota_1")];
        let client = Arc::new(SucceedingClient { channel_refs, profiles });
        let governor = Arc::new(QuotaGovernor::new(1_000_000, 0.8, 1));
        governor.record_usage(5_000); // cumulative usage unrelated to this call's own spend

        let adapter = PlatformSearchAdapter::new(
            client,
            governor.clone(),
            vec!["key-a".to_string()],
            toggles(true, "platform_search"),
        );

        let (results, quota_used) = adapter.search_channels(&["query-two".to_string()], 10).await;

        assert_eq!(quota_used, 101, "100 for search.list plus 1 for the channels.list batch");
        assert_eq!(governor.units_used(), 5_000 + 101);
        assert_eq!(results.get("query-two").unwrap().len(), 1);
    }
}
