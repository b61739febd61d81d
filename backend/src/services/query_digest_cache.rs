use chrono::{Duration as ChronoDuration, Utc};
use discover_models::CachedQueryExpansion;
use discover_utils::cache_manager::{get_query_digest_l1_cache, CacheManager};
use redis::AsyncCommands;

use crate::services::query_digest::cache_key;

/// Two-level cache of generated query expansions, addressed by digest key
/// (spec §4.4). L1 is the bounded in-memory `CacheManager`
/// (`discover_utils`); L2 is a durable redis store with a longer TTL,
/// mirroring the teacher's `AdvancedCacheService` write-through tiering.
pub struct QueryDigestCache {
    l1: CacheManager,
    redis: Option<redis::Client>,
    l2_ttl: ChronoDuration,
}

impl QueryDigestCache {
    pub fn new(redis_url: Option<&str>, l2_ttl_hours: i64) -> Self {
        Self {
            l1: get_query_digest_l1_cache(),
            redis: redis_url.and_then(|url| redis::Client::open(url).ok()),
            l2_ttl: ChronoDuration::hours(l2_ttl_hours),
        }
    }

    pub async fn get(&self, raw: &str) -> Option<CachedQueryExpansion> {
        let key = cache_key(raw);
        let now = Utc::now();

        if let Some(entry) = self.l1.get::<CachedQueryExpansion>(&key) {
            if entry.is_valid(now) {
                return Some(entry);
            }
        }

        let entry = self.get_from_l2(&key).await?;
        if !entry.is_valid(now) {
            return None;
        }

        let mut bumped = entry.clone();
        bumped.hit_count += 1;
        self.put_l2(&key, &bumped).await;
        let _ = self.l1.set(&key, &bumped, Some(std::time::Duration::from_secs(300)));
        Some(bumped)
    }

    pub async fn put(&self, raw: &str, queries: Vec<String>, token_cost: u32) -> CachedQueryExpansion {
        let key = cache_key(raw);
        let normalized = crate::services::query_digest::normalize(raw);
        let now = Utc::now();

        let entry = CachedQueryExpansion {
            digest_key: key.clone(),
            normalized,
            queries,
            token_cost,
            created_at: now,
            expires_at: now + self.l2_ttl,
            hit_count: 0,
        };

        let _ = self.l1.set(&key, &entry, Some(std::time::Duration::from_secs(300)));
        self.put_l2(&key, &entry).await;
        entry
    }

    pub fn l1_stats(&self) -> discover_utils::cache_manager::CacheStats {
        self.l1.get_stats()
    }

    async fn get_from_l2(&self, key: &str) -> Option<CachedQueryExpansion> {
        let client = self.redis.as_ref()?;
        let mut conn = client.get_multiplexed_async_connection().await.ok()?;
        let data: Vec<u8> = conn.get(key).await.ok()?;
        if data.is_empty() {
            return None;
        }
        bincode::deserialize(&data).ok()
    }

    async fn put_l2(&self, key: &str, entry: &CachedQueryExpansion) {
        let Some(client) = &self.redis else { return };
        let Ok(mut conn) = client.get_multiplexed_async_connection().await else { return };
        if let Ok(data) = bincode::serialize(entry) {
            let ttl_secs = self.l2_ttl.num_seconds().max(1) as u64;
            let _: Result<(), _> = conn.set_ex(key, data, ttl_secs).await;
        }
    }
}
