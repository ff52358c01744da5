//! In-memory TTL cache and freshness policy

use crate::aggregator::AggregatedResult;
use crate::graph::Fid;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age at which an entry stops being served
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// A cached result for one subject
///
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub subject: Fid,
    pub result: AggregatedResult,
    pub computed_at: Instant,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.computed_at.elapsed()
    }
}

/// What the caller presented that bears on freshness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreshnessRequest {
    /// Caller passed `refresh=true`
    pub force_refresh: bool,
    /// Caller holds a freshness cookie with a non-zero timestamp
    pub has_prior_fetch: bool,
}

/// True when a raw freshness-cookie value is a non-zero integer
///
/// The timestamp is only checked for presence. It is never compared with
/// the entry's age or the current time.
pub fn cookie_marks_prior_fetch(raw: Option<&str>) -> bool {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .is_some_and(|ts| ts != 0)
}

/// Per-subject TTL cache
///
/// Entries are only checked for expiry when read; nothing is purged.
/// Concurrent writers for the same subject race and the last write wins.
#[derive(Debug)]
pub struct ResultCache {
    config: CacheConfig,
    entries: RwLock<HashMap<Fid, CacheEntry>>,
}

impl ResultCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Entry for `subject` if one exists and is younger than the TTL
    pub async fn get_fresh(&self, subject: Fid) -> Option<AggregatedResult> {
        let entries = self.entries.read().await;
        entries
            .get(&subject)
            .filter(|entry| entry.age() < self.config.ttl)
            .map(|entry| entry.result.clone())
    }

    /// Apply the freshness policy
    ///
    /// Serves from cache only when the caller did not force a refresh, holds
    /// a prior-fetch cookie, and a fresh entry exists.
    pub async fn lookup(
        &self,
        subject: Fid,
        request: FreshnessRequest,
    ) -> Option<AggregatedResult> {
        if request.force_refresh || !request.has_prior_fetch {
            return None;
        }
        self.get_fresh(subject).await
    }

    /// Unconditionally replace the entry for `subject`
    pub async fn store(&self, subject: Fid, result: AggregatedResult) {
        let entry = CacheEntry {
            subject,
            result,
            computed_at: Instant::now(),
        };
        self.entries.write().await.insert(subject, entry);
    }

    /// Number of entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Profile;

    fn result(fid: u64) -> AggregatedResult {
        AggregatedResult {
            following: vec![Profile::bare(Fid::new(fid))],
            followers: vec![],
            not_following_back: vec![Profile::bare(Fid::new(fid))],
        }
    }

    const WITH_COOKIE: FreshnessRequest = FreshnessRequest {
        force_refresh: false,
        has_prior_fetch: true,
    };

    #[test]
    fn test_cookie_presence_check() {
        assert!(cookie_marks_prior_fetch(Some("1700000000000")));
        assert!(cookie_marks_prior_fetch(Some("1")));
        assert!(!cookie_marks_prior_fetch(Some("0")));
        assert!(!cookie_marks_prior_fetch(Some("")));
        assert!(!cookie_marks_prior_fetch(Some("yesterday")));
        assert!(!cookie_marks_prior_fetch(None));
    }

    #[test]
    fn test_default_ttl_is_five_minutes() {
        assert_eq!(ResultCache::default().ttl(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_hit_requires_cookie() {
        let cache = ResultCache::default();
        cache.store(Fid::new(100), result(1)).await;

        assert!(cache
            .lookup(Fid::new(100), FreshnessRequest::default())
            .await
            .is_none());
        assert_eq!(
            cache.lookup(Fid::new(100), WITH_COOKIE).await,
            Some(result(1))
        );
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let cache = ResultCache::default();
        cache.store(Fid::new(100), result(1)).await;

        let request = FreshnessRequest {
            force_refresh: true,
            has_prior_fetch: true,
        };
        assert!(cache.lookup(Fid::new(100), request).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_entry_is_miss() {
        let cache = ResultCache::default();
        assert!(cache.lookup(Fid::new(5), WITH_COOKIE).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_but_kept() {
        let cache = ResultCache::new(CacheConfig {
            ttl: Duration::ZERO,
        });
        cache.store(Fid::new(100), result(1)).await;

        assert!(cache.lookup(Fid::new(100), WITH_COOKIE).await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let cache = ResultCache::default();
        cache.store(Fid::new(100), result(1)).await;
        cache.store(Fid::new(100), result(2)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(
            cache.get_fresh(Fid::new(100)).await,
            Some(result(2))
        );
    }
}
