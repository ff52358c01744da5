//! Per-request refollow orchestration
//!
//! Owns the cache and the resolved creator requirement, and runs one request
//! through gate → freshness decision → fetch → aggregate → hydrate → store.

use crate::aggregator::{aggregate, AggregatedResult};
use crate::cache::{CacheConfig, FreshnessRequest, ResultCache};
use crate::gate::CreatorRequirement;
use crate::graph::{fetch_identifiers, hydrate, Direction, Fid, IdentifierSet};
use crate::upstream::GraphProvider;
use crate::{metrics, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Answer to one refollow request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefollowOutcome {
    pub result: AggregatedResult,
    /// True when served from the cache without recomputing
    pub from_cache: bool,
}

/// Runs refollow requests against a provider
pub struct RefollowService {
    provider: Arc<dyn GraphProvider>,
    cache: ResultCache,
    requirement: CreatorRequirement,
}

impl RefollowService {
    pub fn new(
        provider: Arc<dyn GraphProvider>,
        cache_config: CacheConfig,
        requirement: CreatorRequirement,
    ) -> Self {
        Self {
            provider,
            cache: ResultCache::new(cache_config),
            requirement,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub fn requirement(&self) -> &CreatorRequirement {
        &self.requirement
    }

    /// Serve a refollow request for `subject`
    ///
    /// With a non-empty creator requirement, the subject's following set is
    /// fetched first to check the gate; that set is reused if the request
    /// then misses the cache.
    pub async fn refollow(
        &self,
        subject: Fid,
        freshness: FreshnessRequest,
    ) -> Result<RefollowOutcome> {
        let gate_following = if self.requirement.is_empty() {
            None
        } else {
            let following =
                fetch_identifiers(self.provider.as_ref(), Direction::Following, subject).await?;
            self.requirement.check(&following)?;
            Some(following)
        };

        if let Some(result) = self.cache.lookup(subject, freshness).await {
            metrics::record_cache_hit();
            debug!(subject = %subject, "Serving refollow result from cache");
            return Ok(RefollowOutcome {
                result,
                from_cache: true,
            });
        }

        metrics::record_cache_miss();
        let result = self.compute_with(subject, gate_following).await?;
        self.cache.store(subject, result.clone()).await;

        Ok(RefollowOutcome {
            result,
            from_cache: false,
        })
    }

    /// Compute a fresh result, bypassing gate and cache
    pub async fn compute(&self, subject: Fid) -> Result<AggregatedResult> {
        self.compute_with(subject, None).await
    }

    async fn compute_with(
        &self,
        subject: Fid,
        known_following: Option<IdentifierSet>,
    ) -> Result<AggregatedResult> {
        let provider = self.provider.as_ref();

        let (following, followers) = match known_following {
            Some(following) => {
                let followers = fetch_identifiers(provider, Direction::Followers, subject).await?;
                (following, followers)
            }
            None => {
                futures::try_join!(
                    fetch_identifiers(provider, Direction::Following, subject),
                    fetch_identifiers(provider, Direction::Followers, subject),
                )?
            }
        };

        let aggregation = aggregate(following, followers);
        let profiles = hydrate(provider, &aggregation.union()).await?;

        info!(
            subject = %subject,
            following = aggregation.following.len(),
            followers = aggregation.followers.len(),
            not_following_back = aggregation.not_following_back.len(),
            hydrated = profiles.len(),
            "Computed refollow result"
        );

        Ok(aggregation.into_result(&profiles))
    }
}
