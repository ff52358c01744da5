//! Cache layer for aggregated refollow results
//!
//! Provides an in-memory, per-subject TTL cache plus the freshness policy
//! that decides when a request may be answered from it.

mod memory;

pub use memory::{
    cookie_marks_prior_fetch, CacheConfig, CacheEntry, FreshnessRequest, ResultCache,
};
