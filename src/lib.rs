//! Refollow - who you follow, who follows you, and who doesn't follow back
//!
//! Refollow is a small backend relay over a social-graph API. Given an
//! account identifier (FID) it reports three derived sets, enriched with
//! display profiles, and caches the assembled result per identifier for a
//! short window to limit upstream calls.
//!
//! # Architecture
//!
//! - **upstream**: Provider trait, HTTP client, and response normalization
//! - **graph**: Core types (Fid, Profile, IdentifierSet), paginated fetcher, hydrator
//! - **aggregator**: Derivation of following / followers / not-following-back
//! - **gate**: Creator follow requirement resolved at startup
//! - **cache**: Per-subject TTL cache and freshness policy
//! - **service**: Per-request orchestration
//! - **server**: Axum HTTP surface
//! - **config**, **logging**, **metrics**: Ambient plumbing

// Core modules
pub mod config;
pub mod error;
pub mod graph;
pub mod upstream;

// Components
pub mod aggregator;
pub mod cache;
pub mod gate;
pub mod server;
pub mod service;

// Ambient
pub mod logging;
pub mod metrics;

// Re-exports
pub use error::{RefollowError, Result};
