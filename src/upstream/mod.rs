//! Upstream social-graph provider
//!
//! Everything the relay knows about the outside world goes through the
//! [`GraphProvider`] trait:
//!
//! - username → identifier lookup
//! - cursor-paginated follower/following listing by identifier
//! - bulk identifier → profile hydration
//!
//! [`NeynarClient`] is the HTTP implementation. Raw response bodies are
//! normalized in [`shapes`] before any business logic sees them, so upstream
//! shape drift stays a one-place change.

mod client;
pub mod shapes;

pub use client::NeynarClient;

use crate::graph::{Direction, Fid, Profile};
use crate::Result;
use async_trait::async_trait;

/// One page of a follower/following listing, after normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowPage {
    /// Identifiers on this page, in response order
    pub fids: Vec<Fid>,
    /// Cursor for the next page; `None` when the listing is exhausted
    pub next_cursor: Option<String>,
}

/// Source of social-graph data
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// Resolve a human-readable handle to its identifier
    ///
    /// Returns `Ok(None)` when the provider knows no such handle.
    async fn lookup_username(&self, username: &str) -> Result<Option<Fid>>;

    /// Fetch one page of the subject's followers or following
    async fn follow_page(
        &self,
        direction: Direction,
        subject: Fid,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<FollowPage>;

    /// Resolve identifiers to display profiles in a single request
    async fn bulk_profiles(&self, fids: &[Fid]) -> Result<Vec<Profile>>;
}
