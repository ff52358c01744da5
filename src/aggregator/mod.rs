//! Aggregation engine
//!
//! Derives the three reported sets from a subject's following and followers
//! sets and assembles them into the response payload.
//!
//! # Derived sets
//!
//! - **following**: accounts the subject follows
//! - **followers**: accounts that follow the subject
//! - **not following back**: members of following absent from followers
//!
//! All lists keep the first-insertion order of their source set so the same
//! inputs always produce the same payload.

mod engine;

pub use engine::{aggregate, build_list, AggregatedResult, Aggregation};
