//! Core social-graph data structures and retrieval
//!
//! Defines Fid, Profile, and IdentifierSet, plus the paginated fetcher and
//! the profile hydrator built on top of an upstream provider.

pub mod fetcher;
pub mod hydrator;
mod identifier_set;
mod ids;
mod profile;

pub use fetcher::fetch_identifiers;
pub use hydrator::hydrate;
pub use identifier_set::IdentifierSet;
pub use ids::{Direction, Fid, ParseFidError};
pub use profile::Profile;
