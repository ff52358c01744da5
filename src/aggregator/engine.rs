//! Set derivation and payload assembly

use crate::graph::{Fid, IdentifierSet, Profile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three derived identifier sets for one subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub following: IdentifierSet,
    pub followers: IdentifierSet,
    pub not_following_back: IdentifierSet,
}

impl Aggregation {
    /// Every identifier that needs a profile: following first, then followers
    pub fn union(&self) -> IdentifierSet {
        self.following
            .iter()
            .chain(self.followers.iter())
            .copied()
            .collect()
    }

    /// Assemble the response payload from hydrated profiles
    pub fn into_result(self, profiles: &HashMap<Fid, Profile>) -> AggregatedResult {
        AggregatedResult {
            following: build_list(&self.following, profiles),
            followers: build_list(&self.followers, profiles),
            not_following_back: build_list(&self.not_following_back, profiles),
        }
    }
}

/// Externally visible payload for `/refollow`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    pub following: Vec<Profile>,
    pub followers: Vec<Profile>,
    pub not_following_back: Vec<Profile>,
}

/// Derive following / followers / not-following-back
pub fn aggregate(following: IdentifierSet, followers: IdentifierSet) -> Aggregation {
    let not_following_back = following
        .iter()
        .filter(|fid| !followers.contains(fid))
        .copied()
        .collect();

    Aggregation {
        following,
        followers,
        not_following_back,
    }
}

/// Map each identifier to its profile, or a bare profile when hydration has none
pub fn build_list(ids: &IdentifierSet, profiles: &HashMap<Fid, Profile>) -> Vec<Profile> {
    ids.iter()
        .map(|fid| {
            profiles
                .get(fid)
                .cloned()
                .unwrap_or_else(|| Profile::bare(*fid))
        })
        .collect()
}
