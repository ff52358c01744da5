//! Bulk resolution of identifiers to display profiles

use super::{Fid, IdentifierSet, Profile};
use crate::upstream::GraphProvider;
use crate::Result;
use std::collections::HashMap;
use tracing::debug;

/// Resolve every identifier in `ids` to a profile with one bulk request
///
/// An empty set skips the upstream call. Identifiers the provider does not
/// return are simply absent from the map; callers fall back to
/// [`Profile::bare`].
pub async fn hydrate(
    provider: &dyn GraphProvider,
    ids: &IdentifierSet,
) -> Result<HashMap<Fid, Profile>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = provider.bulk_profiles(&ids.to_vec()).await?;
    let map: HashMap<Fid, Profile> = profiles.into_iter().map(|p| (p.fid, p)).collect();

    debug!(requested = ids.len(), resolved = map.len(), "Hydrated profiles");

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Direction;
    use crate::upstream::FollowPage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Knows profiles only for even identifiers
    struct EvenProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GraphProvider for EvenProvider {
        async fn lookup_username(&self, _username: &str) -> Result<Option<Fid>> {
            Ok(None)
        }

        async fn follow_page(
            &self,
            _direction: Direction,
            _subject: Fid,
            _cursor: Option<&str>,
            _limit: u32,
        ) -> Result<FollowPage> {
            Ok(FollowPage::default())
        }

        async fn bulk_profiles(&self, fids: &[Fid]) -> Result<Vec<Profile>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(fids
                .iter()
                .filter(|f| f.value() % 2 == 0)
                .map(|f| Profile::bare(*f).with_username(format!("user{}", f)))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_empty_set_skips_upstream() {
        let provider = EvenProvider {
            calls: AtomicUsize::new(0),
        };
        let map = hydrate(&provider, &IdentifierSet::new()).await.unwrap();
        assert!(map.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_profiles_are_absent() {
        let provider = EvenProvider {
            calls: AtomicUsize::new(0),
        };
        let ids: IdentifierSet = [1, 2, 3, 4].into_iter().map(Fid::new).collect();
        let map = hydrate(&provider, &ids).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Fid::new(2)].username.as_deref(), Some("user2"));
        assert!(!map.contains_key(&Fid::new(1)));
    }
}
