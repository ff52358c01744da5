//! Paginated follower/following retrieval

use super::{Direction, Fid, IdentifierSet};
use crate::upstream::GraphProvider;
use crate::Result;
use tracing::debug;

/// Identifiers requested per upstream page
pub const PAGE_SIZE: u32 = 100;

/// Hard ceiling on pages fetched per direction (caps a direction at 300 identifiers)
pub const MAX_PAGES: usize = 3;

/// Fetch the subject's identifiers in one direction
///
/// Walks the cursor chain from the first page until the cursor runs out or
/// [`MAX_PAGES`] pages have been read. Any page failure fails the whole
/// direction; pages already read are discarded.
pub async fn fetch_identifiers(
    provider: &dyn GraphProvider,
    direction: Direction,
    subject: Fid,
) -> Result<IdentifierSet> {
    let mut ids = IdentifierSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    while pages < MAX_PAGES {
        let page = provider
            .follow_page(direction, subject, cursor.as_deref(), PAGE_SIZE)
            .await?;
        pages += 1;
        ids.extend(page.fids);

        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    debug!(
        subject = %subject,
        direction = %direction,
        pages = pages,
        count = ids.len(),
        "Fetched identifiers"
    );

    Ok(ids)
}
