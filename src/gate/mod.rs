//! Creator follow gate
//!
//! Callers must follow a fixed set of creator accounts before they are served
//! data. The creators are configured as human-readable handles and resolved
//! to identifiers once, at startup.
//!
//! Resolution is fallible. [`resolve_creators`] reports the outcome as a
//! `Result` and the caller chooses what a failure means; the server treats it
//! as "no requirement" so a brief upstream outage at boot does not lock every
//! user out.

use crate::graph::{Fid, IdentifierSet};
use crate::upstream::GraphProvider;
use crate::{RefollowError, Result};
use tracing::{info, warn};

/// One creator the caller must follow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredCreator {
    pub handle: String,
    pub fid: Fid,
}

/// The resolved set of creators every caller must follow
///
/// Empty means the gate always passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorRequirement {
    creators: Vec<RequiredCreator>,
}

impl CreatorRequirement {
    /// A requirement that lets everyone through
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(creators: Vec<RequiredCreator>) -> Self {
        Self { creators }
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    pub fn creators(&self) -> &[RequiredCreator] {
        &self.creators
    }

    pub fn fids(&self) -> Vec<Fid> {
        self.creators.iter().map(|c| c.fid).collect()
    }

    pub fn handles(&self) -> Vec<String> {
        self.creators.iter().map(|c| c.handle.clone()).collect()
    }

    /// Pass iff `following` contains every required creator
    pub fn check(&self, following: &IdentifierSet) -> Result<()> {
        if self.is_empty() || following.is_superset_of(self.creators.iter().map(|c| &c.fid)) {
            Ok(())
        } else {
            Err(RefollowError::gate_denied(self.handles()))
        }
    }
}

/// Resolve creator handles to identifiers
///
/// Handles that fail to resolve or are unknown upstream are skipped. Returns
/// an error only when every lookup failed outright, meaning the upstream
/// could not be reached at all.
pub async fn resolve_creators(
    provider: &dyn GraphProvider,
    handles: &[String],
) -> Result<CreatorRequirement> {
    let mut creators = Vec::with_capacity(handles.len());
    let mut failures = Vec::new();

    for handle in handles {
        match provider.lookup_username(handle).await {
            Ok(Some(fid)) => creators.push(RequiredCreator {
                handle: handle.clone(),
                fid,
            }),
            Ok(None) => warn!(handle = %handle, "Creator handle not found, skipping"),
            Err(e) => {
                warn!(handle = %handle, error = %e, "Failed to resolve creator handle, skipping");
                failures.push(e);
            }
        }
    }

    if !handles.is_empty() && failures.len() == handles.len() {
        let reasons = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RefollowError::Other(format!(
            "Could not resolve any creator handle: {}",
            reasons
        )));
    }

    info!(
        required = creators.len(),
        configured = handles.len(),
        "Creator requirement resolved"
    );

    Ok(CreatorRequirement::new(creators))
}
