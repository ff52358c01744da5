//! Insertion-ordered set of account identifiers

use super::Fid;
use indexmap::IndexSet;

/// A set of unique identifiers that iterates in first-insertion order
///
/// Upstream pages carry no meaningful order, but responses must be stable,
/// so every derived list is built from this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet(IndexSet<Fid>);

impl IdentifierSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identifier, returning false if it was already present
    pub fn insert(&mut self, fid: Fid) -> bool {
        self.0.insert(fid)
    }

    pub fn contains(&self, fid: &Fid) -> bool {
        self.0.contains(fid)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in first-insertion order
    pub fn iter(&self) -> indexmap::set::Iter<'_, Fid> {
        self.0.iter()
    }

    /// Identifiers in first-insertion order
    pub fn as_slice(&self) -> &indexmap::set::Slice<Fid> {
        self.0.as_slice()
    }

    /// Identifier at `index` in first-insertion order
    pub fn get_index(&self, index: usize) -> Option<Fid> {
        self.0.get_index(index).copied()
    }

    /// Owned copy of the identifiers, in first-insertion order
    pub fn to_vec(&self) -> Vec<Fid> {
        self.0.iter().copied().collect()
    }

    /// True if every member of `other` is in this set
    pub fn is_superset_of<'a>(&self, other: impl IntoIterator<Item = &'a Fid>) -> bool {
        other.into_iter().all(|fid| self.contains(fid))
    }
}

impl FromIterator<Fid> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = Fid>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Fid> for IdentifierSet {
    fn extend<I: IntoIterator<Item = Fid>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a Fid;
    type IntoIter = indexmap::set::Iter<'a, Fid>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
