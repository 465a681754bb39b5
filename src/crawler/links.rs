//! Sorted, deduplicated link collections

use std::collections::btree_set;
use std::collections::BTreeSet;

/// An ordered set of absolute links
///
/// Links are unique by exact string value and iterate in lexicographic
/// order. No canonicalisation happens here: `http://a.test/x` and
/// `http://a.test/x/` are two different entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: BTreeSet<String>,
}

impl LinkSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link, returning false if it was already present
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        self.links.insert(link.into())
    }

    /// Moves every link of `other` into this set
    pub fn merge(&mut self, other: LinkSet) {
        self.links.extend(other.links);
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates links in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }

    /// Consumes the set, returning a sorted vector
    pub fn into_vec(self) -> Vec<String> {
        self.links.into_iter().collect()
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl Extend<String> for LinkSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.links.extend(iter);
    }
}
