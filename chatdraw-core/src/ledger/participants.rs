//! Ordered, duplicate-free participant roster.

use compact_str::CompactString;
use std::collections::HashSet;

/// Participants in arrival order, backed by a uniqueness index.
///
/// The `order` vector is the display order and the sample space for winner
/// draws. Every identity in `order` appears in `index` exactly once and
/// vice versa.
#[derive(Debug, Default, Clone)]
pub struct ParticipantSet {
    order: Vec<CompactString>,
    index: HashSet<CompactString>,
}

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `identity` if it is not already present.
    ///
    /// Returns `true` if the roster changed.
    pub fn insert(&mut self, identity: &CompactString) -> bool {
        if !self.index.insert(identity.clone()) {
            return false;
        }
        self.order.push(identity.clone());
        true
    }

    /// Remove `identity`, preserving the relative order of the rest.
    ///
    /// Returns `true` if the roster changed.
    pub fn remove(&mut self, identity: &str) -> bool {
        if !self.index.remove(identity) {
            return false;
        }
        self.order.retain(|entry| entry.as_str() != identity);
        true
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&CompactString> {
        self.order.get(position)
    }

    pub fn as_slice(&self) -> &[CompactString] {
        &self.order
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.order.len() == self.index.len()
            && self.order.iter().all(|entry| self.index.contains(entry))
    }
}
