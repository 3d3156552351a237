//! Chat channels the relay joins and announces to.

use crate::twitch::normalize_channel;
use compact_str::CompactString;

/// Normalised, duplicate-free list of channel names (no leading `#`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelList {
    channels: Vec<CompactString>,
}

impl ChannelList {
    /// Normalise raw names, dropping empty entries and duplicates.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut channels: Vec<CompactString> = Vec::new();
        for name in raw {
            if let Some(name) = normalize_channel(name.as_ref()) {
                if !channels.contains(&name) {
                    channels.push(name);
                }
            }
        }
        Self { channels }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompactString> {
        self.channels.iter()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channels to join and to part when moving from `self` to `next`.
    pub fn diff(&self, next: &ChannelList) -> (Vec<CompactString>, Vec<CompactString>) {
        let joins = next
            .channels
            .iter()
            .filter(|c| !self.contains(c))
            .cloned()
            .collect();
        let parts = self
            .channels
            .iter()
            .filter(|c| !next.contains(c))
            .cloned()
            .collect();
        (joins, parts)
    }
}
